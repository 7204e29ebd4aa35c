use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    /// Encode order infos as `"start_time.desc,name.asc"`
    pub fn generate(infos: &[FilterOrderInfo]) -> Option<String> {
        if infos.is_empty() {
            return None;
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{}.{}", i.column, i.sort.keyword()))
            .collect();
        Some(parts.join(","))
    }
}
