use serde_json::Value;

use super::error::FilterError;
use super::types::FilterWhereInfo;

/// Encodes equality conditions into `column=eq.value` query pairs.
pub struct FilterWhere;

impl FilterWhere {
    pub fn validate(condition: &FilterWhereInfo) -> Result<(), FilterError> {
        match &condition.data {
            Value::Array(_) | Value::Object(_) => Err(FilterError::InvalidValue(format!(
                "{} requires a scalar value, got {}",
                condition.column, condition.data
            ))),
            _ => Ok(()),
        }
    }

    pub fn to_param(condition: &FilterWhereInfo) -> (String, String) {
        let value = match &condition.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (condition.column.clone(), format!("eq.{}", value))
    }
}
