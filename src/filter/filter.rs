use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterWhereInfo, SortDirection};
use crate::database::models::Table;

/// Read request against one remote table: projection, equality conditions,
/// order and limit.
#[derive(Debug, Clone)]
pub struct Filter {
    table: Table,
    select_columns: Vec<String>,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            select_columns: vec![],
            conditions: vec![],
            order_data: vec![],
            limit: None,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo {
            column: column.to_string(),
            data: value.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, sort: SortDirection) -> Self {
        self.order_data.push(FilterOrderInfo {
            column: column.to_string(),
            sort,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Encode as query pairs for the remote data API
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, FilterError> {
        self.validate()?;

        let mut pairs = vec![("select".to_string(), self.build_select_clause())];
        for condition in &self.conditions {
            pairs.push(FilterWhere::to_param(condition));
        }
        if let Some(order) = FilterOrder::generate(&self.order_data) {
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        Ok(pairs)
    }

    fn validate(&self) -> Result<(), FilterError> {
        for column in &self.select_columns {
            if column != "*" {
                Self::validate_column(column)?;
            }
        }
        for condition in &self.conditions {
            Self::validate_column(&condition.column)?;
            FilterWhere::validate(condition)?;
        }
        for order in &self.order_data {
            Self::validate_column(&order.column)?;
        }
        Ok(())
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let mut chars = column.chars();
        let valid_start = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
        if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.join(",")
        }
    }
}
