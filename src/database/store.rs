use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::database::models::Table;
use crate::filter::{Filter, FilterError};

/// Errors from the remote data API
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Data API returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("Could not decode {table} row: {message}")]
    Decode { table: Table, message: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn decode(table: Table, err: serde_json::Error) -> Self {
        StoreError::Decode {
            table,
            message: err.to_string(),
        }
    }

    /// True when the backend rejected the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Api { status: 401 | 403, .. })
    }
}

/// Conflict target for idempotent inserts. Rows colliding on `columns`
/// are skipped when `ignore_duplicates` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnConflict {
    pub columns: Vec<&'static str>,
    pub ignore_duplicates: bool,
}

impl OnConflict {
    pub fn ignore(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            ignore_duplicates: true,
        }
    }

    pub fn target(&self) -> String {
        self.columns.join(",")
    }
}

/// Row-level access to the remote tables on behalf of one signed-in caller.
/// The backend enforces per-user row policies using `token`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, token: &AccessToken, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Insert rows and return the rows the backend actually created
    async fn insert(
        &self,
        token: &AccessToken,
        table: Table,
        rows: Vec<Value>,
        on_conflict: Option<&OnConflict>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Patch one row by id and return the updated rows
    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        id: Uuid,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError>;
}
