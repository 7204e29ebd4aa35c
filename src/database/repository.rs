use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::database::models::Record;
use crate::database::store::{OnConflict, RemoteStore, StoreError};
use crate::filter::Filter;

/// Typed access to one table through a [`RemoteStore`], scoped to the
/// caller's access token.
pub struct Repository<'a, T> {
    store: Arc<dyn RemoteStore>,
    token: &'a AccessToken,
    _phantom: PhantomData<T>,
}

impl<'a, T: Record> Repository<'a, T> {
    pub fn new(store: Arc<dyn RemoteStore>, token: &'a AccessToken) -> Self {
        Self {
            store,
            token,
            _phantom: PhantomData,
        }
    }

    /// Start a filter against this repository's table
    pub fn filter() -> Filter {
        Filter::new(T::TABLE)
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        let rows = self.store.select(self.token, &filter).await?;
        Self::decode_all(rows)
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        let mut rows = self.select_any(filter.limit(1)).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Whether at least one row matches
    pub async fn exists(&self, filter: Filter) -> Result<bool, StoreError> {
        let rows = self.store.select(self.token, &filter.select(&["id"]).limit(1)).await?;
        Ok(!rows.is_empty())
    }

    pub async fn insert_many<I: Serialize>(
        &self,
        rows: &[I],
        on_conflict: Option<&OnConflict>,
    ) -> Result<Vec<T>, StoreError> {
        let values = rows
            .iter()
            .map(|row| serde_json::to_value(row).map_err(|e| StoreError::decode(T::TABLE, e)))
            .collect::<Result<Vec<Value>, _>>()?;
        let created = self.store.insert(self.token, T::TABLE, values, on_conflict).await?;
        Self::decode_all(created)
    }

    pub async fn insert_one<I: Serialize>(&self, row: &I) -> Result<T, StoreError> {
        self.insert_many(std::slice::from_ref(row), None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{} insert returned no row", T::TABLE)))
    }

    /// Patch one row; a missing (or invisible) row is `NotFound`
    pub async fn update_404<P: Serialize>(&self, id: Uuid, patch: &P) -> Result<T, StoreError> {
        let patch = serde_json::to_value(patch).map_err(|e| StoreError::decode(T::TABLE, e))?;
        self.store
            .update(self.token, T::TABLE, id, patch)
            .await
            .and_then(Self::decode_all)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{} record {} not found", T::TABLE, id)))
    }

    fn decode_all(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| StoreError::decode(T::TABLE, e)))
            .collect()
    }
}
