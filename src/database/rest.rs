use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::models::Table;
use super::store::{OnConflict, RemoteStore, StoreError};
use crate::auth::AccessToken;
use crate::config::BackendConfig;
use crate::filter::Filter;

/// Client for the hosted data API (`{url}/rest/v1/{table}`)
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    hint: Option<String>,
}

impl RestStore {
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn authorize(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token.as_str())
    }

    async fn read_rows(table: Table, response: Response) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
            let (message, code) = match body {
                Some(body) => {
                    let mut message = body.message.unwrap_or_else(|| text.clone());
                    if let Some(hint) = body.hint {
                        message = format!("{} ({})", message, hint);
                    }
                    (message, body.code)
                }
                None => (text, None),
            };
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
                code,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        match serde_json::from_str::<Value>(&text).map_err(|e| StoreError::decode(table, e))? {
            Value::Array(rows) => Ok(rows),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(StoreError::Decode {
                table,
                message: format!("expected rows, got {}", other),
            }),
        }
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, token: &AccessToken, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let table = filter.table();
        let query = filter.to_query_pairs()?;
        debug!(table = %table, ?query, "select");

        let request = self.client.get(self.table_url(table)).query(&query);
        let response = self.authorize(request, token).send().await?;
        Self::read_rows(table, response).await
    }

    async fn insert(
        &self,
        token: &AccessToken,
        table: Table,
        rows: Vec<Value>,
        on_conflict: Option<&OnConflict>,
    ) -> Result<Vec<Value>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        debug!(table = %table, count = rows.len(), "insert");

        let mut request = self.client.post(self.table_url(table)).json(&rows);
        let mut prefer = "return=representation".to_string();
        if let Some(conflict) = on_conflict {
            request = request.query(&[("on_conflict", conflict.target())]);
            if conflict.ignore_duplicates {
                prefer.push_str(",resolution=ignore-duplicates");
            } else {
                prefer.push_str(",resolution=merge-duplicates");
            }
        }

        let response = self
            .authorize(request, token)
            .header("Prefer", prefer)
            .send()
            .await?;
        Self::read_rows(table, response).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        id: Uuid,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        debug!(table = %table, %id, "update");

        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .json(&patch);
        let response = self
            .authorize(request, token)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::read_rows(table, response).await
    }
}
