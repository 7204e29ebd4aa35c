use anyhow::{anyhow, bail, Context};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Thin client for the `/api` envelope: unwraps `data` on success and turns
/// `{ "success": false, ... }` bodies into errors.
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(server: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL: {}", server))?;
        let http = Client::builder()
            .user_agent(concat!("babyzoom-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(Method::GET, path).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(Method::POST, path).await
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str) -> anyhow::Result<T> {
        let url = self.base.join(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("{} returned a non-JSON body ({})", url, status))?;

        Self::unwrap_envelope(status, body)
    }

    fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, body: Value) -> anyhow::Result<T> {
        if !status.is_success() || body.get("success") != Some(&Value::Bool(true)) {
            let message = body.get("error").and_then(Value::as_str).unwrap_or("request failed");
            let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
            if status == StatusCode::UNAUTHORIZED {
                bail!("{} ({}): sign in with `babyzoom-cli login` and pass --token", message, code);
            }
            bail!("{} ({}, HTTP {})", message, code, status.as_u16());
        }

        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| anyhow!("response has no data"))?;
        Ok(serde_json::from_value(data)?)
    }
}
