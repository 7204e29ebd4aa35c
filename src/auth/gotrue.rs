use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AccessToken, AuthError, AuthService, AuthUser, Session, SignUpOutcome};
use crate::config::BackendConfig;

/// Client for the hosted auth API (`{url}/auth/v1/...`)
#[derive(Clone)]
pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(body: TokenResponse) -> Self {
        Session {
            access_token: AccessToken::new(body.access_token),
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
            user: body.user,
        }
    }
}

impl GoTrueAuth {
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    /// Turn a non-2xx response into `AuthError::Rejected` carrying the
    /// service's own message
    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| {
                ["error_description", "msg", "message", "error"]
                    .iter()
                    .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthService for GoTrueAuth {
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .request(self.client.get(self.endpoint("user")))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("Access token rejected by auth API");
            return Ok(None);
        }
        let user = Self::check(response).await?.json::<AuthUser>().await?;
        Ok(Some(user))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .request(self.client.post(self.endpoint("token")))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = Self::check(response).await?.json::<TokenResponse>().await?;
        Ok(body.into())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .request(self.client.post(self.endpoint("signup")))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = Self::check(response).await?.json::<Value>().await?;

        // A session is only returned when no email confirmation is pending
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            Ok(SignUpOutcome::SignedIn(token.into()))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    async fn recover_password(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .request(self.client.post(self.endpoint("recover")))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        let response = self
            .request(self.client.post(self.endpoint("logout")))
            .bearer_auth(token.as_str())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
