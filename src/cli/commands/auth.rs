use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::auth::{AuthClient, GoTrueAuth};
use crate::backend::http_client;
use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Password sign-in straight against the auth service. Needs the same
/// backend variables as the server (`SUPABASE_URL`, `SUPABASE_ANON_KEY`).
pub async fn login(email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("backend configuration is required to sign in")?;
    let client = http_client(&config.backend)?;
    let auth = AuthClient::new(Arc::new(GoTrueAuth::new(client, &config.backend)));

    let session = auth.sign_in(email.trim(), password).await?;

    let data = json!({
        "user_id": session.user.id,
        "email": session.user.email,
        "access_token": session.access_token.as_str(),
        "expires_in": session.expires_in,
    });
    output(output_format, &data, |_| {
        format!(
            "✓ Signed in as {}\nexport BABYZOOM_TOKEN={}",
            session.user.email.as_deref().unwrap_or(email),
            session.access_token.as_str()
        )
    })
}
