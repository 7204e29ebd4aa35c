use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::{AuthClient, AuthService, GoTrueAuth};
use crate::config::BackendConfig;
use crate::database::{RemoteStore, RestStore};
use crate::types::{Clock, SystemClock};

/// Handles to the hosted backend shared by every request
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn RemoteStore>,
    pub auth: AuthClient,
    pub clock: Arc<dyn Clock>,
}

impl Backend {
    pub fn new(store: Arc<dyn RemoteStore>, auth: Arc<dyn AuthService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            auth: AuthClient::new(auth),
            clock,
        }
    }

    /// Remote store and auth clients over one shared HTTP client
    pub fn connect(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = http_client(config)?;
        Ok(Self::new(
            Arc::new(RestStore::new(client.clone(), config)),
            Arc::new(GoTrueAuth::new(client, config)),
            Arc::new(SystemClock),
        ))
    }
}

pub fn http_client(config: &BackendConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(concat!("babyzoom/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}
