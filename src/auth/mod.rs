//! Session handling against the hosted auth API.
//!
//! Credentials are never checked locally: the remote service is the only
//! authority on whether an access token is valid. This module wraps that
//! service behind [`AuthService`] and adds the session-change notification
//! stream the auth view listens on.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub mod claims;
pub mod cookies;
pub mod events;
pub mod gotrue;

pub use claims::TokenClaims;
pub use events::{SessionEvent, SessionEvents, Subscription};
pub use gotrue::GoTrueAuth;

/// Errors from the remote auth API
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected auth response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}

/// Bearer token issued by the auth API. Debug output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Identity the auth API resolved a token to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A request whose token the auth API has vouched for
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: AuthUser,
    pub token: AccessToken,
}

/// An established session: identity plus validity window
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: AccessToken,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds as reported by the auth API
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created and signed in immediately
    SignedIn(Session),
    /// Account created; the address must be confirmed before sign-in
    ConfirmationRequired,
}

/// Remote auth service seam
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a token to its identity. `Ok(None)` means the token is not
    /// (or no longer) valid.
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn recover_password(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError>;
}

/// Auth facade used by the views: wraps the remote service and publishes
/// session changes to subscribers.
#[derive(Clone)]
pub struct AuthClient {
    service: Arc<dyn AuthService>,
    events: Arc<SessionEvents>,
}

impl AuthClient {
    pub fn new(service: Arc<dyn AuthService>) -> Self {
        Self {
            service,
            events: Arc::new(SessionEvents::default()),
        }
    }

    /// Same remote service with its own listener registry, so listeners
    /// only observe changes made through this handle
    pub fn scoped(&self) -> Self {
        Self {
            service: self.service.clone(),
            events: Arc::new(SessionEvents::default()),
        }
    }

    /// Validate a token. Transport or API failures count as "no session".
    pub async fn current_user(&self, token: &AccessToken) -> Option<AuthUser> {
        match self.service.get_user(token).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Session validation failed, treating as signed out: {}", e);
                None
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.service.sign_in_with_password(email, password).await?;
        info!(user_id = %session.user.id, "Signed in");
        self.events.publish(&SessionEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.service.sign_up(email, password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            info!(user_id = %session.user.id, "Signed up");
            self.events.publish(&SessionEvent::SignedIn(session.user.clone()));
        }
        Ok(outcome)
    }

    pub async fn recover_password(&self, email: &str) -> Result<(), AuthError> {
        self.service.recover_password(email).await?;
        self.events.publish(&SessionEvent::PasswordRecovery);
        Ok(())
    }

    /// Remote sign-out. A failure is logged; the caller clears its cookie
    /// either way.
    pub async fn sign_out(&self, token: &AccessToken) {
        if let Err(e) = self.service.sign_out(token).await {
            warn!("Remote sign-out failed: {}", e);
        }
        self.events.publish(&SessionEvent::SignedOut);
    }

    /// Register a session-change listener. It stays registered until the
    /// returned subscription is released.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn events(&self) -> &Arc<SessionEvents> {
        &self.events
    }

    /// Validate `token` and pair it with the identity it resolves to
    pub async fn authenticate(&self, token: AccessToken) -> Option<Authenticated> {
        self.current_user(&token)
            .await
            .map(|user| Authenticated { user, token })
    }
}
