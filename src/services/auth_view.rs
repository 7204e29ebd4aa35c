use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::auth::{AccessToken, AuthClient, AuthError, Session, SessionEvent, SignUpOutcome, Subscription};
use crate::types::Route;

/// Which form the auth page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
    Recover,
}

impl AuthMode {
    pub fn from_path(segment: Option<&str>) -> Self {
        match segment {
            Some("sign-up") => AuthMode::SignUp,
            Some("recover") => AuthMode::Recover,
            _ => AuthMode::SignIn,
        }
    }
}

/// Lifecycle of the auth page for one request.
///
/// While mounted the view listens for session changes and flips to
/// "go home" as soon as a session appears. The listener is released once,
/// by [`AuthView::teardown`] or by drop.
pub struct AuthView {
    auth: AuthClient,
    subscription: Option<Subscription>,
    session_seen: Arc<AtomicBool>,
}

impl AuthView {
    /// Mount the view. An `existing` token the auth API accepts skips the
    /// forms entirely.
    pub async fn mount(auth: AuthClient, existing: Option<&AccessToken>) -> Self {
        let session_seen = Arc::new(AtomicBool::new(false));
        let flag = session_seen.clone();
        let subscription = auth.on_auth_state_change(move |event| {
            if let SessionEvent::SignedIn(_) = event {
                flag.store(true, Ordering::SeqCst);
            }
        });

        if let Some(token) = existing {
            if auth.current_user(token).await.is_some() {
                debug!("Existing session, skipping auth forms");
                session_seen.store(true, Ordering::SeqCst);
            }
        }

        Self {
            auth,
            subscription: Some(subscription),
            session_seen,
        }
    }

    /// Where to navigate, if anywhere
    pub fn destination(&self) -> Option<Route> {
        self.session_seen.load(Ordering::SeqCst).then_some(Route::Home)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.auth.sign_in(email.trim(), password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        self.auth.sign_up(email.trim(), password).await
    }

    pub async fn recover(&self, email: &str) -> Result<(), AuthError> {
        self.auth.recover_password(email.trim()).await
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.as_ref().map(Subscription::is_active).unwrap_or(false)
    }

    /// Release the session listener. Returns false if it was already gone.
    pub fn teardown(&mut self) -> bool {
        self.subscription
            .take()
            .map(Subscription::unsubscribe)
            .unwrap_or(false)
    }
}
