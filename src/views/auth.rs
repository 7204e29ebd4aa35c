use serde::Serialize;

use crate::services::catalog::{AuthCopy, FormCopy};
use crate::services::AuthMode;

#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub tagline: String,
    pub footer: String,
    pub theme: Vec<ThemeVar>,
    pub form: FormCopy,
    pub action: &'static str,
    pub is_sign_in: bool,
    pub is_sign_up: bool,
    pub is_recover: bool,
    pub sign_in_link: String,
    pub sign_up_link: String,
    pub recover_link: String,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThemeVar {
    pub name: String,
    pub value: String,
}

impl AuthPage {
    pub fn new(copy: &AuthCopy, mode: AuthMode) -> Self {
        let form = match mode {
            AuthMode::SignIn => &copy.sign_in,
            AuthMode::SignUp => &copy.sign_up,
            AuthMode::Recover => &copy.forgotten_password,
        };
        Self {
            tagline: copy.tagline.clone(),
            footer: copy.footer.clone(),
            theme: copy
                .theme
                .iter()
                .map(|(name, value)| ThemeVar {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            form: form.clone(),
            action: match mode {
                AuthMode::SignIn => "/auth/sign-in",
                AuthMode::SignUp => "/auth/sign-up",
                AuthMode::Recover => "/auth/recover",
            },
            is_sign_in: mode == AuthMode::SignIn,
            is_sign_up: mode == AuthMode::SignUp,
            is_recover: mode == AuthMode::Recover,
            sign_in_link: copy.sign_in.link_text.clone(),
            sign_up_link: copy.sign_up.link_text.clone(),
            recover_link: copy.forgotten_password.link_text.clone(),
            email: String::new(),
            error: None,
            notice: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.trim().to_string();
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Show the form's confirmation text
    pub fn confirmed(mut self) -> Self {
        self.notice = self.form.confirmation_text.clone();
        self
    }
}
