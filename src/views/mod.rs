//! Server-rendered pages. Templates are compiled into the binary and
//! rendered from view models that carry display-ready values only.

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

pub mod auth;
pub mod home;

pub use auth::AuthPage;
pub use home::HomePage;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

const TEMPLATES: &[(&str, &str)] = &[
    ("home", include_str!("../../templates/home.hbs")),
    ("auth", include_str!("../../templates/auth.hbs")),
];

const PARTIALS: &[(&str, &str)] = &[("head", include_str!("../../templates/head.hbs"))];

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, ViewError> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    pub fn render_home(&self, page: &HomePage) -> Result<String, ViewError> {
        self.render("home", page)
    }

    pub fn render_auth(&self, page: &AuthPage) -> Result<String, ViewError> {
        self.render("auth", page)
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, ViewError> {
        Ok(self.registry.render(template, data)?)
    }
}
