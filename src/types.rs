/// Shared types used across the codebase

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tabs of the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Routine,
    Activities,
    Sleep,
    Vaccines,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Dashboard, Tab::Routine, Tab::Activities, Tab::Sleep, Tab::Vaccines];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Routine => "routine",
            Tab::Activities => "activities",
            Tab::Sleep => "sleep",
            Tab::Vaccines => "vaccines",
        }
    }

    /// Unknown names fall back to the dashboard
    pub fn parse(name: Option<&str>) -> Tab {
        name.and_then(|n| Tab::ALL.into_iter().find(|t| t.as_str() == n))
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Início",
            Tab::Routine => "Rotina",
            Tab::Activities => "Atividades",
            Tab::Sleep => "Sono",
            Tab::Vaccines => "Vacinas",
        }
    }

    /// Home URL with this tab selected
    pub fn href(&self) -> String {
        match self {
            Tab::Dashboard => Route::Home.path().to_string(),
            tab => format!("{}?tab={}", Route::Home.path(), tab.as_str()),
        }
    }
}

/// The two logical page routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth",
            Route::Home => "/",
        }
    }
}

/// Source of the current instant. Calendar dates are UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
