use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::database::models::{RoutineKind, VaccineKind};

const EMBEDDED_CATALOG: &str = include_str!("catalog.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Static content: seed sets, suggestions and auth page copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub profile: ProfileDefaults,
    pub vaccines: Vec<VaccineSeed>,
    pub routines: Vec<RoutineSeed>,
    pub activities: Vec<Activity>,
    pub sleep_guidelines: Vec<SleepGuideline>,
    pub auth: AuthCopy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefaults {
    pub full_name: String,
    pub baby_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccineSeed {
    pub name: String,
    pub age_recommendation: String,
    #[serde(rename = "type")]
    pub kind: VaccineKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineSeed {
    #[serde(rename = "type")]
    pub kind: RoutineKind,
    pub title: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sensorial,
    Motora,
    Cognitiva,
}

impl ActivityCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::Sensorial => "Sensorial",
            ActivityCategory::Motora => "Motora",
            ActivityCategory::Cognitiva => "Cognitiva",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub age_range: String,
    pub category: ActivityCategory,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepGuideline {
    pub age: String,
    pub total: String,
    pub naps: String,
    pub night: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCopy {
    pub tagline: String,
    pub footer: String,
    pub sign_in: FormCopy,
    pub sign_up: FormCopy,
    pub forgotten_password: FormCopy,
    /// CSS custom properties for the auth page, keyed by property name
    pub theme: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormCopy {
    pub email_label: String,
    pub password_label: Option<String>,
    pub email_input_placeholder: String,
    pub password_input_placeholder: Option<String>,
    pub button_label: String,
    pub loading_button_label: String,
    pub link_text: String,
    pub confirmation_text: Option<String>,
}

impl Catalog {
    /// The catalogue compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::parse(EMBEDDED_CATALOG)
    }

    /// Load from `path` when given, the embedded catalogue otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let catalog = Self::parse(&content)?;
                info!("Loaded catalog from {:?}", path);
                Ok(catalog)
            }
            None => {
                debug!("Using embedded catalog");
                Self::embedded()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::new();
        for vaccine in &self.vaccines {
            if vaccine.name.trim().is_empty() {
                return Err(CatalogError::Invalid("vaccine with empty name".to_string()));
            }
            if !names.insert(vaccine.name.as_str()) {
                return Err(CatalogError::Invalid(format!("duplicate vaccine {}", vaccine.name)));
            }
        }

        let mut slots = HashSet::new();
        for routine in &self.routines {
            if NaiveTime::parse_from_str(&routine.time, "%H:%M").is_err() {
                return Err(CatalogError::Invalid(format!(
                    "routine {} has time {:?}, expected HH:MM",
                    routine.title, routine.time
                )));
            }
            if !slots.insert((routine.kind, routine.title.as_str(), routine.time.as_str())) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate routine {} at {}",
                    routine.title, routine.time
                )));
            }
        }
        Ok(())
    }
}
