use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccineKind {
    Mandatory,
    Optional,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age_recommendation: String,
    #[serde(rename = "type")]
    pub kind: VaccineKind,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Vaccine {
    const TABLE: Table = Table::Vaccines;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VaccineInsert {
    pub user_id: Uuid,
    pub name: String,
    pub age_recommendation: String,
    #[serde(rename = "type")]
    pub kind: VaccineKind,
}

/// Completion patch. `completed_date` is always sent so un-completing clears it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaccineCompletion {
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
}

impl VaccineCompletion {
    /// The patch that flips `vaccine`'s completion as of `today`
    pub fn toggled(vaccine: &Vaccine, today: NaiveDate) -> Self {
        let completed = !vaccine.completed;
        Self {
            completed,
            completed_date: completed.then_some(today),
        }
    }
}
