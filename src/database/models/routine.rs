use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Sleep,
    Feeding,
    Play,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: RoutineKind,
    pub title: String,
    /// Wall-clock time, `HH:MM`
    pub time: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
    pub completed: bool,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Record for Routine {
    const TABLE: Table = Table::Routines;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineInsert {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: RoutineKind,
    pub title: String,
    pub time: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineCompletion {
    pub completed: bool,
}
