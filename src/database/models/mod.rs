//! Shapes of the remote tables. Rows are what the data API returns; the
//! `*Insert` / patch types are what this application writes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod achievement;
pub mod nap;
pub mod profile;
pub mod routine;
pub mod vaccine;

pub use achievement::Achievement;
pub use nap::{Nap, NapInsert, NapQuality};
pub use profile::{Profile, ProfileInsert, ProfileUpdate};
pub use routine::{Routine, RoutineCompletion, RoutineInsert, RoutineKind};
pub use vaccine::{Vaccine, VaccineCompletion, VaccineInsert, VaccineKind};

/// Remote tables addressed by this application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Routines,
    Naps,
    Vaccines,
    Achievements,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Profiles,
        Table::Routines,
        Table::Naps,
        Table::Vaccines,
        Table::Achievements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Routines => "routines",
            Table::Naps => "naps",
            Table::Vaccines => "vaccines",
            Table::Achievements => "achievements",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Column holding the owning account id
    pub fn owner_column(&self) -> &'static str {
        match self {
            Table::Profiles => "id",
            _ => "user_id",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type stored in one remote table
pub trait Record: DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;

    fn id(&self) -> Uuid;
}
