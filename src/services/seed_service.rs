use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{AccessToken, AuthUser};
use crate::database::models::{
    Profile, ProfileInsert, Routine, RoutineInsert, Vaccine, VaccineInsert,
};
use crate::database::{OnConflict, RemoteStore, Repository, StoreError};
use crate::services::catalog::Catalog;

const PROFILE_KEY: &[&str] = &["id"];
const VACCINE_KEY: &[&str] = &["user_id", "name"];
const ROUTINE_KEY: &[&str] = &["user_id", "date", "type", "time", "title"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SeedOutcome {
    AlreadyPresent,
    /// Number of rows this call actually created
    Seeded(usize),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub profile: SeedOutcome,
    pub vaccines: SeedOutcome,
    pub routines: SeedOutcome,
}

impl SeedReport {
    pub fn created_anything(&self) -> bool {
        [&self.profile, &self.vaccines, &self.routines]
            .iter()
            .any(|o| matches!(o, SeedOutcome::Seeded(n) if *n > 0))
    }
}

/// Creates the default profile, vaccine list and daily routine for an
/// account that has none. Inserts are keyed on uniqueness constraints with
/// duplicates ignored, so concurrent first logins cannot double-seed.
pub struct SeedService<'a> {
    store: Arc<dyn RemoteStore>,
    token: &'a AccessToken,
    catalog: &'a Catalog,
}

impl<'a> SeedService<'a> {
    pub fn new(store: Arc<dyn RemoteStore>, token: &'a AccessToken, catalog: &'a Catalog) -> Self {
        Self { store, token, catalog }
    }

    /// Run every step. Steps are independent: a failure is logged and
    /// recorded in the report, and the remaining steps still run.
    pub async fn seed_defaults(&self, user: &AuthUser, today: NaiveDate) -> SeedReport {
        let report = SeedReport {
            profile: Self::settle("profile", self.seed_profile(user, today).await),
            vaccines: Self::settle("vaccines", self.seed_vaccines(user).await),
            routines: Self::settle("routines", self.seed_routines(user, today).await),
        };
        if report.created_anything() {
            info!(user_id = %user.id, ?report, "Seeded default data");
        }
        report
    }

    async fn seed_profile(&self, user: &AuthUser, today: NaiveDate) -> Result<SeedOutcome, StoreError> {
        let repo = Repository::<Profile>::new(self.store.clone(), self.token);
        if repo.exists(Repository::<Profile>::filter().eq("id", user.id.to_string())).await? {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let defaults = &self.catalog.profile;
        let row = ProfileInsert {
            id: user.id,
            email: user.email.clone(),
            full_name: defaults.full_name.clone(),
            baby_name: defaults.baby_name.clone(),
            baby_birth_date: today,
        };
        let created = repo.insert_many(&[row], Some(&OnConflict::ignore(PROFILE_KEY))).await?;
        Ok(SeedOutcome::Seeded(created.len()))
    }

    async fn seed_vaccines(&self, user: &AuthUser) -> Result<SeedOutcome, StoreError> {
        let repo = Repository::<Vaccine>::new(self.store.clone(), self.token);
        if repo.exists(Repository::<Vaccine>::filter().eq("user_id", user.id.to_string())).await? {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let rows: Vec<VaccineInsert> = self
            .catalog
            .vaccines
            .iter()
            .map(|seed| VaccineInsert {
                user_id: user.id,
                name: seed.name.clone(),
                age_recommendation: seed.age_recommendation.clone(),
                kind: seed.kind,
            })
            .collect();
        let created = repo.insert_many(&rows, Some(&OnConflict::ignore(VACCINE_KEY))).await?;
        Ok(SeedOutcome::Seeded(created.len()))
    }

    // Any routine on any date counts as "already seeded"
    async fn seed_routines(&self, user: &AuthUser, today: NaiveDate) -> Result<SeedOutcome, StoreError> {
        let repo = Repository::<Routine>::new(self.store.clone(), self.token);
        if repo.exists(Repository::<Routine>::filter().eq("user_id", user.id.to_string())).await? {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let rows: Vec<RoutineInsert> = self
            .catalog
            .routines
            .iter()
            .map(|seed| RoutineInsert {
                user_id: user.id,
                kind: seed.kind,
                title: seed.title.clone(),
                time: seed.time.clone(),
                date: today,
            })
            .collect();
        let created = repo.insert_many(&rows, Some(&OnConflict::ignore(ROUTINE_KEY))).await?;
        Ok(SeedOutcome::Seeded(created.len()))
    }

    fn settle(step: &'static str, result: Result<SeedOutcome, StoreError>) -> SeedOutcome {
        result.unwrap_or_else(|e| {
            warn!(step, "Seeding step failed: {}", e);
            SeedOutcome::Failed(e.to_string())
        })
    }
}
