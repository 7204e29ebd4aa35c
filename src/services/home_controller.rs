//! Per-session state behind the main view.
//!
//! A controller is created for one request, owns that session's
//! collections, and is dropped with the response. Nothing here is shared
//! between sessions.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{AccessToken, AuthUser, Authenticated};
use crate::backend::Backend;
use crate::database::models::{
    Nap, NapInsert, NapQuality, Profile, ProfileUpdate, Record, Routine, RoutineCompletion, Vaccine,
    VaccineCompletion,
};
use crate::database::{Repository, StoreError};
use crate::filter::SortDirection;
use crate::services::catalog::Catalog;
use crate::services::metrics::DashboardSummary;
use crate::services::seed_service::{SeedReport, SeedService};

pub const NAP_MINUTES: i64 = 90;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The four per-user collections as last loaded or confirmed
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeState {
    pub profile: Option<Profile>,
    /// Most recent first
    pub naps: Vec<Nap>,
    /// Oldest first
    pub vaccines: Vec<Vaccine>,
    /// Today's, by time of day
    pub routines: Vec<Routine>,
}

pub enum Activation {
    /// No valid session; the caller should go to the login view
    Login,
    Ready(HomeController),
}

pub struct HomeController {
    backend: Backend,
    catalog: Arc<Catalog>,
    recent_naps_limit: u32,
    user: AuthUser,
    token: AccessToken,
    state: HomeState,
    seed_report: Option<SeedReport>,
}

impl HomeController {
    /// Bootstrap the view for `session`: load, seed what is missing, reload.
    pub async fn activate(
        backend: &Backend,
        catalog: Arc<Catalog>,
        recent_naps_limit: u32,
        session: Option<Authenticated>,
    ) -> Activation {
        let Some(session) = session else {
            debug!("No session, sending to login");
            return Activation::Login;
        };
        let mut controller = Self::attach(backend, catalog, recent_naps_limit, session);
        controller.bootstrap().await;
        Activation::Ready(controller)
    }

    /// Bind to an already validated session without loading anything
    pub fn attach(backend: &Backend, catalog: Arc<Catalog>, recent_naps_limit: u32, session: Authenticated) -> Self {
        Self {
            backend: backend.clone(),
            catalog,
            recent_naps_limit,
            user: session.user,
            token: session.token,
            state: HomeState::default(),
            seed_report: None,
        }
    }

    pub async fn bootstrap(&mut self) {
        self.refresh().await;

        let today = self.backend.clock.today();
        let seeder = SeedService::new(self.backend.store.clone(), &self.token, &self.catalog);
        let report = seeder.seed_defaults(&self.user, today).await;
        self.seed_report = Some(report);

        self.refresh().await;
    }

    /// Reload every collection. A collection that fails to load is logged
    /// and left empty.
    pub async fn refresh(&mut self) {
        let (profile, naps, vaccines, routines) = futures::join!(
            self.load_profile(),
            self.load_naps(),
            self.load_vaccines(),
            self.load_routines()
        );

        self.state = HomeState {
            profile: Self::or_empty("profile", profile),
            naps: Self::or_empty("naps", naps),
            vaccines: Self::or_empty("vaccines", vaccines),
            routines: Self::or_empty("routines", routines),
        };
    }

    async fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        self.repo::<Profile>()
            .select_one(Repository::<Profile>::filter().eq("id", self.user.id.to_string()))
            .await
    }

    async fn load_naps(&self) -> Result<Vec<Nap>, StoreError> {
        let filter = Repository::<Nap>::filter()
            .eq("user_id", self.user.id.to_string())
            .order("start_time", SortDirection::Desc)
            .limit(self.recent_naps_limit);
        self.repo::<Nap>().select_any(filter).await
    }

    async fn load_vaccines(&self) -> Result<Vec<Vaccine>, StoreError> {
        let filter = Repository::<Vaccine>::filter()
            .eq("user_id", self.user.id.to_string())
            .order("created_at", SortDirection::Asc);
        self.repo::<Vaccine>().select_any(filter).await
    }

    async fn load_routines(&self) -> Result<Vec<Routine>, StoreError> {
        let filter = Repository::<Routine>::filter()
            .eq("user_id", self.user.id.to_string())
            .eq("date", self.backend.clock.today().to_string())
            .order("time", SortDirection::Asc);
        self.repo::<Routine>().select_any(filter).await
    }

    /// Flip a vaccine's completion. Completing stamps today's date and
    /// un-completing clears it.
    pub async fn toggle_vaccine(&mut self, id: Uuid) -> Result<Vaccine, ControllerError> {
        let current = self.find_or_fetch::<Vaccine>(id, |s| &s.vaccines).await?;
        let patch = VaccineCompletion::toggled(&current, self.backend.clock.today());

        let updated = self.write(self.repo::<Vaccine>().update_404(id, &patch).await, "toggle vaccine")?;
        if let Some(slot) = self.state.vaccines.iter_mut().find(|v| v.id == id) {
            *slot = updated.clone();
        }
        info!(user_id = %self.user.id, vaccine = %updated.name, completed = updated.completed, "Vaccine toggled");
        Ok(updated)
    }

    /// Record a nap of fixed length ending now
    pub async fn add_nap(&mut self) -> Result<Nap, ControllerError> {
        let now = self.backend.clock.now();
        let row = NapInsert {
            user_id: self.user.id,
            start_time: now - Duration::minutes(NAP_MINUTES),
            end_time: now,
            duration_minutes: NAP_MINUTES as i32,
            quality: NapQuality::Good,
            date: now.date_naive(),
        };

        let nap = self.write(self.repo::<Nap>().insert_one(&row).await, "add nap")?;
        self.state.naps.insert(0, nap.clone());
        info!(user_id = %self.user.id, nap_id = %nap.id, "Nap recorded");
        Ok(nap)
    }

    pub async fn toggle_routine(&mut self, id: Uuid) -> Result<Routine, ControllerError> {
        let current = self.find_or_fetch::<Routine>(id, |s| &s.routines).await?;
        let patch = RoutineCompletion {
            completed: !current.completed,
        };

        let updated = self.write(self.repo::<Routine>().update_404(id, &patch).await, "toggle routine")?;
        if let Some(slot) = self.state.routines.iter_mut().find(|r| r.id == id) {
            *slot = updated.clone();
        }
        info!(user_id = %self.user.id, routine = %updated.title, completed = updated.completed, "Routine toggled");
        Ok(updated)
    }

    pub async fn update_profile(&mut self, mut update: ProfileUpdate) -> Result<Profile, ControllerError> {
        update.full_name = update.full_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        update.baby_name = update.baby_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if update.is_empty() {
            return Err(ControllerError::Invalid("Nothing to update".to_string()));
        }
        update.updated_at = Some(self.backend.clock.now());

        let profile = self.write(
            self.repo::<Profile>().update_404(self.user.id, &update).await,
            "update profile",
        )?;
        self.state.profile = Some(profile.clone());
        info!(user_id = %self.user.id, "Profile updated");
        Ok(profile)
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn state(&self) -> &HomeState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn seed_report(&self) -> Option<&SeedReport> {
        self.seed_report.as_ref()
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(
            &self.state.vaccines,
            &self.state.naps,
            &self.state.routines,
            self.backend.clock.today(),
        )
    }

    fn repo<T: Record>(&self) -> Repository<'_, T> {
        Repository::new(self.backend.store.clone(), &self.token)
    }

    async fn find_or_fetch<T: Record + Clone>(
        &self,
        id: Uuid,
        local: impl Fn(&HomeState) -> &Vec<T>,
    ) -> Result<T, ControllerError> {
        if let Some(found) = local(&self.state).iter().find(|r| r.id() == id) {
            return Ok(found.clone());
        }
        self.repo::<T>()
            .select_one(Repository::<T>::filter().eq("id", id.to_string()))
            .await?
            .ok_or_else(|| ControllerError::NotFound(format!("{} record {} not found", T::TABLE, id)))
    }

    // Local state is only touched by callers after this returns Ok
    fn write<T>(&self, result: Result<T, StoreError>, action: &'static str) -> Result<T, ControllerError> {
        result.map_err(|e| {
            warn!(user_id = %self.user.id, action, "Write failed: {}", e);
            match e {
                StoreError::NotFound(message) => ControllerError::NotFound(message),
                other => ControllerError::Store(other),
            }
        })
    }

    fn or_empty<T: Default>(collection: &'static str, result: Result<T, StoreError>) -> T {
        result.unwrap_or_else(|e| {
            warn!(collection, "Load failed, showing empty: {}", e);
            T::default()
        })
    }
}
