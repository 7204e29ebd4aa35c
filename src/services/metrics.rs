//! Figures derived from the loaded collections. Recomputed on every
//! render and never written back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::database::models::{Nap, Routine, Vaccine};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VaccineProgress {
    pub completed: usize,
    pub total: usize,
    /// Exact completion percentage, 0 when there are no vaccines
    pub percent: f64,
}

impl VaccineProgress {
    pub fn of(vaccines: &[Vaccine]) -> Self {
        let total = vaccines.len();
        let completed = vaccines.iter().filter(|v| v.completed).count();
        let percent = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    /// Whole percent, rounded half away from zero
    pub fn rounded(&self) -> i64 {
        self.percent.round() as i64
    }
}

/// Minutes slept in naps that started on `date` (UTC calendar day)
pub fn sleep_minutes_on(naps: &[Nap], date: NaiveDate) -> i64 {
    naps.iter()
        .filter(|nap| nap.start_time.date_naive() == date)
        .map(|nap| nap.duration_minutes.unwrap_or(0) as i64)
        .sum()
}

/// `150` -> `"2.5h"`
pub fn hours_label(minutes: i64) -> String {
    format!("{:.1}h", minutes as f64 / 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutineTally {
    pub completed: usize,
    pub total: usize,
}

impl RoutineTally {
    pub fn of(routines: &[Routine]) -> Self {
        Self {
            completed: routines.iter().filter(|r| r.completed).count(),
            total: routines.len(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.completed, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub vaccines: VaccineProgress,
    pub vaccine_percent_display: i64,
    pub sleep_minutes_today: i64,
    pub sleep_today_label: String,
    pub routines: RoutineTally,
    pub nap_count: usize,
}

impl DashboardSummary {
    pub fn compute(vaccines: &[Vaccine], naps: &[Nap], routines: &[Routine], today: NaiveDate) -> Self {
        let progress = VaccineProgress::of(vaccines);
        let sleep_minutes_today = sleep_minutes_on(naps, today);
        Self {
            vaccines: progress,
            vaccine_percent_display: progress.rounded(),
            sleep_minutes_today,
            sleep_today_label: hours_label(sleep_minutes_today),
            routines: RoutineTally::of(routines),
            nap_count: naps.len(),
        }
    }
}
