use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{Nap, NapQuality, Routine, RoutineKind, Vaccine, VaccineKind};
use crate::services::catalog::{Activity, SleepGuideline};
use crate::services::HomeController;
use crate::types::Tab;

const BRAND: &str = "#00BFFF";
const ACCENT: &str = "#FF69B4";

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub baby_name: String,
    pub email: String,
    pub tabs: Vec<TabLink>,
    pub tab: &'static str,
    pub is_dashboard: bool,
    pub is_routine: bool,
    pub is_activities: bool,
    pub is_sleep: bool,
    pub is_vaccines: bool,
    pub badges: usize,
    pub sleep_today: String,
    pub routines_done: String,
    pub nap_count: usize,
    pub vaccines_done: usize,
    pub vaccines_total: usize,
    pub vaccine_percent: i64,
    /// Exact percentage for the progress bar width
    pub vaccine_bar: String,
    pub recent_naps: Vec<NapRow>,
    pub naps: Vec<NapRow>,
    pub routine_sections: Vec<RoutineSection>,
    pub activities: Vec<ActivityCard>,
    pub guidelines: Vec<SleepGuideline>,
    pub vaccines: Vec<VaccineRow>,
    pub profile: ProfileForm,
}

#[derive(Debug, Serialize)]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct NapRow {
    pub started: String,
    pub minutes: i32,
    pub quality_label: &'static str,
    pub quality_class: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RoutineSection {
    pub title: &'static str,
    pub color: &'static str,
    pub items: Vec<RoutineRow>,
}

#[derive(Debug, Serialize)]
pub struct RoutineRow {
    pub id: String,
    pub time: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ActivityCard {
    pub title: String,
    pub age_range: String,
    pub category: &'static str,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct VaccineRow {
    pub id: String,
    pub name: String,
    pub age_recommendation: String,
    pub kind_label: &'static str,
    pub completed: bool,
    pub completed_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub baby_name: String,
    pub baby_birth_date: String,
}

impl HomePage {
    pub fn build(controller: &HomeController, tab: Tab) -> Self {
        let state = controller.state();
        let summary = controller.summary();
        let catalog = controller.catalog();
        let profile = state.profile.as_ref();

        let naps: Vec<NapRow> = state.naps.iter().map(NapRow::from).collect();

        Self {
            baby_name: profile
                .and_then(|p| p.baby_name.clone())
                .unwrap_or_else(|| "Carregando...".to_string()),
            email: controller.user().email.clone().unwrap_or_default(),
            tabs: Tab::ALL
                .iter()
                .map(|t| TabLink {
                    label: t.label(),
                    href: t.href(),
                    active: *t == tab,
                })
                .collect(),
            tab: tab.as_str(),
            is_dashboard: tab == Tab::Dashboard,
            is_routine: tab == Tab::Routine,
            is_activities: tab == Tab::Activities,
            is_sleep: tab == Tab::Sleep,
            is_vaccines: tab == Tab::Vaccines,
            badges: summary.vaccines.completed,
            sleep_today: summary.sleep_today_label.clone(),
            routines_done: summary.routines.label(),
            nap_count: summary.nap_count,
            vaccines_done: summary.vaccines.completed,
            vaccines_total: summary.vaccines.total,
            vaccine_percent: summary.vaccine_percent_display,
            vaccine_bar: format!("{}", summary.vaccines.percent),
            recent_naps: state.naps.iter().take(3).map(NapRow::from).collect(),
            naps,
            routine_sections: routine_sections(&state.routines),
            activities: catalog.activities.iter().map(ActivityCard::from).collect(),
            guidelines: catalog.sleep_guidelines.clone(),
            vaccines: state.vaccines.iter().map(VaccineRow::from).collect(),
            profile: ProfileForm {
                full_name: profile.and_then(|p| p.full_name.clone()).unwrap_or_default(),
                baby_name: profile.and_then(|p| p.baby_name.clone()).unwrap_or_default(),
                baby_birth_date: profile
                    .and_then(|p| p.baby_birth_date)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            },
        }
    }
}

fn routine_sections(routines: &[Routine]) -> Vec<RoutineSection> {
    [
        (RoutineKind::Sleep, "Sono", BRAND),
        (RoutineKind::Feeding, "Alimentação", ACCENT),
        (RoutineKind::Play, "Brincadeiras", BRAND),
    ]
    .into_iter()
    .map(|(kind, title, color)| RoutineSection {
        title,
        color,
        items: routines
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| RoutineRow {
                id: r.id.to_string(),
                time: r.time.clone(),
                title: r.title.clone(),
                completed: r.completed,
            })
            .collect(),
    })
    .collect()
}

pub fn quality_label(quality: Option<NapQuality>) -> &'static str {
    match quality {
        Some(NapQuality::Excellent) => "Excelente",
        Some(NapQuality::Good) => "Boa",
        Some(NapQuality::Fair) => "Média",
        _ => "Ruim",
    }
}

fn quality_class(quality: Option<NapQuality>) -> &'static str {
    match quality {
        Some(NapQuality::Excellent) => "quality-excellent",
        Some(NapQuality::Good) => "quality-good",
        Some(NapQuality::Fair) => "quality-fair",
        _ => "quality-poor",
    }
}

pub fn vaccine_kind_label(kind: VaccineKind) -> &'static str {
    match kind {
        VaccineKind::Mandatory => "Obrigatória",
        _ => "Opcional",
    }
}

/// `01/05 10:30`
pub fn short_timestamp(at: DateTime<Utc>) -> String {
    at.format("%d/%m %H:%M").to_string()
}

impl From<&Nap> for NapRow {
    fn from(nap: &Nap) -> Self {
        Self {
            started: short_timestamp(nap.start_time),
            minutes: nap.duration_minutes.unwrap_or(0),
            quality_label: quality_label(nap.quality),
            quality_class: quality_class(nap.quality),
        }
    }
}

impl From<&Activity> for ActivityCard {
    fn from(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            age_range: activity.age_range.clone(),
            category: activity.category.label(),
            description: activity.description.clone(),
        }
    }
}

impl From<&Vaccine> for VaccineRow {
    fn from(vaccine: &Vaccine) -> Self {
        Self {
            id: vaccine.id.to_string(),
            name: vaccine.name.clone(),
            age_recommendation: vaccine.age_recommendation.clone(),
            kind_label: vaccine_kind_label(vaccine.kind),
            completed: vaccine.completed,
            completed_date: vaccine.completed_date.map(|d| d.format("%d/%m/%Y").to_string()),
        }
    }
}
