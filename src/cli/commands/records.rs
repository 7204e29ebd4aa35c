use clap::Subcommand;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::{check_mark, output};
use crate::cli::OutputFormat;
use crate::database::models::{Nap, Routine, Vaccine};

#[derive(Subcommand)]
pub enum NapCommands {
    #[command(about = "Record a 90 minute nap ending now")]
    Add,
}

#[derive(Subcommand)]
pub enum VaccineCommands {
    #[command(about = "Mark a vaccine as applied, or undo it")]
    Toggle {
        #[arg(help = "Vaccine id")]
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum RoutineCommands {
    #[command(about = "Mark a routine item as done, or undo it")]
    Toggle {
        #[arg(help = "Routine id")]
        id: Uuid,
    },
}

pub async fn nap(cmd: NapCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NapCommands::Add => {
            let nap: Nap = client.post("/api/naps").await?;
            output(output_format, &nap, |n| {
                format!(
                    "✓ Nap recorded: {} min ({})",
                    n.duration_minutes.unwrap_or_default(),
                    n.start_time.format("%d/%m %H:%M")
                )
            })
        }
    }
}

pub async fn vaccine(cmd: VaccineCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        VaccineCommands::Toggle { id } => {
            let vaccine: Vaccine = client.post(&format!("/api/vaccines/{}/toggle", id)).await?;
            output(output_format, &vaccine, |v| match v.completed_date {
                Some(date) => format!("{} {} (aplicada em {})", check_mark(v.completed), v.name, date.format("%d/%m/%Y")),
                None => format!("{} {}", check_mark(v.completed), v.name),
            })
        }
    }
}

pub async fn routine(cmd: RoutineCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RoutineCommands::Toggle { id } => {
            let routine: Routine = client.post(&format!("/api/routines/{}/toggle", id)).await?;
            output(output_format, &routine, |r| {
                format!("{} {} {}", check_mark(r.completed), r.time, r.title)
            })
        }
    }
}
