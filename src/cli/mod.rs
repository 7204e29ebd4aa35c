//! `babyzoom-cli`: sign in against the auth service and drive the JSON API.

pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "babyzoom-cli")]
#[command(about = "BabyZoom CLI - naps, vaccines and routines from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "BABYZOOM_URL",
        default_value = "http://localhost:3000",
        help = "BabyZoom server base URL"
    )]
    pub server: String,

    #[arg(
        long,
        global = true,
        env = "BABYZOOM_TOKEN",
        hide_env_values = true,
        help = "Access token (see `login`)"
    )]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in with email and password and print the access token")]
    Login {
        #[arg(long, env = "BABYZOOM_EMAIL")]
        email: String,
        #[arg(long, env = "BABYZOOM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Check that the server is up")]
    Health,

    #[command(about = "Show the dashboard summary (seeds defaults on first use)")]
    Dashboard,

    #[command(about = "Nap tracking")]
    Nap {
        #[command(subcommand)]
        cmd: commands::records::NapCommands,
    },

    #[command(about = "Vaccine schedule")]
    Vaccine {
        #[command(subcommand)]
        cmd: commands::records::VaccineCommands,
    },

    #[command(about = "Daily routine")]
    Routine {
        #[command(subcommand)]
        cmd: commands::records::RoutineCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&email, &password, output_format).await,
        Commands::Health => {
            let client = ApiClient::new(&cli.server, None)?;
            commands::dashboard::health(&client, output_format).await
        }
        Commands::Dashboard => {
            let client = ApiClient::new(&cli.server, cli.token)?;
            commands::dashboard::dashboard(&client, output_format).await
        }
        Commands::Nap { cmd } => {
            let client = ApiClient::new(&cli.server, cli.token)?;
            commands::records::nap(cmd, &client, output_format).await
        }
        Commands::Vaccine { cmd } => {
            let client = ApiClient::new(&cli.server, cli.token)?;
            commands::records::vaccine(cmd, &client, output_format).await
        }
        Commands::Routine { cmd } => {
            let client = ApiClient::new(&cli.server, cli.token)?;
            commands::records::routine(cmd, &client, output_format).await
        }
    }
}
