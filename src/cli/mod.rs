pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::records::{Appointment, Incident};

/// Page size used when `--limit` is omitted
pub const DEFAULT_PAGE_SIZE: usize = 3;

#[derive(Parser)]
#[command(name = "melody")]
#[command(about = "Melody CLI - Command-line interface for the MelodyStudio API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign up and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Your appointments")]
    Appointments {
        #[command(subcommand)]
        cmd: commands::records::RecordCommands,
    },

    #[command(about = "Your incident reports")]
    Incidents {
        #[command(subcommand)]
        cmd: commands::records::RecordCommands,
    },

    #[command(about = "Musician catalogue and reviews")]
    Resources {
        #[command(subcommand)]
        cmd: commands::resources::ResourceCommands,
    },

    #[command(about = "Cross-user views (admin role)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Appointments { cmd } => {
            commands::records::handle::<Appointment>(
                cmd,
                "/appointments",
                &["id", "title", "date", "time", "musician"],
                output_format,
            )
            .await
        }
        Commands::Incidents { cmd } => {
            commands::records::handle::<Incident>(cmd, "/incidencias", &["id", "title", "createdAt"], output_format).await
        }
        Commands::Resources { cmd } => commands::resources::handle(cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
    }
}
