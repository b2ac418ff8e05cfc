pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "noteful")]
#[command(about = "Noteful API - notes, folders and tags over REST")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Provision a user account")]
    CreateUser {
        #[arg(long, help = "Login name, unique across the service")]
        username: String,
        #[arg(long, help = "Plain-text password; only its hash is stored")]
        password: String,
        #[arg(long, help = "Display name (defaults to the username)")]
        fullname: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => crate::server::serve(config).await,
        Commands::Migrate => commands::migrate::handle(&config).await,
        Commands::CreateUser {
            username,
            password,
            fullname,
        } => {
            let fullname = fullname.unwrap_or_else(|| username.clone());
            commands::user::create(&config, username, password, fullname, output_format).await
        }
    }
}
