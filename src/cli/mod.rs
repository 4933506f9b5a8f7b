pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hiimart")]
#[command(about = "Hiimart CLI - inspect and exercise the storefront route gate")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the gate decision for a path and role")]
    Check(commands::check::CheckArgs),

    #[command(about = "Print route tables, matcher and coverage gaps")]
    Routes,

    #[command(about = "Mint a signed session token for local testing")]
    Token(commands::token::TokenArgs),
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

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Check(args) => commands::check::handle(args, config, output_format),
        Commands::Routes => commands::routes::handle(config, output_format),
        Commands::Token(args) => commands::token::handle(args, config, output_format),
    }
}
