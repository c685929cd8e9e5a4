//! poelookup - Path of Exile price and wiki lookups
//!
//! A console host for the chat commands: runs a single `price` or `wiki`
//! lookup, or reads commands from stdin with one session shared across them.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use poelookup::cli::{parse_shell_line, Cli, LookupCommand, LookupConfig};
use poelookup::commands::{self, render_embed_text, Command, CommandKind};
use poelookup::data::Embed;
use poelookup::Session;

/// A command typed on the console; replies go to stdout
struct ConsoleCommand {
    args: String,
}

impl Command for ConsoleCommand {
    fn args(&self) -> &str {
        &self.args
    }

    fn reply(&mut self, text: &str, embed: Option<&Embed>) {
        if !text.is_empty() {
            println!("{}", text);
        }
        if let Some(embed) = embed {
            println!("{}", render_embed_text(embed));
        }
    }
}

/// Sends logs to stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_shell(session: &mut Session) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some((kind, args)) = parse_shell_line(&line) else {
            warn!(%line, "unknown command");
            eprintln!("unknown command, expected 'price <query>' or 'wiki <query>'");
            continue;
        };

        let mut cmd = ConsoleCommand {
            args: args.to_string(),
        };
        // A failed command only aborts itself
        if let Err(err) = commands::dispatch(session, kind, &mut cmd).await {
            error!(error = %err, "command failed");
            eprintln!("Error: {}", err);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = match LookupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(ExitCode::from(2));
        }
    };

    let mut session = Session::new(&config)?;

    let (kind, query) = match &cli.command {
        LookupCommand::Price { query } => (CommandKind::Price, query.join(" ")),
        LookupCommand::Wiki { query } => (CommandKind::Wiki, query.join(" ")),
        LookupCommand::Shell => {
            run_shell(&mut session).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let mut cmd = ConsoleCommand { args: query };
    if let Err(err) = commands::dispatch(&mut session, kind, &mut cmd).await {
        eprintln!("Error: {}", err);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
