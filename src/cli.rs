//! Command-line interface parsing for poelookup
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the `LookupConfig` a session is built from. It also parses the lines read
//! by the interactive shell.

use chrono::Duration;
use clap::{Parser, Subcommand};
use reqwest::Url;
use thiserror::Error;

use crate::cache::DEFAULT_TTL_SECS;
use crate::commands::CommandKind;
use crate::data::ninja::DEFAULT_NINJA_BASE_URL;
use crate::data::wiki::DEFAULT_WIKI_BASE_URL;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A base URL flag does not hold an absolute URL
    #[error("Invalid URL for --{flag}: '{value}'")]
    InvalidUrl { flag: &'static str, value: String },
}

/// poelookup - Path of Exile price and wiki lookups
#[derive(Parser, Debug)]
#[command(name = "poelookup")]
#[command(about = "Path of Exile item price and wiki lookups")]
#[command(version)]
pub struct Cli {
    /// Base URL of poe.ninja
    #[arg(long, value_name = "URL", default_value = DEFAULT_NINJA_BASE_URL)]
    pub ninja_url: String,

    /// Base URL of the wiki's api.php and index.php
    #[arg(long, value_name = "URL", default_value = DEFAULT_WIKI_BASE_URL)]
    pub wiki_url: String,

    /// League to price items in instead of the current challenge league
    #[arg(long, value_name = "NAME")]
    pub league: Option<String>,

    /// Seconds a fetched price page stays fresh
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TTL_SECS as u32)]
    pub cache_ttl: u32,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: LookupCommand,
}

/// What the binary should do
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LookupCommand {
    /// Look up item prices on poe.ninja
    ///
    /// Examples:
    ///   poelookup price headhunter
    ///   poelookup price the doctor
    Price {
        #[arg(required = true, value_name = "QUERY")]
        query: Vec<String>,
    },

    /// Look up an item on the wiki
    Wiki {
        #[arg(required = true, value_name = "QUERY")]
        query: Vec<String>,
    },

    /// Read "price <query>" and "wiki <query>" lines from stdin
    Shell,
}

/// Configuration derived from CLI arguments for session startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Base URL of poe.ninja
    pub ninja_base_url: String,
    /// Base URL of the wiki scripts
    pub wiki_base_url: String,
    /// League override; resolved from poe.ninja when `None`
    pub league: Option<String>,
    /// How long catalog pages stay cached
    pub cache_ttl: Duration,
    /// Request timeout, if any
    pub timeout: Option<std::time::Duration>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            ninja_base_url: DEFAULT_NINJA_BASE_URL.to_string(),
            wiki_base_url: DEFAULT_WIKI_BASE_URL.to_string(),
            league: None,
            cache_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            timeout: None,
        }
    }
}

/// Checks that `value` is an absolute URL
fn parse_base_url(flag: &'static str, value: &str) -> Result<String, CliError> {
    Url::parse(value).map_err(|_| CliError::InvalidUrl {
        flag,
        value: value.to_string(),
    })?;
    Ok(value.to_string())
}

impl LookupConfig {
    /// Creates a LookupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(LookupConfig)` with validated settings
    /// * `Err(CliError)` if a base URL is not a valid absolute URL
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let league = cli
            .league
            .as_deref()
            .map(str::trim)
            .filter(|league| !league.is_empty())
            .map(str::to_string);

        Ok(LookupConfig {
            ninja_base_url: parse_base_url("ninja-url", &cli.ninja_url)?,
            wiki_base_url: parse_base_url("wiki-url", &cli.wiki_url)?,
            league,
            cache_ttl: Duration::seconds(i64::from(cli.cache_ttl)),
            timeout: cli.timeout.map(std::time::Duration::from_secs),
        })
    }
}

/// Parses a shell line such as `price kaom` or `!wiki goldrim`
///
/// # Returns
/// * `Some((kind, args))` for a known command, args trimmed
/// * `None` for anything else
pub fn parse_shell_line(line: &str) -> Option<(CommandKind, &str)> {
    let line = line.trim();
    let line = line.strip_prefix('!').unwrap_or(line);
    let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let kind = match name.to_lowercase().as_str() {
        "price" => CommandKind::Price,
        "wiki" => CommandKind::Wiki,
        _ => return None,
    };
    Some((kind, args.trim()))
}
