//! Lookup session shared by the command handlers
//!
//! A `Session` is built once when the host starts and handed to every command
//! by mutable reference. It owns the upstream clients, the catalog page cache
//! and the active league name for the lifetime of the process.

use reqwest::{redirect, Client};
use tracing::debug;

use crate::cli::LookupConfig;
use crate::commands::CommandError;
use crate::data::{NinjaClient, WikiClient};

/// User agent sent with every upstream request
const USER_AGENT: &str = concat!("poelookup/", env!("CARGO_PKG_VERSION"));

/// State shared by the price and wiki commands
#[derive(Debug)]
pub struct Session {
    ninja: NinjaClient,
    wiki: WikiClient,
    /// Active league, resolved on first use unless configured
    league: Option<String>,
}

impl Session {
    /// Creates a session from startup configuration
    pub fn new(config: &LookupConfig) -> Result<Self, reqwest::Error> {
        let http_client = client_builder(config).build()?;
        let redirect_client = client_builder(config)
            .redirect(redirect::Policy::none())
            .build()?;

        let ninja = NinjaClient::with_client(http_client.clone(), config.ninja_base_url.as_str())
            .with_cache_ttl(config.cache_ttl);
        let wiki = WikiClient::with_clients(http_client, redirect_client, config.wiki_base_url.as_str());

        Ok(Self::with_parts(ninja, wiki, config.league.clone()))
    }

    /// Creates a session from prebuilt clients
    pub fn with_parts(ninja: NinjaClient, wiki: WikiClient, league: Option<String>) -> Self {
        Self { ninja, wiki, league }
    }

    /// Returns the active league, resolving it on first use
    ///
    /// A league that cannot be resolved is not remembered, so the next call
    /// tries again.
    pub async fn league(&mut self) -> Result<String, CommandError> {
        if let Some(league) = &self.league {
            return Ok(league.clone());
        }

        let league = self
            .ninja
            .resolve_active_league()
            .await?
            .ok_or(CommandError::NoActiveLeague)?;
        debug!(%league, "remembering active league");
        self.league = Some(league.clone());
        Ok(league)
    }

    /// The league currently remembered, if any
    pub fn current_league(&self) -> Option<&str> {
        self.league.as_deref()
    }

    pub fn ninja_mut(&mut self) -> &mut NinjaClient {
        &mut self.ninja
    }

    pub fn wiki(&self) -> &WikiClient {
        &self.wiki
    }
}

fn client_builder(config: &LookupConfig) -> reqwest::ClientBuilder {
    let builder = Client::builder().user_agent(USER_AGENT);
    match config.timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}
