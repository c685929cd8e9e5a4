//! poe.ninja API client
//!
//! This module resolves the active league from the poe.ninja front page and
//! searches the item overview catalog pages for prices. Catalog pages are
//! cached per (page, league) for an hour.

use chrono::Duration;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{CatalogPage, ItemOverview, LeagueInfo, SearchResult};
use crate::cache::CacheManager;

/// Base URL of poe.ninja
pub const DEFAULT_NINJA_BASE_URL: &str = "https://poe.ninja";

/// Start of the script assignment that embeds the league list
const LEAGUES_MARKER: &str = "window.leagues = ";

/// End of the embedded league list; the leading `]` belongs to the JSON
const LEAGUES_END: &str = "];</script>";

/// Errors that can occur when talking to poe.ninja
#[derive(Debug, Error)]
pub enum NinjaError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse a JSON document
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The front page has no embedded league list
    #[error("Couldn't find leagues JSON")]
    LeaguesNotFound,

    /// The league list was found but never closed
    #[error("Leagues JSON is not terminated")]
    LeaguesUnterminated,
}

/// Extracts the JSON text of the `window.leagues` array from the front page
///
/// Only the first line containing the marker is considered.
pub fn extract_leagues_json(html: &str) -> Result<&str, NinjaError> {
    let line = html
        .lines()
        .find(|line| line.contains(LEAGUES_MARKER))
        .ok_or(NinjaError::LeaguesNotFound)?;

    let start = line
        .find(LEAGUES_MARKER)
        .map(|index| index + LEAGUES_MARKER.len())
        .ok_or(NinjaError::LeaguesNotFound)?;
    let end = line[start..]
        .find(LEAGUES_END)
        .map(|index| start + index + 1)
        .ok_or(NinjaError::LeaguesUnterminated)?;

    Ok(&line[start..end])
}

/// Picks the league prices should be looked up in
///
/// The first challenge league wins. Without one, the standard league is
/// used; `None` when neither is listed.
pub fn pick_active_league(leagues: &[LeagueInfo]) -> Option<String> {
    let mut standard = None;
    for league in leagues {
        match league.url.as_str() {
            "challenge" => return Some(league.name.clone()),
            "standard" => standard = Some(league.name.clone()),
            _ => {}
        }
    }
    standard
}

/// Client for the poe.ninja front page and item overview API
#[derive(Debug, Clone)]
pub struct NinjaClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cached item overviews keyed by (page, league)
    cache: CacheManager<ItemOverview>,
    /// Base URL for the site (allows override for testing)
    base_url: String,
}

impl Default for NinjaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NinjaClient {
    /// Creates a new NinjaClient with default configuration
    pub fn new() -> Self {
        Self::with_client(Client::new(), DEFAULT_NINJA_BASE_URL)
    }

    /// Creates a new NinjaClient with a custom HTTP client and base URL
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            cache: CacheManager::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Replaces the cache time-to-live
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = CacheManager::with_ttl(ttl);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gives direct access to the overview cache
    pub fn cache_mut(&mut self) -> &mut CacheManager<ItemOverview> {
        &mut self.cache
    }

    /// Fetches the front page and picks the active league
    ///
    /// # Returns
    /// * `Ok(Some(name))` - The challenge league, or standard when there is none
    /// * `Ok(None)` - Neither league is listed
    /// * `Err(NinjaError)` - If the request fails or the league list is missing
    #[instrument(skip(self))]
    pub async fn resolve_active_league(&self) -> Result<Option<String>, NinjaError> {
        let url = format!("{}/", self.base_url);
        let html = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let leagues: Vec<LeagueInfo> = serde_json::from_str(extract_leagues_json(&html)?)?;
        let active = pick_active_league(&leagues);
        match &active {
            Some(name) => info!(league = %name, "resolved active league"),
            None => info!("no challenge or standard league listed"),
        }
        Ok(active)
    }

    /// Returns the overview of one catalog page, from cache when fresh
    pub async fn item_overview(
        &mut self,
        page: CatalogPage,
        league: &str,
    ) -> Result<&ItemOverview, NinjaError> {
        let http_client = &self.http_client;
        let base_url = &self.base_url;
        self.cache
            .get_or_fetch(page.as_str(), league, || {
                fetch_item_overview(http_client, base_url, page, league)
            })
            .await
    }

    /// Searches the catalog pages for items whose name contains `query`
    ///
    /// Matching is case-insensitive. Pages are searched in order and the
    /// search stops after the first page with any match, so later pages may
    /// hold matches that are not returned.
    #[instrument(skip(self))]
    pub async fn search(&mut self, league: &str, query: &str) -> Result<SearchResult, NinjaError> {
        let needle = query.to_lowercase();
        let mut result = SearchResult::default();

        for page in CatalogPage::ALL {
            let overview = self.item_overview(page, league).await?;
            for line in &overview.lines {
                if line.name.to_lowercase().contains(&needle) {
                    result.names.insert(line.name.clone());
                    result.lines.push(line.clone());
                }
            }
            if !result.names.is_empty() {
                debug!(%page, matches = result.lines.len(), "search matched");
                break;
            }
        }

        Ok(result)
    }
}

/// Fetches one item overview page from the API
#[instrument(skip(http_client, base_url))]
async fn fetch_item_overview(
    http_client: &Client,
    base_url: &str,
    page: CatalogPage,
    league: &str,
) -> Result<ItemOverview, NinjaError> {
    let url = format!("{}/api/data/itemoverview", base_url);
    let text = http_client
        .get(&url)
        .query(&[("league", league), ("type", page.as_str())])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Ok(serde_json::from_str(&text)?)
}
