//! Path of Exile wiki client
//!
//! Resolves a free-text query to a single wiki page through the MediaWiki
//! opensearch API, reads the page's `pagevalues` table and turns the item
//! fields into a display-ready embed.

use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{redirect, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use super::pagevalues::{parse_pagevalues, PageValuesError};
use super::{Embed, EmbedImage, ItemInfo};

/// Base URL of the wiki's script path (where api.php and index.php live)
pub const DEFAULT_WIKI_BASE_URL: &str = "https://www.poewiki.net/w";

/// Maximum number of opensearch results requested
const SEARCH_LIMIT: u32 = 10;

/// Errors that can occur when talking to the wiki
#[derive(Debug, Error)]
pub enum WikiError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The file redirect did not say where the image lives
    #[error("No redirect location for file {0}")]
    MissingLocation(String),

    /// The redirect location header is not valid text
    #[error("Redirect location is not valid UTF-8")]
    InvalidLocation,
}

/// Opensearch response: echoed query, titles, descriptions, page URLs
pub type OpenSearchResponse = (String, Vec<String>, Vec<Value>, Vec<String>);

/// Which branch a search result falls into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing matched the echoed query
    NoResults(String),
    /// Several pages matched; carries their titles
    Ambiguous(Vec<String>),
    /// Exactly one page matched
    Single { title: String, url: String },
}

/// Final outcome of a wiki lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiLookup {
    NoResults(String),
    Ambiguous(Vec<String>),
    /// The page exists but its values could not be used
    Unparsed(PageValuesError),
    Found(Embed),
}

/// Sorts an opensearch response into no results, ambiguous or single
pub fn classify_search(response: OpenSearchResponse) -> SearchOutcome {
    let (query, mut titles, _, urls) = response;
    match titles.len() {
        0 => SearchOutcome::NoResults(query),
        1 => {
            let title = titles.remove(0);
            let url = urls.into_iter().next().unwrap_or_default();
            SearchOutcome::Single { title, url }
        }
        _ => SearchOutcome::Ambiguous(titles),
    }
}

/// Converts a page or file name to its URL title form
pub fn page_title(name: &str) -> String {
    name.replace(' ', "_")
}

/// Builds the embed description from an item's requirements and stats
///
/// Requirements come first as "Requires Level L, D Dex, I Int, S Str",
/// listing only those present, then the implicit and explicit stats. Parts
/// are separated by blank lines and empty parts are left out.
pub fn describe_item(info: &ItemInfo) -> String {
    let mut requirements = Vec::new();
    if let Some(level) = &info.required_level_range_text {
        requirements.push(format!("Requires Level {}", level));
    }
    if let Some(dexterity) = &info.required_dexterity_range_text {
        requirements.push(format!("{} Dex", dexterity));
    }
    if let Some(intelligence) = &info.required_intelligence_range_text {
        requirements.push(format!("{} Int", intelligence));
    }
    if let Some(strength) = &info.required_strength_range_text {
        requirements.push(format!("{} Str", strength));
    }
    let requirements = requirements.join(", ");

    [
        Some(requirements.as_str()),
        info.implicit_stat_text.as_deref(),
        info.explicit_stat_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Assembles the reply embed for a resolved item
pub fn build_embed(title: &str, url: &str, info: &ItemInfo, image_url: Option<String>) -> Embed {
    Embed {
        title: title.to_string(),
        description: describe_item(info),
        url: url.to_string(),
        image: image_url.map(|url| EmbedImage { url }),
    }
}

/// Client for the MediaWiki API of the Path of Exile wiki
#[derive(Debug, Clone)]
pub struct WikiClient {
    /// HTTP client for API and page requests
    http_client: Client,
    /// HTTP client that reports redirects instead of following them
    redirect_client: Client,
    /// Base URL of api.php and index.php (allows override for testing)
    base_url: String,
}

impl WikiClient {
    /// Creates a new WikiClient against the default wiki
    pub fn new() -> Result<Self, WikiError> {
        Self::with_client(Client::new(), DEFAULT_WIKI_BASE_URL)
    }

    /// Creates a new WikiClient with a custom HTTP client and base URL
    ///
    /// A second client that does not follow redirects is built for file
    /// lookups.
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Result<Self, WikiError> {
        let redirect_client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self::with_clients(http_client, redirect_client, base_url))
    }

    /// Creates a new WikiClient from two prebuilt clients
    ///
    /// `redirect_client` must not follow redirects.
    pub fn with_clients(http_client: Client, redirect_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            redirect_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self) -> String {
        format!("{}/api.php", self.base_url)
    }

    fn index_url(&self) -> String {
        format!("{}/index.php", self.base_url)
    }

    /// Looks up an item page and builds its embed
    ///
    /// # Returns
    /// * `Ok(WikiLookup)` - One of no results, ambiguous, unparsed or found
    /// * `Err(WikiError)` - If a request fails
    #[instrument(skip(self))]
    pub async fn lookup(&self, query: &str) -> Result<WikiLookup, WikiError> {
        let (title, url) = match classify_search(self.open_search(query).await?) {
            SearchOutcome::NoResults(query) => return Ok(WikiLookup::NoResults(query)),
            SearchOutcome::Ambiguous(titles) => return Ok(WikiLookup::Ambiguous(titles)),
            SearchOutcome::Single { title, url } => (title, url),
        };
        debug!(%title, "resolved wiki page");

        let pagevalues = self.fetch_pagevalues(&title).await?;
        let info = match parse_pagevalues(&title, &pagevalues) {
            Ok(info) => info,
            Err(err) => return Ok(WikiLookup::Unparsed(err)),
        };

        let image_url = match &info.inventory_icon {
            Some(file_name) => Some(self.resolve_file_url(file_name).await?),
            None => None,
        };

        Ok(WikiLookup::Found(build_embed(&title, &url, &info, image_url)))
    }

    /// Runs an opensearch query
    pub async fn open_search(&self, query: &str) -> Result<OpenSearchResponse, WikiError> {
        let limit = SEARCH_LIMIT.to_string();
        let text = self
            .http_client
            .get(self.api_url())
            .header(ACCEPT, "application/json")
            .query(&[
                ("action", "opensearch"),
                ("format", "json"),
                ("formatversion", "2"),
                ("search", query),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches the raw pagevalues document of a page
    pub async fn fetch_pagevalues(&self, title: &str) -> Result<String, WikiError> {
        let title = page_title(title);
        let text = self
            .http_client
            .get(self.index_url())
            .query(&[("title", title.as_str()), ("action", "pagevalues")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    /// Resolves a file name to the direct URL of the image
    pub async fn resolve_file_url(&self, file_name: &str) -> Result<String, WikiError> {
        let title = format!("Special:Redirect/file/{}", page_title(file_name));
        let response = self
            .redirect_client
            .head(self.index_url())
            .query(&[("title", title.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let location = response
            .headers()
            .get(LOCATION)
            .ok_or_else(|| WikiError::MissingLocation(file_name.to_string()))?
            .to_str()
            .map_err(|_| WikiError::InvalidLocation)?;
        Ok(location.to_string())
    }
}
