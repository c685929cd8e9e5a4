//! Core data models for poelookup
//!
//! This module contains the data types shared by the price and wiki lookups,
//! along with the clients that fetch them.

pub mod ninja;
pub mod pagevalues;
pub mod wiki;

pub use ninja::{NinjaClient, NinjaError};
pub use pagevalues::{parse_pagevalues, strip_mediawiki_formatting, PageValuesError};
pub use wiki::{WikiClient, WikiError, WikiLookup};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One league record from the embedded `window.leagues` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeagueInfo {
    /// Short identifier such as "challenge" or "standard"
    pub url: String,
    /// Display name used in API queries
    pub name: String,
}

/// One priced item variant on a catalog page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    /// Item name
    pub name: String,
    /// Price in chaos orbs
    pub chaos_value: f64,
    /// Price in exalted orbs
    #[serde(default)]
    pub exalted_value: f64,
    /// Number of linked sockets, 0 when not applicable
    #[serde(default)]
    pub links: u32,
}

/// Response body of the item overview endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemOverview {
    pub lines: Vec<PriceLine>,
}

/// Matches collected by an item search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Distinct matched names, sorted
    pub names: BTreeSet<String>,
    /// Every matching line, in page order
    pub lines: Vec<PriceLine>,
}

/// Catalog pages searched for prices, in search order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogPage {
    UniqueArmour,
    UniqueWeapon,
    UniqueAccessory,
    UniqueJewel,
    UniqueFlask,
    UniqueMap,
    DivinationCard,
    Prophecy,
    HelmetEnchant,
}

impl CatalogPage {
    /// All pages in the order they are searched
    pub const ALL: [CatalogPage; 9] = [
        CatalogPage::UniqueArmour,
        CatalogPage::UniqueWeapon,
        CatalogPage::UniqueAccessory,
        CatalogPage::UniqueJewel,
        CatalogPage::UniqueFlask,
        CatalogPage::UniqueMap,
        CatalogPage::DivinationCard,
        CatalogPage::Prophecy,
        CatalogPage::HelmetEnchant,
    ];

    /// Value of the `type` query parameter for this page
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogPage::UniqueArmour => "UniqueArmour",
            CatalogPage::UniqueWeapon => "UniqueWeapon",
            CatalogPage::UniqueAccessory => "UniqueAccessory",
            CatalogPage::UniqueJewel => "UniqueJewel",
            CatalogPage::UniqueFlask => "UniqueFlask",
            CatalogPage::UniqueMap => "UniqueMap",
            CatalogPage::DivinationCard => "DivinationCard",
            CatalogPage::Prophecy => "Prophecy",
            CatalogPage::HelmetEnchant => "HelmetEnchant",
        }
    }
}

impl fmt::Display for CatalogPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment attributes parsed from a wiki page's pagevalues
///
/// A field is `None` when the page has no value for it. Requirement fields
/// whose value is "0" are also `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemInfo {
    pub implicit_stat_text: Option<String>,
    pub explicit_stat_text: Option<String>,
    pub required_level_range_text: Option<String>,
    pub required_dexterity_range_text: Option<String>,
    pub required_intelligence_range_text: Option<String>,
    pub required_strength_range_text: Option<String>,
    /// Icon file name with the `File:` prefix removed
    pub inventory_icon: Option<String>,
}

/// Rich attachment sent along with a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}
