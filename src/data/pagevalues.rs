//! Parser for MediaWiki `action=pagevalues` output
//!
//! The page values of an equippable item are rendered as a single line of
//! HTML table markup. This module picks the known item fields out of that
//! line and removes the wiki markup from their values.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::ItemInfo;

/// Opening markup of the item values table line
const TABLE_START: &str = r#"<table class="wikitable mw-page-info"><tr><td style="vertical-align: top;">"#;

/// Closing markup of the item values table line
const TABLE_END: &str = "</tr></table>";

/// Separator between two table rows
const CELL_DELIMITER: &str = r#"</td></tr><tr><td style="vertical-align: top;">"#;

/// Separator between a field name and its value
const KEY_VALUE_DELIMITER: &str = "</td><td>";

/// Field whose presence marks the item values line
const MARKER_FIELD: &str = "implicit_stat_text";

const LINE_BREAK: &str = "&lt;br&gt;";
const ESCAPED_TAG_START: &str = "&lt;";
const UNPARSED: &str = "[unparsed]";
const FILE_PREFIX: &str = "File:";

static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.*\|)?(.+?)\]\]").expect("wiki link pattern is valid"));

/// Reasons a pagevalues document could not be turned into an [`ItemInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageValuesError {
    /// The page has no item stats at all
    #[error("{0} is not equippable")]
    NotEquippable(String),

    /// The item stats line does not have the expected shape
    #[error("failed to parse pagevalues for {0}")]
    Malformed(String),
}

/// Parses the pagevalues document of the page called `name`
pub fn parse_pagevalues(name: &str, pagevalues: &str) -> Result<ItemInfo, PageValuesError> {
    let line = pagevalues
        .lines()
        .find(|line| line.contains(MARKER_FIELD))
        .ok_or_else(|| PageValuesError::NotEquippable(name.to_string()))?;

    let malformed = || PageValuesError::Malformed(name.to_string());

    let body = line
        .strip_prefix(TABLE_START)
        .and_then(|rest| rest.strip_suffix(TABLE_END))
        .ok_or_else(malformed)?;
    let body = body.strip_suffix("</td>").unwrap_or(body);

    let mut info = ItemInfo::default();
    for cell in body.split(CELL_DELIMITER) {
        let (key, value) = cell.split_once(KEY_VALUE_DELIMITER).ok_or_else(malformed)?;
        let slot = match key {
            "implicit_stat_text" => &mut info.implicit_stat_text,
            "explicit_stat_text" => &mut info.explicit_stat_text,
            "required_level_range_text" => &mut info.required_level_range_text,
            "required_dexterity_range_text" => &mut info.required_dexterity_range_text,
            "required_intelligence_range_text" => &mut info.required_intelligence_range_text,
            "required_strength_range_text" => &mut info.required_strength_range_text,
            "inventory_icon" => &mut info.inventory_icon,
            _ => continue,
        };
        *slot = Some(strip_mediawiki_formatting(value));
    }

    for requirement in [
        &mut info.required_level_range_text,
        &mut info.required_dexterity_range_text,
        &mut info.required_intelligence_range_text,
        &mut info.required_strength_range_text,
    ] {
        if requirement.as_deref() == Some("0") {
            *requirement = None;
        }
    }

    if let Some(icon) = info.inventory_icon.take() {
        let file_name = icon.strip_prefix(FILE_PREFIX).ok_or_else(malformed)?;
        info.inventory_icon = Some(file_name.to_string());
    }

    Ok(info)
}

/// Reduces a wiki field value to plain text
///
/// Escaped `<br>` tags become newlines, segments starting with any other
/// escaped tag become `[unparsed]`, and `[[target|display]]` links keep only
/// their display text.
pub fn strip_mediawiki_formatting(value: &str) -> String {
    let joined = value
        .split(LINE_BREAK)
        .map(|segment| {
            if segment.starts_with(ESCAPED_TAG_START) {
                UNPARSED
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    WIKI_LINK.replace_all(&joined, "$2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a pagevalues line in the shape the wiki renders
    fn table_line(cells: &[(&str, &str)]) -> String {
        let rows = cells
            .iter()
            .map(|(key, value)| format!("{key}{KEY_VALUE_DELIMITER}{value}"))
            .collect::<Vec<_>>()
            .join(CELL_DELIMITER);
        format!("{TABLE_START}{rows}</td>{TABLE_END}")
    }

    fn document(line: &str) -> String {
        format!("<!DOCTYPE html>\n<html><body>\n<h2>Table: items</h2>\n{line}\n</body></html>\n")
    }

    #[test]
    fn test_strip_line_breaks_and_links() {
        assert_eq!(strip_mediawiki_formatting("a&lt;br&gt;[[Foo|Bar]]"), "a\nBar");
    }

    #[test]
    fn test_strip_escaped_tag_is_unparsed() {
        assert_eq!(strip_mediawiki_formatting("&lt;div&gt;text"), "[unparsed]");
    }

    #[test]
    fn test_strip_link_without_display_text() {
        assert_eq!(
            strip_mediawiki_formatting("+1 to [[Level|Level]] of [[Socketed Gems]]"),
            "+1 to Level of Socketed Gems"
        );
    }

    #[test]
    fn test_strip_plain_text_is_unchanged() {
        assert_eq!(strip_mediawiki_formatting("+500 to maximum Life"), "+500 to maximum Life");
    }

    #[test]
    fn test_strip_only_unparses_tag_segments() {
        assert_eq!(
            strip_mediawiki_formatting("first&lt;br&gt;&lt;span class=x&gt;y&lt;br&gt;last"),
            "first\n[unparsed]\nlast"
        );
    }

    #[test]
    fn test_parse_extracts_known_fields() {
        let line = table_line(&[
            ("name", "Kaom's Heart"),
            ("implicit_stat_text", ""),
            (
                "explicit_stat_text",
                "Has no Sockets&lt;br&gt;+500 to maximum [[Life]]",
            ),
            ("required_level_range_text", "68"),
            ("required_dexterity_range_text", "0"),
            ("required_intelligence_range_text", "0"),
            ("required_strength_range_text", "100"),
            ("inventory_icon", "File:Kaom's Heart inventory icon.png"),
        ]);

        let info = parse_pagevalues("Kaom's Heart", &document(&line)).expect("parses");

        assert_eq!(info.implicit_stat_text.as_deref(), Some(""));
        assert_eq!(
            info.explicit_stat_text.as_deref(),
            Some("Has no Sockets\n+500 to maximum Life")
        );
        assert_eq!(info.required_level_range_text.as_deref(), Some("68"));
        assert_eq!(info.required_dexterity_range_text, None);
        assert_eq!(info.required_intelligence_range_text, None);
        assert_eq!(info.required_strength_range_text.as_deref(), Some("100"));
        assert_eq!(
            info.inventory_icon.as_deref(),
            Some("Kaom's Heart inventory icon.png")
        );
    }

    #[test]
    fn test_parse_missing_fields_are_none() {
        let line = table_line(&[("implicit_stat_text", "+25 to Strength")]);

        let info = parse_pagevalues("Iron Ring", &document(&line)).expect("parses");

        assert_eq!(info.implicit_stat_text.as_deref(), Some("+25 to Strength"));
        assert_eq!(info.explicit_stat_text, None);
        assert_eq!(info.required_level_range_text, None);
        assert_eq!(info.inventory_icon, None);
    }

    #[test]
    fn test_parse_without_marker_is_not_equippable() {
        let result = parse_pagevalues("Chaos Orb", &document("<p>no item table</p>"));

        let err = result.unwrap_err();
        assert_eq!(err, PageValuesError::NotEquippable("Chaos Orb".to_string()));
        assert_eq!(err.to_string(), "Chaos Orb is not equippable");
    }

    #[test]
    fn test_parse_wrong_wrapper_is_malformed() {
        let line = "<table class=\"other\">implicit_stat_text</td><td>x</td></tr></table>";

        let err = parse_pagevalues("Goldrim", &document(line)).unwrap_err();

        assert_eq!(err, PageValuesError::Malformed("Goldrim".to_string()));
        assert_eq!(err.to_string(), "failed to parse pagevalues for Goldrim");
    }

    #[test]
    fn test_parse_cell_without_value_is_malformed() {
        let line = format!("{TABLE_START}implicit_stat_text{TABLE_END}");

        let err = parse_pagevalues("Goldrim", &document(&line)).unwrap_err();

        assert_eq!(err, PageValuesError::Malformed("Goldrim".to_string()));
    }

    #[test]
    fn test_parse_icon_without_file_prefix_is_malformed() {
        let line = table_line(&[
            ("implicit_stat_text", ""),
            ("inventory_icon", "Goldrim inventory icon.png"),
        ]);

        let err = parse_pagevalues("Goldrim", &document(&line)).unwrap_err();

        assert_eq!(err, PageValuesError::Malformed("Goldrim".to_string()));
    }

    #[test]
    fn test_parse_uses_first_marker_line() {
        let first = table_line(&[("implicit_stat_text", "first")]);
        let second = table_line(&[("implicit_stat_text", "second")]);
        let text = format!("{first}\n{second}");

        let info = parse_pagevalues("Ring", &text).expect("parses");

        assert_eq!(info.implicit_stat_text.as_deref(), Some("first"));
    }
}
