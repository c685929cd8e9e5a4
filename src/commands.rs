//! Chat command handlers
//!
//! The bot framework that delivers commands is abstracted behind the
//! [`Command`] trait: it supplies the argument text and accepts replies.
//! Handlers produce all of their output through [`Command::reply`].

use thiserror::Error;
use tracing::instrument;

use crate::data::{Embed, NinjaError, PriceLine, SearchResult, WikiError, WikiLookup};
use crate::session::Session;

/// Longest reply listing ambiguous item names, in characters
const MAX_NAME_LIST_CHARS: usize = 250;

/// A chat command as delivered by the bot framework
pub trait Command {
    /// Free text following the command name
    fn args(&self) -> &str;

    /// Sends a reply, optionally with a rich attachment
    fn reply(&mut self, text: &str, embed: Option<&Embed>);
}

/// The commands this crate answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Price,
    Wiki,
}

/// Failures that abort a command without a reply
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("price lookup failed: {0}")]
    Ninja(#[from] NinjaError),

    #[error("wiki lookup failed: {0}")]
    Wiki(#[from] WikiError),

    /// poe.ninja lists neither a challenge nor a standard league
    #[error("no active league found")]
    NoActiveLeague,
}

/// Runs the handler for `kind`
pub async fn dispatch<C: Command + ?Sized>(
    session: &mut Session,
    kind: CommandKind,
    cmd: &mut C,
) -> Result<(), CommandError> {
    match kind {
        CommandKind::Price => price(session, cmd).await,
        CommandKind::Wiki => wiki(session, cmd).await,
    }
}

/// Replies with the prices of items matching the command text
#[instrument(skip_all, fields(query = cmd.args()))]
pub async fn price<C: Command + ?Sized>(session: &mut Session, cmd: &mut C) -> Result<(), CommandError> {
    let query = cmd.args().trim().to_string();
    if query.is_empty() {
        return Ok(());
    }

    let league = session.league().await?;
    let result = session.ninja_mut().search(&league, &query).await?;
    cmd.reply(&format_price_reply(&league, &query, &result), None);
    Ok(())
}

/// Replies with the wiki summary of the item matching the command text
#[instrument(skip_all, fields(query = cmd.args()))]
pub async fn wiki<C: Command + ?Sized>(session: &mut Session, cmd: &mut C) -> Result<(), CommandError> {
    let query = cmd.args().trim().to_string();
    if query.is_empty() {
        return Ok(());
    }

    match session.wiki().lookup(&query).await? {
        WikiLookup::NoResults(echoed) => cmd.reply(&format!("no results found for '{}'", echoed), None),
        WikiLookup::Ambiguous(titles) => cmd.reply(&titles.join(", "), None),
        WikiLookup::Unparsed(err) => cmd.reply(&err.to_string(), None),
        WikiLookup::Found(embed) => cmd.reply("", Some(&embed)),
    }
    Ok(())
}

/// Formats the reply for a price search
///
/// * No matches: a "couldn't find" message
/// * One distinct name: the league followed by every matching line
/// * Several names: the names, comma-separated and cut to 250 characters
pub fn format_price_reply(league: &str, query: &str, result: &SearchResult) -> String {
    match result.names.len() {
        0 => format!("couldn't find {}", query),
        1 => std::iter::once(format!("{}:", league))
            .chain(result.lines.iter().map(format_price_line))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            let names = result.names.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            names.chars().take(MAX_NAME_LIST_CHARS).collect()
        }
    }
}

/// Formats one priced line as `Name (N link): C.C chaos, E.E exalted`
///
/// The link count is shown only for linked items and the exalted price only
/// when it exceeds one.
pub fn format_price_line(line: &PriceLine) -> String {
    let mut text = line.name.clone();
    if line.links > 0 {
        text.push_str(&format!(" ({} link)", line.links));
    }
    text.push_str(&format!(": {:.1} chaos", line.chaos_value));
    if line.exalted_value > 1.0 {
        text.push_str(&format!(", {:.1} exalted", line.exalted_value));
    }
    text
}

/// Renders an embed as plain text for hosts without rich attachments
pub fn render_embed_text(embed: &Embed) -> String {
    let mut parts = vec![embed.title.clone(), embed.url.clone()];
    if !embed.description.is_empty() {
        parts.push(embed.description.clone());
    }
    if let Some(image) = &embed.image {
        parts.push(image.url.clone());
    }
    parts.join("\n")
}
