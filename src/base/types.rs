//! Common types and result aliases shared across the application.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// The error type used throughout the application.
pub type Err = anyhow::Error;
/// A result with the application error type.
pub type Res<T> = Result<T, Err>;
/// A result carrying no value on success.
pub type Void = Res<()>;

/// Normalized metadata for one story, as returned by the Wattpad v3 API.
///
/// The schema is strict: a payload missing any of these fields fails to
/// decode, so API drift surfaces as a typed error at the fetch boundary
/// instead of a panic at field-access time.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Canonical story id. The API serializes it as a string.
    #[serde_as(as = "DisplayFromStr")]
    pub id: u64,
    /// Story title.
    pub title: String,
    /// URL of the story's cover image.
    pub cover: String,
    /// Number of reads.
    pub read_count: u64,
    /// Number of votes.
    pub vote_count: u64,
    /// Number of comments.
    pub comment_count: u64,
    /// Number of parts in the story.
    pub num_parts: u32,
    /// When the story was last modified.
    pub modify_date: DateTime<Utc>,
    /// Whether the story is marked complete.
    pub completed: bool,
    /// Whether the story is marked mature.
    pub mature: bool,
    /// Language of the story.
    pub language: Language,
    /// Author of the story.
    pub user: Author,
    /// Parts of the story.
    pub parts: Vec<PartRef>,
}

/// Language of a story.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Language {
    /// Human-readable language name.
    pub name: String,
}

/// Author of a story.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Author {
    /// Author display name.
    pub name: String,
}

/// A part id as it appears in a story's `parts` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartRef {
    /// Part id.
    pub id: u64,
}

/// Visual weight of a card action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    /// Default button styling.
    Default,
    /// Emphasized (primary) button styling.
    Emphasized,
}

/// A link button attached to a response card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardAction {
    /// Button label.
    pub label: String,
    /// URL the button opens.
    pub url: String,
    /// Visual weight of the button.
    pub style: ActionStyle,
}

/// The structured reply sent back to the chat surface for one story.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCard {
    /// Card title.
    pub title: String,
    /// Markdown summary body.
    pub summary: String,
    /// URL of the card image.
    pub image_url: String,
    /// Accent color for surfaces that support one.
    pub color: &'static str,
    /// Link buttons attached to the card.
    pub actions: Vec<CardAction>,
}
