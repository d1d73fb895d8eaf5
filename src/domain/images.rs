use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ids::ImageMetadataId;

/// File extension shared by every generated thumbnail.
pub const THUMBNAIL_EXTENSION: &str = ".jpg";

/// Longest accepted search term in bytes. With the `_{token}.jpg` suffix the
/// generated filename stays under the common 255-byte name limit.
pub const MAX_SEARCH_TERM_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    BlackAndWhite,
    Black,
    White,
    Yellow,
    Orange,
    Red,
    Purple,
    Magenta,
    Green,
    Teal,
    Blue,
}

impl Color {
    pub const ALL: [Color; 11] = [
        Color::BlackAndWhite,
        Color::Black,
        Color::White,
        Color::Yellow,
        Color::Orange,
        Color::Red,
        Color::Purple,
        Color::Magenta,
        Color::Green,
        Color::Teal,
        Color::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::BlackAndWhite => "black_and_white",
            Color::Black => "black",
            Color::White => "white",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::Magenta => "magenta",
            Color::Green => "green",
            Color::Teal => "teal",
            Color::Blue => "blue",
        }
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Color::ALL
            .into_iter()
            .find(|color| color.as_str() == lowered)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Squarish => "squarish",
        }
    }
}

impl FromStr for Orientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "squarish" => Ok(Orientation::Squarish),
            _ => Err(()),
        }
    }
}

/// What the caller asked the image provider for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageQuery {
    pub search_term: String,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl ImageQuery {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            color: None,
            orientation: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn normalize(mut self) -> Self {
        self.search_term = self.search_term.trim().to_string();
        self
    }
}

/// Filename that ties a search term to its cached thumbnail.
///
/// The same string is the public lookup key of the metadata record and the
/// name of the JPEG inside the thumbnail directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueLink(String);

impl UniqueLink {
    /// Build `{search_term}_{token}.jpg` with a fresh random v4 UUID token.
    pub fn generate(search_term: &str) -> Self {
        let token = Uuid::new_v4().simple();
        Self(format!(
            "{}_{token}{THUMBNAIL_EXTENSION}",
            sanitize_term(search_term)
        ))
    }

    /// Accept an externally supplied link only if it names a single file.
    pub fn parse(value: &str) -> Option<Self> {
        if is_safe_file_name(value) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UniqueLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UniqueLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn sanitize_term(term: &str) -> String {
    let mut sanitized: String = term
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if sanitized.starts_with('.') {
        sanitized.replace_range(..1, "_");
    }
    sanitized
}

fn is_safe_file_name(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && !value.contains(['/', '\\'])
        && !value.chars().any(char::is_control)
}

/// A persisted record describing one successful search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub id: ImageMetadataId,
    pub unique_link: UniqueLink,
    pub image_original_url: String,
    pub search_term: String,
    pub color: Option<Color>,
    pub orientation: Option<Orientation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewImageMetadata {
    pub unique_link: UniqueLink,
    pub image_original_url: String,
    pub search_term: String,
    pub color: Option<Color>,
    pub orientation: Option<Orientation>,
}

impl NewImageMetadata {
    pub fn new(query: &ImageQuery, image_original_url: String, unique_link: UniqueLink) -> Self {
        Self {
            unique_link,
            image_original_url,
            search_term: query.search_term.clone(),
            color: query.color,
            orientation: query.orientation,
        }
    }
}
