//! Place-name to coordinate resolution.
//!
//! # Responsibility
//! - Define the geocoder contract consumed by the synchronizer.
//! - Provide the encyclopedia-scraping implementation.
//!
//! # Invariants
//! - One call is one lookup: no retry, no cache.
//! - Failures never produce partial coordinates.

use crate::model::geo::Coordinates;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod scrape;
mod wiki;

pub use scrape::CoordinateScraper;
pub use wiki::{WikipediaGeocoder, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

pub type LookupResult<T> = Result<T, LookupError>;

/// Resolves free-text place names to coordinates.
pub trait Geocoder {
    /// Resolves `location` with exactly one external lookup.
    fn resolve(&self, location: &str) -> LookupResult<Coordinates>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn resolve(&self, location: &str) -> LookupResult<Coordinates> {
        (**self).resolve(location)
    }
}

/// Reasons a location could not be resolved.
#[derive(Debug)]
pub enum LookupError {
    EmptyLocation,
    InvalidUrl(String),
    InvalidSelector(String),
    Transport(reqwest::Error),
    HttpStatus(u16),
    /// Fewer than two elements carry the coordinate class.
    MissingCoordinates {
        class: &'static str,
        found: usize,
    },
    InvalidNumber {
        class: &'static str,
        value: String,
    },
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLocation => write!(f, "location cannot be empty"),
            Self::InvalidUrl(message) => write!(f, "invalid article url: {message}"),
            Self::InvalidSelector(message) => write!(f, "invalid coordinate selector: {message}"),
            Self::Transport(err) => write!(f, "article fetch failed: {err}"),
            Self::HttpStatus(status) => write!(f, "article fetch returned HTTP {status}"),
            Self::MissingCoordinates { class, found } => write!(
                f,
                "expected at least 2 `.{class}` elements in article, found {found}"
            ),
            Self::InvalidNumber { class, value } => {
                write!(f, "`.{class}` value `{value}` is not a number")
            }
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl LookupError {
    /// Stable code for structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyLocation => "empty_location",
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidSelector(_) => "invalid_selector",
            Self::Transport(_) => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::MissingCoordinates { .. } => "missing_coordinates",
            Self::InvalidNumber { .. } => "invalid_number",
        }
    }
}
