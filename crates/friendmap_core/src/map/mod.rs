//! Map display boundary and marker bookkeeping.
//!
//! # Responsibility
//! - Define the display contract (`MapDisplay`) the core drives.
//! - Own the record-to-marker side-table (`MarkerRegistry`).
//! - Provide a standalone HTML renderer (`LeafletMap`).
//!
//! # Invariants
//! - Marker handles are opaque and owned by the registry.
//! - A handle is valid only until its marker is deleted.

use crate::model::geo::Coordinates;
use crate::model::user::UserId;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod leaflet;
mod registry;

pub use leaflet::{LeafletMap, RenderedMarker, DEFAULT_CENTER, DEFAULT_ZOOM, SINGLE_LOCATION_ZOOM};
pub use registry::MarkerRegistry;

pub type MapResult<T> = Result<T, MapError>;

/// Generation-checked handle to one displayed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerHandle {
    index: u32,
    generation: u32,
}

impl MarkerHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> u32 {
        self.index
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl Display for MarkerHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker#{}v{}", self.index, self.generation)
    }
}

/// Map widget operations the core relies on.
pub trait MapDisplay {
    /// Displays a pin and returns its handle.
    fn set_marker(&mut self, position: Coordinates, label: &str) -> MapResult<MarkerHandle>;
    /// Removes a displayed pin.
    ///
    /// # Errors
    /// - `UnknownMarker` when the handle is stale or foreign.
    fn delete_marker(&mut self, handle: MarkerHandle) -> MapResult<()>;
    fn set_position(&mut self, position: Coordinates);
    fn set_zoom(&mut self, level: u8);
}

/// Display-layer failures.
#[derive(Debug)]
pub enum MapError {
    UnknownMarker(MarkerHandle),
    /// A marker was requested for a record without coordinates.
    UnresolvedRecord(UserId),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Render(serde_json::Error),
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMarker(handle) => write!(f, "marker is not displayed: {handle}"),
            Self::UnresolvedRecord(id) => {
                write!(f, "user {id} has no resolved coordinates to place a marker at")
            }
            Self::Io { path, source } => {
                write!(f, "failed to write map `{}`: {source}", path.display())
            }
            Self::Render(err) => write!(f, "failed to render map markers: {err}"),
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownMarker(_) | Self::UnresolvedRecord(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}
