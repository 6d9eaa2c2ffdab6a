//! Record-to-marker side-table.
//!
//! # Invariants
//! - At most one live marker per record id.
//! - Only records with coordinates are ever placed.
//! - After a successful `clear_all` the table is empty.

use super::{MapDisplay, MapError, MapResult, MarkerHandle};
use crate::model::geo::Coordinates;
use crate::model::user::{UserId, UserRecord};
use log::debug;
use std::collections::BTreeMap;

/// Owns the display and every marker handle placed on it.
pub struct MarkerRegistry<D: MapDisplay> {
    display: D,
    markers: BTreeMap<UserId, MarkerHandle>,
}

impl<D: MapDisplay> MarkerRegistry<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            markers: BTreeMap::new(),
        }
    }

    /// Displays a marker for `record`, replacing any marker it already had.
    ///
    /// # Errors
    /// - `UnresolvedRecord` when `record.coordinates` is `None`; nothing is
    ///   touched in that case.
    /// - Display errors from deleting the previous marker or setting the new
    ///   one.
    pub fn place(&mut self, record: &UserRecord) -> MapResult<MarkerHandle> {
        let position = record
            .coordinates
            .ok_or(MapError::UnresolvedRecord(record.id))?;

        self.remove(record.id)?;
        let handle = self.display.set_marker(position, &record.name)?;
        self.markers.insert(record.id, handle);
        debug!("event=marker_place module=map status=ok handle={handle}");
        Ok(handle)
    }

    /// Deletes the marker of `id`, returning its handle when one existed.
    ///
    /// The entry is kept when the display rejects the deletion so a later
    /// `clear_all` retries it.
    pub fn remove(&mut self, id: UserId) -> MapResult<Option<MarkerHandle>> {
        let Some(handle) = self.markers.get(&id).copied() else {
            return Ok(None);
        };
        self.display.delete_marker(handle)?;
        self.markers.remove(&id);
        Ok(Some(handle))
    }

    /// Deletes every tracked marker.
    ///
    /// All deletions are attempted. Entries the display refused to delete
    /// stay tracked so the next call retries them; the first display error is
    /// returned.
    pub fn clear_all(&mut self) -> MapResult<()> {
        let mut first_error = None;
        let display = &mut self.display;
        self.markers
            .retain(|_, handle| match display.delete_marker(*handle) {
                Ok(()) => false,
                Err(err) => {
                    first_error.get_or_insert(err);
                    true
                }
            });
        first_error.map_or(Ok(()), Err)
    }

    pub fn handle(&self, id: UserId) -> Option<MarkerHandle> {
        self.markers.get(&id).copied()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.markers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Moves the display viewport; markers are untouched.
    pub fn set_view(&mut self, position: Coordinates, zoom: u8) {
        self.display.set_position(position);
        self.display.set_zoom(zoom);
    }
}
