//! Record/marker synchronizer.
//!
//! # Responsibility
//! - Drive geocoding, store mutation and marker placement for every
//!   create/update/remove so the map mirrors the store.
//! - Rebuild the whole marker set from the store on demand.
//!
//! # Invariants
//! - A failed lookup aborts before any store or marker mutation.
//! - The store write commits before markers change; a display failure after
//!   that leaves stale markers that `refresh` rebuilds.
//! - `refresh` never geocodes.

use crate::geocode::{Geocoder, LookupError};
use crate::map::{MapDisplay, MapError, MarkerHandle, MarkerRegistry};
use crate::model::geo::Coordinates;
use crate::model::user::{UserFields, UserId, UserRecord, UserValidationError};
use crate::repo::user_repo::{RepoError, UserRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SyncResult<T> = Result<T, SyncError>;

/// Per-record lifecycle as seen by the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Stored without coordinates.
    Unresolved,
    /// Has coordinates but no live marker.
    Resolved,
    Displayed,
    /// Not in the store (terminal).
    Removed,
}

/// Key a caller used to reference a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(UserId),
    Name(String),
}

impl Display for UserKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name `{name}`"),
        }
    }
}

/// User-facing failure taxonomy of synchronizer operations.
#[derive(Debug)]
pub enum SyncError {
    Validation(UserValidationError),
    LookupFailure(LookupError),
    NotFound(UserKey),
    InvalidRecordState(UserId),
    PersistenceFailure(RepoError),
    Display(MapError),
    /// The record left the store but its marker could not be deleted.
    MarkerCleanup { id: UserId, source: MapError },
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid user: {err}"),
            Self::LookupFailure(err) => write!(f, "could not resolve location: {err}"),
            Self::NotFound(key) => write!(f, "user not found by {key}"),
            Self::InvalidRecordState(id) => {
                write!(f, "user {id} has no coordinates and cannot be displayed")
            }
            Self::PersistenceFailure(err) => write!(f, "record store failure: {err}"),
            Self::Display(err) => write!(f, "map display failure: {err}"),
            Self::MarkerCleanup { id, source } => write!(
                f,
                "user {id} was removed but its marker is still displayed: {source}"
            ),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::LookupFailure(err) => Some(err),
            Self::NotFound(_) | Self::InvalidRecordState(_) => None,
            Self::PersistenceFailure(err) => Some(err),
            Self::Display(err) => Some(err),
            Self::MarkerCleanup { source, .. } => Some(source),
        }
    }
}

impl From<UserValidationError> for SyncError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LookupError> for SyncError {
    fn from(value: LookupError) -> Self {
        Self::LookupFailure(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(UserKey::Id(id)),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::PersistenceFailure(other),
        }
    }
}

impl From<MapError> for SyncError {
    fn from(value: MapError) -> Self {
        match value {
            MapError::UnresolvedRecord(id) => Self::InvalidRecordState(id),
            other => Self::Display(other),
        }
    }
}

/// A stored record and its marker, if displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedUser {
    pub record: UserRecord,
    pub marker: Option<MarkerHandle>,
}

impl SyncedUser {
    pub fn state(&self) -> RecordState {
        match (self.marker, self.record.coordinates) {
            (Some(_), _) => RecordState::Displayed,
            (None, Some(_)) => RecordState::Resolved,
            (None, None) => RecordState::Unresolved,
        }
    }
}

/// Confirmation of a completed removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedUser {
    pub record: UserRecord,
    pub marker: Option<MarkerHandle>,
}

impl RemovedUser {
    pub fn state(&self) -> RecordState {
        RecordState::Removed
    }
}

/// Keeps a record store and a marker registry consistent.
pub struct Synchronizer<R, G, D>
where
    R: UserRepository,
    G: Geocoder,
    D: MapDisplay,
{
    repo: R,
    geocoder: G,
    registry: MarkerRegistry<D>,
}

impl<R, G, D> Synchronizer<R, G, D>
where
    R: UserRepository,
    G: Geocoder,
    D: MapDisplay,
{
    pub fn new(repo: R, geocoder: G, display: D) -> Self {
        Self {
            repo,
            geocoder,
            registry: MarkerRegistry::new(display),
        }
    }

    /// Geocodes, stores and displays a new record.
    ///
    /// # Errors
    /// - `Validation` for a blank name or location.
    /// - `LookupFailure` when the location cannot be resolved; nothing is
    ///   stored or displayed.
    /// - `PersistenceFailure` when the insert fails.
    /// - `Display` when the marker cannot be placed; the record stays stored.
    pub fn create(&mut self, fields: UserFields) -> SyncResult<SyncedUser> {
        let started_at = Instant::now();
        fields.validate()?;

        let coordinates = self.geocoder.resolve(&fields.location)?;
        let record = self.repo.create_user(fields, Some(coordinates))?;
        let marker = self.registry.place(&record)?;

        info!(
            "event=user_create module=sync status=ok id={} duration_ms={}",
            record.id,
            started_at.elapsed().as_millis()
        );
        Ok(SyncedUser {
            record,
            marker: Some(marker),
        })
    }

    /// Replaces the fields of record `id`.
    ///
    /// An unchanged location keeps the stored coordinates without a lookup.
    /// A changed (or never resolved) location is geocoded first; a failed
    /// lookup leaves record and marker untouched.
    pub fn update(&mut self, id: UserId, fields: UserFields) -> SyncResult<SyncedUser> {
        let started_at = Instant::now();
        let existing = self.load(id)?;
        fields.validate()?;

        let (coordinates, geocoded) = match existing.coordinates {
            Some(coords) if !existing.location_changed(&fields) => (coords, false),
            _ => (self.geocoder.resolve(&fields.location)?, true),
        };

        let updated = UserRecord::with_id(id, fields, Some(coordinates));
        self.repo.update_user(&updated)?;
        let marker = self.registry.place(&updated)?;

        info!(
            "event=user_update module=sync status=ok id={id} geocoded={geocoded} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(SyncedUser {
            record: updated,
            marker: Some(marker),
        })
    }

    /// Removes record `id` from the store, then its marker.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not stored.
    /// - `PersistenceFailure` when the delete fails; the marker is kept.
    /// - `MarkerCleanup` when the record was deleted but the display refused
    ///   to drop its marker.
    pub fn remove(&mut self, id: UserId) -> SyncResult<RemovedUser> {
        let existing = self.load(id)?;
        self.repo.remove_user(id)?;

        match self.registry.remove(id) {
            Ok(marker) => {
                info!("event=user_remove module=sync status=ok id={id}");
                Ok(RemovedUser {
                    record: existing,
                    marker,
                })
            }
            Err(source) => {
                error!(
                    "event=user_remove module=sync status=error id={id} \
                     error_code=marker_cleanup_failed error={source}"
                );
                Err(SyncError::MarkerCleanup { id, source })
            }
        }
    }

    /// Rebuilds every marker from stored coordinates.
    ///
    /// Records without coordinates are returned undisplayed.
    pub fn refresh(&mut self) -> SyncResult<Vec<SyncedUser>> {
        let started_at = Instant::now();
        self.registry.clear_all()?;

        let records = self.repo.list_users()?;
        let mut synced = Vec::with_capacity(records.len());
        let mut unresolved = 0_usize;
        for record in records {
            let marker = if record.is_resolved() {
                Some(self.registry.place(&record)?)
            } else {
                unresolved += 1;
                None
            };
            synced.push(SyncedUser { record, marker });
        }

        if unresolved > 0 {
            warn!("event=map_refresh module=sync status=partial unresolved={unresolved}");
        }
        info!(
            "event=map_refresh module=sync status=ok users={} markers={} duration_ms={}",
            synced.len(),
            self.registry.len(),
            started_at.elapsed().as_millis()
        );
        Ok(synced)
    }

    /// First record named `name` in store order.
    pub fn find_by_name(&self, name: &str) -> SyncResult<Option<UserRecord>> {
        Ok(self.repo.find_by_name(name)?)
    }

    /// Updates the first record named `name`.
    pub fn update_by_name(&mut self, name: &str, fields: UserFields) -> SyncResult<SyncedUser> {
        let id = self.id_for_name(name)?;
        self.update(id, fields)
    }

    /// Removes the first record named `name`; later namesakes stay.
    pub fn remove_by_name(&mut self, name: &str) -> SyncResult<RemovedUser> {
        let id = self.id_for_name(name)?;
        self.remove(id)
    }

    /// Stored records in store order, without touching the map.
    pub fn users(&self) -> SyncResult<Vec<UserRecord>> {
        Ok(self.repo.list_users()?)
    }

    pub fn state_of(&self, id: UserId) -> SyncResult<RecordState> {
        let Some(record) = self.repo.get_user(id)? else {
            return Ok(RecordState::Removed);
        };
        let state = SyncedUser {
            marker: self.registry.handle(id),
            record,
        }
        .state();
        Ok(state)
    }

    /// Resolves a place name without touching store or map.
    pub fn locate(&self, location: &str) -> SyncResult<Coordinates> {
        Ok(self.geocoder.resolve(location)?)
    }

    pub fn registry(&self) -> &MarkerRegistry<D> {
        &self.registry
    }

    pub fn display(&self) -> &D {
        self.registry.display()
    }

    /// Moves the map viewport.
    pub fn set_view(&mut self, position: Coordinates, zoom: u8) {
        self.registry.set_view(position, zoom);
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn load(&self, id: UserId) -> SyncResult<UserRecord> {
        self.repo
            .get_user(id)?
            .ok_or(SyncError::NotFound(UserKey::Id(id)))
    }

    fn id_for_name(&self, name: &str) -> SyncResult<UserId> {
        self.repo
            .find_by_name(name)?
            .map(|record| record.id)
            .ok_or_else(|| SyncError::NotFound(UserKey::Name(name.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordState, SyncError, SyncedUser, UserKey};
    use crate::map::{MapError, MarkerHandle};
    use crate::model::geo::Coordinates;
    use crate::model::user::{UserFields, UserRecord};
    use crate::repo::user_repo::RepoError;

    #[test]
    fn placing_unresolved_record_maps_to_invalid_record_state() {
        let record = UserRecord::new(UserFields::new("Jan", "Kowalski", 3, "Warszawa"), None);
        let err = SyncError::from(MapError::UnresolvedRecord(record.id));
        assert!(matches!(err, SyncError::InvalidRecordState(id) if id == record.id));
        assert!(err.to_string().contains("no coordinates"));
    }

    #[test]
    fn stale_marker_maps_to_display_error() {
        let handle = MarkerHandle::new(0, 3);
        let err = SyncError::from(MapError::UnknownMarker(handle));
        assert!(matches!(err, SyncError::Display(MapError::UnknownMarker(h)) if h == handle));
    }

    #[test]
    fn repo_errors_split_into_not_found_and_persistence_failure() {
        let record = UserRecord::new(UserFields::new("Jan", "Kowalski", 3, "Warszawa"), None);
        assert!(matches!(
            SyncError::from(RepoError::NotFound(record.id)),
            SyncError::NotFound(UserKey::Id(id)) if id == record.id
        ));
        assert!(matches!(
            SyncError::from(RepoError::InvalidData("bad row".to_string())),
            SyncError::PersistenceFailure(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn synced_user_state_follows_marker_and_coordinates() {
        let mut record = UserRecord::new(UserFields::new("Jan", "Kowalski", 3, "Warszawa"), None);
        let unresolved = SyncedUser {
            record: record.clone(),
            marker: None,
        };
        assert_eq!(unresolved.state(), RecordState::Unresolved);

        record.coordinates = Some(Coordinates::new(52.23, 21.01));
        let resolved = SyncedUser {
            record: record.clone(),
            marker: None,
        };
        assert_eq!(resolved.state(), RecordState::Resolved);

        let displayed = SyncedUser {
            record,
            marker: Some(MarkerHandle::new(0, 0)),
        };
        assert_eq!(displayed.state(), RecordState::Displayed);
    }
}
