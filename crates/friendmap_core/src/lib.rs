//! Core logic for friendmap: friend records, place-name geocoding and the
//! map markers that mirror them.
//! This crate is the single source of truth for record/marker consistency.

pub mod config;
pub mod db;
pub mod geocode;
pub mod logging;
pub mod map;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use geocode::{Geocoder, LookupError, LookupResult, WikipediaGeocoder};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use map::{LeafletMap, MapDisplay, MapError, MapResult, MarkerHandle, MarkerRegistry};
pub use model::geo::Coordinates;
pub use model::user::{UserFields, UserId, UserRecord, UserValidationError};
pub use repo::memory_repo::InMemoryUserRepository;
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::sync_service::{
    RecordState, RemovedUser, SyncError, SyncResult, SyncedUser, Synchronizer, UserKey,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
