//! Friend record domain model.
//!
//! # Responsibility
//! - Define the canonical record kept by every record store.
//! - Validate user-entered fields before any store or network work.
//!
//! # Invariants
//! - `id` is stable across edits and never reused for another record.
//! - `coordinates` were resolved from the current `location` text, or are
//!   `None` when the record is unresolved.

use crate::model::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one friend record.
pub type UserId = Uuid;

/// Raw, user-entered fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub name: String,
    pub surname: String,
    pub posts: u32,
    /// Free-text place name, used verbatim as an encyclopedia article title.
    pub location: String,
}

impl UserFields {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        posts: u32,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            posts,
            location: location.into(),
        }
    }

    /// Validates fields required for geocoding and marker labelling.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `EmptyLocation` when `location` is blank.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_required(&self.name, &self.location)
    }
}

/// Canonical friend record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub posts: u32,
    pub location: String,
    pub coordinates: Option<Coordinates>,
}

impl UserRecord {
    /// Creates a record with a generated stable ID.
    pub fn new(fields: UserFields, coordinates: Option<Coordinates>) -> Self {
        Self::with_id(Uuid::new_v4(), fields, coordinates)
    }

    /// Creates a record with a caller-provided stable ID.
    pub fn with_id(id: UserId, fields: UserFields, coordinates: Option<Coordinates>) -> Self {
        Self {
            id,
            name: fields.name,
            surname: fields.surname,
            posts: fields.posts,
            location: fields.location,
            coordinates,
        }
    }

    /// Returns the editable fields of this record.
    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            surname: self.surname.clone(),
            posts: self.posts,
            location: self.location.clone(),
        }
    }

    /// Whether `location` text differs from the stored one.
    pub fn location_changed(&self, fields: &UserFields) -> bool {
        self.location != fields.location
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Validates persisted state with the same rules as input fields.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_required(&self.name, &self.location)
    }
}

fn validate_required(name: &str, location: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if location.trim().is_empty() {
        return Err(UserValidationError::EmptyLocation);
    }
    Ok(())
}

/// Field validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyLocation,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::EmptyLocation => write!(f, "location cannot be empty"),
        }
    }
}

impl Error for UserValidationError {}
