//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `users` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - All statements are parameterized; no user text is spliced into SQL.
//! - Each write is a single auto-committed statement.

use crate::db::DbError;
use crate::model::geo::Coordinates;
use crate::model::user::{UserFields, UserId, UserRecord, UserValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    surname,
    posts,
    location,
    coords
FROM users";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    Db(DbError),
    NotFound(UserId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store contract.
pub trait UserRepository {
    /// All records in store order.
    fn list_users(&self) -> RepoResult<Vec<UserRecord>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>>;
    /// First record whose `name` equals `name` exactly, in store order.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<UserRecord>>;
    /// Appends a record and returns it with its assigned ID.
    fn create_user(
        &mut self,
        fields: UserFields,
        coordinates: Option<Coordinates>,
    ) -> RepoResult<UserRecord>;
    fn update_user(&mut self, record: &UserRecord) -> RepoResult<()>;
    fn remove_user(&mut self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_users(&self) -> RepoResult<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} WHERE name = ?1 ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn create_user(
        &mut self,
        fields: UserFields,
        coordinates: Option<Coordinates>,
    ) -> RepoResult<UserRecord> {
        let record = UserRecord::new(fields, coordinates);
        record.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                id,
                name,
                surname,
                posts,
                location,
                coords
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.surname.as_str(),
                i64::from(record.posts),
                record.location.as_str(),
                record.coordinates.map(Coordinates::to_wkt_point),
            ],
        )?;

        Ok(record)
    }

    fn update_user(&mut self, record: &UserRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                surname = ?2,
                posts = ?3,
                location = ?4,
                coords = ?5
             WHERE id = ?6;",
            params![
                record.name.as_str(),
                record.surname.as_str(),
                i64::from(record.posts),
                record.location.as_str(),
                record.coordinates.map(Coordinates::to_wkt_point),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn remove_user(&mut self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in users.id"))
    })?;

    let posts_value: i64 = row.get("posts")?;
    let posts = u32::try_from(posts_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid post count `{posts_value}` in users.posts"))
    })?;

    let coordinates = match row.get::<_, Option<String>>("coords")? {
        Some(text) => Some(
            Coordinates::from_wkt_point(&text)
                .map_err(|err| RepoError::InvalidData(format!("{err} in users.coords")))?,
        ),
        None => None,
    };

    let record = UserRecord {
        id,
        name: row.get("name")?,
        surname: row.get("surname")?,
        posts,
        location: row.get("location")?,
        coordinates,
    };
    record.validate()?;
    Ok(record)
}
