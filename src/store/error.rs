use std::fmt;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the persistence gateway.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite rejected the statement or the connection failed.
    Db(rusqlite::Error),
    /// A document could not be encoded to or decoded from JSON.
    Serialization(serde_json::Error),
    /// A field value could not be cast to the type the document declares.
    Cast { field: &'static str, value: String },
    /// A stored row does not decode, e.g. a malformed `_id`. Only raised by
    /// [`super::SqliteStore`].
    InvalidData(String),
    /// A poisoned store lock, or a failure switched on through
    /// [`super::MemoryStore`]'s fault injection.
    Unavailable(String),
    /// The database was written by a newer schema than this binary knows.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::Cast { field, value } => {
                write!(f, "cast to integer failed for value \"{value}\" at path \"{field}\"")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported version {latest_supported}"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
