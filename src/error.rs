// Error taxonomy for the store and the reporter

use thiserror::Error;

/// Errors surfaced by store and report operations.
///
/// Updating or deleting a row that does not exist is NOT an error; those
/// operations return the number of affected rows instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A declared CHECK / UNIQUE / PRIMARY KEY constraint was violated,
    /// or an enum value outside the allowed set was supplied
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Delete refused because other rows still point at this one
    #[error("{entity} {id} is still referenced by {dependents} row(s)")]
    Referenced {
        entity: &'static str,
        id: i64,
        dependents: i64,
    },

    /// Any other SQLite failure
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart rendering or PNG encoding failed
    #[error("chart error: {0}")]
    Chart(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| code.to_string());
                Error::ConstraintViolation(detail)
            }
            other => Error::Database(other),
        }
    }
}

impl Error {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::ConstraintViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
