use std::fmt;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failure of a data-access operation.
///
/// Not-found is never represented here: lookups return `Option` and list
/// queries return an empty `Vec`.
#[derive(Error, Debug)]
pub enum DbError {
    /// The database could not be reached, rejected our credentials, or
    /// dropped the connection mid-query.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// An insert violated a table constraint.
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    /// Any other driver error, including malformed SQL.
    #[error("query failed: {0}")]
    Query(#[source] DieselError),

    /// The blocking task running the query panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not-null",
            ConstraintKind::Check => "check",
        };
        f.write_str(name)
    }
}

impl DbError {
    pub fn is_constraint(&self, kind: ConstraintKind) -> bool {
        matches!(self, DbError::Constraint { kind: k, .. } if *k == kind)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(e: r2d2::Error) -> Self {
        DbError::Unavailable(format!("Failed to get DB connection: {}", e))
    }
}

impl From<DieselError> for DbError {
    fn from(e: DieselError) -> Self {
        if let DieselError::DatabaseError(kind, info) = &e {
            let message = info.message().to_string();
            let constraint = match kind {
                DatabaseErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                DatabaseErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                DatabaseErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                DatabaseErrorKind::CheckViolation => Some(ConstraintKind::Check),
                DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                    return DbError::Unavailable(message);
                }
                _ => None,
            };
            if let Some(kind) = constraint {
                return DbError::Constraint { kind, message };
            }
        }
        DbError::Query(e)
    }
}
