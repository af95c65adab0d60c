use sqlx::error::ErrorKind;
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level failure categories. The REST layer maps these onto HTTP
/// statuses (404 / 409 / 400 / 500).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for DomainError {
    /// Classify persistence violations into their domain categories; anything
    /// unrecognized stays a database error and surfaces as a generic 500.
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound("record not found".to_string());
        }

        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return Self::Conflict("already exists".to_string());
                }
                ErrorKind::ForeignKeyViolation => {
                    return Self::InvalidReference(
                        "referenced record does not exist".to_string(),
                    );
                }
                _ => {}
            }
        }

        Self::Database(err)
    }
}

/// Pull a required request field, rejecting missing or blank values.
pub fn require(value: Option<String>, field: &str) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::Validation(format!("{} is required", field))),
    }
}
