use thiserror::Error;

/// Errors surfaced by the pagination and comment-tree core.
///
/// `InvalidArgument` is never retried. `Unavailable` is propagated as-is so the
/// transport layer can decide on retries. `Invariant` means the stored data is
/// inconsistent and must not be confused with an empty result.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("data invariant violated: {0}")]
    Invariant(String),
}

impl CoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        CoreError::Invariant(message.into())
    }
}

/// Rows that reached us but do not fit the model are a data problem, not an
/// outage; retrying them cannot help.
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
                CoreError::Invariant(format!("row does not match the model: {}", err))
            }
            other => CoreError::Unavailable(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
