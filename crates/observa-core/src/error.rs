use thiserror::Error;

use crate::domain::HandlerError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ObservaError>;

#[derive(Debug, Error)]
pub enum ObservaError {
    #[error("could not find observable element named {0:?}")]
    UnknownField(String),

    #[error("handler {0:?} is not registered in the handler table")]
    InvalidHandler(String),

    #[error("duplicate handler name {0:?}")]
    DuplicateHandler(String),

    #[error("{0:?} is already an observable element")]
    DuplicateField(String),

    #[error("invalid watch spec: {0}")]
    InvalidWatchSpec(String),

    #[error("{0:?} cannot be used as an observable element name")]
    InvalidFieldName(String),

    #[error("notify called for {0:?}, which is not an observable element")]
    NotObservable(String),

    #[error("re-entrant notification for {0:?} while a dispatch is running")]
    Reentrant(String),

    #[error("observer of {field:?} failed: {source}")]
    Handler {
        field: String,
        #[source]
        source: HandlerError,
    },

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}
