use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount is not a number: {0:?}")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(f64),

    #[error("Amount is too large (got {0}, limit is 1e15)")]
    AmountTooLarge(f64),

    #[error("Unknown transaction type: {0:?} (expected income or expense)")]
    UnknownKind(String),
}

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error("Stored ledger under '{key}' is corrupt: {reason}")]
    CorruptState { key: String, reason: String },

    #[error("Storage unavailable, changes were not saved: {0}")]
    StorageUnavailable(String),

    #[error("No transaction ids left to assign")]
    IdsExhausted,

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
