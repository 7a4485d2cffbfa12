use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Field value out of range: {0}")]
    FieldOutOfRange(String),

    #[error("Short string encoding failed for '{0}'")]
    ShortString(String),

    #[error("Unknown struct type: {0}")]
    UnknownType(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Dialect mismatch: computed {computed}, contract reported {reported}")]
    DialectMismatch { computed: String, reported: String },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
