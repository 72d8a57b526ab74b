use thiserror::Error;

/// Validation errors for domain values and entities
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Value must be non-negative")]
    MustBeNonNegative,

    #[error("Value must be finite")]
    MustBeFinite,
}

impl From<ValidationError> for String {
    fn from(error: ValidationError) -> Self {
        error.to_string()
    }
}

/// Errors returned by the remote trading store client
///
/// `Rejected` carries the backend's `detail` message verbatim so the UI layer
/// can surface it unchanged.
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// True for non-2xx responses carrying a remote validation message
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}
