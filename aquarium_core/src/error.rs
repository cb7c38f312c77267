use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AquariumError {
    /// A manual value was rejected; the store was left unchanged.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
    #[error("remote store error: {0}")]
    Remote(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

impl AquariumError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
