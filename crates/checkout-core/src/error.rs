//! Error Types

use std::collections::BTreeMap;

use thiserror::Error;

/// Attribute name to error message
pub type ErrorMap = BTreeMap<String, String>;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// User input failed provider checks; the step is redisplayed
    #[error("{message}")]
    Validation { message: String, errors: ErrorMap },

    /// Provider id is not part of the registry
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Provider failed while computing price, availability or config
    #[error("Provider error: {0}")]
    Provider(String),

    /// Basket store unavailable or rejected the change
    #[error("Basket error: {0}")]
    Basket(String),

    /// Template rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Validation failure carrying the per-attribute messages
    pub fn validation(message: impl Into<String>, errors: ErrorMap) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    /// Whether the error is meant to be shown to the customer
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CheckoutError::Validation { .. })
    }

    /// Per-attribute errors, empty for system faults
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            CheckoutError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Validation { message, .. } => message.clone(),
            CheckoutError::ProviderNotFound(_) => {
                "The selected payment option is not available.".into()
            }
            CheckoutError::Basket(_) => {
                "Your basket could not be updated. Please try again.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
