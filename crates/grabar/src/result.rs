//! Result and error types for Grabar.

use thiserror::Error;

/// Result type for Grabar operations
pub type GrabarResult<T> = Result<T, GrabarError>;

/// Errors that can occur in Grabar
#[derive(Debug, Error)]
pub enum GrabarError {
    /// HTML snapshot could not be parsed
    #[error("HTML parse error: {message}")]
    HtmlParse {
        /// Error message
        message: String,
    },

    /// Selector syntax outside the supported subset
    #[error("Unsupported selector: {selector}")]
    UnsupportedSelector {
        /// Offending selector
        selector: String,
    },

    /// No element matched a query
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Query that matched nothing
        selector: String,
    },

    /// Node is not an element
    #[error("Node {node} is not an element")]
    NotAnElement {
        /// Arena index of the node
        node: usize,
    },

    /// Operation called in the wrong session state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Action record that no script target can express
    #[error("Invalid action: {message}")]
    InvalidAction {
        /// Error message
        message: String,
    },

    /// Malformed or unknown protocol message
    #[error("Protocol error: {message}")]
    Protocol {
        /// Error message
        message: String,
    },

    /// Outgoing native message exceeds the transport limit
    #[error("Message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Encoded size
        size: usize,
        /// Transport limit
        limit: usize,
    },

    /// Script generation error
    #[error("Script generation failed: {message}")]
    Generation {
        /// Error message
        message: String,
    },

    /// Generated file manifest missing or unreadable
    #[error("Manifest verification failed for '{path}': {reason}")]
    Manifest {
        /// Path to the generated file
        path: String,
        /// Why verification failed
        reason: String,
    },

    /// Generated file was edited after generation
    #[error("Hash mismatch for '{path}': expected {expected}, got {actual}")]
    HashMismatch {
        /// Path to the generated file
        path: String,
        /// Hash recorded in the manifest
        expected: String,
        /// Hash of the current contents
        actual: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Backend call without a bearer token
    #[error("Not authenticated: set an API token or sign in first")]
    NotAuthenticated,

    /// Backend returned a non-success status
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// HTTP transport error
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl GrabarError {
    /// Create an HTML parse error
    #[must_use]
    pub fn html_parse(message: impl Into<String>) -> Self {
        Self::HtmlParse {
            message: message.into(),
        }
    }

    /// Create an unsupported selector error
    #[must_use]
    pub fn unsupported_selector(selector: impl Into<String>) -> Self {
        Self::UnsupportedSelector {
            selector: selector.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an invalid action error
    #[must_use]
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::InvalidAction {
            message: message.into(),
        }
    }

    /// Create a protocol error
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a script generation error
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
