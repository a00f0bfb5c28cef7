//! Result and error types for Formfill.

use thiserror::Error;

/// Result type for Formfill operations
pub type FillResult<T> = Result<T, FillError>;

/// Errors that can occur while detecting or filling form fields
#[derive(Debug, Error)]
pub enum FillError {
    /// Requested locale has no synthetic-data backend
    #[error("Unsupported locale: {locale}")]
    UnsupportedLocale {
        /// Locale string as supplied by the caller
        locale: String,
    },

    /// Invalid configuration (bad field type name, malformed options file, ...)
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// No element matched a selector
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// The browser layer rejected an element operation
    #[error("Interaction '{action}' failed: {message}")]
    Interaction {
        /// Operation that failed (fill, check, click, ...)
        action: String,
        /// Error message
        message: String,
    },

    /// Browser launch or connection error
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// A caller-supplied value generator failed
    #[error("Value generator failed: {message}")]
    Generator {
        /// Error message
        message: String,
    },

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

impl FillError {
    /// Create an unsupported-locale error
    #[must_use]
    pub fn unsupported_locale(locale: impl Into<String>) -> Self {
        Self::UnsupportedLocale {
            locale: locale.into(),
        }
    }

    /// Create an invalid-configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interaction {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create a generator error
    #[must_use]
    pub fn generator(message: impl Into<String>) -> Self {
        Self::Generator {
            message: message.into(),
        }
    }

    /// Whether this error was raised before any element was touched
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLocale { .. }
                | Self::InvalidConfig { .. }
                | Self::Json(_)
                | Self::Yaml(_)
        )
    }
}
