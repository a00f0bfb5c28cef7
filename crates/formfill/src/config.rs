//! Auto-fill configuration.
//!
//! [`AutoFillOptions`] can be built in code or loaded from YAML/JSON:
//!
//! ```yaml
//! formSelector: "#signup"
//! excludeSelectors: ["#captcha"]
//! submitAfterFill: true
//! locale: fr
//! customFields:
//!   "#quantity": { type: number, min: 1, max: 3 }
//!   "#promo": { value: "WELCOME10" }
//! ```

use crate::field::FieldOverride;
use crate::result::{FillError, FillResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Default scope for field discovery
pub const DEFAULT_FORM_SELECTOR: &str = "form";

/// Default submit button selector
pub const DEFAULT_SUBMIT_SELECTOR: &str = "button[type='submit']";

/// Default cap on discovered fields
pub const DEFAULT_MAX_ELEMENTS: usize = 50;

/// Scan-and-fill configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoFillOptions {
    /// Scope for field discovery
    pub form_selector: String,
    /// Fields whose synthesized selector contains any of these are skipped
    pub exclude_selectors: Vec<String>,
    /// Overrides merged onto detected fields with exactly this selector
    pub custom_fields: IndexMap<String, FieldOverride>,
    /// Submit the form after filling
    pub submit_after_fill: bool,
    /// Submit button selector
    pub submit_selector: String,
    /// Locale for every field without its own
    pub locale: Option<String>,
    /// Total cap on discovered fields
    pub max_elements: usize,
}

impl Default for AutoFillOptions {
    fn default() -> Self {
        Self {
            form_selector: DEFAULT_FORM_SELECTOR.to_string(),
            exclude_selectors: Vec::new(),
            custom_fields: IndexMap::new(),
            submit_after_fill: false,
            submit_selector: DEFAULT_SUBMIT_SELECTOR.to_string(),
            locale: None,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl AutoFillOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML options
    pub fn from_yaml_str(yaml: &str) -> FillResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse JSON options
    pub fn from_json_str(json: &str) -> FillResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> FillResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            other => Err(FillError::invalid_config(format!(
                "unsupported options file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Set the discovery scope
    #[must_use]
    pub fn with_form_selector(mut self, selector: impl Into<String>) -> Self {
        self.form_selector = selector.into();
        self
    }

    /// Add an exclusion substring
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_selectors.push(pattern.into());
        self
    }

    /// Add a per-selector override
    #[must_use]
    pub fn with_custom_field(mut self, selector: impl Into<String>, patch: FieldOverride) -> Self {
        let _ = self.custom_fields.insert(selector.into(), patch);
        self
    }

    /// Submit after filling
    #[must_use]
    pub const fn submit_after_fill(mut self, submit: bool) -> Self {
        self.submit_after_fill = submit;
        self
    }

    /// Set the submit button selector
    #[must_use]
    pub fn with_submit_selector(mut self, selector: impl Into<String>) -> Self {
        self.submit_selector = selector.into();
        self
    }

    /// Set the call-scoped locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Cap the number of discovered fields
    #[must_use]
    pub const fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }
}
