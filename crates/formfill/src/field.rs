//! Field descriptors: semantic category, addressing, generated values and
//! the partial overrides merged onto auto-detected fields.

use crate::driver::ElementHandle;
use crate::result::{FillError, FillResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Semantic category of a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    Text,
    /// Email address
    Email,
    /// Password
    Password,
    /// Phone number
    Phone,
    /// Integer
    Number,
    /// Calendar date
    Date,
    /// Dropdown
    Select,
    /// Checkbox
    Checkbox,
    /// Radio button
    Radio,
    /// Multi-line text
    Textarea,
    /// File upload
    File,
    /// Person name
    Name,
    /// Street address
    Address,
    /// City
    City,
    /// State or region
    State,
    /// ZIP / postal code
    Zip,
    /// Country
    Country,
    /// Company name
    Company,
    /// Web address
    Url,
    /// Caller-defined category, filled from an override
    Custom,
}

impl FieldType {
    /// Every category, in declaration order
    pub const ALL: [Self; 20] = [
        Self::Text,
        Self::Email,
        Self::Password,
        Self::Phone,
        Self::Number,
        Self::Date,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Textarea,
        Self::File,
        Self::Name,
        Self::Address,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Country,
        Self::Company,
        Self::Url,
        Self::Custom,
    ];

    /// Lowercase name, as used in config files and on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Phone => "phone",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Textarea => "textarea",
            Self::File => "file",
            Self::Name => "name",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Country => "country",
            Self::Company => "company",
            Self::Url => "url",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = FillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| FillError::invalid_config(format!("unknown field type '{s}'")))
    }
}

/// A value written into a form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text-like value
    Text(String),
    /// Checked state
    Bool(bool),
    /// Integer
    Number(i64),
    /// Calendar date
    Date(NaiveDate),
}

impl FieldValue {
    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is a number
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Caller-supplied generator that replaces category-based generation
pub type ValueFn = Arc<dyn Fn() -> FillResult<FieldValue> + Send + Sync>;

/// How a field names its element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// CSS selector, resolved at fill time
    Selector(String),
    /// Already-resolved element
    Element(ElementHandle),
}

impl FieldTarget {
    /// The selector, when addressed by selector
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::Selector(s) => Some(s),
            Self::Element(_) => None,
        }
    }
}

/// One field's contract: where it is, what it is, and how to fill it
#[derive(Clone)]
pub struct FieldConfig {
    /// Element addressing
    pub target: FieldTarget,
    /// Semantic category
    pub field_type: FieldType,
    /// Replaces category generation when present
    pub value_fn: Option<ValueFn>,
    /// Lower bound for NUMBER fields (default 1)
    pub min: Option<i64>,
    /// Upper bound for NUMBER fields (default 100)
    pub max: Option<i64>,
    /// Candidate values for SELECT fields; empty means read them from the page
    pub options: Option<Vec<String>>,
    /// Click the element after filling
    pub click_after_fill: bool,
    /// Press Enter in the element after filling
    pub press_enter_after_fill: bool,
    /// Blur the element after filling
    pub blur_after_fill: bool,
    /// File to attach (FILE inputs)
    pub file_path: Option<PathBuf>,
    /// Locale for this field only
    pub locale: Option<String>,
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("target", &self.target)
            .field("field_type", &self.field_type)
            .field("value_fn", &self.value_fn.as_ref().map(|_| "<fn>"))
            .field("min", &self.min)
            .field("max", &self.max)
            .field("options", &self.options)
            .field("click_after_fill", &self.click_after_fill)
            .field("press_enter_after_fill", &self.press_enter_after_fill)
            .field("blur_after_fill", &self.blur_after_fill)
            .field("file_path", &self.file_path)
            .field("locale", &self.locale)
            .finish()
    }
}

impl FieldConfig {
    /// Field addressed by CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>, field_type: FieldType) -> Self {
        Self::with_target(FieldTarget::Selector(selector.into()), field_type)
    }

    /// Field addressed by a resolved element
    #[must_use]
    pub fn for_element(element: ElementHandle, field_type: FieldType) -> Self {
        Self::with_target(FieldTarget::Element(element), field_type)
    }

    fn with_target(target: FieldTarget, field_type: FieldType) -> Self {
        Self {
            target,
            field_type,
            value_fn: None,
            min: None,
            max: None,
            options: None,
            click_after_fill: false,
            press_enter_after_fill: false,
            blur_after_fill: false,
            file_path: None,
            locale: None,
        }
    }

    /// The selector, when addressed by selector
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.target.selector()
    }

    /// Generate values with `f` instead of by category
    #[must_use]
    pub fn with_value_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> FillResult<FieldValue> + Send + Sync + 'static,
    {
        self.value_fn = Some(Arc::new(f));
        self
    }

    /// Always fill `value`
    #[must_use]
    pub fn with_value(self, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        self.with_value_fn(move || Ok(value.clone()))
    }

    /// Bounds for NUMBER generation
    #[must_use]
    pub const fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Explicit SELECT candidates
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Click after filling
    #[must_use]
    pub const fn click_after_fill(mut self) -> Self {
        self.click_after_fill = true;
        self
    }

    /// Press Enter after filling
    #[must_use]
    pub const fn press_enter_after_fill(mut self) -> Self {
        self.press_enter_after_fill = true;
        self
    }

    /// Blur after filling
    #[must_use]
    pub const fn blur_after_fill(mut self) -> Self {
        self.blur_after_fill = true;
        self
    }

    /// File to attach
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Per-field locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Shallow merge: every property set on `patch` replaces ours
    pub fn apply_override(&mut self, patch: &FieldOverride) {
        if let Some(field_type) = patch.field_type {
            self.field_type = field_type;
        }
        if let Some(f) = &patch.value_fn {
            self.value_fn = Some(Arc::clone(f));
        } else if let Some(value) = &patch.value {
            let value = FieldValue::Text(value.clone());
            self.value_fn = Some(Arc::new(move || Ok(value.clone())));
        }
        if patch.min.is_some() {
            self.min = patch.min;
        }
        if patch.max.is_some() {
            self.max = patch.max;
        }
        if patch.options.is_some() {
            self.options.clone_from(&patch.options);
        }
        if let Some(click) = patch.click_after_fill {
            self.click_after_fill = click;
        }
        if let Some(enter) = patch.press_enter_after_fill {
            self.press_enter_after_fill = enter;
        }
        if let Some(blur) = patch.blur_after_fill {
            self.blur_after_fill = blur;
        }
        if patch.file_path.is_some() {
            self.file_path.clone_from(&patch.file_path);
        }
        if patch.locale.is_some() {
            self.locale.clone_from(&patch.locale);
        }
    }
}

/// Partial [`FieldConfig`] keyed by selector in
/// [`AutoFillOptions::custom_fields`](crate::AutoFillOptions)
///
/// Config files cannot carry closures, so they use `value` for a constant;
/// `value_fn` wins when both are set.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldOverride {
    /// Replacement category
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    /// Replacement generator
    #[serde(skip)]
    pub value_fn: Option<ValueFn>,
    /// Constant text value
    pub value: Option<String>,
    /// NUMBER lower bound
    pub min: Option<i64>,
    /// NUMBER upper bound
    pub max: Option<i64>,
    /// SELECT candidates
    pub options: Option<Vec<String>>,
    /// Click after filling
    pub click_after_fill: Option<bool>,
    /// Press Enter after filling
    pub press_enter_after_fill: Option<bool>,
    /// Blur after filling
    pub blur_after_fill: Option<bool>,
    /// File to attach
    pub file_path: Option<PathBuf>,
    /// Locale for this field
    pub locale: Option<String>,
}

impl fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOverride")
            .field("field_type", &self.field_type)
            .field("value_fn", &self.value_fn.as_ref().map(|_| "<fn>"))
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("options", &self.options)
            .field("click_after_fill", &self.click_after_fill)
            .field("press_enter_after_fill", &self.press_enter_after_fill)
            .field("blur_after_fill", &self.blur_after_fill)
            .field("file_path", &self.file_path)
            .field("locale", &self.locale)
            .finish()
    }
}

impl FieldOverride {
    /// Empty override
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the category
    #[must_use]
    pub const fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Override the generator
    #[must_use]
    pub fn value_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> FillResult<FieldValue> + Send + Sync + 'static,
    {
        self.value_fn = Some(Arc::new(f));
        self
    }

    /// Fill a constant
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Override NUMBER bounds
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Override SELECT candidates
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a file
    #[must_use]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Press Enter after filling
    #[must_use]
    pub const fn press_enter_after_fill(mut self, enabled: bool) -> Self {
        self.press_enter_after_fill = Some(enabled);
        self
    }
}
