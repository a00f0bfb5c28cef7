//! Field classification from noisy element signals.
//!
//! Rules run in strict priority order and the first decisive one wins:
//!
//! 1. `<select>` is [`FieldType::Select`], `<textarea>` is [`FieldType::Textarea`]
//! 2. a declared `type` found in [`TYPE_RULES`]
//! 3. the first [`KEYWORD_RULES`] entry contained in name, then id, then
//!    placeholder, then aria-label, then label text; a signal no keyword is
//!    contained in may still match a [`WORD_RULES`] entry as a whole word
//! 4. [`FieldType::Text`]
//!
//! The tables are ordered data; within one signal the earliest matching
//! keyword wins, so specific keys are listed before general ones.

use crate::field::FieldType;

/// Exact (case-insensitive) `type` attribute matches
pub const TYPE_RULES: &[(&str, FieldType)] = &[
    ("email", FieldType::Email),
    ("password", FieldType::Password),
    ("tel", FieldType::Phone),
    ("number", FieldType::Number),
    ("range", FieldType::Number),
    ("date", FieldType::Date),
    ("checkbox", FieldType::Checkbox),
    ("radio", FieldType::Radio),
    ("file", FieldType::File),
    ("url", FieldType::Url),
];

/// Substring matches against free-text signals, most specific first
pub const KEYWORD_RULES: &[(&str, FieldType)] = &[
    ("email", FieldType::Email),
    ("e-mail", FieldType::Email),
    ("password", FieldType::Password),
    ("passwd", FieldType::Password),
    ("pwd", FieldType::Password),
    ("mobile", FieldType::Phone),
    ("phone", FieldType::Phone),
    ("tel", FieldType::Phone),
    ("zip", FieldType::Zip),
    ("postal", FieldType::Zip),
    ("postcode", FieldType::Zip),
    ("company", FieldType::Company),
    ("organization", FieldType::Company),
    ("organisation", FieldType::Company),
    ("business", FieldType::Company),
    ("country", FieldType::Country),
    ("city", FieldType::City),
    ("town", FieldType::City),
    ("state", FieldType::State),
    ("province", FieldType::State),
    ("region", FieldType::State),
    ("street", FieldType::Address),
    ("address", FieldType::Address),
    ("addr", FieldType::Address),
    ("website", FieldType::Url),
    ("homepage", FieldType::Url),
    ("url", FieldType::Url),
    ("web", FieldType::Url),
    ("comment", FieldType::Textarea),
    ("message", FieldType::Textarea),
    ("description", FieldType::Textarea),
    ("notes", FieldType::Textarea),
    ("birth", FieldType::Date),
    ("dob", FieldType::Date),
    ("date", FieldType::Date),
    ("quantity", FieldType::Number),
    ("amount", FieldType::Number),
    ("first-name", FieldType::Name),
    ("first_name", FieldType::Name),
    ("firstname", FieldType::Name),
    ("last-name", FieldType::Name),
    ("last_name", FieldType::Name),
    ("lastname", FieldType::Name),
    ("full-name", FieldType::Name),
    ("fullname", FieldType::Name),
    ("name", FieldType::Name),
];

/// Keys too short to search as substrings (`age` sits inside `page` and
/// `manager`); these match only a whole word of the signal
pub const WORD_RULES: &[(&str, FieldType)] = &[
    ("age", FieldType::Number),
    ("qty", FieldType::Number),
];

/// Everything the classifier can observe about one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSignals {
    /// Tag name
    pub tag: String,
    /// Declared `type` attribute
    pub declared_type: Option<String>,
    /// `name` attribute
    pub name: Option<String>,
    /// `id` attribute
    pub id: Option<String>,
    /// `placeholder` attribute
    pub placeholder: Option<String>,
    /// `aria-label` attribute
    pub aria_label: Option<String>,
    /// Associated label text
    pub label: Option<String>,
}

impl ElementSignals {
    /// Signals for an element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the declared type
    #[must_use]
    pub fn declared_type(mut self, value: impl Into<String>) -> Self {
        self.declared_type = Some(value.into());
        self
    }

    /// Set the name attribute
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    /// Set the id attribute
    #[must_use]
    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    /// Set the placeholder
    #[must_use]
    pub fn placeholder(mut self, value: impl Into<String>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    /// Set the aria-label
    #[must_use]
    pub fn aria_label(mut self, value: impl Into<String>) -> Self {
        self.aria_label = Some(value.into());
        self
    }

    /// Set the label text
    #[must_use]
    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(value.into());
        self
    }

    /// Free-text signals in confidence order
    fn text_signals(&self) -> [Option<&str>; 5] {
        [
            self.name.as_deref(),
            self.id.as_deref(),
            self.placeholder.as_deref(),
            self.aria_label.as_deref(),
            self.label.as_deref(),
        ]
    }
}

/// Classify one element
#[must_use]
pub fn classify(signals: &ElementSignals) -> FieldType {
    let tag = signals.tag.to_ascii_lowercase();
    if tag == "select" {
        return FieldType::Select;
    }
    if tag == "textarea" {
        return FieldType::Textarea;
    }

    if let Some(field_type) = signals.declared_type.as_deref().and_then(match_type) {
        return field_type;
    }

    signals
        .text_signals()
        .into_iter()
        .flatten()
        .find_map(|signal| match_keyword(signal).or_else(|| match_word(signal)))
        .unwrap_or(FieldType::Text)
}

/// Look up a declared `type` attribute
#[must_use]
pub fn match_type(declared: &str) -> Option<FieldType> {
    let declared = declared.trim();
    TYPE_RULES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(declared))
        .map(|&(_, field_type)| field_type)
}

/// First keyword rule contained in `text`
#[must_use]
pub fn match_keyword(text: &str) -> Option<FieldType> {
    let text = text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(key, _)| text.contains(key))
        .map(|&(_, field_type)| field_type)
}

/// First word rule equal to a whole word of `text`
///
/// Words are split on anything that is not a letter or digit.
#[must_use]
pub fn match_word(text: &str) -> Option<FieldType> {
    let text = text.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    WORD_RULES
        .iter()
        .find(|(key, _)| words.contains(key))
        .map(|&(_, field_type)| field_type)
}
