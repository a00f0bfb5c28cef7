//! Fill orchestration.
//!
//! [`FormFiller`] drives three flows over a [`FormDriver`]:
//!
//! - [`FormFiller::fill_field`]: one descriptor
//! - [`FormFiller::fill_form`]: an explicit list, strictly in order
//! - [`FormFiller::auto_fill_form`]: scan, merge overrides, fill, optionally submit
//!
//! Every call resolves its own [`Locale`] (field, then call, then the
//! filler's default) and builds a fresh [`ValueGenerator`] for it. The
//! filler's default locale never changes during a fill.

use crate::config::AutoFillOptions;
use crate::driver::{ElementHandle, FormDriver};
use crate::field::{FieldConfig, FieldTarget, FieldType, FieldValue};
use crate::generator::{Locale, ValueGenerator};
use crate::result::{FillError, FillResult};
use crate::scanner;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Values written by a fill, keyed by selector or `field-<n>`, in fill order
pub type FillReport = IndexMap<String, FieldValue>;

/// How a live element receives a value
///
/// Derived from the element's runtime tag and `type`, never from the
/// semantic [`FieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Anything that takes typed text
    TextLike,
    /// `<select>`
    Selectable,
    /// Checkbox or radio
    Toggle,
    /// File input
    File,
}

impl ControlKind {
    /// Classify a live element by tag and declared `type`
    #[must_use]
    pub fn from_element(tag: &str, declared_type: Option<&str>) -> Self {
        if tag.eq_ignore_ascii_case("select") {
            return Self::Selectable;
        }
        if !tag.eq_ignore_ascii_case("input") {
            return Self::TextLike;
        }
        match declared_type.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("checkbox" | "radio") => Self::Toggle,
            Some("file") => Self::File,
            _ => Self::TextLike,
        }
    }
}

/// Fills forms through a [`FormDriver`]
#[derive(Debug)]
pub struct FormFiller<D> {
    driver: D,
    locale: Locale,
}

impl<D: FormDriver> FormFiller<D> {
    /// Filler generating English data by default
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            locale: Locale::default(),
        }
    }

    /// Set the default locale
    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Default locale
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Borrow the driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Take the driver back
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Fill one field and return the value written
    pub async fn fill_field(&self, config: &FieldConfig) -> FillResult<FieldValue> {
        self.fill_field_in(config, None).await
    }

    /// Fill `configs` in order
    ///
    /// Stops at the first error; fields filled before it stay filled.
    pub async fn fill_form(&self, configs: &[FieldConfig]) -> FillResult<FillReport> {
        self.fill_form_in(configs, None).await
    }

    /// Discover fields under `options.form_selector` with overrides merged
    pub async fn detect_fields(&self, options: &AutoFillOptions) -> FillResult<Vec<FieldConfig>> {
        scanner::detect_with_options(&self.driver, options).await
    }

    /// Scan, fill and optionally submit
    pub async fn auto_fill_form(&self, options: &AutoFillOptions) -> FillResult<FillReport> {
        let call_locale = options
            .locale
            .as_deref()
            .map(str::parse::<Locale>)
            .transpose()?;

        let fields = self.detect_fields(options).await?;
        let report = self.fill_form_in(&fields, call_locale).await?;

        if options.submit_after_fill {
            self.submit(&options.submit_selector, fields.last(), &report)
                .await?;
        }

        info!(
            form = %options.form_selector,
            filled = report.len(),
            submitted = options.submit_after_fill,
            "auto-fill complete"
        );
        Ok(report)
    }

    /// Write `value` into `element` by its live control kind, then run the
    /// requested post actions (click, Enter, blur)
    pub async fn apply_value(
        &self,
        element: &ElementHandle,
        config: &FieldConfig,
        value: &FieldValue,
    ) -> FillResult<()> {
        let declared = if element.tag_name.eq_ignore_ascii_case("input") {
            self.driver.attribute(element, "type").await?
        } else {
            None
        };
        let kind = ControlKind::from_element(&element.tag_name, declared.as_deref());

        match (kind, value, config.file_path.as_deref()) {
            (ControlKind::Selectable, FieldValue::Text(option), _) => {
                self.driver.select_option(element, option).await?;
            }
            (ControlKind::Toggle, FieldValue::Bool(true), _) => self.driver.check(element).await?,
            (ControlKind::Toggle, FieldValue::Bool(false), _) => {
                self.driver.uncheck(element).await?;
            }
            (ControlKind::Toggle, _, _) => {
                debug!(element = %element.id, %value, "non-boolean value for toggle, left as is");
            }
            (ControlKind::File, _, Some(path)) => {
                self.driver.set_input_files(element, path).await?;
            }
            _ => self.driver.fill(element, &value.to_string()).await?,
        }

        if config.click_after_fill {
            self.driver.click(element).await?;
        }
        if config.press_enter_after_fill {
            self.driver.press_key(element, "Enter").await?;
        }
        if config.blur_after_fill {
            self.driver.blur(element).await?;
        }
        Ok(())
    }

    async fn fill_form_in(
        &self,
        configs: &[FieldConfig],
        call_locale: Option<Locale>,
    ) -> FillResult<FillReport> {
        let mut report = FillReport::new();
        for config in configs {
            let value = self.fill_field_in(config, call_locale).await?;
            let key = match config.selector() {
                Some(selector) => selector.to_string(),
                None => format!("field-{}", report.len()),
            };
            let _ = report.insert(key, value);
        }
        Ok(report)
    }

    async fn fill_field_in(
        &self,
        config: &FieldConfig,
        call_locale: Option<Locale>,
    ) -> FillResult<FieldValue> {
        let locale = self.resolve_locale(config, call_locale)?;
        let element = self.resolve_element(config).await?;

        let live_options = if needs_live_options(config) {
            self.driver.option_values(&element).await?
        } else {
            Vec::new()
        };
        let value =
            ValueGenerator::new(locale).generate_with_options(config, &live_options)?;

        self.apply_value(&element, config, &value).await?;
        debug!(
            field = ?config.target,
            field_type = %config.field_type,
            %locale,
            %value,
            "filled field"
        );
        Ok(value)
    }

    fn resolve_locale(
        &self,
        config: &FieldConfig,
        call_locale: Option<Locale>,
    ) -> FillResult<Locale> {
        let field_locale = config
            .locale
            .as_deref()
            .map(str::parse::<Locale>)
            .transpose()?;
        Ok(field_locale.or(call_locale).unwrap_or(self.locale))
    }

    async fn resolve_element(&self, config: &FieldConfig) -> FillResult<ElementHandle> {
        match &config.target {
            FieldTarget::Element(handle) => Ok(handle.clone()),
            FieldTarget::Selector(selector) => self
                .driver
                .query_selector(selector)
                .await?
                .ok_or_else(|| FillError::element_not_found(selector)),
        }
    }

    async fn submit(
        &self,
        submit_selector: &str,
        last: Option<&FieldConfig>,
        report: &FillReport,
    ) -> FillResult<()> {
        if let Some(button) = self.driver.query_selector(submit_selector).await? {
            if self.driver.is_visible(&button).await? {
                debug!(selector = submit_selector, "clicking submit");
                return self.driver.click(&button).await;
            }
        }

        let Some(last) = last.filter(|_| !report.is_empty()) else {
            debug!(selector = submit_selector, "no submit control and nothing filled");
            return Ok(());
        };
        let element = self.resolve_element(last).await?;
        warn!(
            selector = submit_selector,
            field = ?last.target,
            "submit control missing or hidden, pressing Enter in last field"
        );
        self.driver.press_key(&element, "Enter").await
    }
}

fn needs_live_options(config: &FieldConfig) -> bool {
    config.field_type == FieldType::Select
        && config.value_fn.is_none()
        && config.options.as_ref().map_or(true, Vec::is_empty)
}
