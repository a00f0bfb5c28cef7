//! Single-pass field discovery.
//!
//! Inputs are scanned first, then dropdowns, then text areas; within a kind,
//! document order. Every emitted descriptor carries a synthesized selector,
//! which is the key for override merging and for the fill result map.

use crate::classifier::{classify, ElementSignals};
use crate::config::AutoFillOptions;
use crate::driver::{ElementHandle, FormDriver};
use crate::field::{FieldConfig, FieldOverride};
use crate::result::FillResult;
use indexmap::IndexMap;
use tracing::{debug, info};

/// Input types that never receive synthetic data
pub const IGNORED_INPUT_TYPES: [&str; 4] = ["hidden", "submit", "button", "reset"];

/// Element kinds, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<input>` other than [`IGNORED_INPUT_TYPES`]
    Input,
    /// `<select>`
    Select,
    /// `<textarea>`
    Textarea,
}

impl ElementKind {
    /// Scan order
    pub const SCAN_ORDER: [Self; 3] = [Self::Input, Self::Select, Self::Textarea];

    /// Tag name
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Select => "select",
            Self::Textarea => "textarea",
        }
    }

    /// Selector for every element of this kind under `form_selector`
    #[must_use]
    pub fn query(self, form_selector: &str) -> String {
        match self {
            Self::Input => {
                let filters: String = IGNORED_INPUT_TYPES
                    .iter()
                    .map(|t| format!(":not([type='{t}'])"))
                    .collect();
                format!("{form_selector} input{filters}")
            }
            Self::Select | Self::Textarea => format!("{form_selector} {}", self.tag()),
        }
    }
}

/// Stable selector for a discovered element: `#id`, else `tag[name="..."]`,
/// else `<form> tag:nth-child(position)` with a 1-based position among every
/// element with that tag under the form
#[must_use]
pub fn synthesize_selector(
    kind: ElementKind,
    form_selector: &str,
    id: Option<&str>,
    name: Option<&str>,
    position: usize,
) -> String {
    if let Some(id) = id {
        return format!("#{}", css_escape(id));
    }
    if let Some(name) = name {
        return format!("{}[name=\"{}\"]", kind.tag(), css_escape(name));
    }
    format!("{form_selector} {}:nth-child({position})", kind.tag())
}

/// Escape an identifier the way the DOM's `CSS.escape` does
#[must_use]
pub fn css_escape(value: &str) -> String {
    if value == "-" {
        return "\\-".to_string();
    }
    let first_is_dash = value.starts_with('-');
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", u32::from(c))),
            '0'..='9' if i == 0 || (i == 1 && first_is_dash) => {
                out.push_str(&format!("\\{:x} ", u32::from(c)));
            }
            c if !c.is_ascii() || c.is_ascii_alphanumeric() || c == '-' || c == '_' => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Discover and classify up to `max_elements` fields under `form_selector`
pub async fn detect<D>(
    driver: &D,
    form_selector: &str,
    exclude_selectors: &[String],
    max_elements: usize,
) -> FillResult<Vec<FieldConfig>>
where
    D: FormDriver + ?Sized,
{
    let mut fields = Vec::new();

    for kind in ElementKind::SCAN_ORDER {
        if fields.len() >= max_elements {
            break;
        }
        let elements = driver.query_selector_all(&kind.query(form_selector)).await?;
        let mut siblings: Option<Vec<ElementHandle>> = None;

        for (index, element) in elements.iter().enumerate() {
            if fields.len() >= max_elements {
                break;
            }
            let signals = read_signals(driver, kind, element).await?;
            let position = if signals.id.is_none() && signals.name.is_none() {
                position_among_tag(driver, form_selector, kind, element, &mut siblings)
                    .await?
                    .unwrap_or(index + 1)
            } else {
                index + 1
            };
            let selector = synthesize_selector(
                kind,
                form_selector,
                signals.id.as_deref(),
                signals.name.as_deref(),
                position,
            );
            if exclude_selectors
                .iter()
                .any(|pattern| selector.contains(pattern.as_str()))
            {
                debug!(%selector, "excluded");
                continue;
            }

            let field_type = classify(&signals);
            debug!(%selector, %field_type, "detected field");
            fields.push(FieldConfig::new(selector, field_type));
        }
    }

    info!(form = form_selector, count = fields.len(), "field detection complete");
    Ok(fields)
}

/// [`detect`] driven by [`AutoFillOptions`], with `custom_fields` merged
pub async fn detect_with_options<D>(
    driver: &D,
    options: &AutoFillOptions,
) -> FillResult<Vec<FieldConfig>>
where
    D: FormDriver + ?Sized,
{
    let mut fields = detect(
        driver,
        &options.form_selector,
        &options.exclude_selectors,
        options.max_elements,
    )
    .await?;
    merge_custom_fields(&mut fields, &options.custom_fields);
    Ok(fields)
}

/// Shallow-merge overrides onto fields whose selector matches exactly
pub fn merge_custom_fields(fields: &mut [FieldConfig], custom: &IndexMap<String, FieldOverride>) {
    if custom.is_empty() {
        return;
    }
    for field in fields.iter_mut() {
        let Some(patch) = field.selector().and_then(|s| custom.get(s)) else {
            continue;
        };
        field.apply_override(patch);
        debug!(selector = ?field.selector(), field_type = %field.field_type, "applied override");
    }
}

/// 1-based position of `element` among every `kind` element under the form,
/// ignored input types included, so `nth-child` resolves back to it
async fn position_among_tag<D>(
    driver: &D,
    form_selector: &str,
    kind: ElementKind,
    element: &ElementHandle,
    siblings: &mut Option<Vec<ElementHandle>>,
) -> FillResult<Option<usize>>
where
    D: FormDriver + ?Sized,
{
    if siblings.is_none() {
        let all = driver
            .query_selector_all(&format!("{form_selector} {}", kind.tag()))
            .await?;
        *siblings = Some(all);
    }
    Ok(siblings
        .as_deref()
        .and_then(|all| all.iter().position(|h| h.id == element.id))
        .map(|i| i + 1))
}

async fn read_signals<D>(
    driver: &D,
    kind: ElementKind,
    element: &ElementHandle,
) -> FillResult<ElementSignals>
where
    D: FormDriver + ?Sized,
{
    Ok(ElementSignals {
        tag: kind.tag().to_string(),
        name: attribute(driver, element, "name").await?,
        id: attribute(driver, element, "id").await?,
        declared_type: attribute(driver, element, "type").await?,
        placeholder: attribute(driver, element, "placeholder").await?,
        aria_label: attribute(driver, element, "aria-label").await?,
        label: non_empty(driver.label_text(element).await?),
    })
}

async fn attribute<D>(driver: &D, element: &ElementHandle, name: &str) -> FillResult<Option<String>>
where
    D: FormDriver + ?Sized,
{
    Ok(non_empty(driver.attribute(element, name).await?))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::field::FieldType;

    fn signup_form() -> MockDriver {
        MockDriver::new()
            .with_element(MockElement::input("text").name("first_name"))
            .with_element(MockElement::input("email").id("email"))
            .with_element(MockElement::input("hidden").name("csrf"))
            .with_element(MockElement::input("submit").id("go"))
            .with_element(MockElement::input("text").attr("placeholder", "ZIP code"))
            .with_element(MockElement::select().id("country").option("US"))
            .with_element(MockElement::textarea().name("bio").label("About you"))
            .with_element(MockElement::input("text").id("captcha"))
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_id_preferred() {
            let s = synthesize_selector(ElementKind::Input, "form", Some("a"), Some("b"), 1);
            assert_eq!(s, "#a");
        }

        #[test]
        fn test_name_second() {
            let s = synthesize_selector(ElementKind::Select, "form", None, Some("b"), 1);
            assert_eq!(s, "select[name=\"b\"]");
        }

        #[test]
        fn test_positional_fallback() {
            let s = synthesize_selector(ElementKind::Textarea, "#f", None, None, 3);
            assert_eq!(s, "#f textarea:nth-child(3)");
        }

        #[test]
        fn test_escapes_ids_and_names() {
            let s = synthesize_selector(ElementKind::Input, "form", Some("1st.item:x"), None, 1);
            assert_eq!(s, r"#\31 st\.item\:x");
            let s = synthesize_selector(ElementKind::Input, "form", None, Some("say \"hi\""), 1);
            assert_eq!(s, r#"input[name="say\ \"hi\""]"#);
        }

        #[test]
        fn test_css_escape_edge_cases() {
            assert_eq!(css_escape("email"), "email");
            assert_eq!(css_escape("user_name-2"), "user_name-2");
            assert_eq!(css_escape("-"), r"\-");
            assert_eq!(css_escape("-9lives"), r"-\39 lives");
            assert_eq!(css_escape("a\tb"), r"a\9 b");
            assert_eq!(css_escape("名前"), "名前");
        }

        #[test]
        fn test_input_query_excludes_buttons() {
            let q = ElementKind::Input.query("form");
            for t in IGNORED_INPUT_TYPES {
                assert!(q.contains(&format!(":not([type='{t}'])")));
            }
            assert_eq!(ElementKind::Select.query("#f"), "#f select");
        }
    }

    mod detect_tests {
        use super::*;

        #[tokio::test]
        async fn test_detects_in_kind_order() {
            let driver = signup_form();
            let fields = detect(&driver, "form", &[], 50).await.unwrap();
            let summary: Vec<(Option<&str>, FieldType)> =
                fields.iter().map(|f| (f.selector(), f.field_type)).collect();
            assert_eq!(
                summary,
                vec![
                    (Some("input[name=\"first_name\"]"), FieldType::Name),
                    (Some("#email"), FieldType::Email),
                    (Some("form input:nth-child(5)"), FieldType::Zip),
                    (Some("#captcha"), FieldType::Text),
                    (Some("#country"), FieldType::Select),
                    (Some("textarea[name=\"bio\"]"), FieldType::Textarea),
                ]
            );
        }

        #[tokio::test]
        async fn test_selectors_resolve_to_detected_elements() {
            let driver = signup_form()
                .with_element(MockElement::input("text").id("2fa.code"))
                .with_element(MockElement::input("text").name("nick name"));
            let fields = detect(&driver, "form", &[], 50).await.unwrap();
            let expected = ["mock-0", "mock-1", "mock-4", "mock-7", "mock-8", "mock-9"];
            for (field, id) in fields.iter().zip(expected) {
                let selector = field.selector().unwrap();
                let found = driver.query_selector(selector).await.unwrap().unwrap();
                assert_eq!(found.id, id, "{selector}");
            }
        }

        #[tokio::test]
        async fn test_exclusions_do_not_consume_budget() {
            let driver = signup_form();
            let exclude = vec!["#captcha".to_string(), "first_name".to_string()];
            let fields = detect(&driver, "form", &exclude, 3).await.unwrap();
            let selectors: Vec<_> = fields.iter().filter_map(|f| f.selector()).collect();
            assert_eq!(
                selectors,
                vec!["#email", "form input:nth-child(5)", "#country"]
            );
        }

        #[tokio::test]
        async fn test_max_elements_is_global() {
            let driver = signup_form();
            let fields = detect(&driver, "form", &[], 2).await.unwrap();
            assert_eq!(fields.len(), 2);
            assert!(!driver.was_called("query_selector_all:form select"));
        }

        #[tokio::test]
        async fn test_zero_budget_queries_nothing() {
            let driver = signup_form();
            let fields = detect(&driver, "form", &[], 0).await.unwrap();
            assert!(fields.is_empty());
            assert!(driver.history().is_empty());
        }

        #[tokio::test]
        async fn test_scoped_to_form() {
            let driver = signup_form()
                .with_element(MockElement::input("email").id("newsletter").in_form("#footer"));
            let fields = detect(&driver, "#footer", &[], 50).await.unwrap();
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].selector(), Some("#newsletter"));
        }

        #[tokio::test]
        async fn test_empty_id_ignored() {
            let driver = MockDriver::new()
                .with_element(MockElement::input("text").id("").name("city"));
            let fields = detect(&driver, "form", &[], 50).await.unwrap();
            assert_eq!(fields[0].selector(), Some("input[name=\"city\"]"));
            assert_eq!(fields[0].field_type, FieldType::City);
        }
    }

    mod merge_tests {
        use super::*;

        #[tokio::test]
        async fn test_custom_fields_merged_by_exact_selector() {
            let driver = signup_form();
            let options = AutoFillOptions::new()
                .with_custom_field("#captcha", FieldOverride::new().value("1234"))
                .with_custom_field("#country", FieldOverride::new().options(["US"]))
                .with_custom_field("captcha", FieldOverride::new().field_type(FieldType::Email));
            let fields = detect_with_options(&driver, &options).await.unwrap();

            let captcha = fields.iter().find(|f| f.selector() == Some("#captcha")).unwrap();
            assert_eq!(captcha.field_type, FieldType::Text);
            assert!(captcha.value_fn.is_some());

            let country = fields.iter().find(|f| f.selector() == Some("#country")).unwrap();
            assert_eq!(country.options.as_deref(), Some(&["US".to_string()][..]));
        }
    }
}
