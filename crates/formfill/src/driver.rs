//! FormDriver - Abstract Browser Automation Trait
//!
//! Everything the fill engine needs from a browser goes through [`FormDriver`]:
//! element lookup and enumeration, attribute and label introspection, and the
//! handful of interactions a form control can receive.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  FormDriver (Abstract Trait)                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐     │
//! │  │  ChromiumDriver     │        │  MockDriver         │     │
//! │  │  (feature=browser)  │        │  (in-memory DOM)    │     │
//! │  │  CDP via            │        │  records every call │     │
//! │  │  chromiumoxide      │        │  for verification   │     │
//! │  └─────────────────────┘        └─────────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::result::{FillError, FillResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier for the element
    pub id: String,
    /// Lowercase element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into().to_ascii_lowercase(),
        }
    }
}

/// Browser configuration for driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Executable path override
    pub executable_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            sandbox: true,
            navigation_timeout: Duration::from_secs(30),
            executable_path: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the browser executable
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

/// Abstract driver trait for browser automation
///
/// Every method suspends until the browser acknowledges the operation.
/// Failures are reported as [`FillError`] and never retried by callers.
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// First element matching `selector`, if any
    async fn query_selector(&self, selector: &str) -> FillResult<Option<ElementHandle>>;

    /// All elements matching `selector`, in document order
    async fn query_selector_all(&self, selector: &str) -> FillResult<Vec<ElementHandle>>;

    /// Read an attribute
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> FillResult<Option<String>>;

    /// Text of the element's associated `<label>`
    async fn label_text(&self, element: &ElementHandle) -> FillResult<Option<String>>;

    /// Values of enabled, non-empty `<option>`s of a dropdown
    async fn option_values(&self, element: &ElementHandle) -> FillResult<Vec<String>>;

    /// Replace the element's value with `text`
    async fn fill(&self, element: &ElementHandle, text: &str) -> FillResult<()>;

    /// Check a checkbox or radio
    async fn check(&self, element: &ElementHandle) -> FillResult<()>;

    /// Uncheck a checkbox or radio
    async fn uncheck(&self, element: &ElementHandle) -> FillResult<()>;

    /// Select the dropdown option with the given value
    async fn select_option(&self, element: &ElementHandle, value: &str) -> FillResult<()>;

    /// Attach a file to a file input
    async fn set_input_files(&self, element: &ElementHandle, path: &Path) -> FillResult<()>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> FillResult<()>;

    /// Press a key (e.g. "Enter") with the element focused
    async fn press_key(&self, element: &ElementHandle, key: &str) -> FillResult<()>;

    /// Remove focus from the element
    async fn blur(&self, element: &ElementHandle) -> FillResult<()>;

    /// Whether the element is rendered and visible
    async fn is_visible(&self, element: &ElementHandle) -> FillResult<bool>;
}

/// One `<option>` of a mock dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOption {
    /// Option value
    pub value: String,
    /// Disabled options are not offered to the generator
    pub disabled: bool,
}

/// In-memory element for [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Selector of the form the element lives in
    pub form: String,
    /// Lowercase tag name
    pub tag: String,
    /// Attributes (name, id, type, placeholder, aria-label, ...)
    pub attributes: BTreeMap<String, String>,
    /// Text of the associated label
    pub label: Option<String>,
    /// Dropdown options
    pub options: Vec<MockOption>,
    /// Visibility
    pub visible: bool,
    /// Fail every interaction (simulates a detached element)
    pub detached: bool,
    /// Current value
    pub value: String,
    /// Current checked state
    pub checked: bool,
    /// Attached files
    pub files: Vec<PathBuf>,
}

impl MockElement {
    /// Create an element inside the default `form`
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            form: "form".to_string(),
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            label: None,
            options: Vec::new(),
            visible: true,
            detached: false,
            value: String::new(),
            checked: false,
            files: Vec::new(),
        }
    }

    /// `<input type="...">`
    #[must_use]
    pub fn input(input_type: &str) -> Self {
        Self::new("input").attr("type", input_type)
    }

    /// `<select>`
    #[must_use]
    pub fn select() -> Self {
        Self::new("select")
    }

    /// `<textarea>`
    #[must_use]
    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set the `name` attribute
    #[must_use]
    pub fn name(self, name: &str) -> Self {
        self.attr("name", name)
    }

    /// Set the label text
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Add an enabled option
    #[must_use]
    pub fn option(mut self, value: &str) -> Self {
        self.options.push(MockOption {
            value: value.to_string(),
            disabled: false,
        });
        self
    }

    /// Add a disabled option
    #[must_use]
    pub fn disabled_option(mut self, value: &str) -> Self {
        self.options.push(MockOption {
            value: value.to_string(),
            disabled: true,
        });
        self
    }

    /// Place the element in another form
    #[must_use]
    pub fn in_form(mut self, form: &str) -> Self {
        self.form = form.to_string();
        self
    }

    /// Mark the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Make every interaction with the element fail
    #[must_use]
    pub const fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parsed form of the simple selectors the engine and tests use:
/// `[scope ]compound` where compound is `tag#id[attr='v']:nth-child(n):not([type='x'])`.
#[derive(Debug, Default)]
struct SimpleSelector {
    scope: Option<String>,
    tag: Option<String>,
    id: Option<String>,
    attrs: Vec<(String, String)>,
    excluded_types: Vec<String>,
    nth_child: Option<usize>,
}

impl SimpleSelector {
    fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        let (scope, compound) = match rfind_top_level(selector, ' ') {
            Some(split) => (
                Some(selector[..split].trim().to_string()),
                &selector[split + 1..],
            ),
            None => (None, selector),
        };
        let mut parsed = Self {
            scope,
            ..Self::default()
        };

        let (tag, mut rest) = read_ident(compound);
        if !tag.is_empty() {
            parsed.tag = Some(tag.to_ascii_lowercase());
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('#') {
                let (id, tail) = read_ident(after);
                parsed.id = Some(id);
                rest = tail;
            } else if let Some(after) = rest.strip_prefix(":not(") {
                let end = find_top_level(after, ')').unwrap_or(after.len());
                if let Some((key, value)) = parse_attr(&after[..end]) {
                    if key == "type" {
                        parsed.excluded_types.push(value);
                    }
                }
                rest = after.get(end + 1..).unwrap_or("");
            } else if let Some(after) = rest.strip_prefix(":nth-child(") {
                let end = find_top_level(after, ')').unwrap_or(after.len());
                parsed.nth_child = after[..end].trim().parse().ok();
                rest = after.get(end + 1..).unwrap_or("");
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = find_top_level(after, ']').unwrap_or(after.len());
                if let Some(pair) = parse_attr(&after[..end]) {
                    parsed.attrs.push(pair);
                }
                rest = after.get(end + 1..).unwrap_or("");
            } else {
                break;
            }
        }
        parsed
    }

    fn matches(&self, element: &MockElement) -> bool {
        if let Some(scope) = &self.scope {
            if scope != &element.form {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if tag != "*" && tag != &element.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.get("id") != Some(id.as_str()) {
                return false;
            }
        }
        let element_type = element.get("type").unwrap_or("text");
        if self.excluded_types.iter().any(|t| t == element_type) {
            return false;
        }
        self.attrs.iter().all(|(key, value)| {
            let actual = if key == "type" && element.tag == "input" {
                Some(element_type)
            } else {
                element.get(key)
            };
            actual == Some(value.as_str())
        })
    }
}

/// `key='value'`, `key="value"` or `key=value` to an unescaped pair
fn parse_attr(raw: &str) -> Option<(String, String)> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let split = find_top_level(inner, '=')?;
    let key = inner[..split].trim().to_string();
    let value = inner[split + 1..].trim();
    let value = match value.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let body = &value[1..];
            let end = find_unescaped(body, quote).unwrap_or(body.len());
            unescape(&body[..end])
        }
        _ => unescape(value),
    };
    Some((key, value))
}

/// Byte offset of the first `target` outside quotes, brackets and parens
fn find_top_level(s: &str, target: char) -> Option<usize> {
    scan_top_level(s, target).first().copied()
}

/// Byte offset of the last `target` outside quotes, brackets and parens
fn rfind_top_level(s: &str, target: char) -> Option<usize> {
    scan_top_level(s, target).last().copied()
}

fn scan_top_level(s: &str, target: char) -> Vec<usize> {
    let mut hits = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            skip_escape(&mut chars);
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if depth == 0 && c == target {
            hits.push(i);
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    hits
}

/// Consume the body of an escape whose backslash was just read
fn skip_escape(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) {
    let mut digits = 0;
    while digits < 6 && chars.peek().is_some_and(|&(_, h)| h.is_ascii_hexdigit()) {
        let _ = chars.next();
        digits += 1;
    }
    if digits == 0 {
        let _ = chars.next();
    } else if chars.peek().is_some_and(|&(_, c)| c == ' ') {
        let _ = chars.next();
    }
}

fn find_unescaped(s: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    s.char_indices().find_map(|(i, c)| {
        if escaped {
            escaped = false;
            None
        } else if c == '\\' {
            escaped = true;
            None
        } else if c == target {
            Some(i)
        } else {
            None
        }
    })
}

/// Leading identifier (tag or id) with CSS escapes resolved, and the rest
fn read_ident(s: &str) -> (String, &str) {
    let end = s
        .char_indices()
        .scan(false, |escaped, (i, c)| {
            let stop = !*escaped && matches!(c, '#' | '[' | ':' | '.');
            *escaped = !*escaped && c == '\\';
            Some((i, stop))
        })
        .find(|&(_, stop)| stop)
        .map_or(s.len(), |(i, _)| i);
    (unescape(&s[..end]), &s[end..])
}

/// Resolve CSS escapes: `\\` + 1-6 hex digits (plus one optional space), or
/// `\\` + any other character
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    let _ = chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        if chars.peek() == Some(&' ') {
            let _ = chars.next();
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
        out.push(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'));
    }
    out
}

#[derive(Debug, Default)]
struct MockState {
    elements: Vec<MockElement>,
    call_history: Vec<String>,
}

/// Mock driver for unit testing
///
/// Holds an in-memory DOM and records every call (`"fill:mock-0=abc"`) so
/// tests can assert on interaction order.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock element, returning its handle
    pub fn add_element(&self, element: MockElement) -> ElementHandle {
        let mut state = self.lock();
        let handle = ElementHandle::new(format!("mock-{}", state.elements.len()), &element.tag);
        state.elements.push(element);
        handle
    }

    /// Builder form of [`Self::add_element`]
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        let _ = self.add_element(element);
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Snapshot of the element a handle refers to
    #[must_use]
    pub fn element(&self, handle: &ElementHandle) -> Option<MockElement> {
        let state = self.lock();
        index_of(handle).and_then(|i| state.elements.get(i).cloned())
    }

    /// Snapshot of the first element matching `selector`
    #[must_use]
    pub fn find(&self, selector: &str) -> Option<MockElement> {
        let state = self.lock();
        let parsed = SimpleSelector::parse(selector);
        matching(&state.elements, &parsed).first().map(|&i| state.elements[i].clone())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.lock().call_history.push(call);
    }

    /// Apply `f` to a live element, failing like a browser would on detached nodes
    fn with_element_mut<T>(
        &self,
        action: &str,
        handle: &ElementHandle,
        f: impl FnOnce(&mut MockElement) -> FillResult<T>,
    ) -> FillResult<T> {
        let mut state = self.lock();
        let element = index_of(handle)
            .and_then(|i| state.elements.get_mut(i))
            .ok_or_else(|| FillError::interaction(action, format!("unknown handle {}", handle.id)))?;
        if element.detached {
            return Err(FillError::interaction(
                action,
                "element is not attached to the DOM",
            ));
        }
        f(element)
    }
}

fn index_of(handle: &ElementHandle) -> Option<usize> {
    handle.id.strip_prefix("mock-")?.parse().ok()
}

fn handle_for(index: usize, element: &MockElement) -> ElementHandle {
    ElementHandle::new(format!("mock-{index}"), &element.tag)
}

fn matching(elements: &[MockElement], selector: &SimpleSelector) -> Vec<usize> {
    let all: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| selector.matches(e))
        .map(|(i, _)| i)
        .collect();
    match selector.nth_child {
        Some(n) if n >= 1 => all.get(n - 1).map(|&i| vec![i]).unwrap_or_default(),
        Some(_) => Vec::new(),
        None => all,
    }
}

#[async_trait]
impl FormDriver for MockDriver {
    async fn query_selector(&self, selector: &str) -> FillResult<Option<ElementHandle>> {
        self.record(format!("query_selector:{selector}"));
        let state = self.lock();
        let parsed = SimpleSelector::parse(selector);
        Ok(matching(&state.elements, &parsed)
            .first()
            .map(|&i| handle_for(i, &state.elements[i])))
    }

    async fn query_selector_all(&self, selector: &str) -> FillResult<Vec<ElementHandle>> {
        self.record(format!("query_selector_all:{selector}"));
        let state = self.lock();
        let parsed = SimpleSelector::parse(selector);
        Ok(matching(&state.elements, &parsed)
            .into_iter()
            .map(|i| handle_for(i, &state.elements[i]))
            .collect())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> FillResult<Option<String>> {
        self.record(format!("attribute:{}:{name}", element.id));
        self.with_element_mut("attribute", element, |e| Ok(e.get(name).map(str::to_string)))
    }

    async fn label_text(&self, element: &ElementHandle) -> FillResult<Option<String>> {
        self.record(format!("label_text:{}", element.id));
        self.with_element_mut("label_text", element, |e| Ok(e.label.clone()))
    }

    async fn option_values(&self, element: &ElementHandle) -> FillResult<Vec<String>> {
        self.record(format!("option_values:{}", element.id));
        self.with_element_mut("option_values", element, |e| {
            Ok(e.options
                .iter()
                .filter(|o| !o.disabled && !o.value.is_empty())
                .map(|o| o.value.clone())
                .collect())
        })
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> FillResult<()> {
        self.record(format!("fill:{}={text}", element.id));
        self.with_element_mut("fill", element, |e| {
            e.value = text.to_string();
            Ok(())
        })
    }

    async fn check(&self, element: &ElementHandle) -> FillResult<()> {
        self.record(format!("check:{}", element.id));
        self.with_element_mut("check", element, |e| {
            e.checked = true;
            Ok(())
        })
    }

    async fn uncheck(&self, element: &ElementHandle) -> FillResult<()> {
        self.record(format!("uncheck:{}", element.id));
        self.with_element_mut("uncheck", element, |e| {
            e.checked = false;
            Ok(())
        })
    }

    async fn select_option(&self, element: &ElementHandle, value: &str) -> FillResult<()> {
        self.record(format!("select_option:{}={value}", element.id));
        self.with_element_mut("select_option", element, |e| {
            if !e.options.is_empty() && !e.options.iter().any(|o| o.value == value) {
                return Err(FillError::interaction(
                    "select_option",
                    format!("no option with value '{value}'"),
                ));
            }
            e.value = value.to_string();
            Ok(())
        })
    }

    async fn set_input_files(&self, element: &ElementHandle, path: &Path) -> FillResult<()> {
        self.record(format!("set_input_files:{}={}", element.id, path.display()));
        self.with_element_mut("set_input_files", element, |e| {
            e.files = vec![path.to_path_buf()];
            Ok(())
        })
    }

    async fn click(&self, element: &ElementHandle) -> FillResult<()> {
        self.record(format!("click:{}", element.id));
        self.with_element_mut("click", element, |_| Ok(()))
    }

    async fn press_key(&self, element: &ElementHandle, key: &str) -> FillResult<()> {
        self.record(format!("press_key:{}={key}", element.id));
        self.with_element_mut("press_key", element, |_| Ok(()))
    }

    async fn blur(&self, element: &ElementHandle) -> FillResult<()> {
        self.record(format!("blur:{}", element.id));
        self.with_element_mut("blur", element, |_| Ok(()))
    }

    async fn is_visible(&self, element: &ElementHandle) -> FillResult<bool> {
        self.record(format!("is_visible:{}", element.id));
        self.with_element_mut("is_visible", element, |e| Ok(e.visible))
    }
}
