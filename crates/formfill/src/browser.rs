//! Chromium-backed [`FormDriver`] over CDP.
//!
//! Elements found by selector are kept in a registry keyed by their CDP
//! backend node id, so finding the same node again reuses its entry and the
//! [`ElementHandle`] ids stay stable within a page. The registry is cleared on
//! every navigation.

use crate::driver::{DriverConfig, ElementHandle, FormDriver};
use crate::result::{FillError, FillResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

const TAG_NAME_JS: &str = "function() { return this.tagName.toLowerCase(); }";

const LABEL_TEXT_JS: &str = r"function() {
    const label = (this.labels && this.labels[0]) || this.closest('label');
    return label ? label.textContent.trim() : null;
}";

const OPTION_VALUES_JS: &str = r"function() {
    const values = Array.from(this.options || [])
        .filter(o => !o.disabled && o.value !== '')
        .map(o => o.value);
    return JSON.stringify(values);
}";

const VISIBLE_JS: &str = r"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.display !== 'none'
        && style.visibility !== 'hidden'
        && rect.width > 0
        && rect.height > 0;
}";

const BLUR_JS: &str = "function() { this.blur(); }";

/// Live elements by backend node id
#[derive(Debug)]
struct ElementRegistry<E> {
    elements: HashMap<String, E>,
}

impl<E> ElementRegistry<E> {
    fn new() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }

    /// Store `element`, replacing any earlier entry for the same node
    fn insert(&mut self, backend_node_id: i64, element: E) -> String {
        let key = format!("node-{backend_node_id}");
        let _ = self.elements.insert(key.clone(), element);
        key
    }

    fn get(&self, action: &str, handle: &ElementHandle) -> FillResult<&E> {
        self.elements.get(&handle.id).ok_or_else(|| {
            FillError::interaction(action, format!("stale element handle {}", handle.id))
        })
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Real browser driver
pub struct ChromiumDriver {
    config: DriverConfig,
    browser: Mutex<Browser>,
    page: Page,
    elements: Mutex<ElementRegistry<Element>>,
    handler: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: DriverConfig) -> FillResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| FillError::Browser { message })?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| FillError::Browser {
                message: e.to_string(),
            })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FillError::Browser {
                message: e.to_string(),
            })?;

        info!(headless = config.headless, "chromium launched");
        Ok(Self {
            config,
            browser: Mutex::new(browser),
            page,
            elements: Mutex::new(ElementRegistry::new()),
            handler,
        })
    }

    /// Navigate and wait for the load event
    pub async fn goto(&self, url: &str) -> FillResult<()> {
        let navigation = self.page.goto(url);
        tokio::time::timeout(self.config.navigation_timeout, navigation)
            .await
            .map_err(|_| FillError::Browser {
                message: format!(
                    "navigation to {url} timed out after {:?}",
                    self.config.navigation_timeout
                ),
            })?
            .map_err(|e| FillError::Browser {
                message: format!("navigation to {url} failed: {e}"),
            })?;
        self.elements.lock().await.clear();
        debug!(url, "navigated");
        Ok(())
    }

    /// The driver's configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Close the browser
    pub async fn close(self) -> FillResult<()> {
        let result = self.browser.lock().await.close().await;
        self.handler.abort();
        result.map(|_| ()).map_err(|e| FillError::Browser {
            message: e.to_string(),
        })
    }

    async fn register(&self, element: Element) -> FillResult<ElementHandle> {
        let tag = call_string(&element, "tag_name", TAG_NAME_JS)
            .await?
            .unwrap_or_default();
        let node = *element.backend_node_id.inner();
        let mut elements = self.elements.lock().await;
        let id = elements.insert(node, element);
        debug!(%id, registered = elements.len(), "element registered");
        Ok(ElementHandle::new(id, tag))
    }

    /// Run `script` as `function() { ... }` with `this` bound to the element
    async fn call(&self, action: &str, handle: &ElementHandle, script: &str) -> FillResult<Value> {
        let elements = self.elements.lock().await;
        let element = elements.get(action, handle)?;
        call_js(element, action, script).await
    }
}

async fn call_js(element: &Element, action: &str, script: &str) -> FillResult<Value> {
    let returns = element
        .call_js_fn(script, false)
        .await
        .map_err(|e| FillError::interaction(action, e.to_string()))?;
    if let Some(exception) = returns.exception_details {
        return Err(FillError::interaction(action, exception.text));
    }
    Ok(returns.result.value.unwrap_or(Value::Null))
}

async fn call_string(element: &Element, action: &str, script: &str) -> FillResult<Option<String>> {
    Ok(match call_js(element, action, script).await? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// `function() { ... }` that assigns `value` and fires input/change
fn set_value_js(value: &str) -> FillResult<String> {
    let literal = serde_json::to_string(value)?;
    Ok(format!(
        "function() {{
            this.focus();
            this.value = {literal};
            this.dispatchEvent(new Event('input', {{ bubbles: true }}));
            this.dispatchEvent(new Event('change', {{ bubbles: true }}));
        }}"
    ))
}

fn select_option_js(value: &str) -> FillResult<String> {
    let literal = serde_json::to_string(value)?;
    Ok(format!(
        "function() {{
            const wanted = {literal};
            if (!Array.from(this.options).some(o => o.value === wanted)) {{
                throw new Error('no option with value ' + wanted);
            }}
            this.value = wanted;
            this.dispatchEvent(new Event('input', {{ bubbles: true }}));
            this.dispatchEvent(new Event('change', {{ bubbles: true }}));
        }}"
    ))
}

fn set_checked_js(checked: bool) -> String {
    format!(
        "function() {{
            if (this.checked !== {checked}) {{
                this.checked = {checked};
                this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }}
        }}"
    )
}

#[async_trait]
impl FormDriver for ChromiumDriver {
    async fn query_selector(&self, selector: &str) -> FillResult<Option<ElementHandle>> {
        let found = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| FillError::interaction("query_selector", e.to_string()))?;
        match found.into_iter().next() {
            Some(element) => Ok(Some(self.register(element).await?)),
            None => Ok(None),
        }
    }

    async fn query_selector_all(&self, selector: &str) -> FillResult<Vec<ElementHandle>> {
        let found = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| FillError::interaction("query_selector_all", e.to_string()))?;
        let mut handles = Vec::with_capacity(found.len());
        for element in found {
            handles.push(self.register(element).await?);
        }
        Ok(handles)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> FillResult<Option<String>> {
        let elements = self.elements.lock().await;
        elements.get("attribute", element)?
            .attribute(name)
            .await
            .map_err(|e| FillError::interaction("attribute", e.to_string()))
    }

    async fn label_text(&self, element: &ElementHandle) -> FillResult<Option<String>> {
        let elements = self.elements.lock().await;
        call_string(elements.get("label_text", element)?, "label_text", LABEL_TEXT_JS).await
    }

    async fn option_values(&self, element: &ElementHandle) -> FillResult<Vec<String>> {
        let elements = self.elements.lock().await;
        let target = elements.get("option_values", element)?;
        match call_string(target, "option_values", OPTION_VALUES_JS).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> FillResult<()> {
        let _ = self.call("fill", element, &set_value_js(text)?).await?;
        Ok(())
    }

    async fn check(&self, element: &ElementHandle) -> FillResult<()> {
        let _ = self.call("check", element, &set_checked_js(true)).await?;
        Ok(())
    }

    async fn uncheck(&self, element: &ElementHandle) -> FillResult<()> {
        let _ = self.call("uncheck", element, &set_checked_js(false)).await?;
        Ok(())
    }

    async fn select_option(&self, element: &ElementHandle, value: &str) -> FillResult<()> {
        let _ = self
            .call("select_option", element, &select_option_js(value)?)
            .await?;
        Ok(())
    }

    async fn set_input_files(&self, element: &ElementHandle, path: &Path) -> FillResult<()> {
        let elements = self.elements.lock().await;
        let target = elements.get("set_input_files", element)?;
        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(target.backend_node_id)
            .build()
            .map_err(|message| FillError::interaction("set_input_files", message))?;
        let _ = self
            .page
            .execute(params)
            .await
            .map_err(|e| FillError::interaction("set_input_files", e.to_string()))?;
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> FillResult<()> {
        let elements = self.elements.lock().await;
        let _ = elements.get("click", element)?
            .click()
            .await
            .map_err(|e| FillError::interaction("click", e.to_string()))?;
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: &str) -> FillResult<()> {
        let elements = self.elements.lock().await;
        let target = elements.get("press_key", element)?;
        let _ = target
            .focus()
            .await
            .map_err(|e| FillError::interaction("press_key", e.to_string()))?;
        let _ = target
            .press_key(key)
            .await
            .map_err(|e| FillError::interaction("press_key", e.to_string()))?;
        Ok(())
    }

    async fn blur(&self, element: &ElementHandle) -> FillResult<()> {
        let _ = self.call("blur", element, BLUR_JS).await?;
        Ok(())
    }

    async fn is_visible(&self, element: &ElementHandle) -> FillResult<bool> {
        Ok(self.call("is_visible", element, VISIBLE_JS).await? == Value::Bool(true))
    }
}
