//! Formfill: classify unannotated HTML form fields and fill them with
//! synthetic data.
//!
//! Given any form, the engine discovers its controls, guesses what each one
//! is for from the noisy signals a page exposes (tag, `type`, name, id,
//! placeholder, aria-label, label), generates a plausible locale-aware value
//! per category and writes it with the interaction the live control needs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    FORMFILL Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scanner    │    │ Classifier │    │ Generator  │            │
//! │   │ (detect)   │───►│ (rules)    │    │ (fake)     │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │          │                                   │                  │
//! │          ▼                                   ▼                  │
//! │   ┌──────────────────────────────────────────────────┐          │
//! │   │ FormFiller: fill_field / fill_form / auto_fill   │          │
//! │   └──────────────────────────────────────────────────┘          │
//! │                          │                                      │
//! │                          ▼                                      │
//! │   ┌──────────────────────────────────────────────────┐          │
//! │   │ FormDriver: MockDriver | ChromiumDriver (browser)│          │
//! │   └──────────────────────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use formfill::{AutoFillOptions, FormFiller, MockDriver, MockElement};
//!
//! # async fn run() -> formfill::FillResult<()> {
//! let driver = MockDriver::new()
//!     .with_element(MockElement::input("email").id("email"))
//!     .with_element(MockElement::input("text").id("captcha"));
//!
//! let filler = FormFiller::new(driver);
//! let report = filler
//!     .auto_fill_form(&AutoFillOptions::new().exclude("#captcha"))
//!     .await?;
//! assert!(report.contains_key("#email"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[cfg(feature = "browser")]
mod browser;
pub mod classifier;
mod config;
mod driver;
mod field;
mod filler;
pub mod generator;
mod result;
pub mod scanner;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use classifier::{classify, ElementSignals};
pub use config::{
    AutoFillOptions, DEFAULT_FORM_SELECTOR, DEFAULT_MAX_ELEMENTS, DEFAULT_SUBMIT_SELECTOR,
};
pub use driver::{DriverConfig, ElementHandle, FormDriver, MockDriver, MockElement, MockOption};
pub use field::{FieldConfig, FieldOverride, FieldTarget, FieldType, FieldValue, ValueFn};
pub use filler::{ControlKind, FillReport, FormFiller};
pub use generator::{Locale, ValueGenerator};
pub use result::{FillError, FillResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::classifier::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::field::*;
    pub use super::filler::*;
    pub use super::generator::*;
    pub use super::result::*;
    pub use super::scanner::{detect, detect_with_options};

    #[cfg(feature = "browser")]
    pub use super::browser::*;
}
