//! Result printing

use crate::config::{CliConfig, OutputFormat};
use crate::error::CliResult;
use console::{style, Term};
use formfill::{FieldType, FieldValue, FillReport};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyJson {
    field_type: FieldType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuesJson<'a> {
    field_type: FieldType,
    values: &'a [FieldValue],
}

/// Serialized in fill order
#[derive(Serialize)]
struct ReportJson<'a> {
    url: &'a str,
    filled: &'a FillReport,
}

/// Writes command results to stdout as text or JSON
#[derive(Debug)]
pub struct Printer {
    term: Term,
    format: OutputFormat,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Printer {
    /// Printer for the given configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            term: Term::stdout(),
            format: config.format,
            use_color: config.color.should_color(),
            quiet: config.verbosity.is_quiet(),
        }
    }

    /// Print a classification
    pub fn field_type(&self, field_type: FieldType) -> CliResult<()> {
        let out = match self.format {
            OutputFormat::Json => serde_json::to_string(&ClassifyJson { field_type })?,
            OutputFormat::Text if self.use_color => style(field_type).cyan().bold().to_string(),
            OutputFormat::Text => field_type.to_string(),
        };
        self.write(&out)
    }

    /// Print generated values
    pub fn values(&self, field_type: FieldType, values: &[FieldValue]) -> CliResult<()> {
        let out = match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ValuesJson { field_type, values })?
            }
            OutputFormat::Text => render_values(values),
        };
        self.write(&out)
    }

    /// Print a fill report
    pub fn report(&self, url: &str, report: &FillReport) -> CliResult<()> {
        let out = match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ReportJson { url, filled: report })?
            }
            OutputFormat::Text => render_report(url, report, self.use_color, self.quiet),
        };
        self.write(&out)
    }

    fn write(&self, out: &str) -> CliResult<()> {
        self.term.write_line(out)?;
        Ok(())
    }
}

/// One value per line
#[must_use]
pub fn render_values(values: &[FieldValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Header plus `key = value` lines in fill order
#[must_use]
pub fn render_report(url: &str, report: &FillReport, use_color: bool, quiet: bool) -> String {
    let mut lines = Vec::with_capacity(report.len() + 1);
    if !quiet {
        let header = format!("Filled {} field(s) on {url}", report.len());
        lines.push(if use_color {
            format!("{} {header}", style("✓").green().bold())
        } else {
            header
        });
    }
    for (key, value) in report {
        let key = if use_color {
            style(key).bold().to_string()
        } else {
            key.clone()
        };
        let value = value.to_string().replace('\n', "\\n");
        lines.push(format!("  {key} = {value}"));
    }
    lines.join("\n")
}
