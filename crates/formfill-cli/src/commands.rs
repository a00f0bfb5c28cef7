//! CLI command definitions using clap

use crate::config::{ColorChoice, OutputFormat};
use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand, ValueEnum};
use formfill::{AutoFillOptions, DriverConfig, ElementSignals, FieldConfig, FieldType};
use std::path::PathBuf;
use std::time::Duration;

/// Formfill: classify form fields and fill them with synthetic data
#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: FormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a form control from the signals it exposes
    Classify(ClassifyArgs),

    /// Generate synthetic values for a field category
    Generate(GenerateArgs),

    /// Detect and fill a form on a live page (needs the `browser` feature)
    Fill(FillArgs),
}

/// Arguments for the classify command
#[derive(Parser, Debug, Default)]
pub struct ClassifyArgs {
    /// Element tag (input, select, textarea)
    #[arg(long, default_value = "input")]
    pub tag: String,

    /// Declared `type` attribute
    #[arg(long = "type")]
    pub declared_type: Option<String>,

    /// `name` attribute
    #[arg(long)]
    pub name: Option<String>,

    /// `id` attribute
    #[arg(long)]
    pub id: Option<String>,

    /// Placeholder text
    #[arg(long)]
    pub placeholder: Option<String>,

    /// `aria-label` attribute
    #[arg(long)]
    pub aria_label: Option<String>,

    /// Associated label text
    #[arg(long)]
    pub label: Option<String>,
}

impl ClassifyArgs {
    /// Signals for the classifier
    #[must_use]
    pub fn to_signals(&self) -> ElementSignals {
        ElementSignals {
            tag: self.tag.clone(),
            declared_type: self.declared_type.clone(),
            name: self.name.clone(),
            id: self.id.clone(),
            placeholder: self.placeholder.clone(),
            aria_label: self.aria_label.clone(),
            label: self.label.clone(),
        }
    }
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Field category (text, email, number, select, ...)
    pub field_type: String,

    /// Locale (en, fr_FR, pt_BR, ja_JP, zh_CN, zh_TW)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// NUMBER lower bound
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<i64>,

    /// NUMBER upper bound
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<i64>,

    /// SELECT candidate (repeatable)
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// Number of values
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenerateArgs {
    /// Field descriptor for the generator
    pub fn to_field_config(&self) -> CliResult<FieldConfig> {
        let field_type: FieldType = self.field_type.parse()?;
        let mut config = FieldConfig::new("generate", field_type);
        config.min = self.min;
        config.max = self.max;
        if !self.options.is_empty() {
            config = config.with_options(self.options.iter().cloned());
        }
        Ok(config)
    }
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct FillArgs {
    /// Page URL
    pub url: String,

    /// Options file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Form selector
    #[arg(long)]
    pub form: Option<String>,

    /// Skip fields whose selector contains this (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Locale for generated data
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Submit after filling
    #[arg(long)]
    pub submit: bool,

    /// Submit button selector
    #[arg(long)]
    pub submit_selector: Option<String>,

    /// Cap on detected fields
    #[arg(long)]
    pub max_elements: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long)]
    pub chromium: Option<String>,

    /// Navigation timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl FillArgs {
    /// Options file (if any) with command-line flags layered on top
    pub fn to_options(&self) -> CliResult<AutoFillOptions> {
        let mut options = match &self.config {
            Some(path) => AutoFillOptions::load(path).map_err(|e| {
                CliError::config(format!("{}: {e}", path.display()))
            })?,
            None => AutoFillOptions::default(),
        };

        if let Some(form) = &self.form {
            options.form_selector.clone_from(form);
        }
        options.exclude_selectors.extend(self.exclude.iter().cloned());
        if self.locale.is_some() {
            options.locale.clone_from(&self.locale);
        }
        if self.submit {
            options.submit_after_fill = true;
        }
        if let Some(selector) = &self.submit_selector {
            options.submit_selector.clone_from(selector);
        }
        if let Some(max) = self.max_elements {
            options.max_elements = max;
        }
        Ok(options)
    }

    /// Browser settings
    #[must_use]
    pub fn to_driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::new()
            .headless(!self.headed)
            .navigation_timeout(Duration::from_secs(self.timeout));
        if self.no_sandbox {
            config = config.no_sandbox();
        }
        if let Some(path) = &self.chromium {
            config = config.executable_path(path.clone());
        }
        config
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Output format argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_classify() {
            let cli = Cli::parse_from([
                "formfill",
                "classify",
                "--type",
                "email",
                "--name",
                "contact",
            ]);
            let Commands::Classify(args) = cli.command else {
                panic!("expected classify");
            };
            let signals = args.to_signals();
            assert_eq!(signals.tag, "input");
            assert_eq!(signals.declared_type.as_deref(), Some("email"));
            assert_eq!(signals.name.as_deref(), Some("contact"));
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from([
                "formfill", "-vv", "--color", "never", "--format", "json", "generate", "zip",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
            assert!(matches!(cli.format, FormatArg::Json));
        }

        #[test]
        fn test_missing_subcommand_fails() {
            assert!(Cli::try_parse_from(["formfill"]).is_err());
        }
    }

    mod generate_tests {
        use super::*;

        #[test]
        fn test_to_field_config() {
            let cli = Cli::parse_from([
                "formfill", "generate", "number", "--min", "-5", "--max", "5", "-n", "3",
            ]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected generate");
            };
            assert_eq!(args.count, 3);
            let config = args.to_field_config().unwrap();
            assert_eq!(config.field_type, FieldType::Number);
            assert_eq!((config.min, config.max), (Some(-5), Some(5)));
            assert!(config.options.is_none());
        }

        #[test]
        fn test_options_collected() {
            let cli = Cli::parse_from([
                "formfill", "generate", "select", "--option", "a", "--option", "b",
            ]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected generate");
            };
            let config = args.to_field_config().unwrap();
            assert_eq!(config.options, Some(vec!["a".to_string(), "b".to_string()]));
        }

        #[test]
        fn test_unknown_field_type() {
            let cli = Cli::parse_from(["formfill", "generate", "telepathy"]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected generate");
            };
            assert!(matches!(args.to_field_config(), Err(CliError::Fill(_))));
        }
    }

    mod fill_tests {
        use super::*;
        use std::io::Write;

        fn fill_args(extra: &[&str]) -> FillArgs {
            let mut argv = vec!["formfill", "fill", "http://localhost:8080/signup"];
            argv.extend_from_slice(extra);
            let Commands::Fill(args) = Cli::parse_from(argv).command else {
                panic!("expected fill");
            };
            args
        }

        #[test]
        fn test_flags_without_config_file() {
            let options = fill_args(&["--form", "#signup", "--exclude", "#captcha", "--submit"])
                .to_options()
                .unwrap();
            assert_eq!(options.form_selector, "#signup");
            assert_eq!(options.exclude_selectors, vec!["#captcha"]);
            assert!(options.submit_after_fill);
            assert_eq!(options.max_elements, 50);
        }

        #[test]
        fn test_flags_layer_over_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("signup.yaml");
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "formSelector: '#from-file'").unwrap();
            writeln!(file, "excludeSelectors: ['#a']").unwrap();
            writeln!(file, "locale: ja").unwrap();

            let options = fill_args(&[
                "--config",
                path.to_str().unwrap(),
                "--exclude",
                "#b",
                "--max-elements",
                "4",
            ])
            .to_options()
            .unwrap();

            assert_eq!(options.form_selector, "#from-file");
            assert_eq!(options.exclude_selectors, vec!["#a", "#b"]);
            assert_eq!(options.locale.as_deref(), Some("ja"));
            assert_eq!(options.max_elements, 4);
        }

        #[test]
        fn test_bad_config_file_is_config_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("broken.json");
            std::fs::write(&path, "{ not json").unwrap();

            let err = fill_args(&["--config", path.to_str().unwrap()])
                .to_options()
                .unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
        }

        #[test]
        fn test_driver_config() {
            let config = fill_args(&["--headed", "--no-sandbox", "--chromium", "/opt/chrome"])
                .to_driver_config();
            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.executable_path.as_deref(), Some("/opt/chrome"));
            assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        }
    }
}
