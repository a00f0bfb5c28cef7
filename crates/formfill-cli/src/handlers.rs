//! Subcommand implementations

use crate::commands::{ClassifyArgs, FillArgs, GenerateArgs};
use crate::error::{CliError, CliResult};
use formfill::{classify, FieldType, FieldValue, FillReport, Locale, ValueGenerator};
use tracing::debug;

/// Classify one set of element signals
#[must_use]
pub fn run_classify(args: &ClassifyArgs) -> FieldType {
    let signals = args.to_signals();
    let field_type = classify(&signals);
    debug!(?signals, %field_type, "classified");
    field_type
}

/// Generate `args.count` values
pub fn run_generate(args: &GenerateArgs) -> CliResult<(FieldType, Vec<FieldValue>)> {
    if args.count == 0 {
        return Err(CliError::invalid_argument("--count must be at least 1"));
    }
    let config = args.to_field_config()?;
    let locale: Locale = args.locale.as_deref().unwrap_or("en").parse()?;
    let mut generator = match args.seed {
        Some(seed) => ValueGenerator::with_seed(locale, seed),
        None => ValueGenerator::new(locale),
    };

    let values = (0..args.count)
        .map(|_| generator.generate(&config))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((config.field_type, values))
}

/// Launch Chromium, open `args.url` and auto-fill it
#[cfg(feature = "browser")]
pub fn run_fill(args: &FillArgs) -> CliResult<FillReport> {
    use formfill::{ChromiumDriver, FormFiller};

    let options = args.to_options()?;
    if let Some(locale) = &options.locale {
        let _: Locale = locale.parse()?;
    }
    let driver_config = args.to_driver_config();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("failed to start async runtime: {e}")))?;

    rt.block_on(async {
        let driver = ChromiumDriver::launch(driver_config).await?;
        driver.goto(&args.url).await?;

        let filler = FormFiller::new(driver);
        let filled = filler.auto_fill_form(&options).await;
        let closed = filler.into_driver().close().await;

        let report = filled?;
        closed?;
        Ok::<_, CliError>(report)
    })
}

/// Live filling is compiled out
#[cfg(not(feature = "browser"))]
pub fn run_fill(args: &FillArgs) -> CliResult<FillReport> {
    let _ = args.to_options()?;
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["formfill", "generate"];
        full.extend_from_slice(argv);
        let Commands::Generate(args) = Cli::parse_from(full).command else {
            panic!("expected generate");
        };
        args
    }

    #[test]
    fn test_classify_uses_declared_type() {
        let args = ClassifyArgs {
            tag: "input".to_string(),
            declared_type: Some("tel".to_string()),
            name: Some("email".to_string()),
            ..ClassifyArgs::default()
        };
        assert_eq!(run_classify(&args), FieldType::Phone);
    }

    #[test]
    fn test_classify_label_fallback() {
        let args = ClassifyArgs {
            tag: "input".to_string(),
            label: Some("Postal code".to_string()),
            ..ClassifyArgs::default()
        };
        assert_eq!(run_classify(&args), FieldType::Zip);
    }

    #[test]
    fn test_generate_count_and_bounds() {
        let (field_type, values) =
            run_generate(&generate_args(&["number", "--min", "5", "--max", "5", "-n", "4"]))
                .unwrap();
        assert_eq!(field_type, FieldType::Number);
        assert_eq!(values, vec![FieldValue::Number(5); 4]);
    }

    #[test]
    fn test_generate_seed_is_reproducible() {
        let args = generate_args(&["name", "--seed", "11", "-n", "3"]);
        assert_eq!(run_generate(&args).unwrap(), run_generate(&args).unwrap());
    }

    #[test]
    fn test_generate_rejects_unknown_locale() {
        let err = run_generate(&generate_args(&["city", "--locale", "tlh"])).unwrap_err();
        assert!(matches!(err, CliError::Fill(formfill::FillError::UnsupportedLocale { .. })));
    }

    #[test]
    fn test_generate_rejects_zero_count() {
        let err = run_generate(&generate_args(&["text", "-n", "0"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
