//! Synthetic value generation per field category.
//!
//! A [`ValueGenerator`] owns one uniform RNG and one [`Locale`]. The fill
//! engine builds a generator per call for the locale that call resolved, so
//! no locale state is shared between calls.

use crate::field::{FieldConfig, FieldType, FieldValue};
use crate::result::{FillError, FillResult};
use chrono::{Days, Local, NaiveDate};
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryName, StateName, StreetName, ZipCode,
};
use fake::faker::company::raw::CompanyName;
use fake::faker::internet::raw::{DomainSuffix, Password, SafeEmail};
use fake::faker::lorem::raw::{Paragraphs, Word, Words};
use fake::faker::name::raw::Name;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{Data, EN, FR_FR, JA_JP, PT_BR, ZH_CN, ZH_TW};
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default NUMBER lower bound
pub const DEFAULT_NUMBER_MIN: i64 = 1;

/// Default NUMBER upper bound
pub const DEFAULT_NUMBER_MAX: i64 = 100;

/// Minimum generated password length
pub const MIN_PASSWORD_LEN: usize = 12;

/// Generated dates fall within this many days before today
pub const RECENT_DAYS: u64 = 7;

/// Locales with a synthetic-data backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English
    #[default]
    En,
    /// French (France)
    FrFr,
    /// Portuguese (Brazil)
    PtBr,
    /// Japanese
    JaJp,
    /// Chinese (Simplified)
    ZhCn,
    /// Chinese (Traditional)
    ZhTw,
}

impl Locale {
    /// Every supported locale
    pub const ALL: [Self; 6] = [
        Self::En,
        Self::FrFr,
        Self::PtBr,
        Self::JaJp,
        Self::ZhCn,
        Self::ZhTw,
    ];

    /// Canonical code (`en`, `fr_FR`, ...)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::FrFr => "fr_FR",
            Self::PtBr => "pt_BR",
            Self::JaJp => "ja_JP",
            Self::ZhCn => "zh_CN",
            Self::ZhTw => "zh_TW",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = FillError;

    /// Accepts `en`, `en-US`, `fr_FR`, `pt-br`, `ja`, `zh_TW`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "en" | "en_us" | "en_gb" | "en_au" | "en_ca" => Ok(Self::En),
            "fr" | "fr_fr" => Ok(Self::FrFr),
            "pt_br" => Ok(Self::PtBr),
            "ja" | "ja_jp" => Ok(Self::JaJp),
            "zh_cn" | "zh_hans" => Ok(Self::ZhCn),
            "zh_tw" | "zh_hant" => Ok(Self::ZhTw),
            _ => Err(FillError::unsupported_locale(s)),
        }
    }
}

/// Produces values for [`FieldConfig`]s
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    locale: Locale,
    rng: StdRng,
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl ValueGenerator {
    /// Generator seeded from OS entropy
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator
    #[must_use]
    pub fn with_seed(locale: Locale, seed: u64) -> Self {
        Self {
            locale,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator for a locale string, rejecting unsupported locales
    pub fn for_locale(locale: &str) -> FillResult<Self> {
        Ok(Self::new(locale.parse()?))
    }

    /// The generator's locale
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Generate a value for `config`
    ///
    /// SELECT fields without explicit options yield an empty string; use
    /// [`Self::generate_with_options`] to supply the live element's options.
    pub fn generate(&mut self, config: &FieldConfig) -> FillResult<FieldValue> {
        self.generate_with_options(config, &[])
    }

    /// Generate a value, picking SELECT values from `live_options` when
    /// `config.options` is absent or empty
    pub fn generate_with_options(
        &mut self,
        config: &FieldConfig,
        live_options: &[String],
    ) -> FillResult<FieldValue> {
        if let Some(value_fn) = &config.value_fn {
            return value_fn();
        }

        let value = match config.field_type {
            FieldType::Number => FieldValue::Number(self.number(config.min, config.max)),
            FieldType::Date => FieldValue::Date(self.recent_date()),
            FieldType::Checkbox | FieldType::Radio => FieldValue::Bool(self.rng.gen_bool(0.5)),
            FieldType::Select => {
                let explicit = config.options.as_deref().unwrap_or_default();
                let candidates = if explicit.is_empty() {
                    live_options
                } else {
                    explicit
                };
                FieldValue::Text(self.pick(candidates).unwrap_or_default())
            }
            other => FieldValue::Text(self.text(other)),
        };
        Ok(value)
    }

    /// Uniform integer in `[min ?? 1, max ?? 100]`; inverted bounds are swapped
    pub fn number(&mut self, min: Option<i64>, max: Option<i64>) -> i64 {
        let low = min.unwrap_or(DEFAULT_NUMBER_MIN);
        let high = max.unwrap_or(DEFAULT_NUMBER_MAX);
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.rng.gen_range(low..=high)
    }

    /// Uniform pick
    pub fn pick(&mut self, options: &[String]) -> Option<String> {
        options.choose(&mut self.rng).cloned()
    }

    /// A date within the last [`RECENT_DAYS`] days
    pub fn recent_date(&mut self) -> NaiveDate {
        let today = Local::now().date_naive();
        let back = self.rng.gen_range(0..=RECENT_DAYS);
        today.checked_sub_days(Days::new(back)).unwrap_or(today)
    }

    /// Text for a string-valued category
    pub fn text(&mut self, field_type: FieldType) -> String {
        let rng = &mut self.rng;
        match self.locale {
            Locale::En => synthesize(EN, field_type, rng),
            Locale::FrFr => synthesize(FR_FR, field_type, rng),
            Locale::PtBr => synthesize(PT_BR, field_type, rng),
            Locale::JaJp => synthesize(JA_JP, field_type, rng),
            Locale::ZhCn => synthesize(ZH_CN, field_type, rng),
            Locale::ZhTw => synthesize(ZH_TW, field_type, rng),
        }
    }
}

fn synthesize<L, R>(locale: L, field_type: FieldType, rng: &mut R) -> String
where
    L: Data + Copy,
    R: Rng,
{
    match field_type {
        FieldType::Text => Words(locale, 3..6)
            .fake_with_rng::<Vec<String>, _>(rng)
            .join(" "),
        FieldType::Email => SafeEmail(locale).fake_with_rng(rng),
        FieldType::Password => Password(locale, MIN_PASSWORD_LEN..MIN_PASSWORD_LEN + 8)
            .fake_with_rng(rng),
        FieldType::Phone => PhoneNumber(locale).fake_with_rng(rng),
        FieldType::Textarea => Paragraphs(locale, 2..4)
            .fake_with_rng::<Vec<String>, _>(rng)
            .join("\n\n"),
        FieldType::Name => Name(locale).fake_with_rng(rng),
        FieldType::Address => format!(
            "{} {}",
            BuildingNumber(locale).fake_with_rng::<String, _>(rng),
            StreetName(locale).fake_with_rng::<String, _>(rng)
        ),
        FieldType::City => CityName(locale).fake_with_rng(rng),
        FieldType::State => StateName(locale).fake_with_rng(rng),
        FieldType::Zip => ZipCode(locale).fake_with_rng(rng),
        FieldType::Country => CountryName(locale).fake_with_rng(rng),
        FieldType::Company => CompanyName(locale).fake_with_rng(rng),
        // Host labels must stay ASCII whatever the locale
        FieldType::Url => format!(
            "https://www.{}.{}",
            Word(EN).fake_with_rng::<String, _>(rng).to_lowercase(),
            DomainSuffix(EN).fake_with_rng::<String, _>(rng)
        ),
        FieldType::Number
        | FieldType::Date
        | FieldType::Select
        | FieldType::Checkbox
        | FieldType::Radio
        | FieldType::File
        | FieldType::Custom => Word(locale).fake_with_rng(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generator() -> ValueGenerator {
        ValueGenerator::with_seed(Locale::En, 42)
    }

    mod locale_tests {
        use super::*;

        #[test]
        fn test_parse_variants() {
            assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
            assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::En);
            assert_eq!("fr_FR".parse::<Locale>().unwrap(), Locale::FrFr);
            assert_eq!("PT-br".parse::<Locale>().unwrap(), Locale::PtBr);
            assert_eq!("zh_TW".parse::<Locale>().unwrap(), Locale::ZhTw);
        }

        #[test]
        fn test_unsupported_locale() {
            let err = "tlh".parse::<Locale>().unwrap_err();
            assert!(matches!(err, FillError::UnsupportedLocale { ref locale } if locale == "tlh"));
        }

        #[test]
        fn test_code_round_trip() {
            for locale in Locale::ALL {
                assert_eq!(locale.code().parse::<Locale>().unwrap(), locale);
            }
        }

        #[test]
        fn test_for_locale_rejects_unknown() {
            assert!(ValueGenerator::for_locale("xx").is_err());
            assert_eq!(ValueGenerator::for_locale("ja").unwrap().locale(), Locale::JaJp);
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_value_fn_replaces_category() {
            let config = FieldConfig::new("#n", FieldType::Number)
                .with_range(1, 2)
                .with_value_fn(|| Ok(FieldValue::from("custom")));
            assert_eq!(generator().generate(&config).unwrap(), FieldValue::from("custom"));
        }

        #[test]
        fn test_value_fn_error_propagates() {
            let config = FieldConfig::new("#n", FieldType::Text)
                .with_value_fn(|| Err(FillError::generator("boom")));
            let err = generator().generate(&config).unwrap_err();
            assert!(matches!(err, FillError::Generator { .. }));
        }
    }

    mod category_tests {
        use super::*;

        #[test]
        fn test_number_boundary_collapse() {
            let mut gen = generator();
            let config = FieldConfig::new("#n", FieldType::Number).with_range(5, 5);
            for _ in 0..100 {
                assert_eq!(gen.generate(&config).unwrap(), FieldValue::Number(5));
            }
        }

        #[test]
        fn test_number_defaults() {
            let mut gen = generator();
            let config = FieldConfig::new("#n", FieldType::Number);
            for _ in 0..500 {
                let n = gen.generate(&config).unwrap().as_number().unwrap();
                assert!((1..=100).contains(&n));
            }
        }

        #[test]
        fn test_number_inverted_bounds() {
            let mut gen = generator();
            for _ in 0..100 {
                let n = gen.number(Some(10), Some(3));
                assert!((3..=10).contains(&n));
            }
        }

        #[test]
        fn test_select_without_options_is_empty() {
            let config = FieldConfig::new("#s", FieldType::Select);
            assert_eq!(generator().generate(&config).unwrap(), FieldValue::from(""));
        }

        #[test]
        fn test_select_prefers_explicit_options() {
            let config = FieldConfig::new("#s", FieldType::Select).with_options(["only"]);
            let live = vec!["live".to_string()];
            let value = generator().generate_with_options(&config, &live).unwrap();
            assert_eq!(value, FieldValue::from("only"));
        }

        #[test]
        fn test_select_empty_explicit_options_uses_live() {
            let config =
                FieldConfig::new("#s", FieldType::Select).with_options(Vec::<String>::new());
            let live = vec!["live".to_string()];
            let value = generator().generate_with_options(&config, &live).unwrap();
            assert_eq!(value, FieldValue::from("live"));
        }

        #[test]
        fn test_select_is_uniform() {
            let mut gen = generator();
            let options: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
            let config = FieldConfig::new("#s", FieldType::Select).with_options(options.clone());
            let mut counts = [0usize; 4];
            for _ in 0..4000 {
                let value = gen.generate(&config).unwrap();
                let idx = options
                    .iter()
                    .position(|o| Some(o.as_str()) == value.as_text())
                    .unwrap();
                counts[idx] += 1;
            }
            for count in counts {
                assert!((800..=1200).contains(&count), "counts: {counts:?}");
            }
        }

        #[test]
        fn test_checkbox_is_fair() {
            let mut gen = generator();
            for field_type in [FieldType::Checkbox, FieldType::Radio] {
                let config = FieldConfig::new("#c", field_type);
                let trues = (0..2000)
                    .filter(|_| gen.generate(&config).unwrap().as_bool().unwrap())
                    .count();
                assert!((900..=1100).contains(&trues), "{field_type}: {trues}");
            }
        }

        #[test]
        fn test_date_is_recent() {
            let mut gen = generator();
            let today = Local::now().date_naive();
            let config = FieldConfig::new("#d", FieldType::Date);
            for _ in 0..50 {
                let FieldValue::Date(date) = gen.generate(&config).unwrap() else {
                    panic!("expected a date");
                };
                assert!(date <= today);
                assert!(today.signed_duration_since(date).num_days() <= RECENT_DAYS as i64);
            }
        }

        #[test]
        fn test_password_min_length() {
            let mut gen = generator();
            for _ in 0..50 {
                assert!(gen.text(FieldType::Password).chars().count() >= MIN_PASSWORD_LEN);
            }
        }

        #[test]
        fn test_email_shape() {
            let email = generator().text(FieldType::Email);
            assert!(email.contains('@'), "{email}");
        }

        #[test]
        fn test_url_shape() {
            let url = generator().text(FieldType::Url);
            assert!(url.starts_with("https://www."), "{url}");
        }

        #[test]
        fn test_textarea_has_paragraphs() {
            let text = generator().text(FieldType::Textarea);
            assert!(text.contains("\n\n"));
        }

        #[test]
        fn test_fallback_is_single_word() {
            for field_type in [FieldType::File, FieldType::Custom] {
                let word = generator().text(field_type);
                assert!(!word.is_empty());
                assert!(!word.contains(' '), "{word}");
            }
        }

        #[test]
        fn test_every_category_generates_for_every_locale() {
            for locale in Locale::ALL {
                let mut gen = ValueGenerator::with_seed(locale, 7);
                for field_type in FieldType::ALL {
                    let config = FieldConfig::new("#x", field_type).with_options(["o"]);
                    assert!(gen.generate(&config).is_ok(), "{locale} {field_type}");
                }
            }
        }

        #[test]
        fn test_seed_is_reproducible() {
            let mut a = ValueGenerator::with_seed(Locale::En, 9);
            let mut b = ValueGenerator::with_seed(Locale::En, 9);
            assert_eq!(a.text(FieldType::Name), b.text(FieldType::Name));
            assert_eq!(a.number(None, None), b.number(None, None));
        }
    }

    proptest! {
        #[test]
        fn prop_number_within_bounds(min in -1000i64..1000, span in 0i64..1000, seed: u64) {
            let mut gen = ValueGenerator::with_seed(Locale::En, seed);
            let config = FieldConfig::new("#n", FieldType::Number).with_range(min, min + span);
            let n = gen.generate(&config).unwrap().as_number().unwrap();
            prop_assert!(n >= min && n <= min + span);
        }
    }
}
