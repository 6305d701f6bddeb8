//! Localization support using Project Fluent.
//!
//! Messages shown by the command-line interface are looked up here. The
//! library itself never localizes anything: records and errors stay in plain
//! English so they can be serialized and compared.
//!
//! # Supported Locales
//!
//! - English (en) - Default fallback
//! - German (de)
//!
//! Translation files live in `locales/{locale}/main.ftl` and are embedded at
//! compile time, so the binary works from any directory.
//!
//! # Example
//!
//! ```
//! use project_analyzer_core::l10n::Localizer;
//!
//! let localizer = Localizer::new("en")?;
//! let message = localizer.get("analysis-errors", Some(&[("count", "2")]));
//! assert_eq!(message, "2 files or directories could not be analyzed.");
//! # Ok::<(), project_analyzer_core::Error>(())
//! ```

use crate::error::{Error, Result};
use fluent::FluentResource;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentValue};
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// The default locale used when no locale is specified or loading fails.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales with an embedded translation file.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

/// Returns the embedded translation source for a language code.
fn embedded_locale(language: &str) -> Option<&'static str> {
    match language {
        "en" => Some(include_str!("../locales/en/main.ftl")),
        "de" => Some(include_str!("../locales/de/main.ftl")),
        _ => None,
    }
}

/// Formats translated messages for one locale.
///
/// The bundle is the thread-safe variant, so a `Localizer` can be shared
/// with progress callbacks running on worker threads.
pub struct Localizer {
    bundle: FluentBundle<FluentResource>,
    locale: LanguageIdentifier,
}

impl std::fmt::Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localizer")
            .field("locale", &self.locale.to_string())
            .finish()
    }
}

impl Localizer {
    /// Creates a Localizer for the given locale.
    ///
    /// Only the language subtag selects the translation file, so `de-AT`
    /// loads German. Unsupported languages fall back to English.
    ///
    /// # Errors
    ///
    /// Returns [`Error::L10n`] if the locale identifier cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// use project_analyzer_core::l10n::Localizer;
    ///
    /// let localizer = Localizer::new("fr")?;
    /// assert_eq!(localizer.locale(), "en");
    /// # Ok::<(), project_analyzer_core::Error>(())
    /// ```
    pub fn new(locale_str: &str) -> Result<Self> {
        let requested: LanguageIdentifier = locale_str
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", locale_str)))?;

        let language = requested.language.as_str().to_string();
        let locale = if embedded_locale(&language).is_some() {
            requested
        } else {
            warn!(locale = %locale_str, fallback = DEFAULT_LOCALE, "Unsupported locale");
            DEFAULT_LOCALE
                .parse()
                .map_err(|_| Error::l10n("Invalid default locale"))?
        };

        let bundle = Self::load_bundle(&locale)?;
        Ok(Self { bundle, locale })
    }

    /// Creates a Localizer from the system's locale settings.
    pub fn from_system() -> Result<Self> {
        Self::new(&detect_system_locale())
    }

    fn load_bundle(locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        let language = locale.language.as_str();
        let source = embedded_locale(language)
            .ok_or_else(|| Error::l10n(format!("No translations for '{}'", language)))?;

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| Error::l10n(format!("Failed to parse FTL: {:?}", errors)))?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Terminal output has no use for bidi isolation marks.
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| Error::l10n(format!("Failed to add resource: {:?}", errors)))?;

        Ok(bundle)
    }

    /// Whether the loaded translations define `msg_id`.
    pub fn has_message(&self, msg_id: &str) -> bool {
        self.bundle.has_message(msg_id)
    }

    /// Retrieves a translated message by its identifier.
    ///
    /// Argument values that parse as integers are passed as numbers, so
    /// plural selectors work. Unknown identifiers come back as `[msg_id]`.
    pub fn get(&self, msg_id: &str, args: Option<&[(&str, &str)]>) -> String {
        let Some(message) = self.bundle.get_message(msg_id) else {
            return format!("[{}]", msg_id);
        };
        let Some(pattern) = message.value() else {
            return format!("[{}]", msg_id);
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (key, value) in args {
                let value = match value.parse::<i64>() {
                    Ok(number) => FluentValue::from(number),
                    Err(_) => FluentValue::from(value.to_string()),
                };
                fluent_args.set(key.to_string(), value);
            }
            fluent_args
        });

        let mut errors = Vec::new();
        let formatted = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);

        if !errors.is_empty() {
            warn!(message = msg_id, errors = ?errors, "Fluent formatting errors");
        }

        formatted.into_owned()
    }

    /// The locale actually loaded.
    pub fn locale(&self) -> String {
        self.locale.to_string()
    }
}

/// Detects the system locale from `LC_ALL`, `LC_MESSAGES` or `LANG`.
///
/// The first non-empty variable wins; see [`language_of`] for how its value
/// is reduced to a language.
pub fn detect_system_locale() -> String {
    let value = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty());
    language_of(value.as_deref())
}

/// Reduces a POSIX locale value to its lowercased language part.
///
/// `de_DE.UTF-8` gives `"de"`. A missing value, `C` and `POSIX` give
/// [`DEFAULT_LOCALE`].
pub fn language_of(value: Option<&str>) -> String {
    value
        .and_then(|locale| locale.split(['_', '.', '@']).next())
        .filter(|language| !language.is_empty() && *language != "C" && *language != "POSIX")
        .map(|language| language.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_of_locale_values() {
        assert_eq!(language_of(Some("de_DE.UTF-8")), "de");
        assert_eq!(language_of(Some("fr")), "fr");
        assert_eq!(language_of(Some("EN_us")), "en");
        assert_eq!(language_of(Some("sr_RS@latin")), "sr");
        assert_eq!(language_of(Some("C.UTF-8")), "en");
        assert_eq!(language_of(Some("POSIX")), "en");
        assert_eq!(language_of(Some("")), "en");
        assert_eq!(language_of(None), "en");
    }

    #[test]
    fn test_every_locale_has_the_same_messages() {
        let ids = [
            "analysis-started",
            "analysis-started-path",
            "analysis-complete",
            "analysis-no-results",
            "analysis-errors",
            "header-name",
            "header-type",
            "header-language",
            "header-confidence",
            "header-files",
            "header-path",
            "section-microservices",
            "microservices-none",
            "microservice-summary",
            "section-relationships",
            "relationships-none",
            "section-statistics",
            "stats-frameworks",
            "stats-languages",
            "stats-types",
        ];
        for locale in SUPPORTED_LOCALES {
            let localizer = Localizer::new(locale).unwrap();
            for id in ids {
                assert!(localizer.has_message(id), "{} is missing {}", locale, id);
            }
        }
    }

    #[test]
    fn test_plural_selection() {
        let en = Localizer::new("en").unwrap();
        assert_eq!(en.get("analysis-started", Some(&[("count", "1")])), "Analyzing one root...");
        assert_eq!(en.get("analysis-started", Some(&[("count", "3")])), "Analyzing 3 roots...");

        let de = Localizer::new("de-AT").unwrap();
        assert_eq!(de.locale(), "de-AT");
        assert_eq!(
            de.get("analysis-complete", Some(&[("count", "1"), ("elapsed", "12")])),
            "Ein Projekt gefunden in 12 ms."
        );
    }

    #[test]
    fn test_string_arguments_are_not_isolated() {
        let en = Localizer::new("en").unwrap();
        assert_eq!(
            en.get("analysis-started-path", Some(&[("path", "/srv/code")])),
            "Root: /srv/code"
        );
    }

    #[test]
    fn test_unknown_message_and_locale() {
        let localizer = Localizer::new("fr").unwrap();
        assert_eq!(localizer.locale(), "en");
        assert_eq!(localizer.get("does-not-exist", None), "[does-not-exist]");
        assert!(Localizer::new("not a locale!").is_err());
    }
}
