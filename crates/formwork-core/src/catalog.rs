//! Message catalogs and locale selection.
//!
//! Validation messages are stored in a global, read-only registry organized
//! by language code and error code. The registry is built once on first use
//! and never mutated afterwards, so lookups are lock-free.
//!
//! Messages may carry positional parameters written as `{0}`, `{1}`, ...
//! which are substituted at translation time.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{
    BOOLEAN_ERROR_CODE, CHOICE_ERROR_CODE, EMAIL_ERROR_CODE, MAX_LENGTH_ERROR_CODE,
    MIN_LENGTH_ERROR_CODE, REQUIRED_ERROR_CODE, URL_ERROR_CODE,
};

/// The language used when no preference matches the configured locales.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages with a built-in message catalog.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr"];

/// The global message registry: language code -> (error code -> message).
fn catalogs() -> &'static HashMap<&'static str, HashMap<&'static str, &'static str>> {
    static CATALOGS: OnceLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
        OnceLock::new();
    CATALOGS.get_or_init(|| {
        let en = HashMap::from([
            (BOOLEAN_ERROR_CODE, "Enter a valid boolean"),
            (EMAIL_ERROR_CODE, "Enter a valid email address"),
            (CHOICE_ERROR_CODE, "Invalid choice"),
            (
                MIN_LENGTH_ERROR_CODE,
                "Ensure this value has at least {0} characters",
            ),
            (
                MAX_LENGTH_ERROR_CODE,
                "Ensure this value has at most {0} characters",
            ),
            (REQUIRED_ERROR_CODE, "This field is required"),
            (URL_ERROR_CODE, "Enter a valid URL"),
        ]);
        let fr = HashMap::from([
            (BOOLEAN_ERROR_CODE, "Entrez un bool\u{e9}en valide"),
            (EMAIL_ERROR_CODE, "Entrez une adresse e-mail valide"),
            (CHOICE_ERROR_CODE, "Choix invalide"),
            (
                MIN_LENGTH_ERROR_CODE,
                "Assurez-vous que cette valeur fait au minimum {0} caract\u{e8}res",
            ),
            (
                MAX_LENGTH_ERROR_CODE,
                "Assurez-vous que cette valeur fait au maximum {0} caract\u{e8}res",
            ),
            (REQUIRED_ERROR_CODE, "Ce champ est obligatoire"),
            (URL_ERROR_CODE, "Entrez une URL valide"),
        ]);
        HashMap::from([("en", en), ("fr", fr)])
    })
}

/// Looks up the message for `code` in `language` and substitutes positional
/// parameters.
///
/// Unknown languages fall back to [`DEFAULT_LANGUAGE`]; an unknown code is
/// returned as-is so a message is never silently lost.
pub fn translate(code: &str, language: &str, params: &[String]) -> String {
    let registry = catalogs();
    let catalog = registry
        .get(language)
        .or_else(|| registry.get(DEFAULT_LANGUAGE));
    let template = catalog
        .and_then(|messages| messages.get(code))
        .map_or(code, |message| *message);
    substitute(template, params)
}

/// Replaces `{0}`, `{1}`, ... placeholders with the corresponding parameter.
fn substitute(template: &str, params: &[String]) -> String {
    let mut message = template.to_string();
    for (i, param) in params.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), param);
    }
    message
}

/// Selects the language to use given the configured locales of a form and
/// the caller's ordered preference tags.
///
/// Preference tags are matched against the configured locales on the primary
/// subtag, case-insensitively, so `fr-CH` matches a configured `fr`. The
/// first preference with a configured match wins; if that match is not one
/// of [`SUPPORTED_LANGUAGES`] or nothing matches, [`DEFAULT_LANGUAGE`] is
/// returned.
pub fn select_language(configured: &[String], preferences: &[String]) -> String {
    for preference in preferences {
        let wanted = primary_subtag(preference);
        if wanted.is_empty() {
            continue;
        }
        for locale in configured {
            if primary_subtag(locale).eq_ignore_ascii_case(&wanted) {
                let primary = wanted.to_ascii_lowercase();
                if SUPPORTED_LANGUAGES.contains(&primary.as_str()) {
                    return primary;
                }
                return DEFAULT_LANGUAGE.to_string();
            }
        }
    }
    DEFAULT_LANGUAGE.to_string()
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split('-')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_english() {
        assert_eq!(
            translate(REQUIRED_ERROR_CODE, "en", &[]),
            "This field is required"
        );
        assert_eq!(
            translate(EMAIL_ERROR_CODE, "en", &[]),
            "Enter a valid email address"
        );
    }

    #[test]
    fn test_translate_french() {
        assert_eq!(
            translate(REQUIRED_ERROR_CODE, "fr", &[]),
            "Ce champ est obligatoire"
        );
        assert_eq!(
            translate(EMAIL_ERROR_CODE, "fr", &[]),
            "Entrez une adresse e-mail valide"
        );
    }

    #[test]
    fn test_translate_with_params() {
        assert_eq!(
            translate(MIN_LENGTH_ERROR_CODE, "en", &["5".to_string()]),
            "Ensure this value has at least 5 characters"
        );
        assert_eq!(
            translate(MIN_LENGTH_ERROR_CODE, "fr", &["3".to_string()]),
            "Assurez-vous que cette valeur fait au minimum 3 caract\u{e8}res"
        );
        assert_eq!(
            translate(MAX_LENGTH_ERROR_CODE, "fr", &["10".to_string()]),
            "Assurez-vous que cette valeur fait au maximum 10 caract\u{e8}res"
        );
    }

    #[test]
    fn test_translate_choice_messages() {
        assert_eq!(translate(CHOICE_ERROR_CODE, "en", &[]), "Invalid choice");
        assert_eq!(translate(CHOICE_ERROR_CODE, "fr", &[]), "Choix invalide");
    }

    #[test]
    fn test_translate_unknown_language_falls_back() {
        assert_eq!(
            translate(REQUIRED_ERROR_CODE, "de", &[]),
            "This field is required"
        );
    }

    #[test]
    fn test_translate_unknown_code_passes_through() {
        assert_eq!(translate("custom_code", "en", &[]), "custom_code");
    }

    #[test]
    fn test_select_language_no_preferences() {
        assert_eq!(select_language(&["fr".to_string()], &[]), "en");
    }

    #[test]
    fn test_select_language_first_match_wins() {
        let configured = vec!["en".to_string(), "fr".to_string()];
        let preferences = vec!["fr-CH".to_string(), "en".to_string()];
        assert_eq!(select_language(&configured, &preferences), "fr");
    }

    #[test]
    fn test_select_language_unconfigured_preference_skipped() {
        let configured = vec!["en".to_string()];
        let preferences = vec!["fr".to_string(), "en-GB".to_string()];
        assert_eq!(select_language(&configured, &preferences), "en");
    }

    #[test]
    fn test_select_language_unsupported_match_defaults() {
        let configured = vec!["de".to_string()];
        let preferences = vec!["de-AT".to_string()];
        assert_eq!(select_language(&configured, &preferences), "en");
    }

    #[test]
    fn test_select_language_empty_configured() {
        assert_eq!(select_language(&[], &["fr".to_string()]), "en");
    }
}
