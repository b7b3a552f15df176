//! Name normalization and id generation.

use std::sync::OnceLock;

use formwork_core::ConfigError;
use regex::Regex;

/// The library default auto-id pattern.
pub const DEFAULT_AUTO_ID: &str = "id_{}";

fn whitespace_pattern() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| {
        Regex::new(r"\s+").unwrap_or_else(|e| unreachable!("whitespace pattern is valid: {e}"))
    })
}

/// Lowercases a field name and replaces whitespace runs with underscores.
/// The result is the HTML `name` attribute and the form's map key.
pub(crate) fn normalize_name(name: &str) -> String {
    whitespace_pattern()
        .replace_all(&name.to_lowercase(), "_")
        .into_owned()
}

/// Checks an auto-id pattern: empty disables ids, otherwise the pattern must
/// contain exactly one `{}` placeholder.
pub(crate) fn validate_auto_id(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() || pattern.matches("{}").count() == 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidAutoIdPattern(pattern.to_string()))
    }
}

/// Expands an auto-id pattern for a normalized field name. An empty pattern
/// yields an empty id.
pub(crate) fn apply_auto_id(pattern: &str, normalized_name: &str) -> String {
    if pattern.is_empty() {
        String::new()
    } else {
        pattern.replacen("{}", normalized_name, 1)
    }
}

/// The id of the `index`-th error entry of the field with id `field_id`.
pub(crate) fn error_id(index: usize, field_id: &str) -> String {
    format!("err_{index}_{field_id}")
}

/// The id of the help text of the field with id `field_id`.
pub(crate) fn helptext_id(field_id: &str) -> String {
    format!("helptext_{field_id}")
}
