//! Multi-value dictionary for submitted form data.
//!
//! [`FormData`] holds the decoded key/value pairs of a form submission
//! together with the request's `Accept-Language` header, which a form uses
//! to pick the locale its messages are rendered in.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::accept::parse_accept_language;

/// Decoded form data: each key maps to the ordered list of submitted values.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    data: HashMap<String, Vec<String>>,
    accept_language: Option<String>,
}

impl FormData {
    /// Creates an empty `FormData`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded body or query string (e.g. `"color=red&color=blue"`).
    ///
    /// Handles percent-encoding, `+` as space, and multiple values per key.
    pub fn parse(encoded: &str) -> Self {
        let mut data: HashMap<String, Vec<String>> = HashMap::new();

        for pair in encoded.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq| (&pair[..eq], &pair[eq + 1..]));
            data.entry(url_decode(key)).or_default().push(url_decode(value));
        }
        tracing::trace!(keys = data.len(), "parsed form data");

        Self {
            data,
            accept_language: None,
        }
    }

    /// Builds `FormData` from already-decoded pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut data: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            data.entry(key.into()).or_default().push(value.into());
        }
        Self {
            data,
            accept_language: None,
        }
    }

    /// Attaches the request's `Accept-Language` header value.
    #[must_use]
    pub fn with_accept_language(mut self, header: impl Into<String>) -> Self {
        self.accept_language = Some(header.into());
        self
    }

    /// Appends a value to the list for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.entry(key.into()).or_default().push(value.into());
    }

    /// Returns the first value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns all values for `key`, if any.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// The underlying key -> values map.
    pub fn as_map(&self) -> &HashMap<String, Vec<String>> {
        &self.data
    }

    /// The attached `Accept-Language` header value, if any.
    pub fn accept_language(&self) -> Option<&str> {
        self.accept_language.as_deref()
    }

    /// The language tags of the attached `Accept-Language` header, ordered
    /// by descending quality. Empty when no header was attached.
    pub fn language_preferences(&self) -> Vec<String> {
        self.accept_language
            .as_deref()
            .map_or_else(Vec::new, parse_accept_language)
    }
}

fn url_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
