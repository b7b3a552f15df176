//! The wrapped-error model for field validation and the library's
//! configuration errors.
//!
//! A [`FieldError`] wraps an underlying cause together with an optional
//! error code. The code identifies the kind of failure (`required`, `email`,
//! ...) independently of the message, which lets callers substitute their own
//! messages per code and lets the catalogs translate built-in messages per
//! locale.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog;

/// Code reported when a value is not a recognized boolean token.
pub const BOOLEAN_ERROR_CODE: &str = "boolean";
/// Code reported when a value is not a syntactically valid email address.
pub const EMAIL_ERROR_CODE: &str = "email";
/// Code reported when a value is not one of the declared choices.
pub const CHOICE_ERROR_CODE: &str = "oneof";
/// Code reported when a value is shorter than the declared minimum length.
pub const MIN_LENGTH_ERROR_CODE: &str = "min";
/// Code reported when a value is longer than the declared maximum length.
pub const MAX_LENGTH_ERROR_CODE: &str = "max";
/// Code reported when a required value is missing.
pub const REQUIRED_ERROR_CODE: &str = "required";
/// Code reported when a value is not a syntactically valid URL.
pub const URL_ERROR_CODE: &str = "url";

/// The error codes a field accepts replacement errors for.
pub const CUSTOMIZABLE_ERROR_CODES: [&str; 7] = [
    BOOLEAN_ERROR_CODE,
    EMAIL_ERROR_CODE,
    CHOICE_ERROR_CODE,
    MIN_LENGTH_ERROR_CODE,
    MAX_LENGTH_ERROR_CODE,
    REQUIRED_ERROR_CODE,
    URL_ERROR_CODE,
];

/// An error value that carries a stable machine code and can render itself
/// in a given locale.
pub trait CodedError: StdError + Send + Sync {
    /// The machine-readable code, or the empty string when the error has
    /// none of its own.
    fn code(&self) -> &str {
        ""
    }

    /// The message for `locale`. The default renders the `Display` form,
    /// ignoring the locale.
    fn translate(&self, locale: &str) -> String {
        let _ = locale;
        self.to_string()
    }
}

/// A validation error: an optional code wrapped around a shared cause.
///
/// The effective [`code`](FieldError::code) is the explicit code when one was
/// attached, otherwise the cause's own code, otherwise the empty string.
/// Cloning is cheap; the cause is reference-counted.
#[derive(Clone)]
pub struct FieldError {
    code: Option<String>,
    cause: Option<Arc<dyn CodedError>>,
}

impl FieldError {
    /// Wraps `cause` without attaching a code of its own.
    pub fn wrap(cause: impl CodedError + 'static) -> Self {
        Self {
            code: None,
            cause: Some(Arc::new(cause)),
        }
    }

    /// Wraps `cause` and attaches `code`, shadowing any code the cause
    /// carries.
    pub fn wrap_with_code(cause: impl CodedError + 'static, code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            cause: Some(Arc::new(cause)),
        }
    }

    /// A codeless error from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::wrap(MessageError(message.into()))
    }

    /// A built-in error for `code`, rendered through the message catalogs.
    pub fn coded(code: impl Into<String>, params: Vec<String>) -> Self {
        Self::wrap(CatalogError {
            code: code.into(),
            params,
        })
    }

    /// The effective error code.
    pub fn code(&self) -> &str {
        if let Some(code) = &self.code {
            return code;
        }
        self.cause.as_deref().map_or("", CodedError::code)
    }

    /// The message for `locale`, delegated to the cause.
    pub fn translate(&self, locale: &str) -> String {
        self.cause
            .as_deref()
            .map_or_else(String::new, |cause| cause.translate(locale))
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause.as_deref() {
            Some(cause) => write!(f, "{cause}"),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldError")
            .field("code", &self.code())
            .field("message", &self.to_string())
            .finish()
    }
}

impl StdError for FieldError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause()
    }
}

impl CodedError for FieldError {
    fn code(&self) -> &str {
        Self::code(self)
    }

    fn translate(&self, locale: &str) -> String {
        Self::translate(self, locale)
    }
}

/// A plain-text cause with no code and no translation.
#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for MessageError {}

impl CodedError for MessageError {}

/// A built-in cause whose message lives in the catalogs.
#[derive(Debug)]
struct CatalogError {
    code: String,
    params: Vec<String>,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            catalog::translate(&self.code, catalog::DEFAULT_LANGUAGE, &self.params)
        )
    }
}

impl StdError for CatalogError {}

impl CodedError for CatalogError {
    fn code(&self) -> &str {
        &self.code
    }

    fn translate(&self, locale: &str) -> String {
        catalog::translate(&self.code, locale, &self.params)
    }
}

/// Replaces each error whose code has a replacement registered in
/// `customized`; errors without a match pass through unchanged.
pub fn customize_errors(
    errors: Vec<FieldError>,
    customized: &HashMap<String, FieldError>,
) -> Vec<FieldError> {
    errors
        .into_iter()
        .map(|error| match customized.get(error.code()) {
            Some(replacement) => replacement.clone(),
            None => error,
        })
        .collect()
}

/// Errors raised by invalid field or form configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The auto-id pattern is neither empty nor a single-placeholder pattern.
    #[error("auto id must be empty or contain exactly one {{}} placeholder, got {0:?}")]
    InvalidAutoIdPattern(String),

    /// A field name was looked up that the form does not declare.
    #[error("no field named {0:?} in form")]
    UnknownField(String),

    /// An error was added to a form that has not been validated yet.
    #[error("cannot add an error to a form before validation; call is_valid, errors or cleaned_data first")]
    NotValidated,
}
