//! # formwork
//!
//! Server-side form definition, validation, and HTML rendering.
//!
//! A [`Form`] is an ordered set of [`Field`]s. Fields sanitize and validate
//! submitted values through a clean pipeline and render deterministic HTML
//! through a fixed set of [`Widget`]s. Error messages carry stable codes,
//! can be replaced per code, and translate to the locale selected from the
//! caller's language preferences.
//!
//! ```
//! use formwork::{Field, Form};
//! use std::collections::HashMap;
//!
//! let mut form = Form::new()
//!     .with_field(Field::char("Your Name"))
//!     .with_field(Field::email("Email"));
//!
//! let mut data = HashMap::new();
//! data.insert("your_name".to_string(), vec!["Alice".to_string()]);
//! data.insert("email".to_string(), vec!["alice@example.com".to_string()]);
//! form.bind(&data, &[]);
//!
//! assert!(form.is_valid());
//! assert_eq!(form.cleaned_data().get("email"), Some("alice@example.com"));
//! ```
//!
//! ## Modules
//!
//! - [`attrs`] - Attribute model with deterministic ordering
//! - [`sanitize`] - Plain-text sanitizers applied before validation
//! - [`widgets`] - The widget catalog
//! - [`choices`] - Choice options and option groups
//! - [`field`] - Field kinds and the clean pipeline
//! - [`form`] - The form aggregate

pub mod attrs;
pub mod choices;
pub mod field;
pub mod form;
pub mod sanitize;
pub mod widgets;

mod ids;
mod render;

// Re-export the most commonly used types at the crate root.
pub use attrs::{attr, bool_attr, AttrMap, Attribute};
pub use choices::ChoiceOption;
pub use field::{Field, FieldKind, ValidateFn, DEFAULT_AUTO_ID};
pub use form::{CleanedData, Form, FormErrors};
pub use formwork_core::{
    CodedError, ConfigError, FieldError, BOOLEAN_ERROR_CODE, CHOICE_ERROR_CODE,
    CUSTOMIZABLE_ERROR_CODES, EMAIL_ERROR_CODE, MAX_LENGTH_ERROR_CODE, MIN_LENGTH_ERROR_CODE,
    REQUIRED_ERROR_CODE, URL_ERROR_CODE,
};
pub use formwork_http::FormData;
pub use sanitize::SanitizeFn;
pub use widgets::Widget;
