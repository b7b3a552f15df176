//! # formwork-core
//!
//! Error model, message catalogs, and the string-rule validation engine for
//! the formwork toolkit. This crate carries no HTML knowledge; it only knows
//! about values, rules, codes, and locales.
//!
//! ## Modules
//!
//! - [`error`] - The wrapped-error model and configuration errors
//! - [`catalog`] - English/French message catalogs and locale selection
//! - [`rules`] - The comma-joined rule-spec grammar and its evaluator

pub mod catalog;
pub mod error;
pub mod rules;

// Re-export the most commonly used types at the crate root.
pub use error::{
    customize_errors, CodedError, ConfigError, FieldError, BOOLEAN_ERROR_CODE, CHOICE_ERROR_CODE,
    CUSTOMIZABLE_ERROR_CODES, EMAIL_ERROR_CODE, MAX_LENGTH_ERROR_CODE, MIN_LENGTH_ERROR_CODE,
    REQUIRED_ERROR_CODE, URL_ERROR_CODE,
};
