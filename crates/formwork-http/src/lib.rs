//! # formwork-http
//!
//! The thin HTTP adapter for formwork. The caller extracts the raw
//! URL-encoded body or query string and the `Accept-Language` header from
//! its framework of choice; this crate turns them into a [`FormData`] a
//! form can bind.
//!
//! ## Modules
//!
//! - [`formdata`] - Multi-value dictionary parsed from URL-encoded input
//! - [`accept`] - `Accept-Language` parsing into q-ordered tags

pub mod accept;
pub mod formdata;

// Re-export the most commonly used types at the crate root.
pub use accept::parse_accept_language;
pub use formdata::FormData;
