//! The form aggregate: an ordered set of fields bound to submitted data.
//!
//! A form is bound at most once. Validation is lazy and memoized: the first
//! call to [`Form::is_valid`], [`Form::cleaned_data`], or [`Form::errors`]
//! cleans every field, runs the form-level clean hook, and caches the
//! outcome; later calls reuse it.

use std::collections::HashMap;
use std::sync::Arc;

use formwork_core::catalog::select_language;
use formwork_core::{ConfigError, FieldError};
use formwork_http::FormData;

use crate::field::{Field, DEFAULT_AUTO_ID};
use crate::ids;

/// Cleaned values per normalized field name. Fields whose validation failed
/// do not appear.
#[derive(Debug, Clone, Default)]
pub struct CleanedData(HashMap<String, Vec<String>>);

impl CleanedData {
    /// The first cleaned value of `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All cleaned values of `field`, if any.
    pub fn get_list(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether `field` cleaned without errors.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields with cleaned values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field cleaned successfully.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: String, values: Vec<String>) {
        self.0.insert(field, values);
    }

    fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }
}

/// Validation errors per normalized field name. Valid fields do not appear.
#[derive(Debug, Clone, Default)]
pub struct FormErrors(HashMap<String, Vec<FieldError>>);

impl FormErrors {
    /// The first error of `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field).and_then(|errors| errors.first())
    }

    /// All errors of `field`, if any.
    pub fn get_list(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether `field` has at least one error.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field has errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, field: String, error: FieldError) {
        self.0.entry(field).or_default().push(error);
    }

    fn insert(&mut self, field: String, errors: Vec<FieldError>) {
        self.0.insert(field, errors);
    }
}

/// The form-level clean hook, run once after all fields cleaned.
type CleanFn = Arc<dyn Fn(&mut Form) + Send + Sync>;

/// An ordered set of fields with shared defaults and bind-once validation.
#[derive(Clone)]
pub struct Form {
    fields: Vec<Field>,
    field_names: Vec<String>,
    auto_id: String,
    required_css_class: String,
    error_css_class: String,
    label_suffix: String,
    locales: Vec<String>,
    bound: bool,
    validated: bool,
    bound_data: HashMap<String, Vec<String>>,
    cleaned_data: CleanedData,
    errors: FormErrors,
    clean_fn: Option<CleanFn>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Creates an empty form with the default auto-id pattern.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            field_names: Vec::new(),
            auto_id: DEFAULT_AUTO_ID.to_string(),
            required_css_class: String::new(),
            error_css_class: String::new(),
            label_suffix: String::new(),
            locales: Vec::new(),
            bound: false,
            validated: false,
            bound_data: HashMap::new(),
            cleaned_data: CleanedData::default(),
            errors: FormErrors::default(),
            clean_fn: None,
        }
    }

    // ── Builder configuration ────────────────────────────────────────────

    /// Appends a field, propagating the form-wide defaults into it when the
    /// field still carries the library default for the setting.
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.add_field(field);
        self
    }

    /// See [`Form::with_field`].
    pub fn add_field(&mut self, mut field: Field) {
        self.field_names.push(field.html_name());
        if field.label_suffix_text().is_empty() && !self.label_suffix.is_empty() {
            field.set_label_suffix(&self.label_suffix);
        }
        if field.required_css().is_empty() && !self.required_css_class.is_empty() {
            field.set_required_css_class(&self.required_css_class);
        }
        if field.error_css().is_empty() && !self.error_css_class.is_empty() {
            field.set_error_css_class(&self.error_css_class);
        }
        if self.auto_id != DEFAULT_AUTO_ID && field.auto_id_pattern() == DEFAULT_AUTO_ID {
            field.set_auto_id_unchecked(&self.auto_id);
        }
        if let Some(locale) = self.locales.first() {
            if field.locale() == "en" {
                field.set_locale(locale.clone());
            }
        }
        self.fields.push(field);
    }

    /// Sets the auto-id pattern for all fields that still carry the library
    /// default. Empty disables ids; anything else must contain exactly one
    /// `{}` placeholder.
    pub fn auto_id(mut self, pattern: impl Into<String>) -> Result<Self, ConfigError> {
        self.set_auto_id(pattern)?;
        Ok(self)
    }

    /// Disables id generation for all fields that still carry the library
    /// default pattern. Without ids, fields render no `<label>` tag.
    #[must_use]
    pub fn disable_auto_id(mut self) -> Self {
        self.propagate_auto_id("");
        self
    }

    /// See [`Form::auto_id`].
    pub fn set_auto_id(&mut self, pattern: impl Into<String>) -> Result<(), ConfigError> {
        let pattern = pattern.into();
        ids::validate_auto_id(&pattern)?;
        self.propagate_auto_id(&pattern);
        Ok(())
    }

    fn propagate_auto_id(&mut self, pattern: &str) {
        self.auto_id = pattern.to_string();
        if pattern == DEFAULT_AUTO_ID {
            return;
        }
        for field in &mut self.fields {
            if field.auto_id_pattern() == DEFAULT_AUTO_ID {
                field.set_auto_id_unchecked(pattern);
            }
        }
    }

    /// Sets the label suffix for all fields without one of their own.
    #[must_use]
    pub fn label_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.set_label_suffix(suffix);
        self
    }

    /// See [`Form::label_suffix`].
    pub fn set_label_suffix(&mut self, suffix: impl Into<String>) {
        self.label_suffix = suffix.into();
        for field in &mut self.fields {
            if field.label_suffix_text().is_empty() {
                field.set_label_suffix(&self.label_suffix);
            }
        }
    }

    /// Sets the required CSS class for all fields without one of their own.
    #[must_use]
    pub fn required_css_class(mut self, class: impl Into<String>) -> Self {
        self.required_css_class = class.into();
        for field in &mut self.fields {
            if field.required_css().is_empty() {
                field.set_required_css_class(&self.required_css_class);
            }
        }
        self
    }

    /// Sets the error CSS class for all fields without one of their own.
    #[must_use]
    pub fn error_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_css_class = class.into();
        for field in &mut self.fields {
            if field.error_css().is_empty() {
                field.set_error_css_class(&self.error_css_class);
            }
        }
        self
    }

    /// Sets the locales error messages may translate to. The locale actually
    /// used is selected at bind time from the caller's language preferences.
    #[must_use]
    pub fn locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        if let Some(locale) = self.locales.first().cloned() {
            for field in &mut self.fields {
                if field.locale() == "en" {
                    field.set_locale(locale.clone());
                }
            }
        }
        self
    }

    /// Sets the form-level clean hook, run once after every field cleaned.
    /// Use [`Form::add_error`] inside it for cross-field validation.
    pub fn set_clean_fn(&mut self, clean: impl Fn(&mut Self) + Send + Sync + 'static) {
        self.clean_fn = Some(Arc::new(clean));
    }

    // ── Binding ──────────────────────────────────────────────────────────

    /// Binds submitted data and language preferences to the form. Only the
    /// first bind takes effect; data is filtered to the declared field names
    /// and validation stays lazy.
    pub fn bind(&mut self, data: &HashMap<String, Vec<String>>, langs: &[&str]) {
        if self.bound {
            return;
        }
        self.bound = true;
        for name in &self.field_names {
            if let Some(values) = data.get(name) {
                self.bound_data.insert(name.clone(), values.clone());
            }
        }
        let preferences: Vec<String> = langs.iter().map(ToString::to_string).collect();
        let locale = select_language(&self.locales, &preferences);
        tracing::debug!(
            fields = self.fields.len(),
            keys = self.bound_data.len(),
            %locale,
            "bound form data",
        );
        for field in &mut self.fields {
            field.set_locale(locale.clone());
        }
    }

    /// Binds a [`FormData`], using its captured `Accept-Language` header as
    /// the language preferences.
    pub fn bind_form_data(&mut self, data: &FormData) {
        let preferences = data.language_preferences();
        let langs: Vec<&str> = preferences.iter().map(String::as_str).collect();
        self.bind(data.as_map(), &langs);
    }

    /// Whether data has been bound.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    // ── Validation ───────────────────────────────────────────────────────

    /// Returns `true` when the form is bound and every field validated
    /// without errors. Runs validation on first use.
    pub fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }
        self.validate_if_needed();
        self.errors.is_empty()
    }

    /// The cleaned values of the fields that validated. Empty when unbound.
    pub fn cleaned_data(&mut self) -> &CleanedData {
        if self.bound {
            self.validate_if_needed();
        }
        &self.cleaned_data
    }

    /// The validation errors per field. Empty when unbound.
    pub fn errors(&mut self) -> &FormErrors {
        if self.bound {
            self.validate_if_needed();
        }
        &self.errors
    }

    /// Adds an error to the field named `field` and evicts its cleaned
    /// values. Only legal once the form has been validated, which makes it
    /// the tool for cross-field checks inside the clean hook.
    pub fn add_error(&mut self, field: &str, error: FieldError) -> Result<(), ConfigError> {
        if !self.validated {
            return Err(ConfigError::NotValidated);
        }
        let index = self
            .field_index(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        let name = self.field_names[index].clone();
        tracing::debug!(field = %name, code = error.code(), "added form-level error");
        self.fields[index].add_error(error.clone());
        self.errors.push(name.clone(), error);
        self.cleaned_data.remove(&name);
        Ok(())
    }

    fn validate_if_needed(&mut self) {
        if self.validated {
            return;
        }
        self.validated = true;
        for index in 0..self.fields.len() {
            let name = self.field_names[index].clone();
            let values = self.bound_data.get(&name).cloned().unwrap_or_default();
            let (cleaned, errors) = self.fields[index].clean_values(&values);
            if errors.is_empty() {
                self.cleaned_data.insert(name, cleaned);
            } else {
                self.errors.insert(name, errors);
            }
        }
        tracing::debug!(
            cleaned = self.cleaned_data.len(),
            failed = self.errors.len(),
            "validated form",
        );
        if let Some(clean) = self.clean_fn.clone() {
            clean(self);
        }
    }

    // ── Access and rendering ─────────────────────────────────────────────

    /// The fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The field whose normalized name matches `field` (the raw name is
    /// normalized before comparing).
    pub fn field_by_name(&self, field: &str) -> Result<&Field, ConfigError> {
        self.field_index(field)
            .map(|index| &self.fields[index])
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))
    }

    /// Mutable variant of [`Form::field_by_name`].
    pub fn field_by_name_mut(&mut self, field: &str) -> Result<&mut Field, ConfigError> {
        let index = self
            .field_index(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        Ok(&mut self.fields[index])
    }

    fn field_index(&self, field: &str) -> Option<usize> {
        let normalized = ids::normalize_name(field);
        self.field_names
            .iter()
            .position(|name| *name == field || *name == normalized)
    }

    /// Renders the form as one `<div>` per field, each on its own line.
    pub fn as_div(&self) -> String {
        let mut out = String::new();
        for field in &self.fields {
            out.push('\n');
            out.push_str(&field.as_div());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::ChoiceOption;
    use formwork_core::error::{EMAIL_ERROR_CODE, REQUIRED_ERROR_CODE};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn contact_form() -> Form {
        Form::new()
            .with_field(Field::char("Your Name"))
            .with_field(Field::email("Email"))
            .with_field(Field::boolean("Subscribe").not_required())
    }

    fn data(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(key, values)| {
                (
                    (*key).to_string(),
                    values.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_valid_submission() {
        let mut form = contact_form();
        form.bind(
            &data(&[
                ("your_name", &["Alice"]),
                ("email", &["alice@example.com"]),
                ("subscribe", &["on"]),
            ]),
            &[],
        );
        assert!(form.is_valid());
        assert_eq!(form.cleaned_data().get("your_name"), Some("Alice"));
        assert_eq!(form.cleaned_data().get("email"), Some("alice@example.com"));
        assert_eq!(form.cleaned_data().get("subscribe"), Some("on"));
    }

    #[test]
    fn test_invalid_field_lands_in_errors_not_cleaned_data() {
        let mut form = contact_form();
        form.bind(
            &data(&[("your_name", &["Alice"]), ("email", &["nope"])]),
            &[],
        );
        assert!(!form.is_valid());
        let errors = form.errors();
        assert_eq!(
            errors.get("email").map(FieldError::code),
            Some(EMAIL_ERROR_CODE)
        );
        assert!(!errors.has("your_name"));
        assert!(!form.cleaned_data().has("email"));
        assert!(form.cleaned_data().has("your_name"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut form = contact_form();
        form.bind(&data(&[("email", &["a@b.com"])]), &[]);
        assert!(!form.is_valid());
        assert_eq!(
            form.errors().get("your_name").map(FieldError::code),
            Some(REQUIRED_ERROR_CODE)
        );
        // Optional boolean cleans to its empty value without input.
        assert_eq!(form.cleaned_data().get("subscribe"), Some("off"));
    }

    #[test]
    fn test_bind_only_once() {
        let mut form = contact_form();
        form.bind(&data(&[("your_name", &["First"])]), &[]);
        form.bind(&data(&[("your_name", &["Second"])]), &[]);
        form.is_valid();
        assert_eq!(form.cleaned_data().get("your_name"), Some("First"));
    }

    #[test]
    fn test_unbound_form() {
        let mut form = contact_form();
        assert!(!form.is_valid());
        assert!(form.cleaned_data().is_empty());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_undeclared_keys_are_filtered() {
        let mut form = Form::new().with_field(Field::char("name"));
        form.bind(
            &data(&[("name", &["x"]), ("sneaky", &["y"])]),
            &[],
        );
        form.is_valid();
        assert!(!form.cleaned_data().has("sneaky"));
    }

    #[test]
    fn test_validation_is_memoized() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let mut form = Form::new().with_field(Field::char("name"));
        form.set_clean_fn(|_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
        });
        form.bind(&data(&[("name", &["x"])]), &[]);
        form.is_valid();
        form.is_valid();
        let _ = form.errors();
        let _ = form.cleaned_data();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clean_fn_cross_field_validation() {
        let mut form = Form::new()
            .with_field(Field::char("password"))
            .with_field(Field::char("confirm"));
        form.set_clean_fn(|form| {
            let password = form.cleaned_data().get("password").map(str::to_string);
            let confirm = form.cleaned_data().get("confirm").map(str::to_string);
            if password != confirm {
                form.add_error("confirm", FieldError::message("passwords do not match"))
                    .unwrap();
            }
        });
        form.bind(
            &data(&[("password", &["secret"]), ("confirm", &["other"])]),
            &[],
        );
        assert!(!form.is_valid());
        assert_eq!(
            form.errors().get("confirm").map(ToString::to_string),
            Some("passwords do not match".to_string())
        );
        assert!(!form.cleaned_data().has("confirm"));
        // The field itself carries the error too, for rendering.
        assert!(form.field_by_name("confirm").unwrap().has_errors());
    }

    #[test]
    fn test_add_error_before_validation_fails() {
        let mut form = Form::new().with_field(Field::char("name"));
        form.bind(&data(&[("name", &["x"])]), &[]);
        let result = form.add_error("name", FieldError::message("nope"));
        assert!(matches!(result, Err(ConfigError::NotValidated)));
    }

    #[test]
    fn test_add_error_unknown_field() {
        let mut form = Form::new().with_field(Field::char("name"));
        form.bind(&data(&[("name", &["x"])]), &[]);
        form.is_valid();
        let result = form.add_error("missing", FieldError::message("nope"));
        assert!(matches!(result, Err(ConfigError::UnknownField(_))));
    }

    #[test]
    fn test_locale_selection_and_translation() {
        let mut form = Form::new()
            .with_field(Field::email("Email"))
            .locales(vec!["en".to_string(), "fr".to_string()]);
        form.bind(&data(&[("email", &["nope"])]), &["fr-CH", "en"]);
        form.is_valid();
        let field = form.field_by_name("email").unwrap();
        assert_eq!(field.locale(), "fr");
        assert_eq!(
            form.errors().get("email").map(|e| e.translate("fr")),
            Some("Entrez une adresse e-mail valide".to_string())
        );
    }

    #[test]
    fn test_auto_id_propagates_only_to_default_fields() {
        let custom = Field::char("a")
            .auto_id("custom_{}")
            .unwrap_or_else(|_| unreachable!());
        let form = Form::new()
            .with_field(custom)
            .with_field(Field::char("b"))
            .auto_id("form_{}")
            .unwrap();
        assert_eq!(form.fields()[0].html_id(), "custom_a");
        assert_eq!(form.fields()[1].html_id(), "form_b");
    }

    #[test]
    fn test_css_classes_propagate_only_to_default_fields() {
        let own = Field::char("a").required_css_class("mine");
        let form = Form::new()
            .with_field(own)
            .with_field(Field::char("b"))
            .required_css_class("theirs");
        assert_eq!(form.fields()[0].required_css(), "mine");
        assert_eq!(form.fields()[1].required_css(), "theirs");
    }

    #[test]
    fn test_label_suffix_propagation() {
        let form = Form::new()
            .with_field(Field::char("a"))
            .label_suffix(":");
        assert_eq!(
            form.fields()[0].label_tag(),
            "<label for=\"id_a\">a:</label>"
        );
    }

    #[test]
    fn test_field_lookup_normalizes() {
        let form = Form::new().with_field(Field::char("Your Name"));
        assert!(form.field_by_name("your_name").is_ok());
        assert!(form.field_by_name("Your Name").is_ok());
        assert!(form.field_by_name("other").is_err());
    }

    #[test]
    fn test_as_div_joins_fields_with_newlines() {
        let form = Form::new()
            .with_field(Field::char("a"))
            .with_field(Field::char("b"));
        let html = form.as_div();
        assert!(html.starts_with("\n<div>"));
        assert_eq!(html.matches("<div>").count(), 2);
        assert!(html.contains("</div>\n<div>"));
    }

    #[test]
    fn test_bind_form_data_uses_accept_language() {
        let mut form = Form::new()
            .with_field(Field::email("Email"))
            .locales(vec!["fr".to_string()]);
        let submitted = FormData::parse("email=nope").with_accept_language("fr;q=0.9, en;q=0.8");
        form.bind_form_data(&submitted);
        form.is_valid();
        assert_eq!(form.field_by_name("email").unwrap().locale(), "fr");
    }
}
