//! Field definitions and the cleaning pipeline.
//!
//! A [`Field`] is one named input of a form: a [`FieldKind`] giving its
//! value semantics, a [`Widget`] giving its HTML shape, display metadata,
//! and the sanitize/validate machinery that turns raw submitted text into a
//! cleaned value plus errors.

use std::collections::HashMap;
use std::sync::Arc;

use formwork_core::error::{customize_errors, FieldError, CUSTOMIZABLE_ERROR_CODES};
use formwork_core::rules::{
    self, build_rules, choices_rule, max_rule, min_rule, validate_value, BOOLEAN_RULE, EMAIL_RULE,
    URL_RULE,
};

use crate::attrs::{AttrMap, Attribute};
use crate::choices::{self, ChoiceOption, OptionGroup};
use crate::ids;
use crate::sanitize::SanitizeFn;
use crate::widgets::Widget;

pub use crate::ids::DEFAULT_AUTO_ID;

/// Default `max_length` of a char field.
pub const DEFAULT_CHAR_MAX_LENGTH: u32 = 256;
/// Default `max_length` of an email field, the syntactic upper bound of an
/// address.
pub const DEFAULT_EMAIL_MAX_LENGTH: u32 = 254;

/// Value a boolean field cleans to when unchecked.
pub const BOOLEAN_EMPTY_VALUE: &str = "off";

/// A validator: sanitized value and required flag in, violations out.
pub type ValidateFn = Arc<dyn Fn(&str, bool) -> Vec<FieldError> + Send + Sync>;

/// The value semantics of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A checkbox-backed boolean.
    Boolean,
    /// Free text with length bounds.
    Char,
    /// An email address.
    Email,
    /// One value out of a declared option set.
    Choice,
    /// Any number of values out of a declared option set.
    MultipleChoice,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BooleanField",
            Self::Char => "CharField",
            Self::Email => "EmailField",
            Self::Choice => "ChoiceField",
            Self::MultipleChoice => "MultipleChoiceField",
        }
    }

    fn default_widget(self) -> Widget {
        match self {
            Self::Boolean => Widget::CheckboxInput,
            Self::Char => Widget::TextInput,
            Self::Email => Widget::EmailInput,
            Self::Choice => Widget::Select,
            Self::MultipleChoice => Widget::SelectMultiple,
        }
    }

    fn allows_widget(self, widget: Widget) -> bool {
        match self {
            Self::Boolean => matches!(widget, Widget::CheckboxInput | Widget::HiddenInput),
            Self::Char | Self::Email => widget.is_input(),
            Self::Choice => matches!(widget, Widget::Select | Widget::RadioSelect),
            Self::MultipleChoice => {
                matches!(widget, Widget::SelectMultiple | Widget::CheckboxSelectMultiple)
            }
        }
    }
}

/// One named input of a form.
#[derive(Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    widget: Widget,
    bound_values: Vec<String>,
    errors: Vec<FieldError>,
    option_groups: Vec<OptionGroup>,
    auto_id: String,
    label: String,
    label_suffix: String,
    safe: bool,
    help_text: String,
    required_css_class: String,
    error_css_class: String,
    attrs: AttrMap,
    min_length: u32,
    max_length: u32,
    not_required: bool,
    disabled: bool,
    empty_value: String,
    sanitize_fn: Option<SanitizeFn>,
    validate_fn: Option<ValidateFn>,
    custom_errors: HashMap<String, FieldError>,
    locale: String,
}

impl Field {
    fn base(name: impl Into<String>, kind: FieldKind, bound_values: Vec<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            widget: kind.default_widget(),
            bound_values,
            errors: Vec::new(),
            option_groups: Vec::new(),
            auto_id: DEFAULT_AUTO_ID.to_string(),
            label_suffix: String::new(),
            safe: false,
            help_text: String::new(),
            required_css_class: String::new(),
            error_css_class: String::new(),
            attrs: AttrMap::new(),
            min_length: 0,
            max_length: 0,
            not_required: false,
            disabled: false,
            empty_value: String::new(),
            sanitize_fn: None,
            validate_fn: None,
            custom_errors: HashMap::new(),
            locale: "en".to_string(),
        }
    }

    /// A boolean field with an unchecked initial state.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::boolean_with_initial(name, false)
    }

    /// A boolean field with an explicit initial state.
    pub fn boolean_with_initial(name: impl Into<String>, initial: bool) -> Self {
        let mut field = Self::base(name, FieldKind::Boolean, vec![initial.to_string()]);
        field.empty_value = BOOLEAN_EMPTY_VALUE.to_string();
        field
    }

    /// A char field with default bounds (`max_length` 256).
    pub fn char(name: impl Into<String>) -> Self {
        Self::char_with(name, "", "", 0, DEFAULT_CHAR_MAX_LENGTH)
    }

    /// A char field with explicit initial value, empty value, and bounds.
    /// A zero bound means unbounded.
    pub fn char_with(
        name: impl Into<String>,
        initial: impl Into<String>,
        empty_value: impl Into<String>,
        min_length: u32,
        max_length: u32,
    ) -> Self {
        let mut field = Self::base(name, FieldKind::Char, vec![initial.into()]);
        field.empty_value = empty_value.into();
        field.min_length = min_length;
        field.max_length = max_length;
        field
    }

    /// An email field with the default syntactic bound (`max_length` 254).
    pub fn email(name: impl Into<String>) -> Self {
        Self::email_with(name, "", "", 0, DEFAULT_EMAIL_MAX_LENGTH)
    }

    /// An email field with explicit initial value, empty value, and bounds.
    pub fn email_with(
        name: impl Into<String>,
        initial: impl Into<String>,
        empty_value: impl Into<String>,
        min_length: u32,
        max_length: u32,
    ) -> Self {
        let mut field = Self::base(name, FieldKind::Email, vec![initial.into()]);
        field.empty_value = empty_value.into();
        field.min_length = min_length;
        field.max_length = max_length;
        field
    }

    /// A char field that validates its value as an http(s) URL, rendered as
    /// `<input type="url">`. Unbounded by default.
    pub fn url(name: impl Into<String>) -> Self {
        Self::url_with(name, "", "", 0, 0)
    }

    /// A URL-validating char field with explicit initial value, empty value,
    /// and bounds.
    pub fn url_with(
        name: impl Into<String>,
        initial: impl Into<String>,
        empty_value: impl Into<String>,
        min_length: u32,
        max_length: u32,
    ) -> Self {
        let mut field = Self::base(name, FieldKind::Char, vec![initial.into()]);
        field.empty_value = empty_value.into();
        field.min_length = min_length;
        field.max_length = max_length;
        field.widget = Widget::UrlInput;
        let mut clauses = length_clauses(min_length, max_length);
        clauses.push(URL_RULE.to_string());
        field.validate_fn = Some(Arc::new(move |value, required| {
            validate_value(value, &build_rules(required, &clauses))
        }));
        field
    }

    /// A choice field with no initial selection. Options are declared with
    /// [`Field::choice_options`] / [`Field::grouped_choice_options`].
    pub fn choice(name: impl Into<String>) -> Self {
        Self::choice_with_initial(name, "")
    }

    /// A choice field with an initial selection.
    pub fn choice_with_initial(name: impl Into<String>, initial: impl Into<String>) -> Self {
        Self::base(name, FieldKind::Choice, vec![initial.into()])
    }

    /// A multiple-choice field with no initial selections.
    pub fn multiple_choice(name: impl Into<String>) -> Self {
        Self::multiple_choice_with_initials(name, Vec::new())
    }

    /// A multiple-choice field with initial selections.
    pub fn multiple_choice_with_initials(name: impl Into<String>, initials: Vec<String>) -> Self {
        Self::base(name, FieldKind::MultipleChoice, initials)
    }

    // ── Builder configuration ────────────────────────────────────────────

    /// Sets the visible label (defaults to the field name).
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    /// Marks the label as pre-escaped HTML, rendered verbatim.
    #[must_use]
    pub fn safe(mut self) -> Self {
        self.safe = true;
        self
    }

    /// Sets the help text, rendered verbatim below the widget.
    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.set_help_text(help_text);
        self
    }

    /// Makes the field optional.
    #[must_use]
    pub fn not_required(mut self) -> Self {
        self.set_not_required();
        self
    }

    /// Marks the field disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.set_disabled();
        self
    }

    /// Sets the widget.
    ///
    /// # Panics
    ///
    /// Panics when the widget cannot render this kind of field, e.g. a
    /// `Select` on a `CharField`.
    #[must_use]
    pub fn widget(mut self, widget: Widget) -> Self {
        self.set_widget(widget);
        self
    }

    /// Replaces the custom attributes.
    ///
    /// # Panics
    ///
    /// Panics when an attribute is named `type`, `name`, or `value`.
    #[must_use]
    pub fn with_attributes(mut self, attributes: &[Attribute]) -> Self {
        self.set_attributes(attributes);
        self
    }

    /// Appends top-level options.
    #[must_use]
    pub fn choice_options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.add_choice_options("", options);
        self
    }

    /// Appends a named option group.
    #[must_use]
    pub fn grouped_choice_options(
        mut self,
        group: impl Into<String>,
        options: Vec<ChoiceOption>,
    ) -> Self {
        self.add_choice_options(group, options);
        self
    }

    /// Sets the auto-id pattern. Empty disables id generation; anything
    /// else must contain exactly one `{}` placeholder.
    pub fn auto_id(mut self, pattern: impl Into<String>) -> Result<Self, formwork_core::ConfigError> {
        self.set_auto_id(pattern)?;
        Ok(self)
    }

    /// Sets the label suffix, appended unless the label already ends in
    /// `.`, `!`, `?`, or `:`.
    #[must_use]
    pub fn label_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.set_label_suffix(suffix);
        self
    }

    /// Sets the CSS class added to the container and label of a required
    /// field.
    #[must_use]
    pub fn required_css_class(mut self, class: impl Into<String>) -> Self {
        self.set_required_css_class(class);
        self
    }

    /// Sets the CSS class added to the container and widget of a field with
    /// errors.
    #[must_use]
    pub fn error_css_class(mut self, class: impl Into<String>) -> Self {
        self.set_error_css_class(class);
        self
    }

    /// Replaces the built-in error reported under `error.code()` with
    /// `error`.
    ///
    /// # Panics
    ///
    /// Panics when the code is not one of the customizable built-in codes.
    #[must_use]
    pub fn customize_error(mut self, error: FieldError) -> Self {
        let code = error.code().to_string();
        assert!(
            CUSTOMIZABLE_ERROR_CODES.contains(&code.as_str()),
            "cannot customize errors with code {code:?}; customizable codes are {CUSTOMIZABLE_ERROR_CODES:?}",
        );
        self.custom_errors.insert(code, error);
        self
    }

    // ── Setters ──────────────────────────────────────────────────────────

    /// See [`Field::label`].
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// See [`Field::help_text`].
    pub fn set_help_text(&mut self, help_text: impl Into<String>) {
        self.help_text = help_text.into();
    }

    /// See [`Field::not_required`].
    pub fn set_not_required(&mut self) {
        self.not_required = true;
    }

    /// See [`Field::disabled`].
    pub fn set_disabled(&mut self) {
        self.disabled = true;
    }

    /// See [`Field::widget`].
    pub fn set_widget(&mut self, widget: Widget) {
        assert!(
            self.kind.allows_widget(widget),
            "a {} cannot render as {widget:?}",
            self.kind.name(),
        );
        self.widget = widget;
    }

    /// See [`Field::with_attributes`].
    pub fn set_attributes(&mut self, attributes: &[Attribute]) {
        self.attrs = AttrMap::from_attributes(attributes);
    }

    /// Appends options under `group`; an empty group label means top-level
    /// options.
    pub fn add_choice_options(&mut self, group: impl Into<String>, options: Vec<ChoiceOption>) {
        assert!(
            matches!(self.kind, FieldKind::Choice | FieldKind::MultipleChoice),
            "cannot add choice options to a {}",
            self.kind.name(),
        );
        self.option_groups.push(OptionGroup {
            label: group.into(),
            options,
        });
    }

    /// See [`Field::auto_id`].
    pub fn set_auto_id(
        &mut self,
        pattern: impl Into<String>,
    ) -> Result<(), formwork_core::ConfigError> {
        let pattern = pattern.into();
        ids::validate_auto_id(&pattern)?;
        self.auto_id = pattern;
        Ok(())
    }

    /// See [`Field::label_suffix`].
    pub fn set_label_suffix(&mut self, suffix: impl Into<String>) {
        self.label_suffix = suffix.into();
    }

    /// See [`Field::required_css_class`].
    pub fn set_required_css_class(&mut self, class: impl Into<String>) {
        self.required_css_class = class.into();
    }

    /// See [`Field::error_css_class`].
    pub fn set_error_css_class(&mut self, class: impl Into<String>) {
        self.error_css_class = class.into();
    }

    /// Sets the locale errors translate to, normally propagated by the form
    /// at bind time.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Propagation path for a pattern the form already validated.
    pub(crate) fn set_auto_id_unchecked(&mut self, pattern: &str) {
        self.auto_id = pattern.to_string();
    }

    /// Replaces the sanitizer. The update closure receives the sanitizer in
    /// effect (custom or the widget default) so it can wrap it.
    pub fn set_sanitize_fn(&mut self, update: impl FnOnce(SanitizeFn) -> SanitizeFn) {
        self.sanitize_fn = Some(update(self.current_sanitize_fn()));
    }

    /// Replaces the validator. The update closure receives the validator in
    /// effect (custom or the kind default with the current constraints) so
    /// it can wrap it.
    pub fn set_validate_fn(&mut self, update: impl FnOnce(ValidateFn) -> ValidateFn) {
        self.validate_fn = Some(update(self.current_validate_fn()));
    }

    // ── Readers ──────────────────────────────────────────────────────────

    /// The declared (display) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized name used for the HTML `name` attribute and data keys.
    pub fn html_name(&self) -> String {
        ids::normalize_name(&self.name)
    }

    /// The element id under the current auto-id pattern, empty when ids are
    /// disabled.
    pub fn html_id(&self) -> String {
        ids::apply_auto_id(&self.auto_id, &self.html_name())
    }

    /// The current auto-id pattern.
    pub fn auto_id_pattern(&self) -> &str {
        &self.auto_id
    }

    /// The field's value semantics.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The widget the field renders as.
    pub fn widget_kind(&self) -> Widget {
        self.widget
    }

    /// Whether a value must be submitted.
    pub fn required(&self) -> bool {
        !self.not_required
    }

    /// Whether the field is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the label is rendered verbatim.
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// The visible label.
    pub fn label_text(&self) -> &str {
        &self.label
    }

    /// The configured label suffix.
    pub fn label_suffix_text(&self) -> &str {
        &self.label_suffix
    }

    /// The help text.
    pub fn help_text_value(&self) -> &str {
        &self.help_text
    }

    /// Whether help text is set.
    pub fn has_help_text(&self) -> bool {
        !self.help_text.is_empty()
    }

    /// The values the field currently holds: initial values until the first
    /// clean, the raw submitted values afterwards.
    pub fn bound_values(&self) -> &[String] {
        &self.bound_values
    }

    /// The errors recorded by the last clean plus any added afterwards.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any error is recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The locale errors translate to.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub(crate) fn min_length(&self) -> u32 {
        self.min_length
    }

    pub(crate) fn max_length(&self) -> u32 {
        self.max_length
    }

    pub(crate) fn custom_attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub(crate) fn option_groups(&self) -> &[OptionGroup] {
        &self.option_groups
    }

    pub(crate) fn required_css(&self) -> &str {
        &self.required_css_class
    }

    pub(crate) fn error_css(&self) -> &str {
        &self.error_css_class
    }

    pub(crate) fn add_error(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    // ── Cleaning ─────────────────────────────────────────────────────────

    /// Cleans a single submitted value: records it as the bound value,
    /// sanitizes, validates, and applies customized errors. Returns the
    /// cleaned value and the errors, which are also stored on the field.
    ///
    /// An optional field cleans an empty sanitized value to its empty value
    /// with no errors.
    ///
    /// # Panics
    ///
    /// Panics on a `MultipleChoiceField`; use [`Field::clean_values`].
    pub fn clean(&mut self, value: &str) -> (String, Vec<FieldError>) {
        assert!(
            self.kind != FieldKind::MultipleChoice,
            "clean takes a single value; use clean_values on a MultipleChoiceField",
        );
        self.bound_values = vec![value.to_string()];
        let sanitized = self.current_sanitize_fn()(value);
        if self.not_required && sanitized.is_empty() {
            self.errors = Vec::new();
            return (self.empty_value.clone(), Vec::new());
        }
        let errors = customize_errors(
            self.current_validate_fn()(&sanitized, self.required()),
            &self.custom_errors,
        );
        self.errors.clone_from(&errors);
        (sanitized, errors)
    }

    /// Cleans the submitted values of any field kind. Single-value kinds
    /// clean the first value (or empty when none was submitted) and yield at
    /// most one cleaned value.
    ///
    /// A multiple-choice field treats required over the whole list: all
    /// values empty is only an error when the field is required. Each value
    /// is then validated individually as optional and all errors are
    /// concatenated.
    pub fn clean_values(&mut self, values: &[String]) -> (Vec<String>, Vec<FieldError>) {
        if self.kind != FieldKind::MultipleChoice {
            let first = values.first().map_or("", String::as_str);
            let (cleaned, errors) = self.clean(first);
            if errors.is_empty() {
                return (vec![cleaned], errors);
            }
            return (Vec::new(), errors);
        }

        self.bound_values = values.to_vec();
        let sanitize = self.current_sanitize_fn();
        let sanitized: Vec<String> = values.iter().map(|value| sanitize(value)).collect();
        if sanitized.iter().all(String::is_empty) {
            if self.required() {
                let errors = customize_errors(
                    validate_value("", rules::REQUIRED_RULE),
                    &self.custom_errors,
                );
                self.errors.clone_from(&errors);
                return (Vec::new(), errors);
            }
            self.errors = Vec::new();
            return (Vec::new(), Vec::new());
        }

        let validate = self.current_validate_fn();
        let mut errors = Vec::new();
        for value in &sanitized {
            let violations = validate(value, false);
            if !violations.is_empty() {
                errors.extend(customize_errors(violations, &self.custom_errors));
            }
        }
        self.errors.clone_from(&errors);
        (sanitized, errors)
    }

    /// Cleans `value` and returns it as a boolean.
    ///
    /// # Panics
    ///
    /// Panics when the field is not a `BooleanField` or the value does not
    /// clean without errors.
    pub fn must_bool(&mut self, value: &str) -> bool {
        assert!(
            self.kind == FieldKind::Boolean,
            "must_bool called on a {}",
            self.kind.name(),
        );
        let (cleaned, errors) = self.clean(value);
        assert!(
            errors.is_empty(),
            "must_bool on invalid value {value:?}: {}",
            errors[0],
        );
        rules::parse_bool(&cleaned).unwrap_or(false)
    }

    /// Cleans `value` and returns it as a validated email address.
    ///
    /// # Panics
    ///
    /// Panics when the field is not an `EmailField` or the value does not
    /// clean without errors.
    pub fn must_email(&mut self, value: &str) -> String {
        assert!(
            self.kind == FieldKind::Email,
            "must_email called on a {}",
            self.kind.name(),
        );
        let (cleaned, errors) = self.clean(value);
        assert!(
            errors.is_empty(),
            "must_email on invalid value {value:?}: {}",
            errors[0],
        );
        cleaned
    }

    fn current_sanitize_fn(&self) -> SanitizeFn {
        self.sanitize_fn
            .clone()
            .unwrap_or_else(|| self.widget.default_sanitize_fn())
    }

    fn current_validate_fn(&self) -> ValidateFn {
        self.validate_fn
            .clone()
            .unwrap_or_else(|| self.default_validate_fn())
    }

    /// The kind's stock validator, capturing the current constraints.
    fn default_validate_fn(&self) -> ValidateFn {
        match self.kind {
            FieldKind::Boolean => Arc::new(|value, required| {
                validate_value(value, &build_rules(required, &[BOOLEAN_RULE.to_string()]))
            }),
            FieldKind::Char => {
                let clauses = length_clauses(self.min_length, self.max_length);
                Arc::new(move |value, required| {
                    validate_value(value, &build_rules(required, &clauses))
                })
            }
            FieldKind::Email => {
                let mut clauses = length_clauses(self.min_length, self.max_length);
                clauses.push(EMAIL_RULE.to_string());
                Arc::new(move |value, required| {
                    validate_value(value, &build_rules(required, &clauses))
                })
            }
            FieldKind::Choice | FieldKind::MultipleChoice => {
                let values = choices::option_values(&self.option_groups);
                Arc::new(move |value, required| {
                    if !required && value.is_empty() {
                        return Vec::new();
                    }
                    validate_value(value, &build_rules(required, &[choices_rule(&values)]))
                })
            }
        }
    }
}

fn length_clauses(min_length: u32, max_length: u32) -> Vec<String> {
    let mut clauses = Vec::new();
    if min_length > 0 {
        clauses.push(min_rule(min_length));
    }
    if max_length > 0 {
        clauses.push(max_rule(max_length));
    }
    clauses
}
