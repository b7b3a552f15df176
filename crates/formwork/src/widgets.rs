//! The widget catalog.
//!
//! A [`Widget`] names the HTML control a field renders as. The set is
//! closed; rendering dispatches on the variant, so every combination a
//! field can be configured with has a defined shape.

use std::sync::Arc;

use crate::sanitize::{self, SanitizeFn};

/// The HTML control rendered for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="url">`.
    UrlInput,
    /// `<input type="password">`.
    PasswordInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<textarea>`.
    TextArea,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
    /// A `<div>` of radio inputs, one per option.
    RadioSelect,
    /// A `<div>` of checkbox inputs, one per option.
    CheckboxSelectMultiple,
}

impl Widget {
    /// The `type` attribute for input-shaped widgets.
    ///
    /// # Panics
    ///
    /// Panics for `Select` and `SelectMultiple`, which render no input.
    pub fn input_type(self) -> &'static str {
        match self {
            Self::TextInput => "text",
            Self::EmailInput => "email",
            Self::UrlInput => "url",
            Self::PasswordInput => "password",
            Self::HiddenInput => "hidden",
            Self::TextArea => "textarea",
            Self::CheckboxInput => "checkbox",
            Self::RadioSelect => "radio",
            Self::CheckboxSelectMultiple => "checkbox",
            Self::Select | Self::SelectMultiple => {
                panic!("{self:?} renders no input element")
            }
        }
    }

    /// Whether the widget renders a single `<input>`/`<textarea>`.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            Self::TextInput
                | Self::EmailInput
                | Self::UrlInput
                | Self::PasswordInput
                | Self::HiddenInput
                | Self::TextArea
                | Self::CheckboxInput
        )
    }

    /// Whether the widget renders a set of options.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Select | Self::SelectMultiple | Self::RadioSelect | Self::CheckboxSelectMultiple
        )
    }

    /// Whether the widget submits multiple values.
    pub fn is_multi_choice(self) -> bool {
        matches!(self, Self::SelectMultiple | Self::CheckboxSelectMultiple)
    }

    /// The widget each option of a choice widget renders as.
    pub fn option_widget(self) -> Self {
        match self {
            Self::CheckboxSelectMultiple => Self::CheckboxInput,
            other => other,
        }
    }

    /// The selected-state attribute name, when `selected` holds. Checkbox
    /// and radio inputs use `checked`, select options use `selected`.
    pub fn selected_attr(self, selected: bool) -> Option<&'static str> {
        if !selected {
            return None;
        }
        match self {
            Self::CheckboxInput | Self::RadioSelect | Self::CheckboxSelectMultiple => {
                Some("checked")
            }
            Self::Select | Self::SelectMultiple => Some("selected"),
            _ => None,
        }
    }

    /// Checkbox inputs carry their state in `checked`, never in `value`.
    pub fn omits_value_attr(self) -> bool {
        self == Self::CheckboxInput
    }

    /// Whether the widget wraps its options in `<fieldset>` + `<legend>`.
    pub fn uses_fieldset(self) -> bool {
        matches!(self, Self::RadioSelect | Self::CheckboxSelectMultiple)
    }

    /// The sanitizer applied to submitted values when the field has no
    /// custom one. Only the textarea keeps newlines.
    pub fn default_sanitize_fn(self) -> SanitizeFn {
        match self {
            Self::TextArea => Arc::new(|value| sanitize::plain_text(value)),
            _ => Arc::new(|value| sanitize::one_line_plain_text(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_types() {
        assert_eq!(Widget::TextInput.input_type(), "text");
        assert_eq!(Widget::EmailInput.input_type(), "email");
        assert_eq!(Widget::CheckboxInput.input_type(), "checkbox");
        assert_eq!(Widget::RadioSelect.input_type(), "radio");
        assert_eq!(Widget::CheckboxSelectMultiple.input_type(), "checkbox");
    }

    #[test]
    #[should_panic(expected = "renders no input element")]
    fn test_select_has_no_input_type() {
        let _ = Widget::Select.input_type();
    }

    #[test]
    fn test_classification() {
        assert!(Widget::TextArea.is_input());
        assert!(!Widget::Select.is_input());
        assert!(Widget::RadioSelect.is_choice());
        assert!(Widget::SelectMultiple.is_multi_choice());
        assert!(!Widget::Select.is_multi_choice());
    }

    #[test]
    fn test_option_widget() {
        assert_eq!(
            Widget::CheckboxSelectMultiple.option_widget(),
            Widget::CheckboxInput
        );
        assert_eq!(Widget::RadioSelect.option_widget(), Widget::RadioSelect);
        assert_eq!(Widget::Select.option_widget(), Widget::Select);
    }

    #[test]
    fn test_selected_attr() {
        assert_eq!(Widget::CheckboxInput.selected_attr(true), Some("checked"));
        assert_eq!(Widget::Select.selected_attr(true), Some("selected"));
        assert_eq!(Widget::Select.selected_attr(false), None);
        assert_eq!(Widget::TextInput.selected_attr(true), None);
    }

    #[test]
    fn test_fieldset_widgets() {
        assert!(Widget::RadioSelect.uses_fieldset());
        assert!(Widget::CheckboxSelectMultiple.uses_fieldset());
        assert!(!Widget::Select.uses_fieldset());
    }

    #[test]
    fn test_default_sanitizers() {
        let one_line = Widget::TextInput.default_sanitize_fn();
        assert_eq!(one_line("a\nb"), "a b");
        let multi_line = Widget::TextArea.default_sanitize_fn();
        assert_eq!(multi_line("a\nb"), "a\nb");
    }
}
