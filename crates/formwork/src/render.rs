//! HTML rendering for fields.
//!
//! The output shapes follow Django's form widget templates: one `<div>` per
//! field holding the label (or a `<fieldset>` + `<legend>` for radio and
//! checkbox groups), the error `<ul>`, the widget, and the help `<span>`.
//! Attribute order inside every tag is fixed by [`AttrMap`], so rendering is
//! byte-for-byte deterministic.

use formwork_core::rules::parse_bool;

use crate::attrs::{escape_html, AttrMap};
use crate::choices::{build_group_views, GroupView, OptionView};
use crate::field::Field;
use crate::ids;
use crate::widgets::Widget;

impl Field {
    /// Renders the field in a `<div>` tag: label or legend, errors, widget,
    /// and help text.
    pub fn as_div(&self) -> String {
        let mut out = String::from("<div");
        let classes = self.css_classes();
        if !classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&classes);
            out.push('"');
        }
        out.push('>');
        if self.use_fieldset() {
            out.push_str("\n<fieldset>");
            out.push_str(&self.legend_tag());
            out.push('\n');
            if self.has_errors() {
                out.push_str(&self.errors_html());
                out.push('\n');
            }
            out.push_str(&self.widget_html());
            if self.has_help_text() {
                out.push('\n');
                out.push_str(&self.help_text_html());
            }
            out.push_str("\n</fieldset>\n");
        } else {
            out.push_str(&self.label_tag());
            if self.has_errors() {
                out.push('\n');
                out.push_str(&self.errors_html());
                out.push('\n');
            }
            out.push_str(&self.widget_html());
            if self.has_help_text() {
                out.push('\n');
                out.push_str(&self.help_text_html());
            }
        }
        out.push_str("</div>");
        out
    }

    /// Renders the `<label>` tag. Without an id there is nothing to point
    /// the label at, so only the text is returned.
    pub fn label_tag(&self) -> String {
        self.label_or_legend("label")
    }

    /// Renders the `<legend>` tag used instead of `<label>` when the
    /// options are grouped in a `<fieldset>`.
    pub fn legend_tag(&self) -> String {
        self.label_or_legend("legend")
    }

    /// Whether the widget wraps in `<fieldset>` + `<legend>`.
    pub fn use_fieldset(&self) -> bool {
        self.widget_kind().uses_fieldset()
    }

    /// The CSS classes of the wrapping `<div>`: the required class when the
    /// field is required, the error class when it has errors.
    pub fn css_classes(&self) -> String {
        let mut classes = self.label_css_classes();
        classes.extend(self.widget_css_classes());
        classes.join(" ")
    }

    fn label_or_legend(&self, tag: &str) -> String {
        let id = self.html_id();
        let use_tag = !id.is_empty();
        let mut attrs = AttrMap::new();
        if use_tag {
            attrs.insert("for", id);
        }
        let classes = self.label_css_classes();
        if !classes.is_empty() {
            attrs.insert("class", classes.join(" "));
        }
        let text = self.label_with_suffix();
        let content = if self.is_safe() {
            text
        } else {
            escape_html(&text)
        };
        if use_tag {
            format!("<{tag}{}>{content}</{tag}>", attrs.html())
        } else {
            content
        }
    }

    /// The label with the suffix appended, unless the label already ends in
    /// `.`, `!`, `?`, or `:`.
    fn label_with_suffix(&self) -> String {
        let label = self.label_text();
        let suffix = self.label_suffix_text();
        if suffix.is_empty() || label.ends_with(['.', '!', '?', ':']) {
            return label.to_string();
        }
        format!("{label}{suffix}")
    }

    /// Renders the widget.
    pub fn widget_html(&self) -> String {
        let widget = self.widget_kind();
        if widget.is_input() {
            self.input_html()
        } else {
            self.choice_html()
        }
    }

    fn input_html(&self) -> String {
        let widget = self.widget_kind();
        let mut attrs = self.attributes_for_field(&self.widget_css_classes());
        let mut value = self
            .bound_values()
            .first()
            .map_or_else(String::new, Clone::clone);
        if let Some(state) = widget.selected_attr(parse_bool(&value).unwrap_or(false)) {
            attrs.insert_bare(state);
        }
        if widget.omits_value_attr() {
            value = String::new();
        }
        let name = self.html_name();
        if widget == Widget::TextArea {
            return format!(
                "<textarea name=\"{name}\"{}>\n{}</textarea>",
                attrs.html(),
                escape_html(&value),
            );
        }
        let mut out = format!("<input type=\"{}\" name=\"{name}\"", widget.input_type());
        if !value.is_empty() {
            out.push_str(" value=\"");
            out.push_str(&escape_html(&value));
            out.push('"');
        }
        out.push_str(&attrs.html());
        out.push('>');
        out
    }

    fn choice_html(&self) -> String {
        let widget = self.widget_kind();
        let attrs = self.attributes_for_field(&self.widget_css_classes());
        let selected: &[String] = if widget.is_multi_choice() {
            self.bound_values()
        } else {
            &self.bound_values()[..self.bound_values().len().min(1)]
        };
        let groups = build_group_views(self.option_groups(), &self.html_id(), selected);
        match widget {
            Widget::Select | Widget::SelectMultiple => {
                self.select_html(&attrs, &groups, widget.option_widget())
            }
            Widget::RadioSelect | Widget::CheckboxSelectMultiple => {
                self.multiple_input_html(&attrs, &groups, widget.option_widget())
            }
            _ => panic!("{widget:?} is not a choice widget"),
        }
    }

    fn select_html(&self, attrs: &AttrMap, groups: &[GroupView], option_widget: Widget) -> String {
        let mut out = format!("<select name=\"{}\"{}>", self.html_name(), attrs.html());
        for group in groups {
            if group.label.is_empty() {
                for option in &group.options {
                    out.push_str("\n  ");
                    out.push_str(&select_option_html(option, option_widget));
                }
            } else {
                out.push_str("\n  <optgroup label=\"");
                out.push_str(&escape_html(&group.label));
                out.push_str("\">");
                for option in &group.options {
                    out.push_str("\n    ");
                    out.push_str(&select_option_html(option, option_widget));
                }
                out.push_str("\n  </optgroup>");
            }
        }
        out.push_str("\n</select>");
        out
    }

    fn multiple_input_html(
        &self,
        attrs: &AttrMap,
        groups: &[GroupView],
        option_widget: Widget,
    ) -> String {
        // The wrapping <div> keeps only the id and class of the field attrs.
        let mut out = String::from("<div");
        if let Some(id) = attrs.value("id") {
            out.push_str(" id=\"");
            out.push_str(id);
            out.push('"');
        }
        if let Some(class) = attrs.value("class") {
            out.push_str(" class=\"");
            out.push_str(class);
            out.push('"');
        }
        out.push('>');
        let name = self.html_name();
        for group in groups {
            if !group.label.is_empty() {
                out.push_str("\n<div><label>");
                out.push_str(&escape_html(&group.label));
                out.push_str("</label>");
            }
            for option in &group.options {
                out.push('\n');
                out.push_str(&input_option_html(option, option_widget, &name));
            }
            if !group.label.is_empty() {
                out.push_str("\n</div>");
            }
        }
        out.push_str("\n</div>");
        out
    }

    /// Renders the field errors as a `<ul class="errorlist">` with one
    /// `<li>` per error, each carrying an id derived from the field id.
    pub fn errors_html(&self) -> String {
        if !self.has_errors() {
            return String::new();
        }
        let field_id = self.html_id();
        let mut out = String::from("<ul class=\"errorlist\">");
        for (i, error) in self.errors().iter().enumerate() {
            let mut attrs = AttrMap::new();
            if !field_id.is_empty() {
                attrs.insert("id", ids::error_id(i, &field_id));
            }
            out.push_str(&format!(
                "<li{}>{}</li>",
                attrs.html(),
                escape_html(&error.translate(self.locale())),
            ));
        }
        out.push_str("</ul>");
        out
    }

    /// Renders the help text in a `<span class="helptext">`. The text is
    /// emitted verbatim.
    pub fn help_text_html(&self) -> String {
        if !self.has_help_text() {
            return String::new();
        }
        let mut attrs = AttrMap::new();
        attrs.insert("class", "helptext");
        let field_id = self.html_id();
        if !field_id.is_empty() {
            attrs.insert("id", ids::helptext_id(&field_id));
        }
        format!("<span{}>{}</span>", attrs.html(), self.help_text_value())
    }

    fn label_css_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if self.required() && !self.required_css().is_empty() {
            classes.push(self.required_css().to_string());
        }
        classes
    }

    fn widget_css_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if self.has_errors() && !self.error_css().is_empty() {
            classes.push(self.error_css().to_string());
        }
        classes
    }

    /// Assembles the widget attributes: state flags, aria annotations,
    /// length bounds, the custom attributes on top, and finally the CSS
    /// classes (custom `class` values append after `classes`).
    fn attributes_for_field(&self, classes: &[String]) -> AttrMap {
        let mut attrs = AttrMap::new();
        if self.widget_kind().is_multi_choice() {
            attrs.insert_bare("multiple");
        }
        let field_id = self.html_id();
        if !field_id.is_empty() {
            attrs.insert("id", field_id.clone());
        }
        if self.required() {
            attrs.insert_bare("required");
        }
        if self.is_disabled() {
            attrs.insert_bare("disabled");
        }
        if self.has_errors() {
            attrs.insert("aria-invalid", "true");
        }
        if !field_id.is_empty() {
            let mut described_by = Vec::new();
            if self.has_help_text() {
                described_by.push(ids::helptext_id(&field_id));
            }
            for i in 0..self.errors().len() {
                described_by.push(ids::error_id(i, &field_id));
            }
            if !described_by.is_empty() {
                attrs.insert("aria-describedby", described_by.join(" "));
            }
        }
        if self.min_length() > 0 {
            attrs.insert("minlength", self.min_length().to_string());
        }
        if self.max_length() > 0 {
            attrs.insert("maxlength", self.max_length().to_string());
        }
        attrs.extend(self.custom_attrs());
        let mut classes = classes.to_vec();
        if let Some(custom) = attrs.value("class") {
            if !classes.is_empty() {
                classes.push(custom.to_string());
            }
        }
        if !classes.is_empty() {
            attrs.insert("class", classes.join(" "));
        }
        attrs
    }
}

fn option_attrs(option: &OptionView, option_widget: Widget) -> AttrMap {
    let mut attrs = AttrMap::new();
    if let Some(id) = &option.id {
        attrs.insert("id", id.clone());
    }
    if let Some(state) = option_widget.selected_attr(option.selected) {
        attrs.insert_bare(state);
    }
    attrs
}

fn select_option_html(option: &OptionView, option_widget: Widget) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape_html(&option.value),
        option_attrs(option, option_widget).html(),
        escape_html(&option.label),
    )
}

fn input_option_html(option: &OptionView, option_widget: Widget, name: &str) -> String {
    let attrs = option_attrs(option, option_widget);
    let mut out = String::from("<label");
    if let Some(id) = &option.id {
        out.push_str(" for=\"");
        out.push_str(id);
        out.push('"');
    }
    out.push('>');
    out.push_str(&format!(
        "<input type=\"{}\" name=\"{name}\"",
        option_widget.input_type(),
    ));
    if !option.value.is_empty() {
        out.push_str(" value=\"");
        out.push_str(&escape_html(&option.value));
        out.push('"');
    }
    out.push_str(&attrs.html());
    out.push('>');
    out.push_str(&escape_html(&option.label));
    out.push_str("</label>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{attr, bool_attr};
    use crate::choices::ChoiceOption;
    use formwork_core::FieldError;

    fn pick_field() -> Field {
        Field::choice("pick").choice_options(vec![
            ChoiceOption::new("a", "Alpha"),
            ChoiceOption::new("b", "Beta"),
        ])
    }

    #[test]
    fn test_char_field_as_div() {
        let field = Field::char("Your Name");
        assert_eq!(
            field.as_div(),
            "<div><label for=\"id_your_name\">Your Name</label>\
             <input type=\"text\" name=\"your_name\" id=\"id_your_name\" maxlength=\"256\" required></div>",
        );
    }

    #[test]
    fn test_char_field_with_errors_and_help() {
        let mut field = Field::char("Nick").help_text("Visible to others");
        field.clean("");
        assert_eq!(
            field.as_div(),
            "<div><label for=\"id_nick\">Nick</label>\n\
             <ul class=\"errorlist\"><li id=\"err_0_id_nick\">This field is required</li></ul>\n\
             <input type=\"text\" name=\"nick\" id=\"id_nick\" \
             maxlength=\"256\" aria-describedby=\"helptext_id_nick err_0_id_nick\" \
             aria-invalid=\"true\" required>\n\
             <span class=\"helptext\" id=\"helptext_id_nick\">Visible to others</span></div>",
        );
    }

    #[test]
    fn test_label_tag_with_suffix_rules() {
        let field = Field::char("name").label("Name").label_suffix(":");
        assert_eq!(field.label_tag(), "<label for=\"id_name\">Name:</label>");

        let punctuated = Field::char("name").label("Ready?").label_suffix(":");
        assert_eq!(
            punctuated.label_tag(),
            "<label for=\"id_name\">Ready?</label>"
        );
    }

    #[test]
    fn test_label_escaping_and_safe() {
        let escaped = Field::char("name").label("<b>Name</b>");
        assert_eq!(
            escaped.label_tag(),
            "<label for=\"id_name\">&lt;b&gt;Name&lt;/b&gt;</label>"
        );

        let safe = Field::char("name").label("<b>Name</b>").safe();
        assert_eq!(
            safe.label_tag(),
            "<label for=\"id_name\"><b>Name</b></label>"
        );
    }

    #[test]
    fn test_label_without_id_is_bare_text() {
        let field = Field::char("name")
            .auto_id("")
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(field.label_tag(), "name");
    }

    #[test]
    fn test_checkbox_omits_value_and_checks_state() {
        let field = Field::boolean_with_initial("subscribe", true);
        assert_eq!(
            field.widget_html(),
            "<input type=\"checkbox\" name=\"subscribe\" id=\"id_subscribe\" checked required>",
        );

        let unchecked = Field::boolean("subscribe");
        assert_eq!(
            unchecked.widget_html(),
            "<input type=\"checkbox\" name=\"subscribe\" id=\"id_subscribe\" required>",
        );
    }

    #[test]
    fn test_textarea_keeps_value_in_content() {
        let field = Field::char_with("bio", "line one\nline two", "", 0, 0)
            .widget(crate::widgets::Widget::TextArea);
        assert_eq!(
            field.widget_html(),
            "<textarea name=\"bio\" id=\"id_bio\" required>\nline one\nline two</textarea>",
        );
    }

    #[test]
    fn test_select_rendering_with_selection() {
        let mut field = pick_field();
        field.clean("b");
        assert_eq!(
            field.widget_html(),
            "<select name=\"pick\" id=\"id_pick\" required>\n  \
             <option value=\"a\" id=\"id_pick_0\">Alpha</option>\n  \
             <option value=\"b\" id=\"id_pick_1\" selected>Beta</option>\n\
             </select>",
        );
    }

    #[test]
    fn test_select_with_optgroup() {
        let field = Field::choice("pick")
            .choice_options(vec![ChoiceOption::new("a", "Alpha")])
            .grouped_choice_options("Greek", vec![ChoiceOption::new("b", "Beta")]);
        assert_eq!(
            field.widget_html(),
            "<select name=\"pick\" id=\"id_pick\" required>\n  \
             <option value=\"a\" id=\"id_pick_0\">Alpha</option>\n  \
             <optgroup label=\"Greek\">\n    \
             <option value=\"b\" id=\"id_pick_1_0\">Beta</option>\n  \
             </optgroup>\n\
             </select>",
        );
    }

    #[test]
    fn test_radio_select_renders_fieldset() {
        let field = pick_field().widget(crate::widgets::Widget::RadioSelect);
        assert_eq!(
            field.as_div(),
            "<div>\n<fieldset><legend for=\"id_pick\">pick</legend>\n\
             <div id=\"id_pick\">\n\
             <label for=\"id_pick_0\"><input type=\"radio\" name=\"pick\" value=\"a\" id=\"id_pick_0\">Alpha</label>\n\
             <label for=\"id_pick_1\"><input type=\"radio\" name=\"pick\" value=\"b\" id=\"id_pick_1\">Beta</label>\n\
             </div>\n</fieldset>\n</div>",
        );
    }

    #[test]
    fn test_checkbox_select_multiple_marks_checked() {
        let mut field = Field::multiple_choice("tags")
            .choice_options(vec![
                ChoiceOption::new("x", "X"),
                ChoiceOption::new("y", "Y"),
            ])
            .widget(crate::widgets::Widget::CheckboxSelectMultiple);
        field.clean_values(&["y".to_string()]);
        assert_eq!(
            field.widget_html(),
            "<div id=\"id_tags\">\n\
             <label for=\"id_tags_0\"><input type=\"checkbox\" name=\"tags\" value=\"x\" id=\"id_tags_0\">X</label>\n\
             <label for=\"id_tags_1\"><input type=\"checkbox\" name=\"tags\" value=\"y\" id=\"id_tags_1\" checked>Y</label>\n\
             </div>",
        );
    }

    #[test]
    fn test_select_multiple_has_multiple_attr() {
        let field = Field::multiple_choice("tags")
            .choice_options(vec![ChoiceOption::new("x", "X")]);
        assert_eq!(
            field.widget_html(),
            "<select name=\"tags\" id=\"id_tags\" multiple required>\n  \
             <option value=\"x\" id=\"id_tags_0\">X</option>\n\
             </select>",
        );
    }

    #[test]
    fn test_custom_attributes_merge_and_order() {
        let field = Field::char("q").with_attributes(&[
            attr("data-role", "search"),
            bool_attr("autofocus"),
            attr("placeholder", "Search"),
        ]);
        assert_eq!(
            field.widget_html(),
            "<input type=\"text\" name=\"q\" id=\"id_q\" data-role=\"search\" \
             maxlength=\"256\" autofocus placeholder=\"Search\" required>",
        );
    }

    #[test]
    fn test_css_class_merging_on_errors() {
        let mut field = Field::char("name")
            .error_css_class("oops")
            .with_attributes(&[attr("class", "wide")]);
        field.clean("");
        let html = field.widget_html();
        assert!(html.contains("class=\"oops wide\""), "{html}");
        assert!(field.as_div().starts_with("<div class=\"oops\">"));
    }

    #[test]
    fn test_required_css_class_on_label_and_div() {
        let field = Field::char("name").required_css_class("req");
        assert!(field.as_div().starts_with("<div class=\"req\">"));
        assert_eq!(
            field.label_tag(),
            "<label for=\"id_name\" class=\"req\">name</label>"
        );
    }

    #[test]
    fn test_disabled_attr() {
        let field = Field::char("name").disabled();
        assert!(field.widget_html().contains(" disabled"));
    }

    #[test]
    fn test_errors_html_without_id() {
        let mut field = Field::char("name")
            .auto_id("")
            .unwrap_or_else(|_| unreachable!());
        field.add_error(FieldError::message("broken"));
        assert_eq!(
            field.errors_html(),
            "<ul class=\"errorlist\"><li>broken</li></ul>"
        );
    }

    #[test]
    fn test_error_translation_follows_locale() {
        let mut field = Field::email("contact");
        field.set_locale("fr");
        field.clean("nope");
        assert!(field
            .errors_html()
            .contains("Entrez une adresse e-mail valide"));
    }

    #[test]
    fn test_ordering_stable_with_auto_id_disabled() {
        let field = Field::char("q")
            .with_attributes(&[attr("data-kind", "x"), bool_attr("autofocus")])
            .auto_id("")
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            field.widget_html(),
            "<input type=\"text\" name=\"q\" data-kind=\"x\" maxlength=\"256\" autofocus required>",
        );
    }
}
