//! HTML attribute model with deterministic serialization.
//!
//! Attributes merge last-write-wins by name into an [`AttrMap`], and always
//! serialize in the same order regardless of insertion order: `class`, `id`,
//! `name`, `data-*` (alphabetical), `src`, `for`, `type`, `href`, `value`,
//! `minlength`, `maxlength`, `title`, `alt`, `role`, `aria-*`
//! (alphabetical), then everything else alphabetically.

use std::collections::BTreeMap;
use std::fmt;

/// Names that widgets own and custom attributes may not set.
const FORBIDDEN_NAMES: [&str; 3] = ["type", "name", "value"];

/// Names serialized ahead of the `aria-*` block, in this order. The `data-*`
/// block sits between `name` and `src`.
const PRIORITY_NAMES: [&str; 13] = [
    "class",
    "id",
    "name",
    "src",
    "for",
    "type",
    "href",
    "value",
    "minlength",
    "maxlength",
    "title",
    "alt",
    "role",
];

/// The value side of an attribute.
///
/// A bare attribute serializes as just its name (`required`); a valued
/// attribute always serializes as `name="value"`, even when the value is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `name="value"`.
    Value(String),
    /// Just `name`.
    Bare,
}

impl AttrValue {
    /// The textual value; bare attributes read as the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(value) => value,
            Self::Bare => "",
        }
    }
}

/// A single attribute to apply to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: AttrValue,
}

impl Attribute {
    /// The attribute's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute's value.
    pub fn value(&self) -> &AttrValue {
        &self.value
    }
}

/// A valued attribute, `name="value"`. The value is stringified through
/// `Display`, so numbers work directly.
pub fn attr(name: impl Into<String>, value: impl fmt::Display) -> Attribute {
    Attribute {
        name: name.into(),
        value: AttrValue::Value(value.to_string()),
    }
}

/// A boolean attribute that renders as the bare name.
pub fn bool_attr(name: impl Into<String>) -> Attribute {
    Attribute {
        name: name.into(),
        value: AttrValue::Bare,
    }
}

/// An attribute set keyed by name, serialized in the fixed priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrMap {
    entries: BTreeMap<String, AttrValue>,
}

impl AttrMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `attributes` into a fresh map, last write per name winning.
    ///
    /// # Panics
    ///
    /// Panics if an attribute is named `type`, `name`, or `value`. Those are
    /// owned by the widget; to change them use a different field or set a
    /// different widget on the field.
    pub fn from_attributes(attributes: &[Attribute]) -> Self {
        let mut map = Self::new();
        map.apply(attributes);
        map
    }

    /// Merges `attributes` into this map, last write per name winning.
    ///
    /// # Panics
    ///
    /// Panics on the forbidden names, see [`AttrMap::from_attributes`].
    pub fn apply(&mut self, attributes: &[Attribute]) {
        for attribute in attributes {
            assert!(
                !FORBIDDEN_NAMES.contains(&attribute.name.as_str()),
                "cannot set the {:?} attribute directly; it is owned by the widget. \
                 To change it, use a different field or set a different widget on the field",
                attribute.name,
            );
            self.entries
                .insert(attribute.name.clone(), attribute.value.clone());
        }
    }

    /// Inserts a valued attribute, replacing any existing entry.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), AttrValue::Value(value.into()));
    }

    /// Inserts a bare attribute, replacing any existing entry.
    pub fn insert_bare(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), AttrValue::Bare);
    }

    /// Merges every entry of `other` into this map.
    pub fn extend(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), value.clone());
        }
    }

    /// The value for `name`, if present. Bare attributes read as `""`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(AttrValue::as_str)
    }

    /// Returns `true` when `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.entries.remove(name)
    }

    /// Returns `true` when the map holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the map in the fixed priority order, with a leading space
    /// before each attribute. Values are emitted verbatim.
    pub fn html(&self) -> String {
        let mut out = String::new();
        for name in self.ordered_names() {
            out.push(' ');
            out.push_str(name);
            if let Some(AttrValue::Value(value)) = self.entries.get(name) {
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
        }
        out
    }

    /// Attribute names in serialization order.
    fn ordered_names(&self) -> Vec<&str> {
        fn take<'a>(names: &mut Vec<&'a str>, remaining: &mut Vec<&'a str>, wanted: &str) {
            if let Some(pos) = remaining.iter().position(|name| *name == wanted) {
                names.push(remaining.remove(pos));
            }
        }

        fn take_prefixed<'a>(names: &mut Vec<&'a str>, remaining: &mut Vec<&'a str>, prefix: &str) {
            let mut block: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|name| name.starts_with(prefix))
                .collect();
            block.sort_unstable();
            remaining.retain(|name| !name.starts_with(prefix));
            names.append(&mut block);
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.entries.len());
        let mut remaining: Vec<&str> = self.entries.keys().map(String::as_str).collect();

        take(&mut names, &mut remaining, "class");
        take(&mut names, &mut remaining, "id");
        take(&mut names, &mut remaining, "name");
        take_prefixed(&mut names, &mut remaining, "data-");
        for wanted in &PRIORITY_NAMES[3..] {
            take(&mut names, &mut remaining, wanted);
        }
        take_prefixed(&mut names, &mut remaining, "aria-");
        remaining.sort_unstable();
        names.extend(remaining);
        names
    }
}

/// Escapes `&`, `<`, `>`, `"`, and `'` for safe interpolation into HTML
/// element content.
pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
