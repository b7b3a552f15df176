//! Choice options, option groups, and the hierarchical id indexing scheme.
//!
//! Options live in ordered groups. A group with an empty label holds
//! top-level options; a named group renders as an `<optgroup>` (or a nested
//! `<div>` for radio/checkbox widgets). Ids are assigned by slot: each
//! top-level option consumes one slot (`<base>_<i>`), a named group consumes
//! exactly one slot and numbers its members within it (`<base>_<g>_<j>`).

/// A single selectable option: the submitted value and its visible label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    value: String,
    label: String,
}

impl ChoiceOption {
    /// Creates an option from its value and label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The submitted value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The visible label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// An ordered run of options under one (possibly empty) group label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionGroup {
    pub(crate) label: String,
    pub(crate) options: Vec<ChoiceOption>,
}

impl OptionGroup {
    pub(crate) fn is_named(&self) -> bool {
        !self.label.is_empty()
    }

    /// Slots the group consumes in the id numbering.
    fn slots(&self) -> usize {
        if self.is_named() {
            1
        } else {
            self.options.len()
        }
    }
}

/// Flattens groups into the declared option values, in order.
pub(crate) fn option_values(groups: &[OptionGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.options.iter().map(|option| option.value.clone()))
        .collect()
}

/// One option prepared for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionView {
    pub(crate) value: String,
    pub(crate) label: String,
    /// Indexed element id, absent when id generation is disabled.
    pub(crate) id: Option<String>,
    pub(crate) selected: bool,
}

/// One group prepared for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupView {
    pub(crate) label: String,
    pub(crate) options: Vec<OptionView>,
}

/// Assigns ids and selection state to every option. `base_id` empty disables
/// id assignment; `selected` holds the sanitized submitted values.
pub(crate) fn build_group_views(
    groups: &[OptionGroup],
    base_id: &str,
    selected: &[String],
) -> Vec<GroupView> {
    let mut views = Vec::with_capacity(groups.len());
    let mut slot = 0_usize;
    for group in groups {
        let options = group
            .options
            .iter()
            .enumerate()
            .map(|(j, option)| OptionView {
                value: option.value.clone(),
                label: option.label.clone(),
                id: option_id(base_id, group.is_named(), slot, j),
                selected: selected.iter().any(|value| *value == option.value),
            })
            .collect();
        views.push(GroupView {
            label: group.label.clone(),
            options,
        });
        slot += group.slots();
    }
    views
}

fn option_id(base_id: &str, grouped: bool, slot: usize, j: usize) -> Option<String> {
    if base_id.is_empty() {
        return None;
    }
    if grouped {
        Some(format!("{base_id}_{slot}_{j}"))
    } else {
        Some(format!("{base_id}_{}", slot + j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(label: &str, values: &[&str]) -> OptionGroup {
        OptionGroup {
            label: label.to_string(),
            options: values
                .iter()
                .map(|value| ChoiceOption::new(*value, value.to_uppercase()))
                .collect(),
        }
    }

    #[test]
    fn test_id_indexing_mixed_groups() {
        // Two ungrouped options, a named group of three, one more ungrouped.
        let groups = vec![
            group("", &["a", "b"]),
            group("Letters", &["c", "d", "e"]),
            group("", &["f"]),
        ];
        let views = build_group_views(&groups, "id_pick", &[]);
        let ids: Vec<&str> = views
            .iter()
            .flat_map(|g| g.options.iter())
            .map(|o| o.id.as_deref().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                "id_pick_0",
                "id_pick_1",
                "id_pick_2_0",
                "id_pick_2_1",
                "id_pick_2_2",
                "id_pick_3",
            ]
        );
    }

    #[test]
    fn test_no_base_id_no_option_ids() {
        let groups = vec![group("", &["a"])];
        let views = build_group_views(&groups, "", &[]);
        assert_eq!(views[0].options[0].id, None);
    }

    #[test]
    fn test_selection_marking() {
        let groups = vec![group("", &["a", "b", "c"])];
        let selected = vec!["a".to_string(), "c".to_string()];
        let views = build_group_views(&groups, "id_x", &selected);
        let flags: Vec<bool> = views[0].options.iter().map(|o| o.selected).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_option_values_flattening() {
        let groups = vec![group("", &["a"]), group("G", &["b", "c"])];
        assert_eq!(option_values(&groups), vec!["a", "b", "c"]);
    }
}
