//! Instructor toolbar actions and the adapter attaching them.

use crate::model::classification::BlockKind;
use serde::Serialize;

/// Toolbar position the marking buttons are inserted at.
pub const TOOLBAR_INSERT_INDEX: usize = 10;

/// Declarative toolbar button toggling one block kind on the active cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarAction {
    pub kind: BlockKind,
    /// Toolbar item name, e.g. `SolutionButton`.
    pub name: String,
    pub label: String,
    /// Font Awesome icon class.
    pub icon_class: String,
    pub class_name: String,
    pub tooltip: String,
}

impl ToolbarAction {
    pub fn for_kind(kind: BlockKind) -> Self {
        let (name, icon) = match kind {
            BlockKind::Solution => ("SolutionButton", "graduation-cap"),
            BlockKind::Hint => ("HintButton", "lightbulb-o"),
        };
        Self {
            kind,
            name: name.to_string(),
            label: format!("Mark as {kind}"),
            icon_class: format!("fa fa-{icon}"),
            class_name: format!("{kind}-button"),
            tooltip: format!("Mark current cell as {kind}"),
        }
    }
}

/// Toolbar of one opened document, implemented by the host.
pub trait Toolbar {
    fn insert_item(&mut self, index: usize, name: &str, action: ToolbarAction);
}

/// Attaches host controls to an opened document.
pub trait PresentationAdapter {
    fn attach_controls(&self, toolbar: &mut dyn Toolbar);
}

/// Adapter inserting the solution and hint buttons.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolbarButtons;

impl PresentationAdapter for ToolbarButtons {
    fn attach_controls(&self, toolbar: &mut dyn Toolbar) {
        for kind in BlockKind::ALL {
            let action = ToolbarAction::for_kind(kind);
            let name = action.name.clone();
            toolbar.insert_item(TOOLBAR_INSERT_INDEX, &name, action);
        }
    }
}

/// In-memory toolbar mirroring insert-at-index semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarModel {
    items: Vec<(String, ToolbarAction)>,
}

impl ToolbarModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = &ToolbarAction> {
        self.items.iter().map(|(_, action)| action)
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Toolbar for ToolbarModel {
    fn insert_item(&mut self, index: usize, name: &str, action: ToolbarAction) {
        let index = index.min(self.items.len());
        self.items.insert(index, (name.to_string(), action));
    }
}

#[cfg(test)]
mod tests {
    use super::{PresentationAdapter, Toolbar, ToolbarAction, ToolbarButtons, ToolbarModel};
    use crate::model::classification::BlockKind;

    #[test]
    fn builds_solution_action_descriptor() {
        let action = ToolbarAction::for_kind(BlockKind::Solution);
        assert_eq!(action.name, "SolutionButton");
        assert_eq!(action.label, "Mark as solution");
        assert_eq!(action.icon_class, "fa fa-graduation-cap");
        assert_eq!(action.class_name, "solution-button");
        assert_eq!(action.tooltip, "Mark current cell as solution");
    }

    #[test]
    fn hint_button_lands_before_solution_button_on_full_toolbar() {
        let mut toolbar = ToolbarModel::new();
        for i in 0..12 {
            let name = format!("item{i}");
            toolbar.insert_item(i, &name, ToolbarAction::for_kind(BlockKind::Hint));
        }
        ToolbarButtons.attach_controls(&mut toolbar);
        assert_eq!(toolbar.len(), 14);
        assert_eq!(toolbar.names()[10..12], ["HintButton", "SolutionButton"]);
    }

    #[test]
    fn short_toolbar_appends_in_insertion_order() {
        let mut toolbar = ToolbarModel::new();
        ToolbarButtons.attach_controls(&mut toolbar);
        assert_eq!(toolbar.names(), vec!["SolutionButton", "HintButton"]);
    }
}
