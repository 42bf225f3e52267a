//! Opened-document session driving the classifier over a notebook.

use crate::extension::toolbar::ToolbarAction;
    use crate::model::classification::{BlockKind, Classification};
use crate::model::metadata::METADATA_CELL_TYPE;
use crate::notebook::{cell_preview, Notebook, NotebookCell, NotebookError, NotebookResult};
use crate::render::{BannerRenderer, CellSurface, DefaultBannerRenderer};
use crate::service::classifier::{CellClassifier, ToggleOutcome};
use log::info;
use serde::Serialize;

/// Listing row describing one cell as the current viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub index: usize,
    pub cell_id: String,
    pub cell_type: String,
    pub classification: Classification,
    pub classes: Vec<String>,
    pub banner_label: Option<String>,
    pub reveal_label: Option<String>,
    pub content_collapsed: bool,
    pub preview: Option<String>,
}

impl CellView {
    fn from_cell(index: usize, cell: &NotebookCell) -> Self {
        let surface = cell.surface();
        let banner = surface.banner();
        Self {
            index,
            cell_id: cell.id().to_string(),
            cell_type: cell.cell_type().to_string(),
            classification: banner
                .map(|b| Classification::from(b.kind))
                .unwrap_or_default(),
            classes: surface.classes().map(str::to_string).collect(),
            banner_label: banner.map(|b| b.label.clone()),
            reveal_label: banner.and_then(|b| b.reveal.as_ref()).map(|c| c.label()),
            content_collapsed: surface.is_content_collapsed(),
            preview: cell_preview(&cell.source_text()),
        }
    }
}

/// One opened notebook bound to a viewer's classifier.
///
/// Opening runs `initialize` over every cell in document order; afterwards
/// only toggles and reveal activations change cell state. Toolbar actions
/// apply to the active (focused) cell, which starts unset.
pub struct NotebookSession<'c, R = DefaultBannerRenderer> {
    notebook: Notebook,
    classifier: &'c CellClassifier<R>,
    active_cell: Option<usize>,
    metadata_changed: bool,
    migrated_cells: usize,
}

impl<'c, R: BannerRenderer> NotebookSession<'c, R> {
    /// Initializes every cell and returns the live session.
    pub fn open(mut notebook: Notebook, classifier: &'c CellClassifier<R>) -> Self {
        let mut migrated_cells = 0;
        for cell in notebook.cells_mut() {
            if classifier.initialize(cell).migrated {
                migrated_cells += 1;
            }
        }
        info!(
            "event=notebook_open module=notebook status=ok cells={} migrated={} viewer={}",
            notebook.len(),
            migrated_cells,
            classifier.viewer().as_str()
        );

        Self {
            notebook,
            classifier,
            active_cell: None,
            metadata_changed: migrated_cells > 0,
            migrated_cells,
        }
    }

    /// Toggles `requested` on the cell at `index`.
    pub fn toggle_cell(
        &mut self,
        index: usize,
        requested: BlockKind,
    ) -> NotebookResult<ToggleOutcome> {
        let cell = self.notebook.cell_mut(index)?;
        let before = cell.metadata().get(METADATA_CELL_TYPE).cloned();
        let outcome = self.classifier.toggle(cell, requested);
        if cell.metadata().get(METADATA_CELL_TYPE) != before.as_ref() {
            self.metadata_changed = true;
        }
        Ok(outcome)
    }

    /// Moves focus to the cell at `index`.
    pub fn set_active_cell(&mut self, index: usize) -> NotebookResult<()> {
        self.notebook.cell(index)?;
        self.active_cell = Some(index);
        Ok(())
    }

    pub fn active_cell(&self) -> Option<usize> {
        self.active_cell
    }

    /// Handles a toolbar button press by toggling its kind on the active cell.
    ///
    /// # Errors
    /// - `NoActiveCell` when nothing has focus.
    pub fn activate_action(&mut self, action: &ToolbarAction) -> NotebookResult<ToggleOutcome> {
        let index = self.active_cell.ok_or(NotebookError::NoActiveCell)?;
        info!(
            "event=toolbar_action module=notebook status=ok action={} index={}",
            action.name, index
        );
        self.toggle_cell(index, action.kind)
    }

    /// Activates the reveal/hide control of the cell at `index`.
    pub fn reveal_cell(&mut self, index: usize) -> NotebookResult<Option<bool>> {
        let cell = self.notebook.cell_mut(index)?;
        Ok(self.classifier.activate_reveal(cell))
    }

    pub fn cell_view(&self, index: usize) -> NotebookResult<CellView> {
        let cell = self.notebook.cell(index)?;
        Ok(CellView::from_cell(index, cell))
    }

    pub fn cell_views(&self) -> Vec<CellView> {
        self.notebook
            .cells()
            .iter()
            .enumerate()
            .map(|(index, cell)| CellView::from_cell(index, cell))
            .collect()
    }

    /// Whether persisted metadata differs from what was loaded.
    pub fn metadata_changed(&self) -> bool {
        self.metadata_changed
    }

    /// Number of cells whose legacy field was migrated on open.
    pub fn migrated_cells(&self) -> usize {
        self.migrated_cells
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn into_notebook(self) -> Notebook {
        self.notebook
    }
}

#[cfg(test)]
mod tests {
    use super::NotebookSession;
    use crate::extension::toolbar::ToolbarAction;
    use crate::model::classification::{BlockKind, Classification};
    use crate::notebook::{Notebook, NotebookCell, NotebookError};
    use crate::service::classifier::CellClassifier;
    use crate::session::ViewerAccess;
    use serde_json::json;

    fn notebook_with(metadata: &[serde_json::Value]) -> Notebook {
        let mut notebook = Notebook::new();
        for (i, value) in metadata.iter().enumerate() {
            let mut cell = NotebookCell::new("code", format!("x = {i}"));
            if let serde_json::Value::Object(map) = value {
                *cell.metadata_mut() = map.clone();
            }
            notebook.push_cell(cell);
        }
        notebook
    }

    #[test]
    fn open_initializes_cells_in_order_and_counts_migrations() {
        let classifier = CellClassifier::new(ViewerAccess::Student);
        let notebook = notebook_with(&[
            json!({}),
            json!({"is_solution": true}),
            json!({"cell_type": "hint"}),
        ]);
        let session = NotebookSession::open(notebook, &classifier);

        let views = session.cell_views();
        let classes = views.iter().map(|v| v.classification).collect::<Vec<_>>();
        assert_eq!(
            classes,
            vec![Classification::None, Classification::Solution, Classification::Hint]
        );
        assert_eq!(session.migrated_cells(), 1);
        assert!(session.metadata_changed());
        assert_eq!(views[2].reveal_label.as_deref(), Some("Reveal hint"));
    }

    #[test]
    fn plain_open_reports_no_metadata_change() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let notebook = notebook_with(&[json!({"cell_type": "hint"})]);
        let session = NotebookSession::open(notebook, &classifier);
        assert!(!session.metadata_changed());
    }

    #[test]
    fn toggle_marks_metadata_changed_and_rejects_bad_index() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let mut session = NotebookSession::open(notebook_with(&[json!({})]), &classifier);

        let outcome = session
            .toggle_cell(0, BlockKind::Hint)
            .expect("toggle existing cell");
        assert_eq!(outcome.next, Classification::Hint);
        assert!(session.metadata_changed());

        let err = session
            .toggle_cell(5, BlockKind::Hint)
            .expect_err("index out of range");
        assert!(matches!(err, NotebookError::CellOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn solution_button_toggles_the_active_cell() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let mut session =
            NotebookSession::open(notebook_with(&[json!({}), json!({})]), &classifier);
        let button = ToolbarAction::for_kind(BlockKind::Solution);

        session.set_active_cell(1).expect("focus second cell");
        assert_eq!(session.active_cell(), Some(1));

        let marked = session.activate_action(&button).expect("mark");
        assert_eq!(marked.previous, Classification::None);
        assert_eq!(marked.next, Classification::Solution);
        let cleared = session.activate_action(&button).expect("unmark");
        assert_eq!(cleared.previous, Classification::Solution);
        assert_eq!(cleared.next, Classification::None);

        let views = session.cell_views();
        assert_eq!(views[0].classification, Classification::None);
        assert!(views[1].classes.is_empty());
    }

    #[test]
    fn toolbar_action_without_focus_is_rejected() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let mut session = NotebookSession::open(notebook_with(&[json!({})]), &classifier);
        let button = ToolbarAction::for_kind(BlockKind::Hint);

        let err = session.activate_action(&button).expect_err("no focus");
        assert!(matches!(err, NotebookError::NoActiveCell));

        let err = session.set_active_cell(3).expect_err("out of range");
        assert!(matches!(err, NotebookError::CellOutOfRange { index: 3, len: 1 }));
        assert_eq!(session.active_cell(), None);
        assert!(!session.metadata_changed());
    }
}
