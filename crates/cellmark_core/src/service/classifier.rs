//! Cell classifier and visibility controller.
//!
//! # Responsibility
//! - Derive a cell's classification from metadata on initialization.
//! - Apply toggle requests through the transition table.
//! - Keep presentation classes, banner and content visibility in sync.
//!
//! # Invariants
//! - Classification and the applied presentation class always agree.
//! - A banner is mounted iff classification is not `none`.
//! - Banners are rebuilt from scratch on every classification change.
//! - Students see classified content collapsed; instructors see everything.

use crate::model::classification::{next_classification, BlockKind, Classification};
use crate::model::metadata::{read_classification, write_classification, MetadataStore};
use crate::render::{BannerRenderer, CellSurface, DefaultBannerRenderer};
use crate::session::ViewerAccess;
use log::{debug, info};

/// Host cell giving split access to metadata and visuals.
pub trait CellHandle {
    type Metadata: MetadataStore;
    type Surface: CellSurface;

    /// Stable id used in log lines.
    fn cell_id(&self) -> &str;
    fn parts_mut(&mut self) -> (&mut Self::Metadata, &mut Self::Surface);
}

/// Result of one `initialize` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeOutcome {
    pub classification: Classification,
    /// Whether the legacy `is_solution` field was found and removed.
    pub migrated: bool,
}

/// Classification change applied by one `toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub previous: Classification,
    pub next: Classification,
}

/// Controller for one viewer session.
#[derive(Debug, Clone)]
pub struct CellClassifier<R = DefaultBannerRenderer> {
    viewer: ViewerAccess,
    renderer: R,
}

impl CellClassifier<DefaultBannerRenderer> {
    pub fn new(viewer: ViewerAccess) -> Self {
        Self::with_renderer(viewer, DefaultBannerRenderer)
    }
}

impl<R: BannerRenderer> CellClassifier<R> {
    pub fn with_renderer(viewer: ViewerAccess, renderer: R) -> Self {
        Self { viewer, renderer }
    }

    pub fn viewer(&self) -> ViewerAccess {
        self.viewer
    }

    /// Derives state from metadata and applies visuals.
    ///
    /// Migrates the legacy field when present; otherwise metadata is left
    /// untouched.
    ///
    /// # Panics
    /// Panics when a classified cell has no header region.
    pub fn initialize<C: CellHandle>(&self, cell: &mut C) -> InitializeOutcome {
        let (metadata, surface) = cell.parts_mut();
        let read = read_classification(metadata);
        let classification = read.classification;

        for kind in BlockKind::ALL {
            if Classification::from(kind) != classification {
                surface.remove_class(kind.presentation_class());
            }
        }
        if let Some(class) = classification.presentation_class() {
            surface.add_class(class);
        }

        surface.unmount_banner();
        match classification.kind() {
            Some(kind) => self.render_banner(surface, kind),
            None => surface.set_content_collapsed(false),
        }

        if let Some(migration) = &read.migration {
            info!(
                "event=legacy_migrated module=classifier status=ok cell_id={} promoted={}",
                cell.cell_id(),
                migration.promoted_to_solution
            );
        }
        debug!(
            "event=cell_initialize module=classifier status=ok cell_id={} classification={} viewer={}",
            cell.cell_id(),
            classification,
            self.viewer.as_str()
        );

        InitializeOutcome {
            classification,
            migrated: read.migration.is_some(),
        }
    }

    /// Applies an instructor toggle request for `requested`.
    ///
    /// # Panics
    /// Panics when the resulting classification needs a banner and the cell
    /// has no header region.
    pub fn toggle<C: CellHandle>(&self, cell: &mut C, requested: BlockKind) -> ToggleOutcome {
        let (metadata, surface) = cell.parts_mut();
        let previous = read_classification(metadata).classification;
        let next = next_classification(previous, requested);

        write_classification(metadata, next);
        if let Some(class) = previous.presentation_class() {
            surface.remove_class(class);
        }
        if let Some(class) = next.presentation_class() {
            surface.add_class(class);
        }

        surface.unmount_banner();
        match next.kind() {
            Some(kind) => self.render_banner(surface, kind),
            None => surface.set_content_collapsed(false),
        }

        info!(
            "event=cell_toggle module=classifier status=ok cell_id={} requested={} previous={} next={}",
            cell.cell_id(),
            requested,
            previous,
            next
        );
        ToggleOutcome { previous, next }
    }

    /// Activates the reveal/hide control of a student banner.
    ///
    /// Returns the new expanded flag, or `None` when the cell shows no
    /// control (instructor view or unclassified cell).
    pub fn activate_reveal<C: CellHandle>(&self, cell: &mut C) -> Option<bool> {
        let (_, surface) = cell.parts_mut();
        let expand = surface.is_content_collapsed();
        surface.banner_mut()?.reveal.as_mut()?.set_expanded(expand);
        surface.set_content_collapsed(!expand);

        debug!(
            "event=cell_reveal module=classifier status=ok cell_id={} expanded={}",
            cell.cell_id(),
            expand
        );
        Some(expand)
    }

    fn render_banner(&self, surface: &mut impl CellSurface, kind: BlockKind) {
        assert!(
            surface.has_header_region(),
            "cell header region must exist before mounting a {kind} banner"
        );
        let layout = self.renderer.render(kind, self.viewer);
        surface.mount_banner(layout.banner);
        surface.set_content_collapsed(layout.content_collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::{CellClassifier, CellHandle};
    use crate::model::classification::{BlockKind, Classification};
    use crate::render::{CellSurface, HeadlessSurface};
    use crate::session::ViewerAccess;
    use serde_json::{json, Map, Value};

    struct TestCell {
        metadata: Map<String, Value>,
        surface: HeadlessSurface,
    }

    impl TestCell {
        fn new(metadata: Value) -> Self {
            let Value::Object(metadata) = metadata else {
                panic!("metadata fixture must be an object");
            };
            Self {
                metadata,
                surface: HeadlessSurface::new(),
            }
        }
    }

    impl CellHandle for TestCell {
        type Metadata = Map<String, Value>;
        type Surface = HeadlessSurface;

        fn cell_id(&self) -> &str {
            "test-cell"
        }

        fn parts_mut(&mut self) -> (&mut Self::Metadata, &mut Self::Surface) {
            (&mut self.metadata, &mut self.surface)
        }
    }

    #[test]
    fn initialize_applies_class_and_banner_without_touching_metadata() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let mut cell = TestCell::new(json!({"cell_type": "hint", "collapsed": false}));

        let outcome = classifier.initialize(&mut cell);

        assert_eq!(outcome.classification, Classification::Hint);
        assert!(!outcome.migrated);
        assert_eq!(
            Value::Object(cell.metadata.clone()),
            json!({"cell_type": "hint", "collapsed": false})
        );
        assert!(cell.surface.has_class("is-hint"));
        assert_eq!(
            cell.surface.banner().map(|b| b.label.as_str()),
            Some("hint block")
        );
    }

    #[test]
    fn initialize_twice_keeps_a_single_banner_and_class() {
        let classifier = CellClassifier::new(ViewerAccess::Student);
        let mut cell = TestCell::new(json!({"cell_type": "solution"}));

        classifier.initialize(&mut cell);
        classifier.initialize(&mut cell);

        assert_eq!(cell.surface.classes().collect::<Vec<_>>(), vec!["is-solution"]);
        assert!(cell.surface.banner().is_some());
        assert!(cell.surface.is_content_collapsed());
    }

    #[test]
    fn toggle_switches_kind_and_swaps_classes() {
        let classifier = CellClassifier::new(ViewerAccess::Instructor);
        let mut cell = TestCell::new(json!({"cell_type": "hint"}));
        classifier.initialize(&mut cell);

        let outcome = classifier.toggle(&mut cell, BlockKind::Solution);

        assert_eq!(outcome.previous, Classification::Hint);
        assert_eq!(outcome.next, Classification::Solution);
        assert!(!cell.surface.has_class("is-hint"));
        assert!(cell.surface.has_class("is-solution"));
        assert_eq!(cell.metadata.get("cell_type"), Some(&json!("solution")));
    }

    #[test]
    fn reveal_is_inert_for_instructors_and_unclassified_cells() {
        let instructor = CellClassifier::new(ViewerAccess::Instructor);
        let mut marked = TestCell::new(json!({"cell_type": "hint"}));
        instructor.initialize(&mut marked);
        assert_eq!(instructor.activate_reveal(&mut marked), None);

        let student = CellClassifier::new(ViewerAccess::Student);
        let mut plain = TestCell::new(json!({}));
        student.initialize(&mut plain);
        assert_eq!(student.activate_reveal(&mut plain), None);
        assert!(!plain.surface.is_content_collapsed());
    }

    #[test]
    #[should_panic(expected = "header region")]
    fn missing_header_region_is_a_defect() {
        let classifier = CellClassifier::new(ViewerAccess::Student);
        let mut cell = TestCell::new(json!({}));
        cell.surface = HeadlessSurface::without_header_region();
        classifier.toggle(&mut cell, BlockKind::Hint);
    }
}
