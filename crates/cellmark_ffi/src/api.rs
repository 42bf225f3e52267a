//! FFI use-case API for UI hosts.
//!
//! # Responsibility
//! - Expose toolbar descriptors and notebook open/toggle/migrate calls via FRB.
//! - Resolve the session from the enablement body on every call.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through `ok = false` envelopes with a message.
//! - Notebook files are rewritten only when cell metadata changed.

use cellmark_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_notebook,
    ping as ping_inner, save_notebook, BlockKind, CellClassifier, CellView, ExtensionRegistry,
    JsonBodyEnablement, NotebookSession, SessionConfig, ToolbarModel, ViewerAccess,
    DOCUMENT_KIND_NOTEBOOK,
};
use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); empty
///   uses `default_log_level()`.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        cellmark_core::default_log_level().to_string()
    } else {
        level
    };
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Toolbar button descriptor for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarActionItem {
    /// Toolbar item name (`SolutionButton|HintButton`).
    pub name: String,
    /// Block kind passed back to `notebook_toggle_cell`.
    pub kind: String,
    pub label: String,
    pub icon_class: String,
    pub class_name: String,
    pub tooltip: String,
}

/// One cell as the viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellViewItem {
    pub index: u32,
    pub cell_id: String,
    /// `none|hint|solution`.
    pub classification: String,
    /// Presentation classes to apply (`is-hint` or `is-solution`, or none).
    pub classes: Vec<String>,
    pub banner_label: Option<String>,
    pub reveal_label: Option<String>,
    pub content_collapsed: bool,
    pub preview: Option<String>,
}

/// Response envelope for `notebook_open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookOpenResponse {
    pub ok: bool,
    /// Whether the enablement query allowed wiring for this session.
    pub enabled: bool,
    /// `instructor|student`.
    pub viewer: String,
    pub cells: Vec<CellViewItem>,
    pub migrated_cells: u32,
    pub message: String,
}

/// Response envelope for `notebook_toggle_cell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellActionResponse {
    pub ok: bool,
    pub cell: Option<CellViewItem>,
    pub message: String,
}

impl CellActionResponse {
    fn success(message: impl Into<String>, cell: CellViewItem) -> Self {
        Self {
            ok: true,
            cell: Some(cell),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            cell: None,
            message: message.into(),
        }
    }
}

/// Response envelope for `notebook_migrate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateResponse {
    pub ok: bool,
    pub migrated_cells: u32,
    pub message: String,
}

/// Lists the marking buttons for the current session.
///
/// # FFI contract
/// - Empty when the session is disabled or the viewer is a student.
#[flutter_rust_bridge::frb(sync)]
pub fn toolbar_actions(enablement_body: String) -> Vec<ToolbarActionItem> {
    let source = JsonBodyEnablement::new(enablement_body.as_str());
    let mut registry = ExtensionRegistry::new();
    if cellmark_core::activate(&source, &mut registry).is_err() {
        return Vec::new();
    }

    let mut toolbar = ToolbarModel::new();
    registry.attach_to(DOCUMENT_KIND_NOTEBOOK, &mut toolbar);
    toolbar
        .items()
        .map(|action| ToolbarActionItem {
            name: action.name.clone(),
            kind: action.kind.as_str().to_string(),
            label: action.label.clone(),
            icon_class: action.icon_class.clone(),
            class_name: action.class_name.clone(),
            tooltip: action.tooltip.clone(),
        })
        .collect()
}

/// Opens a notebook file and initializes every cell for the viewer.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Legacy `is_solution` metadata found on open is migrated and saved.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_open(path: String, enablement_body: String) -> NotebookOpenResponse {
    let session = resolve_session(&enablement_body);
    let viewer = session.viewer.as_str().to_string();
    if !session.enabled {
        return NotebookOpenResponse {
            ok: true,
            enabled: false,
            viewer,
            cells: Vec::new(),
            migrated_cells: 0,
            message: "Cellmark is disabled for this session.".to_string(),
        };
    }

    let classifier = CellClassifier::new(session.viewer);
    let result = guarded(|| {
        let notebook = load_notebook(&path).map_err(|err| err.to_string())?;
        let opened = NotebookSession::open(notebook, &classifier);
        if opened.metadata_changed() {
            save_notebook(opened.notebook(), &path).map_err(|err| err.to_string())?;
        }
        let cells: Vec<CellViewItem> = opened.cell_views().iter().map(to_cell_view_item).collect();
        Ok((cells, opened.migrated_cells()))
    });

    match result {
        Ok((cells, migrated)) => NotebookOpenResponse {
            ok: true,
            enabled: true,
            viewer,
            message: format!("Opened notebook, migrated {migrated} cell(s)."),
            cells,
            migrated_cells: to_u32(migrated),
        },
        Err(message) => NotebookOpenResponse {
            ok: false,
            enabled: true,
            viewer,
            cells: Vec::new(),
            migrated_cells: 0,
            message: format!("notebook_open failed: {message}"),
        },
    }
}

/// Toggles `kind` (`hint|solution`) on one cell and saves the notebook.
///
/// # FFI contract
/// - Instructor-only; student and disabled sessions get a failure envelope.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_toggle_cell(
    path: String,
    cell_index: u32,
    kind: String,
    enablement_body: String,
) -> CellActionResponse {
    let session = resolve_session(&enablement_body);
    if !session.enabled {
        return CellActionResponse::failure("notebook_toggle_cell failed: session is disabled");
    }
    if session.viewer != ViewerAccess::Instructor {
        return CellActionResponse::failure(
            "notebook_toggle_cell failed: marking cells requires instructor access",
        );
    }
    let requested = match BlockKind::parse(&kind) {
        Ok(requested) => requested,
        Err(err) => {
            return CellActionResponse::failure(format!("notebook_toggle_cell failed: {err}"));
        }
    };

    let classifier = CellClassifier::new(session.viewer);
    let result = guarded(|| {
        let index = cell_index as usize;
        let notebook = load_notebook(&path).map_err(|err| err.to_string())?;
        let mut opened = NotebookSession::open(notebook, &classifier);
        let outcome = opened
            .toggle_cell(index, requested)
            .map_err(|err| err.to_string())?;
        if opened.metadata_changed() {
            save_notebook(opened.notebook(), &path).map_err(|err| err.to_string())?;
        }
        let view = opened.cell_view(index).map_err(|err| err.to_string())?;
        Ok((outcome.next, to_cell_view_item(&view)))
    });

    match result {
        Ok((next, item)) => CellActionResponse::success(format!("Cell is now {next}."), item),
        Err(message) => {
            CellActionResponse::failure(format!("notebook_toggle_cell failed: {message}"))
        }
    }
}

/// Removes legacy `is_solution` metadata from every cell and saves.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_migrate(path: String) -> MigrateResponse {
    let classifier = CellClassifier::new(ViewerAccess::Instructor);
    let result = guarded(|| {
        let notebook = load_notebook(&path).map_err(|err| err.to_string())?;
        let opened = NotebookSession::open(notebook, &classifier);
        if opened.metadata_changed() {
            save_notebook(opened.notebook(), &path).map_err(|err| err.to_string())?;
        }
        Ok(opened.migrated_cells())
    });

    match result {
        Ok(migrated) => MigrateResponse {
            ok: true,
            migrated_cells: to_u32(migrated),
            message: format!("Migrated {migrated} cell(s)."),
        },
        Err(message) => MigrateResponse {
            ok: false,
            migrated_cells: 0,
            message: format!("notebook_migrate failed: {message}"),
        },
    }
}

fn resolve_session(enablement_body: &str) -> SessionConfig {
    SessionConfig::resolve(&JsonBodyEnablement::new(enablement_body))
}

// Header-region defects panic inside core; keep them on this side of FFI.
fn guarded<T>(f: impl FnOnce() -> Result<T, String>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            warn!("event=ffi_call module=ffi status=error error_code=panic_caught");
            Err("internal error while updating notebook".to_string())
        }
    }
}

fn to_cell_view_item(view: &CellView) -> CellViewItem {
    CellViewItem {
        index: to_u32(view.index),
        cell_id: view.cell_id.clone(),
        classification: view.classification.label().to_string(),
        classes: view.classes.clone(),
        banner_label: view.banner_label.clone(),
        reveal_label: view.reveal_label.clone(),
        content_collapsed: view.content_collapsed,
        preview: view.preview.clone(),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
