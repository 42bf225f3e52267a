//! Core logic for Cellmark hint/solution notebook cells.
//! This crate is the single source of truth for classification invariants.

pub mod extension;
pub mod logging;
pub mod model;
pub mod notebook;
pub mod render;
pub mod service;
pub mod session;

pub use extension::kernel::{
    activate, Activation, ExtensionKernelError, ExtensionRegistry, DOCUMENT_KIND_NOTEBOOK,
    PLUGIN_ID,
};
pub use extension::toolbar::{
    PresentationAdapter, Toolbar, ToolbarAction, ToolbarButtons, ToolbarModel,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::classification::{next_classification, BlockKind, Classification};
pub use model::metadata::{MetadataStore, METADATA_CELL_TYPE, METADATA_LEGACY_IS_SOLUTION};
pub use notebook::{
    cell_preview, load_notebook, save_notebook, CellView, Notebook, NotebookCell, NotebookError,
    NotebookResult, NotebookSession,
};
pub use render::{
    Banner, BannerLayout, BannerRenderer, CellSurface, DefaultBannerRenderer, HeadlessSurface,
    RevealControl,
};
pub use service::classifier::{CellClassifier, CellHandle, InitializeOutcome, ToggleOutcome};
pub use session::{
    parse_enablement_body, EnablementError, EnablementResponse, EnablementSource,
    JsonBodyEnablement, SessionConfig, StaticEnablement, ViewerAccess,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
