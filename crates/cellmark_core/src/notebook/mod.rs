//! Notebook documents backed by nbformat JSON.
//!
//! # Responsibility
//! - Parse and serialize `.ipynb` files while preserving unknown fields.
//! - Expose each cell as a `CellHandle` for the classifier.
//!
//! # Invariants
//! - Fields this crate does not interpret round-trip unchanged.
//! - Persisted cell ids match `^[a-zA-Z0-9-_]{1,64}$`.
//! - Ids are generated on load only for formats that require them (>= 4.5).
//!
//! # See also
//! - `service::classifier` for the per-cell state machine.

mod preview;
mod session;

pub use preview::cell_preview;
pub use session::{CellView, NotebookSession};

use crate::render::HeadlessSurface;
use crate::service::classifier::CellHandle;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

static CELL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("valid cell id regex"));

/// First minor version of nbformat 4 that requires cell ids.
const CELL_ID_MIN_MINOR: u32 = 5;

pub type NotebookResult<T> = Result<T, NotebookError>;

/// Errors from notebook parsing, IO and cell addressing.
#[derive(Debug)]
pub enum NotebookError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    UnsupportedFormat(u32),
    InvalidCellId(String),
    CellOutOfRange { index: usize, len: usize },
    /// A toolbar action fired while no cell had focus.
    NoActiveCell,
}

impl Display for NotebookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "notebook io failed for `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "notebook json is invalid: {err}"),
            Self::UnsupportedFormat(major) => {
                write!(f, "notebook format {major} is unsupported (expected 4)")
            }
            Self::InvalidCellId(value) => write!(f, "cell id is invalid: `{value}`"),
            Self::CellOutOfRange { index, len } => {
                write!(f, "cell index {index} out of range for notebook with {len} cell(s)")
            }
            Self::NoActiveCell => write!(f, "no active cell to apply the toolbar action to"),
        }
    }
}

impl Error for NotebookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NotebookError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawNotebook {
    #[serde(default)]
    cells: Vec<RawCell>,
    #[serde(default)]
    metadata: Map<String, Value>,
    nbformat: u32,
    nbformat_minor: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default = "empty_source")]
    source: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn empty_source() -> Value {
    Value::String(String::new())
}

/// One notebook cell plus its transient visual state.
#[derive(Debug, Clone)]
pub struct NotebookCell {
    id: String,
    persist_id: bool,
    cell_type: String,
    metadata: Map<String, Value>,
    source: Value,
    extra: Map<String, Value>,
    surface: HeadlessSurface,
}

impl NotebookCell {
    /// Creates a new cell with a generated id.
    pub fn new(cell_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: generate_cell_id(),
            persist_id: true,
            cell_type: cell_type.into(),
            metadata: Map::new(),
            source: Value::String(source.into()),
            extra: Map::new(),
            surface: HeadlessSurface::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// nbformat cell type (`code`, `markdown`, `raw`).
    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.metadata
    }

    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    /// Source joined into one string, whatever shape it was stored in.
    pub fn source_text(&self) -> String {
        match &self.source {
            Value::String(text) => text.clone(),
            Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
            _ => String::new(),
        }
    }

    fn from_raw(raw: RawCell, index: usize, ids_required: bool) -> NotebookResult<Self> {
        let (id, persist_id) = match raw.id {
            Some(id) if is_valid_cell_id(&id) => (id, true),
            Some(id) => return Err(NotebookError::InvalidCellId(id)),
            None if ids_required => (generate_cell_id(), true),
            None => (format!("cell-{index}"), false),
        };
        Ok(Self {
            id,
            persist_id,
            cell_type: raw.cell_type,
            metadata: raw.metadata,
            source: raw.source,
            extra: raw.extra,
            surface: HeadlessSurface::new(),
        })
    }

    fn to_raw(&self) -> RawCell {
        RawCell {
            cell_type: self.cell_type.clone(),
            id: self.persist_id.then(|| self.id.clone()),
            metadata: self.metadata.clone(),
            source: self.source.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl CellHandle for NotebookCell {
    type Metadata = Map<String, Value>;
    type Surface = HeadlessSurface;

    fn cell_id(&self) -> &str {
        &self.id
    }

    fn parts_mut(&mut self) -> (&mut Self::Metadata, &mut Self::Surface) {
        (&mut self.metadata, &mut self.surface)
    }
}

/// Parsed nbformat 4 document.
#[derive(Debug, Clone)]
pub struct Notebook {
    cells: Vec<NotebookCell>,
    metadata: Map<String, Value>,
    nbformat_minor: u32,
    extra: Map<String, Value>,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

impl Notebook {
    /// Empty nbformat 4.5 notebook.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Map::new(),
            nbformat_minor: CELL_ID_MIN_MINOR,
            extra: Map::new(),
        }
    }

    pub fn from_json_str(json: &str) -> NotebookResult<Self> {
        let raw: RawNotebook = serde_json::from_str(json)?;
        if raw.nbformat != 4 {
            return Err(NotebookError::UnsupportedFormat(raw.nbformat));
        }
        let ids_required = raw.nbformat_minor >= CELL_ID_MIN_MINOR;
        let cells = raw
            .cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| NotebookCell::from_raw(cell, index, ids_required))
            .collect::<NotebookResult<Vec<_>>>()?;

        Ok(Self {
            cells,
            metadata: raw.metadata,
            nbformat_minor: raw.nbformat_minor,
            extra: raw.extra,
        })
    }

    /// Serializes with the one-space indentation notebook tools write.
    pub fn to_json_string(&self) -> NotebookResult<String> {
        let raw = RawNotebook {
            cells: self.cells.iter().map(NotebookCell::to_raw).collect(),
            metadata: self.metadata.clone(),
            nbformat: 4,
            nbformat_minor: self.nbformat_minor,
            extra: self.extra.clone(),
        };
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        raw.serialize(&mut serializer)?;
        buf.push(b'\n');
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn push_cell(&mut self, cell: NotebookCell) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[NotebookCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [NotebookCell] {
        &mut self.cells
    }

    pub fn cell(&self, index: usize) -> NotebookResult<&NotebookCell> {
        let len = self.cells.len();
        self.cells
            .get(index)
            .ok_or(NotebookError::CellOutOfRange { index, len })
    }

    pub fn cell_mut(&mut self, index: usize) -> NotebookResult<&mut NotebookCell> {
        let len = self.cells.len();
        self.cells
            .get_mut(index)
            .ok_or(NotebookError::CellOutOfRange { index, len })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Reads and parses a notebook file.
///
/// # Side effects
/// - Emits `notebook_load` logging events with duration and status.
pub fn load_notebook(path: impl AsRef<Path>) -> NotebookResult<Notebook> {
    let path = path.as_ref();
    let started_at = Instant::now();
    let result = std::fs::read_to_string(path)
        .map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|json| Notebook::from_json_str(&json));

    match &result {
        Ok(notebook) => info!(
            "event=notebook_load module=notebook status=ok cells={} duration_ms={}",
            notebook.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=notebook_load module=notebook status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Serializes and writes a notebook file.
pub fn save_notebook(notebook: &Notebook, path: impl AsRef<Path>) -> NotebookResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    let result = notebook.to_json_string().and_then(|json| {
        std::fs::write(path, json).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    match &result {
        Ok(()) => info!(
            "event=notebook_save module=notebook status=ok cells={} duration_ms={}",
            notebook.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=notebook_save module=notebook status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

pub fn is_valid_cell_id(value: &str) -> bool {
    CELL_ID_RE.is_match(value)
}

fn generate_cell_id() -> String {
    Uuid::new_v4().simple().to_string()
}
