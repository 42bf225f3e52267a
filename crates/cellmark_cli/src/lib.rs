//! Command-line host for marking hint/solution cells in `.ipynb` files.
//!
//! # Responsibility
//! - Parse commands and resolve the viewer session once per invocation.
//! - Drive `NotebookSession` and render its cell views as text or JSON.
//!
//! # Invariants
//! - Notebook files are rewritten only when cell metadata changed.
//! - Marking cells always runs with instructor access.

use anyhow::{bail, Context, Result};
use cellmark_core::{
    init_logging, load_notebook, save_notebook, BlockKind, CellClassifier, CellView,
    JsonBodyEnablement, NotebookSession, SessionConfig, ViewerAccess,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

/// Mark notebook cells as hint or solution blocks.
#[derive(Debug, Parser)]
#[command(name = "cellmark", version)]
pub struct Cli {
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (`trace|debug|info|warn|error`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every cell with its classification.
    List(ViewArgs),
    /// Render the notebook as a viewer sees it, optionally pressing reveal controls.
    View(ViewArgs),
    /// Toggle a block kind on one cell (instructor action).
    Mark {
        notebook: PathBuf,
        /// Zero-based cell index.
        index: usize,
        /// `hint` or `solution`.
        kind: String,
    },
    /// Remove legacy `is_solution` metadata from every cell.
    Migrate {
        notebook: PathBuf,
        /// Report what would change without writing the file.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    pub notebook: PathBuf,

    /// Viewer role; only `teacher` sees every cell.
    #[arg(long, default_value = "teacher")]
    pub role: String,

    /// JSON enablement response (`{"is_enabled": bool, "role": string}`);
    /// overrides `--role`.
    #[arg(long)]
    pub enablement: Option<PathBuf>,

    /// Treat the session as disabled, as a failed enablement query would.
    #[arg(long, conflicts_with = "enablement")]
    pub disabled: bool,

    /// Activate the reveal control of this cell index (repeatable).
    #[arg(long = "reveal")]
    pub reveal: Vec<usize>,

    /// Print cell views as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Runs one parsed command and returns its stdout text.
pub fn run(cli: Cli) -> Result<String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| cellmark_core::default_log_level().to_string());
        init_logging(&level, &log_dir.to_string_lossy()).context("failed to start logging")?;
    }

    match cli.command {
        Command::List(args) => view(&args, false),
        Command::View(args) => view(&args, true),
        Command::Mark {
            notebook,
            index,
            kind,
        } => mark(&notebook, index, &kind),
        Command::Migrate { notebook, dry_run } => migrate(&notebook, dry_run),
    }
}

fn resolve_session(args: &ViewArgs) -> Result<SessionConfig> {
    if args.disabled {
        return Ok(SessionConfig::disabled());
    }
    match &args.enablement {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read enablement file {}", path.display()))?;
            Ok(SessionConfig::resolve(&JsonBodyEnablement::new(&body)))
        }
        None => Ok(SessionConfig::enabled_for(ViewerAccess::from_role(&args.role))),
    }
}

fn view(args: &ViewArgs, with_source: bool) -> Result<String> {
    let session = resolve_session(args)?;
    if !session.enabled {
        return Ok("cellmark is disabled for this session\n".to_string());
    }

    let notebook = load_notebook(&args.notebook)?;
    let classifier = CellClassifier::new(session.viewer);
    let mut opened = NotebookSession::open(notebook, &classifier);
    for &index in &args.reveal {
        if opened.reveal_cell(index)?.is_none() {
            bail!("cell {index} has no reveal control for this viewer");
        }
    }

    let views = opened.cell_views();
    if args.json {
        return Ok(serde_json::to_string_pretty(&views)? + "\n");
    }

    let mut out = String::new();
    for view in &views {
        if with_source {
            render_cell(&mut out, view, &opened)?;
        } else {
            writeln!(
                out,
                "{:>3}  {:<10} {:<9} {}",
                view.index,
                view.cell_type,
                view.classification,
                view.preview.as_deref().unwrap_or("")
            )?;
        }
    }
    Ok(out)
}

fn render_cell(out: &mut String, view: &CellView, opened: &NotebookSession<'_>) -> fmt::Result {
    writeln!(out, "[{}] {} cell {}", view.index, view.cell_type, view.cell_id)?;
    if let Some(label) = &view.banner_label {
        match &view.reveal_label {
            Some(control) => writeln!(out, "  == {label} ==  [{control}]")?,
            None => writeln!(out, "  == {label} ==")?,
        }
    }
    if view.content_collapsed {
        return writeln!(out, "  (hidden)");
    }
    let source = opened
        .notebook()
        .cell(view.index)
        .map(|cell| cell.source_text())
        .unwrap_or_default();
    for line in source.lines() {
        writeln!(out, "  | {line}")?;
    }
    Ok(())
}

fn mark(path: &Path, index: usize, kind: &str) -> Result<String> {
    let requested = BlockKind::parse(kind)?;
    let notebook = load_notebook(path)?;
    let classifier = CellClassifier::new(ViewerAccess::Instructor);
    let mut opened = NotebookSession::open(notebook, &classifier);
    let outcome = opened.toggle_cell(index, requested)?;
    if opened.metadata_changed() {
        save_notebook(opened.notebook(), path)?;
        info!(
            "event=cli_mark module=cli status=ok index={} previous={} next={}",
            index, outcome.previous, outcome.next
        );
    }
    Ok(format!("cell {index}: {} -> {}\n", outcome.previous, outcome.next))
}

fn migrate(path: &Path, dry_run: bool) -> Result<String> {
    let notebook = load_notebook(path)?;
    let classifier = CellClassifier::new(ViewerAccess::Instructor);
    let opened = NotebookSession::open(notebook, &classifier);
    let migrated = opened.migrated_cells();
    if migrated > 0 && !dry_run {
        save_notebook(opened.notebook(), path)?;
        info!("event=cli_migrate module=cli status=ok migrated={migrated}");
    }
    let verb = if dry_run { "would migrate" } else { "migrated" };
    Ok(format!("{verb} {migrated} cell(s)\n"))
}
