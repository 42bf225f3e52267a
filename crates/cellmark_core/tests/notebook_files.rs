use cellmark_core::{
    load_notebook, save_notebook, BlockKind, CellClassifier, Classification, NotebookError,
    NotebookSession, ViewerAccess,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, doc: &Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(doc).unwrap()).unwrap();
    path
}

#[test]
fn toggle_and_save_keeps_unrelated_fields() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "lesson.ipynb",
        &json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"kernelspec": {"name": "python3"}},
            "cells": [{
                "id": "ex-1",
                "cell_type": "code",
                "execution_count": 3,
                "metadata": {"tags": ["graded"]},
                "outputs": [{"output_type": "stream", "name": "stdout", "text": "ok\n"}],
                "source": ["total = 0\n", "for x in xs:\n"],
            }],
        }),
    );

    let classifier = CellClassifier::new(ViewerAccess::Instructor);
    let mut session = NotebookSession::open(load_notebook(&path).unwrap(), &classifier);
    let outcome = session.toggle_cell(0, BlockKind::Hint).unwrap();
    assert_eq!(outcome.next, Classification::Hint);
    save_notebook(session.notebook(), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    let saved: Value = serde_json::from_str(&text).unwrap();
    let cell = &saved["cells"][0];
    assert_eq!(cell["id"], json!("ex-1"));
    assert_eq!(cell["execution_count"], json!(3));
    assert_eq!(cell["outputs"][0]["text"], json!("ok\n"));
    assert_eq!(cell["source"], json!(["total = 0\n", "for x in xs:\n"]));
    assert_eq!(cell["metadata"], json!({"tags": ["graded"], "cell_type": "hint"}));
    assert_eq!(saved["metadata"]["kernelspec"]["name"], json!("python3"));
}

#[test]
fn pre_id_notebooks_stay_without_ids() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        "old.ipynb",
        &json!({
            "nbformat": 4,
            "nbformat_minor": 2,
            "metadata": {},
            "cells": [{
                "cell_type": "markdown",
                "metadata": {"is_solution": "yes"},
                "source": "# Answer",
            }],
        }),
    );

    let classifier = CellClassifier::new(ViewerAccess::Student);
    let session = NotebookSession::open(load_notebook(&path).unwrap(), &classifier);
    assert_eq!(session.migrated_cells(), 1);
    let view = session.cell_view(0).unwrap();
    assert_eq!(view.cell_id, "cell-0");
    assert_eq!(view.classification, Classification::Solution);
    assert_eq!(view.preview.as_deref(), Some("Answer"));

    save_notebook(session.notebook(), &path).unwrap();
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(saved["cells"][0].get("id").is_none());
    assert_eq!(saved["cells"][0]["metadata"], json!({"cell_type": "solution"}));
}

#[test]
fn load_reports_missing_files_and_foreign_formats() {
    let dir = TempDir::new().unwrap();
    let err = load_notebook(dir.path().join("missing.ipynb")).unwrap_err();
    assert!(matches!(err, NotebookError::Io { .. }));

    let path = write_json(
        &dir,
        "v3.ipynb",
        &json!({"nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": []}),
    );
    let err = load_notebook(&path).unwrap_err();
    assert!(matches!(err, NotebookError::UnsupportedFormat(3)));
}
