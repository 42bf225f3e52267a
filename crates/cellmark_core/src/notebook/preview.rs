//! One-line cell previews for listings.

use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 80;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)]\([^)]+\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~\[\]]+").expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Collapses cell source into a single line of at most 80 chars.
///
/// Markdown images keep their alt text, links keep their label, emphasis and
/// heading markers are dropped. Returns `None` for blank sources.
pub fn cell_preview(source: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(source, "$1");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut preview = trimmed.chars().take(PREVIEW_MAX_CHARS).collect::<String>();
    if trimmed.chars().count() > PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    Some(preview)
}

#[cfg(test)]
mod tests {
    use super::cell_preview;

    #[test]
    fn strips_markdown_and_joins_lines() {
        let preview = cell_preview("# Step 2\n\nSee [docs](https://x.io) and **try** `len()`")
            .expect("non-blank source");
        assert_eq!(preview, "Step 2 See docs and try len()");
    }

    #[test]
    fn blank_source_has_no_preview() {
        assert_eq!(cell_preview(" \n\t"), None);
    }

    #[test]
    fn long_source_is_truncated() {
        let preview = cell_preview(&"x = 1\n".repeat(40)).expect("non-blank source");
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);
    }
}
