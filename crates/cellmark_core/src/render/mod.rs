//! Visual layer contracts for classified cells.
//!
//! # Responsibility
//! - Describe the header banner and its reveal/hide control as plain data.
//! - Define the surface a host implements to show classes, banners and the
//!   collapsed state of a cell's content region.
//!
//! # Invariants
//! - Rendering reflects classification, it never changes it.
//! - Reveal controls exist only for viewers who cannot see all content.
//!
//! # See also
//! - `service::classifier` for the controller driving these contracts.

mod surface;

pub use surface::{CellSurface, HeadlessSurface};

use crate::model::classification::BlockKind;
use crate::session::ViewerAccess;
use serde::Serialize;

/// Student-facing control toggling a cell's content region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealControl {
    kind: BlockKind,
    expanded: bool,
}

impl RevealControl {
    /// Creates a control for collapsed content.
    pub fn collapsed(kind: BlockKind) -> Self {
        Self {
            kind,
            expanded: false,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Current button text, `Reveal <kind>` or `Hide <kind>`.
    pub fn label(&self) -> String {
        if self.expanded {
            format!("Hide {}", self.kind)
        } else {
            format!("Reveal {}", self.kind)
        }
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }
}

/// Header banner mounted above a classified cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BlockKind,
    /// Text naming the classification, e.g. `solution block`.
    pub label: String,
    pub reveal: Option<RevealControl>,
}

/// Banner plus the content state it starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerLayout {
    pub banner: Banner,
    pub content_collapsed: bool,
}

/// Produces banner descriptions for a classification and viewer.
pub trait BannerRenderer {
    fn render(&self, kind: BlockKind, viewer: ViewerAccess) -> BannerLayout;
}

/// Stock banner: label plus a reveal control for students only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBannerRenderer;

impl BannerRenderer for DefaultBannerRenderer {
    fn render(&self, kind: BlockKind, viewer: ViewerAccess) -> BannerLayout {
        let label = format!("{kind} block");
        if viewer.can_see_all_content() {
            BannerLayout {
                banner: Banner {
                    kind,
                    label,
                    reveal: None,
                },
                content_collapsed: false,
            }
        } else {
            BannerLayout {
                banner: Banner {
                    kind,
                    label,
                    reveal: Some(RevealControl::collapsed(kind)),
                },
                content_collapsed: true,
            }
        }
    }
}
