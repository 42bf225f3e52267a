//! Host surface trait and an in-memory implementation.

use crate::render::Banner;
use std::collections::BTreeSet;

/// Visual state of one cell as the host exposes it.
///
/// Implementations wrap whatever widget tree the host uses; the controller
/// only talks to this trait.
pub trait CellSurface {
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Whether the header region a banner mounts into exists.
    fn has_header_region(&self) -> bool;
    /// Mounts `banner` into the header region, replacing any existing one.
    fn mount_banner(&mut self, banner: Banner);
    fn unmount_banner(&mut self) -> Option<Banner>;
    fn banner(&self) -> Option<&Banner>;
    fn banner_mut(&mut self) -> Option<&mut Banner>;

    fn set_content_collapsed(&mut self, collapsed: bool);
    fn is_content_collapsed(&self) -> bool;
}

/// Surface without a widget tree, used by document sessions and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    classes: BTreeSet<String>,
    banner: Option<Banner>,
    content_collapsed: bool,
    header_region: bool,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            classes: BTreeSet::new(),
            banner: None,
            content_collapsed: false,
            header_region: true,
        }
    }

    /// Surface whose header region failed to mount.
    pub fn without_header_region() -> Self {
        Self {
            header_region: false,
            ..Self::new()
        }
    }

    /// Applied classes in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl CellSurface for HeadlessSurface {
    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn has_header_region(&self) -> bool {
        self.header_region
    }

    fn mount_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    fn unmount_banner(&mut self) -> Option<Banner> {
        self.banner.take()
    }

    fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    fn banner_mut(&mut self) -> Option<&mut Banner> {
        self.banner.as_mut()
    }

    fn set_content_collapsed(&mut self, collapsed: bool) {
        self.content_collapsed = collapsed;
    }

    fn is_content_collapsed(&self) -> bool {
        self.content_collapsed
    }
}
