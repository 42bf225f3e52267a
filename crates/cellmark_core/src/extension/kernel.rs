//! Widget extension registry and plugin activation.

use crate::extension::toolbar::{PresentationAdapter, Toolbar, ToolbarButtons};
use crate::service::classifier::CellClassifier;
use crate::session::{EnablementSource, SessionConfig};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Plugin id used when registering with a host.
pub const PLUGIN_ID: &str = "jupyterlab_rmotr_solutions";
/// Document kind the toolbar buttons attach to.
pub const DOCUMENT_KIND_NOTEBOOK: &str = "Notebook";
/// Registry id of the marking toolbar extension.
pub const TOOLBAR_EXTENSION_ID: &str = "cellmark.toolbar.buttons";

/// Registered adapters, keyed by document kind then extension id.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: BTreeMap<String, BTreeMap<String, Box<dyn PresentationAdapter>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one adapter for documents of `document_kind`.
    pub fn add_widget_extension(
        &mut self,
        document_kind: &str,
        extension_id: &str,
        adapter: Box<dyn PresentationAdapter>,
    ) -> Result<(), ExtensionKernelError> {
        let document_kind = document_kind.trim();
        if document_kind.is_empty() {
            return Err(ExtensionKernelError::EmptyDocumentKind);
        }
        let extension_id = extension_id.trim();
        if extension_id.is_empty() {
            return Err(ExtensionKernelError::EmptyExtensionId);
        }

        let slot = self.entries.entry(document_kind.to_string()).or_default();
        if slot.contains_key(extension_id) {
            return Err(ExtensionKernelError::DuplicateExtensionId(
                extension_id.to_string(),
            ));
        }
        slot.insert(extension_id.to_string(), adapter);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, document_kind: &str, extension_id: &str) -> bool {
        self.entries
            .get(document_kind)
            .is_some_and(|slot| slot.contains_key(extension_id))
    }

    /// Attaches every adapter registered for `document_kind` to a newly
    /// opened document's toolbar. Returns how many adapters ran.
    pub fn attach_to(&self, document_kind: &str, toolbar: &mut dyn Toolbar) -> usize {
        let Some(slot) = self.entries.get(document_kind) else {
            return 0;
        };
        for adapter in slot.values() {
            adapter.attach_controls(toolbar);
        }
        slot.len()
    }
}

/// Outcome of plugin activation.
#[derive(Debug, Clone)]
pub enum Activation {
    /// Enablement query said no (or failed); nothing was wired.
    Inert,
    /// Classifier ready for `initialize` on every opened document.
    Active {
        session: SessionConfig,
        classifier: CellClassifier,
    },
}

impl Activation {
    pub fn classifier(&self) -> Option<&CellClassifier> {
        match self {
            Self::Inert => None,
            Self::Active { classifier, .. } => Some(classifier),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Resolves the session and wires the plugin into `registry`.
///
/// Toolbar buttons are only registered for instructors.
pub fn activate(
    source: &impl EnablementSource,
    registry: &mut ExtensionRegistry,
) -> Result<Activation, ExtensionKernelError> {
    let session = SessionConfig::resolve(source);
    if !session.enabled {
        info!("event=plugin_activate module=extension status=inert plugin_id={PLUGIN_ID}");
        return Ok(Activation::Inert);
    }

    if session.viewer.can_see_all_content() {
        registry.add_widget_extension(
            DOCUMENT_KIND_NOTEBOOK,
            TOOLBAR_EXTENSION_ID,
            Box::new(ToolbarButtons),
        )?;
    }

    info!(
        "event=plugin_activate module=extension status=ok plugin_id={PLUGIN_ID} viewer={} toolbar={}",
        session.viewer.as_str(),
        session.viewer.can_see_all_content()
    );
    Ok(Activation::Active {
        session,
        classifier: CellClassifier::new(session.viewer),
    })
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKernelError {
    EmptyDocumentKind,
    EmptyExtensionId,
    DuplicateExtensionId(String),
}

impl Display for ExtensionKernelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDocumentKind => write!(f, "document kind must not be empty"),
            Self::EmptyExtensionId => write!(f, "extension id must not be empty"),
            Self::DuplicateExtensionId(value) => {
                write!(f, "extension id already registered: {value}")
            }
        }
    }
}

impl Error for ExtensionKernelError {}
