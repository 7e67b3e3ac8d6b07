//! Dialog: one modal session and its construction options.

use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// FocusTarget
// ---------------------------------------------------------------------------

/// A node reference or a lookup key, resolved once at dialog construction.
#[derive(Debug, Clone)]
pub enum FocusTarget {
    /// Direct node reference.
    Node(NodeId),
    /// Lookup key resolved via the tree.
    Id(String),
}

impl From<NodeId> for FocusTarget {
    fn from(node: NodeId) -> Self {
        FocusTarget::Node(node)
    }
}

impl From<&str> for FocusTarget {
    fn from(id: &str) -> Self {
        FocusTarget::Id(id.to_owned())
    }
}

impl From<String> for FocusTarget {
    fn from(id: String) -> Self {
        FocusTarget::Id(id)
    }
}

// ---------------------------------------------------------------------------
// DialogOptions
// ---------------------------------------------------------------------------

/// Configuration for opening a dialog.
#[derive(Debug, Clone)]
pub struct DialogOptions {
    /// Node to focus on open, overriding the default descendant search.
    pub focus_first: Option<FocusTarget>,
    /// Clear the values of all input descendants on open.
    pub clear_on_open: bool,
    /// When true, the caller manages the container's focusability and the
    /// crate never forces its tab index into the tab order.
    pub manage_container_focus: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            focus_first: None,
            clear_on_open: true,
            manage_container_focus: false,
        }
    }
}

impl DialogOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node to focus on open (builder).
    pub fn with_focus_first(mut self, target: impl Into<FocusTarget>) -> Self {
        self.focus_first = Some(target.into());
        self
    }

    /// Set whether input descendants are cleared on open (builder).
    pub fn clear_on_open(mut self, clear: bool) -> Self {
        self.clear_on_open = clear;
        self
    }

    /// Let the caller manage the container's focusability (builder).
    pub fn manage_container_focus(mut self, manage: bool) -> Self {
        self.manage_container_focus = manage;
        self
    }
}

// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

/// One modal session.
///
/// Owns the ids of its boundary sentinels and backdrop; the nodes themselves
/// live in the tree and exist exactly while the dialog is open. The dialog is
/// discarded on close or replace, never reused.
#[derive(Debug)]
pub struct Dialog {
    /// The node acting as the modal surface. Carries the modal marker.
    pub container: NodeId,
    /// Backdrop node wrapping the container.
    pub backdrop: NodeId,
    /// Invisible focusable node inserted immediately before the container.
    pub pre_sentinel: NodeId,
    /// Invisible focusable node inserted immediately after the container.
    pub post_sentinel: NodeId,
    /// Node to focus when this dialog closes.
    pub focus_after_close: NodeId,
    /// Explicit node focused on open, if configured.
    pub focus_first: Option<NodeId>,
    /// Last node focused inside the container; used to detect stuck focus
    /// that requires wrapping to the other end of the dialog.
    pub last_focused: Option<NodeId>,
    /// Whether this dialog's focus-trap listener is installed.
    pub listener_active: bool,
    /// Mirrors [`DialogOptions::manage_container_focus`] for trap fallbacks.
    pub manage_container_focus: bool,
}

impl Dialog {
    /// Install this dialog's focus-trap listener.
    pub fn add_listeners(&mut self) {
        self.listener_active = true;
    }

    /// Uninstall this dialog's focus-trap listener.
    pub fn remove_listeners(&mut self) {
        self.listener_active = false;
    }
}
