//! Modal sessions: dialog state, dialog stack, and the owning context.
//!
//! A [`Dialog`] is one modal session with its own focus boundary and
//! restoration target. The [`DialogStack`] orders open dialogs by z-order;
//! the topmost is "current" and is the only one whose focus-trap listener is
//! active. [`ModalContext`] owns the tree, the focus state, and the stack,
//! and exposes the open/close/replace operations.

pub mod context;
pub mod dialog;
pub mod stack;

pub use context::ModalContext;
pub use dialog::{Dialog, DialogOptions, FocusTarget};
pub use stack::DialogStack;

use crate::dom::node::NodeId;

/// Class added to the tree root while at least one dialog is open.
pub const DIALOG_OPEN_CLASS: &str = "has-dialog";

/// Class identifying (and applied to) a dialog's backdrop node.
pub const BACKDROP_CLASS: &str = "dialog-backdrop";

/// Class toggled on a backdrop while its dialog is open.
pub const ACTIVE_CLASS: &str = "active";

/// Class marking a dialog container as hidden.
pub const HIDDEN_CLASS: &str = "hidden";

/// Class carried by the invisible boundary sentinels.
pub const SENTINEL_CLASS: &str = "focus-sentinel";

/// Errors from dialog construction.
///
/// Both variants are construction-time, fatal-to-the-call failures: the
/// dialog is not created and the stack and tree are left unmodified.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// A required lookup key did not resolve to a node in the tree.
    #[error("no node found for {0}")]
    NotFound(String),
    /// The dialog was configured in a way that can never work, e.g. a
    /// container without the modal marker.
    #[error("invalid dialog configuration: {0}")]
    InvalidConfiguration(String),
}

/// Everything resolved and validated before any mutation happens.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedDialog {
    pub container: NodeId,
    pub focus_after_close: NodeId,
    pub focus_first: Option<NodeId>,
}
