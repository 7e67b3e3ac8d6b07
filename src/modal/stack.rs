//! Dialog stack: insertion order is z-order, last entry is current.

use super::dialog::Dialog;

/// Ordered collection of open dialogs.
///
/// Invariant: at most one dialog has an active focus-trap listener, and it is
/// always the topmost entry (or none at all). `push` deactivates the outgoing
/// top before appending; activating the incoming top is the caller's job,
/// as is reactivating the uncovered top after `pop`.
#[derive(Debug, Default)]
pub struct DialogStack {
    dialogs: Vec<Dialog>,
}

impl DialogStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current (topmost) dialog, if any.
    pub fn current(&self) -> Option<&Dialog> {
        self.dialogs.last()
    }

    /// Mutable access to the current dialog.
    pub fn current_mut(&mut self) -> Option<&mut Dialog> {
        self.dialogs.last_mut()
    }

    /// Push a dialog on top, deactivating the previous top's listener first.
    pub fn push(&mut self, dialog: Dialog) {
        if let Some(top) = self.dialogs.last_mut() {
            top.remove_listeners();
        }
        self.dialogs.push(dialog);
        self.debug_check_listeners();
    }

    /// Remove and return the topmost dialog.
    pub fn pop(&mut self) -> Option<Dialog> {
        let dialog = self.dialogs.pop();
        self.debug_check_listeners();
        dialog
    }

    /// Number of open dialogs.
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    /// Whether no dialog is open.
    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Iterate over open dialogs, bottom of the stack first.
    pub fn iter(&self) -> impl Iterator<Item = &Dialog> {
        self.dialogs.iter()
    }

    /// Violating the single-active-listener invariant is a programming error,
    /// not a runtime condition to surface.
    fn debug_check_listeners(&self) {
        debug_assert!(
            self.dialogs
                .iter()
                .rev()
                .skip(1)
                .all(|d| !d.listener_active),
            "only the topmost dialog may have an active listener"
        );
    }
}
