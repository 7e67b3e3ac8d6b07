//! Pilot: programmatic interaction with a headless host.
//!
//! The `Pilot` wraps a [`ModalContext`](crate::modal::ModalContext) and plays
//! the role of the host environment: it simulates key presses and, most
//! importantly, document tab navigation, dispatching every focus move through
//! the context so sentinels and the focus trap are exercised the way a real
//! host would exercise them.

use crate::dom::node::{NodeData, NodeId, NodeKind};
use crate::event::input::{Key, KeyEvent, Modifiers};
use crate::focus::is_focusable;
use crate::modal::ModalContext;

/// A headless host driver for testing.
pub struct Pilot {
    /// The context under test. Build the document through `context.dom`.
    pub context: ModalContext,
}

impl Pilot {
    /// Create a pilot over a document holding a single root container.
    pub fn new() -> Self {
        let mut context = ModalContext::new();
        context
            .dom
            .insert(NodeData::new(NodeKind::Container).with_id("root"));
        Self { context }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.context.dom.root().expect("pilot document has a root")
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Simulate a key press with no modifiers. Returns whether the modal
    /// machinery consumed the event.
    pub fn press_key(&mut self, key: Key) -> bool {
        self.context.handle_key(KeyEvent::new(key, Modifiers::NONE))
    }

    /// Simulate pressing the cancel key.
    pub fn press_escape(&mut self) -> bool {
        self.press_key(Key::Escape)
    }

    /// Simulate the user focusing a node directly (e.g. a mouse click).
    pub fn focus(&mut self, node: NodeId) -> bool {
        self.context.focus_node(node)
    }

    // ── Tab navigation ───────────────────────────────────────────────

    /// Simulate a Tab press: move host focus to the next tabbable node in
    /// document order, wrapping at the end. Returns the node that ended up
    /// focused, after any trap redirection.
    pub fn tab(&mut self) -> Option<NodeId> {
        self.step(true)
    }

    /// Simulate Shift+Tab: like [`tab`](Pilot::tab) but backwards.
    pub fn back_tab(&mut self) -> Option<NodeId> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> Option<NodeId> {
        let order = self.tab_order();
        if order.is_empty() {
            return None;
        }
        let position = self
            .context
            .focus
            .focused()
            .and_then(|focused| order.iter().position(|&n| n == focused));
        let next = match position {
            Some(idx) if forward => order[(idx + 1) % order.len()],
            Some(idx) => order[(idx + order.len() - 1) % order.len()],
            None if forward => order[0],
            None => order[order.len() - 1],
        };
        self.context.focus_node(next);
        self.context.focus.focused()
    }

    /// The host's tab order: depth-first document order, keeping nodes with
    /// an explicit non-negative tab index (sentinels, forced containers) and
    /// nodes the focusability rules accept. Modal containers without an
    /// explicit tab index are programmatically focusable but not natural tab
    /// stops, matching host behavior.
    fn tab_order(&self) -> Vec<NodeId> {
        let Some(root) = self.context.dom.root() else {
            return Vec::new();
        };
        self.context
            .dom
            .walk_depth_first(root)
            .into_iter()
            .filter(|&id| {
                self.context.dom.get(id).is_some_and(|data| match data.tab_index {
                    Some(t) => t >= 0 && !data.disabled,
                    None => data.kind != NodeKind::Container && is_focusable(data),
                })
            })
            .collect()
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
