//! Focusability rules and the focus director.
//!
//! [`is_focusable`] decides whether a node can receive input focus.
//! [`FocusState`] owns the currently focused node and the suppression flag,
//! and moves focus into subtrees on behalf of the modal machinery. State is
//! an explicit object passed around by the owning context; there are no
//! process-wide globals.

use crate::dom::node::{NodeData, NodeId, NodeKind};
use crate::dom::tree::Dom;

// ---------------------------------------------------------------------------
// Focusability oracle
// ---------------------------------------------------------------------------

/// Whether a node can receive input focus.
///
/// Rules, in order: a negative tab index is never focusable; a disabled node
/// is never focusable; otherwise focusability is kind-specific. A `Container`
/// carrying the modal marker is focusable, which supports focusing a dialog
/// that has no focusable content of its own.
pub fn is_focusable(data: &NodeData) -> bool {
    if data.tab_index.is_some_and(|t| t < 0) {
        return false;
    }
    if data.disabled {
        return false;
    }
    match data.kind {
        NodeKind::Link => {
            data.href.as_deref().is_some_and(|href| !href.is_empty())
                && data.rel.as_deref() != Some("ignore")
        }
        NodeKind::Input => data.input_type.as_deref() != Some("hidden"),
        NodeKind::Button | NodeKind::Select | NodeKind::TextArea => true,
        NodeKind::Container => data.modal,
        NodeKind::Text => false,
    }
}

/// Whether `subtree` has at least one focusable descendant.
///
/// Pure existence check; no focus side effect. Does not consider `subtree`
/// itself, only its descendants.
pub fn has_focusable_elements(dom: &Dom, subtree: NodeId) -> bool {
    descend(dom, subtree, Direction::Forward, &mut |node| {
        dom.get(node).is_some_and(is_focusable)
    })
}

// ---------------------------------------------------------------------------
// Descendant traversal
// ---------------------------------------------------------------------------

/// Child traversal order for descendant searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Pre-order traversal of `subtree`'s descendants: visit each child, then
/// recurse into it. Stops and returns true on the first child for which
/// `visit` returns true. The first/last/existence searches all share this
/// shape so their tie-break order is identical.
fn descend(
    dom: &Dom,
    subtree: NodeId,
    direction: Direction,
    visit: &mut dyn FnMut(NodeId) -> bool,
) -> bool {
    let mut order = dom.children(subtree).to_vec();
    if direction == Direction::Reverse {
        order.reverse();
    }
    for child in order {
        if visit(child) || descend(dom, child, direction, visit) {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// FocusState
// ---------------------------------------------------------------------------

/// The host's focus register plus the trap-suppression flag.
///
/// Focus setting is advisory: the host environment may silently refuse a
/// focus change (here, when the node is no longer in the tree), so callers
/// that care must re-query [`FocusState::focused`] afterwards, which is
/// exactly what [`FocusState::attempt_focus`] does.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<NodeId>,
    suppress: bool,
}

impl FocusState {
    /// Create a state with nothing focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently focused node, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether the focus-trap listener should ignore focus events right now.
    ///
    /// Set only for the duration of a synchronous [`attempt_focus`] call, so
    /// the director's own focus moves never re-trigger the trap. This relies
    /// on the host dispatching focus notifications synchronously, within the
    /// same call stack.
    ///
    /// [`attempt_focus`]: FocusState::attempt_focus
    pub fn is_suppressed(&self) -> bool {
        self.suppress
    }

    /// Advisory focus set. Returns false (and leaves focus unchanged) when
    /// the node is not in the tree.
    pub fn set_focus(&mut self, dom: &Dom, node: NodeId) -> bool {
        if !dom.contains(node) {
            return false;
        }
        self.focused = Some(node);
        true
    }

    /// Attempt to move focus to `node`.
    ///
    /// No-op returning false if the node is absent or not focusable.
    /// Otherwise the set happens under the suppression flag, any refusal by
    /// the host is swallowed, and the result is verified by re-querying the
    /// actual focus target.
    pub fn attempt_focus(&mut self, dom: &Dom, node: NodeId) -> bool {
        let Some(data) = dom.get(node) else {
            return false;
        };
        if !is_focusable(data) {
            return false;
        }
        self.suppress = true;
        let _ = self.set_focus(dom, node);
        self.suppress = false;
        self.focused == Some(node)
    }

    /// Focus the first focusable descendant of `subtree`, depth-first.
    ///
    /// Returns true if one was found and focused. Restartable; no state is
    /// retained between calls.
    pub fn focus_first_descendant(&mut self, dom: &Dom, subtree: NodeId) -> bool {
        descend(dom, subtree, Direction::Forward, &mut |node| {
            self.attempt_focus(dom, node)
        })
    }

    /// Focus the last focusable descendant of `subtree`.
    ///
    /// Identical to [`focus_first_descendant`] with children traversed in
    /// reverse, so the trap can wrap focus to the end of a dialog.
    ///
    /// [`focus_first_descendant`]: FocusState::focus_first_descendant
    pub fn focus_last_descendant(&mut self, dom: &Dom, subtree: NodeId) -> bool {
        descend(dom, subtree, Direction::Reverse, &mut |node| {
            self.attempt_focus(dom, node)
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
