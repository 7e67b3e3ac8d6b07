//! ModalContext: the owning context for tree, focus state, and dialog stack.
//!
//! All operations execute synchronously within the call that triggered them;
//! every mutator restores the stack/listener invariants before returning, so
//! any later event handler observes a consistent state.

use tracing::{debug, trace};

use crate::dom::node::{NodeData, NodeId, NodeKind};
use crate::dom::tree::Dom;
use crate::event::input::{Key, KeyEvent};
use crate::focus::{has_focusable_elements, FocusState};

use super::dialog::{Dialog, DialogOptions, FocusTarget};
use super::stack::DialogStack;
use super::{
    DialogError, ResolvedDialog, ACTIVE_CLASS, BACKDROP_CLASS, DIALOG_OPEN_CLASS, HIDDEN_CLASS,
    SENTINEL_CLASS,
};

/// Owns the document tree, the focus state, and the dialog stack.
///
/// Hosts embed one `ModalContext` per document and route two things into it:
/// key events via [`handle_key`] and capturing-phase focus changes via
/// [`focus_node`] (or [`handle_focus_event`] when the host tracks focus
/// itself). Everything else happens through [`open`], [`close`], and
/// [`replace`].
///
/// [`handle_key`]: ModalContext::handle_key
/// [`focus_node`]: ModalContext::focus_node
/// [`handle_focus_event`]: ModalContext::handle_focus_event
/// [`open`]: ModalContext::open
/// [`close`]: ModalContext::close
/// [`replace`]: ModalContext::replace
#[derive(Default)]
pub struct ModalContext {
    /// The document tree.
    pub dom: Dom,
    /// Current focus and the trap-suppression flag.
    pub focus: FocusState,
    stack: DialogStack,
}

impl ModalContext {
    /// Create a context over an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context over an existing tree.
    pub fn with_dom(dom: Dom) -> Self {
        Self {
            dom,
            focus: FocusState::new(),
            stack: DialogStack::new(),
        }
    }

    /// The dialog stack (topmost entry is current).
    pub fn stack(&self) -> &DialogStack {
        &self.stack
    }

    /// Whether at least one dialog is open.
    pub fn dialog_open(&self) -> bool {
        !self.stack.is_empty()
    }

    // ── Open ─────────────────────────────────────────────────────────

    /// Open a dialog over the node with id `container_id`.
    ///
    /// The container must carry the modal marker and the tree must already
    /// hold it (hidden). `focus_after_close` names the node focused when the
    /// dialog closes and must resolve. On error nothing is mutated.
    pub fn open(
        &mut self,
        container_id: &str,
        focus_after_close: impl Into<FocusTarget>,
        options: DialogOptions,
    ) -> Result<(), DialogError> {
        let container = self.resolve_container(container_id)?;
        let focus_after_close = self.resolve_target(focus_after_close.into())?;
        let focus_first = match options.focus_first.clone() {
            // An unresolvable focus-first target falls back to the automatic
            // descendant search rather than failing the open.
            Some(target) => self.resolve_target(target).ok(),
            None => None,
        };
        self.mount(
            ResolvedDialog {
                container,
                focus_after_close,
                focus_first,
            },
            &options,
        );
        Ok(())
    }

    fn resolve_container(&self, id: &str) -> Result<NodeId, DialogError> {
        let container = self
            .dom
            .query_by_id(id)
            .ok_or_else(|| DialogError::NotFound(format!("id {id:?}")))?;
        if !self.dom.get(container).is_some_and(|data| data.modal) {
            return Err(DialogError::InvalidConfiguration(format!(
                "container {id:?} lacks the modal marker"
            )));
        }
        Ok(container)
    }

    fn resolve_target(&self, target: FocusTarget) -> Result<NodeId, DialogError> {
        match target {
            FocusTarget::Node(node) if self.dom.contains(node) => Ok(node),
            FocusTarget::Node(node) => Err(DialogError::NotFound(format!("node {node:?}"))),
            FocusTarget::Id(id) => self
                .dom
                .query_by_id(&id)
                .ok_or_else(|| DialogError::NotFound(format!("id {id:?}"))),
        }
    }

    /// Mutating half of `open`: everything here must succeed.
    fn mount(&mut self, resolved: ResolvedDialog, options: &DialogOptions) {
        let container = resolved.container;

        // Wrap in a backdrop unless the container already sits in one.
        let backdrop = match self
            .dom
            .parent(container)
            .filter(|&p| self.dom.get(p).is_some_and(|d| d.has_class(BACKDROP_CLASS)))
        {
            Some(existing) => existing,
            None => {
                let node = NodeData::new(NodeKind::Container).with_class(BACKDROP_CLASS);
                let backdrop = self.dom.insert_before(container, node);
                self.dom.reparent(container, backdrop);
                backdrop
            }
        };
        if let Some(data) = self.dom.get_mut(backdrop) {
            data.add_class(ACTIVE_CLASS);
        }

        // Bracket the container with two invisible, tabbable sentinels so
        // focus leaving via tab order at either edge lands on a node the
        // trap will redirect.
        let sentinel = || {
            NodeData::new(NodeKind::Container)
                .with_class(SENTINEL_CLASS)
                .with_tab_index(0)
        };
        let pre_sentinel = self.dom.insert_before(container, sentinel());
        let post_sentinel = self.dom.insert_after(container, sentinel());

        // Document-wide marker: set when the stack becomes non-empty.
        if self.stack.is_empty() {
            if let Some(root) = self.dom.root() {
                if let Some(data) = self.dom.get_mut(root) {
                    data.add_class(DIALOG_OPEN_CLASS);
                }
            }
        }

        self.stack.push(Dialog {
            container,
            backdrop,
            pre_sentinel,
            post_sentinel,
            focus_after_close: resolved.focus_after_close,
            focus_first: resolved.focus_first,
            last_focused: None,
            listener_active: false,
            manage_container_focus: options.manage_container_focus,
        });
        if let Some(top) = self.stack.current_mut() {
            top.add_listeners();
        }

        if options.clear_on_open {
            for id in self.dom.walk_depth_first(container) {
                if let Some(data) = self.dom.get_mut(id) {
                    if data.kind == NodeKind::Input {
                        data.value.clear();
                    }
                }
            }
        }

        // Make the container visible.
        if let Some(data) = self.dom.get_mut(container) {
            data.remove_class(HIDDEN_CLASS);
        }

        // Initial focus: explicit target, else container when nothing inside
        // is focusable, else first focusable descendant.
        let mut settled = false;
        if let Some(first) = resolved.focus_first {
            settled = self.focus.attempt_focus(&self.dom, first);
        }
        if !settled {
            if has_focusable_elements(&self.dom, container) {
                self.focus.focus_first_descendant(&self.dom, container);
            } else {
                if !options.manage_container_focus {
                    if let Some(data) = self.dom.get_mut(container) {
                        data.tab_index = Some(0);
                    }
                }
                self.focus.attempt_focus(&self.dom, container);
            }
        }

        let focused = self.focus.focused();
        if let Some(top) = self.stack.current_mut() {
            top.last_focused = focused;
        }
        debug!(?container, depth = self.stack.len(), "dialog opened");
    }

    // ── Close / replace ──────────────────────────────────────────────

    /// Close the current dialog if `originating` (typically the activated
    /// close control) is inside its container. Returns whether a dialog was
    /// closed.
    pub fn close(&mut self, originating: NodeId) -> bool {
        let Some(top) = self.stack.current() else {
            return false;
        };
        if !self.dom.is_within(originating, top.container) {
            return false;
        }
        self.close_top();
        true
    }

    /// Close the current dialog unconditionally. Returns whether one was open.
    pub fn close_current(&mut self) -> bool {
        if self.stack.is_empty() {
            return false;
        }
        self.close_top();
        true
    }

    fn close_top(&mut self) {
        let Some(dialog) = self.teardown_top() else {
            return;
        };
        // Focus restoration runs while no trap listener is active, so a
        // target outside any remaining dialog is not redirected.
        self.focus_node(dialog.focus_after_close);
        if let Some(next) = self.stack.current_mut() {
            next.add_listeners();
        } else if let Some(root) = self.dom.root() {
            if let Some(data) = self.dom.get_mut(root) {
                data.remove_class(DIALOG_OPEN_CLASS);
            }
        }
        debug!(container = ?dialog.container, depth = self.stack.len(), "dialog closed");
    }

    /// Stack/listener/sentinel teardown shared by close and replace. Does not
    /// restore focus or reactivate an uncovered dialog.
    fn teardown_top(&mut self) -> Option<Dialog> {
        let mut dialog = self.stack.pop()?;
        dialog.remove_listeners();
        self.dom.remove(dialog.pre_sentinel);
        self.dom.remove(dialog.post_sentinel);
        if let Some(data) = self.dom.get_mut(dialog.container) {
            data.add_class(HIDDEN_CLASS);
        }
        if let Some(data) = self.dom.get_mut(dialog.backdrop) {
            data.remove_class(ACTIVE_CLASS);
        }
        Some(dialog)
    }

    /// Close the current dialog and open another in its place, without an
    /// intermediate focus flash.
    ///
    /// Replacing is only valid while focus sits inside the current dialog's
    /// container; a replace requested after focus has left it (e.g. a nested
    /// dialog restored focus elsewhere on close) is refused. `focus_after_close`
    /// defaults to the replaced dialog's own target. The incoming dialog is
    /// fully validated before the open one is torn down, so on error the
    /// current dialog stays open and untouched.
    pub fn replace(
        &mut self,
        container_id: &str,
        focus_after_close: Option<FocusTarget>,
        options: DialogOptions,
    ) -> Result<(), DialogError> {
        let top = self.stack.current().ok_or_else(|| {
            DialogError::InvalidConfiguration("no open dialog to replace".to_owned())
        })?;
        if !self
            .focus
            .focused()
            .is_some_and(|node| self.dom.is_within(node, top.container))
        {
            return Err(DialogError::InvalidConfiguration(
                "focus is outside the current dialog".to_owned(),
            ));
        }
        let inherited = top.focus_after_close;
        let container = self.resolve_container(container_id)?;
        let focus_after_close = match focus_after_close {
            Some(target) => self.resolve_target(target)?,
            None => inherited,
        };
        let focus_first = match options.focus_first.clone() {
            Some(target) => self.resolve_target(target).ok(),
            None => None,
        };

        self.teardown_top();
        self.mount(
            ResolvedDialog {
                container,
                focus_after_close,
                focus_first,
            },
            &options,
        );
        Ok(())
    }

    // ── Focus dispatch & trap ────────────────────────────────────────

    /// Host focus dispatch: advisory focus set followed by a synchronous
    /// capturing focus event. Returns false if the set was refused (node not
    /// in the tree); note the trap may immediately move focus elsewhere.
    pub fn focus_node(&mut self, node: NodeId) -> bool {
        if !self.focus.set_focus(&self.dom, node) {
            return false;
        }
        self.handle_focus_event(node);
        true
    }

    /// The focus-trap listener, invoked for every capturing focus event.
    ///
    /// Ignored while the director's suppression flag is set or when no
    /// dialog listener is active. Focus inside the current container is
    /// recorded; focus that escaped is redirected back inside within this
    /// same call: first focusable descendant, then last (wrapping when the
    /// first search lands back on the previously focused node), then the
    /// container itself.
    pub fn handle_focus_event(&mut self, target: NodeId) {
        if self.focus.is_suppressed() {
            return;
        }
        let Some(top) = self.stack.current() else {
            return;
        };
        if !top.listener_active {
            return;
        }
        let container = top.container;
        let last_focused = top.last_focused;
        let manage_container_focus = top.manage_container_focus;

        if self.dom.is_within(target, container) {
            if let Some(top) = self.stack.current_mut() {
                top.last_focused = Some(target);
            }
            return;
        }

        trace!(?target, ?container, "focus escaped, redirecting");
        self.focus.focus_first_descendant(&self.dom, container);
        if self.focus.focused() == last_focused {
            // First search landed where focus already was (e.g. tabbing
            // backwards off the front edge): wrap to the other end.
            self.focus.focus_last_descendant(&self.dom, container);
        }
        let landed_inside = self
            .focus
            .focused()
            .is_some_and(|node| self.dom.is_within(node, container));
        if !landed_inside {
            if !manage_container_focus {
                if let Some(data) = self.dom.get_mut(container) {
                    data.tab_index = Some(0);
                }
            }
            self.focus.attempt_focus(&self.dom, container);
        }

        let focused = self.focus.focused();
        if let Some(top) = self.stack.current_mut() {
            top.last_focused = focused;
        }
    }

    // ── Cancel key ───────────────────────────────────────────────────

    /// Process-wide cancel-key coordinator.
    ///
    /// On Escape, closes the current dialog and returns true to stop the
    /// event from propagating further. Returns false for other keys, when no
    /// dialog is open, or when the focused node is exempt (e.g. a native
    /// picker mid-interaction).
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if event.code != Key::Escape {
            return false;
        }
        if let Some(origin) = self.focus.focused() {
            if self.dom.get(origin).is_some_and(|data| data.cancel_exempt) {
                return false;
            }
        }
        if self.stack.is_empty() {
            return false;
        }
        self.close_top();
        true
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::input::Modifiers;

    /// Document with a trigger button and two hidden dialogs:
    /// ```text
    ///   root
    ///    ├─ open-btn (Button)
    ///    ├─ d1 (modal, hidden) ── name-input (Input "stale")
    ///    └─ d2 (modal, hidden) ── ok2 (Button)
    /// ```
    struct Fixture {
        ctx: ModalContext,
        btn: NodeId,
        d1: NodeId,
        input1: NodeId,
        d2: NodeId,
        ok2: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
        let btn = dom.insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
        let d1 = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container)
                .with_id("d1")
                .modal(true)
                .with_class(HIDDEN_CLASS),
        );
        let input1 = dom.insert_child(
            d1,
            NodeData::new(NodeKind::Input)
                .with_id("name-input")
                .with_value("stale"),
        );
        let d2 = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container)
                .with_id("d2")
                .modal(true)
                .with_class(HIDDEN_CLASS),
        );
        let ok2 = dom.insert_child(d2, NodeData::new(NodeKind::Button).with_id("ok2"));
        Fixture {
            ctx: ModalContext::with_dom(dom),
            btn,
            d1,
            input1,
            d2,
            ok2,
        }
    }

    /// Dialog with two inputs, for wrap/redirect ordering tests.
    fn two_input_dialog() -> (ModalContext, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
        let btn = dom.insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
        let d = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container).with_id("d").modal(true),
        );
        let i1 = dom.insert_child(d, NodeData::new(NodeKind::Input).with_id("i1"));
        let i2 = dom.insert_child(d, NodeData::new(NodeKind::Input).with_id("i2"));
        let mut ctx = ModalContext::with_dom(dom);
        ctx.open("d", btn, DialogOptions::default()).unwrap();
        (ctx, btn, i1, i2)
    }

    fn assert_listener_invariant(ctx: &ModalContext) {
        let active: Vec<bool> = ctx.stack().iter().map(|d| d.listener_active).collect();
        if let Some((&top, rest)) = active.split_last() {
            assert!(top, "topmost dialog must have the active listener");
            assert!(rest.iter().all(|&a| !a), "covered dialogs must be inactive");
        }
    }

    // ── Open ─────────────────────────────────────────────────────────

    #[test]
    fn open_focuses_first_input_close_restores_trigger() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_eq!(f.ctx.focus.focused(), Some(f.input1));
        assert_eq!(f.ctx.stack().len(), 1);
        assert_listener_invariant(&f.ctx);

        assert!(f.ctx.close_current());
        assert_eq!(f.ctx.focus.focused(), Some(f.btn));
        assert!(f.ctx.stack().is_empty());
    }

    #[test]
    fn open_missing_container() {
        let mut f = fixture();
        let err = f
            .ctx
            .open("missing", "open-btn", DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::NotFound(_)));
        assert!(f.ctx.stack().is_empty());
    }

    #[test]
    fn open_container_without_modal_marker() {
        let mut f = fixture();
        let err = f
            .ctx
            .open("open-btn", "open-btn", DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::InvalidConfiguration(_)));
        assert!(f.ctx.stack().is_empty());
    }

    #[test]
    fn open_missing_focus_after_leaves_state_untouched() {
        let mut f = fixture();
        let before = f.ctx.dom.len();
        let err = f
            .ctx
            .open("d1", "missing", DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::NotFound(_)));
        assert!(f.ctx.stack().is_empty());
        // No backdrop or sentinels were created.
        assert_eq!(f.ctx.dom.len(), before);
    }

    #[test]
    fn open_brackets_container_with_sentinels_in_backdrop() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();

        let top = f.ctx.stack().current().unwrap();
        let (backdrop, pre, post) = (top.backdrop, top.pre_sentinel, top.post_sentinel);
        assert_eq!(f.ctx.dom.parent(f.d1), Some(backdrop));
        let backdrop_data = f.ctx.dom.get(backdrop).unwrap();
        assert!(backdrop_data.has_class(BACKDROP_CLASS));
        assert!(backdrop_data.has_class(ACTIVE_CLASS));
        assert_eq!(f.ctx.dom.children(backdrop), &[pre, f.d1, post]);

        let pre_data = f.ctx.dom.get(pre).unwrap();
        assert!(pre_data.has_class(SENTINEL_CLASS));
        assert_eq!(pre_data.tab_index, Some(0));

        f.ctx.close_current();
        // Sentinels exist exactly while the dialog is open.
        assert!(!f.ctx.dom.contains(pre));
        assert!(!f.ctx.dom.contains(post));
        // The backdrop stays for reuse, just deactivated.
        assert!(f.ctx.dom.get(backdrop).unwrap().has_class(BACKDROP_CLASS));
        assert!(!f.ctx.dom.get(backdrop).unwrap().has_class(ACTIVE_CLASS));
    }

    #[test]
    fn reopen_reuses_existing_backdrop() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        let first_backdrop = f.ctx.stack().current().unwrap().backdrop;
        f.ctx.close_current();
        let settled = f.ctx.dom.len();

        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_eq!(f.ctx.stack().current().unwrap().backdrop, first_backdrop);
        // Only the two sentinels are new.
        assert_eq!(f.ctx.dom.len(), settled + 2);
    }

    #[test]
    fn open_toggles_hidden_class() {
        let mut f = fixture();
        assert!(f.ctx.dom.get(f.d1).unwrap().has_class(HIDDEN_CLASS));
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert!(!f.ctx.dom.get(f.d1).unwrap().has_class(HIDDEN_CLASS));
        f.ctx.close_current();
        assert!(f.ctx.dom.get(f.d1).unwrap().has_class(HIDDEN_CLASS));
    }

    #[test]
    fn open_clears_input_values_by_default() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_eq!(f.ctx.dom.get(f.input1).unwrap().value, "");
    }

    #[test]
    fn clear_on_open_opt_out() {
        let mut f = fixture();
        f.ctx
            .open("d1", "open-btn", DialogOptions::new().clear_on_open(false))
            .unwrap();
        assert_eq!(f.ctx.dom.get(f.input1).unwrap().value, "stale");
    }

    #[test]
    fn dialog_open_marker_follows_stack_emptiness() {
        let mut f = fixture();
        let root = f.ctx.dom.root().unwrap();
        assert!(!f.ctx.dom.get(root).unwrap().has_class(DIALOG_OPEN_CLASS));

        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert!(f.ctx.dom.get(root).unwrap().has_class(DIALOG_OPEN_CLASS));

        f.ctx.open("d2", f.input1, DialogOptions::default()).unwrap();
        assert!(f.ctx.dom.get(root).unwrap().has_class(DIALOG_OPEN_CLASS));

        f.ctx.close_current();
        assert!(f.ctx.dom.get(root).unwrap().has_class(DIALOG_OPEN_CLASS));
        f.ctx.close_current();
        assert!(!f.ctx.dom.get(root).unwrap().has_class(DIALOG_OPEN_CLASS));
    }

    #[test]
    fn explicit_focus_first_wins() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
        let btn = dom.insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
        let d = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container).with_id("d").modal(true),
        );
        let _i1 = dom.insert_child(d, NodeData::new(NodeKind::Input).with_id("i1"));
        let i2 = dom.insert_child(d, NodeData::new(NodeKind::Input).with_id("i2"));
        let mut ctx = ModalContext::with_dom(dom);
        ctx.open("d", btn, DialogOptions::new().with_focus_first("i2"))
            .unwrap();
        assert_eq!(ctx.focus.focused(), Some(i2));
    }

    #[test]
    fn unresolvable_focus_first_falls_back_to_search() {
        let (mut ctx, btn, i1, _i2) = two_input_dialog();
        ctx.close_current();
        ctx.open("d", btn, DialogOptions::new().with_focus_first("nope"))
            .unwrap();
        assert_eq!(ctx.focus.focused(), Some(i1));
    }

    #[test]
    fn dialog_without_focusable_content_focuses_container() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
        let btn = dom.insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
        let d = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container).with_id("d").modal(true),
        );
        let _text = dom.insert_child(d, NodeData::new(NodeKind::Text));
        let mut ctx = ModalContext::with_dom(dom);
        ctx.open("d", btn, DialogOptions::default()).unwrap();

        assert_eq!(ctx.focus.focused(), Some(d));
        // Tab order forced so tab navigation can reach the container.
        assert_eq!(ctx.dom.get(d).unwrap().tab_index, Some(0));

        // Escaped focus falls all the way back to the container, too.
        ctx.focus_node(btn);
        assert_eq!(ctx.focus.focused(), Some(d));
    }

    #[test]
    fn manage_container_focus_keeps_tab_index_untouched() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
        let btn = dom.insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
        let d = dom.insert_child(
            root,
            NodeData::new(NodeKind::Container).with_id("d").modal(true),
        );
        let mut ctx = ModalContext::with_dom(dom);
        ctx.open("d", btn, DialogOptions::new().manage_container_focus(true))
            .unwrap();
        assert_eq!(ctx.focus.focused(), Some(d));
        assert_eq!(ctx.dom.get(d).unwrap().tab_index, None);
    }

    // ── Stacking ─────────────────────────────────────────────────────

    #[test]
    fn nested_open_swaps_listeners() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        f.ctx.open("d2", f.input1, DialogOptions::default()).unwrap();

        let active: Vec<bool> = f.ctx.stack().iter().map(|d| d.listener_active).collect();
        assert_eq!(active, vec![false, true]);
        assert_eq!(f.ctx.focus.focused(), Some(f.ok2));

        f.ctx.close_current();
        let top = f.ctx.stack().current().unwrap();
        assert_eq!(top.container, f.d1);
        assert!(top.listener_active);
        // Focus moved to the closed dialog's configured target.
        assert_eq!(f.ctx.focus.focused(), Some(f.input1));
        assert_listener_invariant(&f.ctx);
    }

    #[test]
    fn listener_invariant_across_sequences() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_listener_invariant(&f.ctx);
        f.ctx.open("d2", f.input1, DialogOptions::default()).unwrap();
        assert_listener_invariant(&f.ctx);
        f.ctx.close_current();
        assert_listener_invariant(&f.ctx);
        f.ctx.close_current();
        assert_listener_invariant(&f.ctx);
    }

    // ── Close guard ──────────────────────────────────────────────────

    #[test]
    fn close_requires_control_inside_container() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert!(!f.ctx.close(f.btn)); // trigger lives outside the dialog
        assert_eq!(f.ctx.stack().len(), 1);
        assert!(f.ctx.close(f.input1));
        assert!(f.ctx.stack().is_empty());
    }

    #[test]
    fn close_current_without_dialog() {
        let mut f = fixture();
        assert!(!f.ctx.close_current());
    }

    // ── Replace ──────────────────────────────────────────────────────

    #[test]
    fn replace_inherits_focus_after_close() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        f.ctx.replace("d2", None, DialogOptions::default()).unwrap();

        assert_eq!(f.ctx.stack().len(), 1);
        let top = f.ctx.stack().current().unwrap();
        assert_eq!(top.container, f.d2);
        assert_eq!(top.focus_after_close, f.btn);
        assert_eq!(f.ctx.focus.focused(), Some(f.ok2));
        // The replaced dialog is hidden again.
        assert!(f.ctx.dom.get(f.d1).unwrap().has_class(HIDDEN_CLASS));

        f.ctx.close_current();
        assert_eq!(f.ctx.focus.focused(), Some(f.btn));
    }

    #[test]
    fn replace_with_explicit_focus_after_close() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        f.ctx
            .replace("d2", Some(FocusTarget::from("name-input")), DialogOptions::default())
            .unwrap();
        assert_eq!(
            f.ctx.stack().current().unwrap().focus_after_close,
            f.input1
        );
    }

    #[test]
    fn replace_validates_before_teardown() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        let pre = f.ctx.stack().current().unwrap().pre_sentinel;

        let err = f
            .ctx
            .replace("missing", None, DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::NotFound(_)));
        // The open dialog is untouched.
        assert_eq!(f.ctx.stack().current().unwrap().container, f.d1);
        assert!(f.ctx.dom.contains(pre));
        assert_listener_invariant(&f.ctx);
    }

    #[test]
    fn replace_refused_when_focus_left_the_dialog() {
        // A nested dialog closing can restore focus outside the uncovered
        // dialog; replacing it from there must be refused, not acted on.
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        f.ctx.open("d2", f.btn, DialogOptions::default()).unwrap();
        f.ctx.close_current();
        assert_eq!(f.ctx.focus.focused(), Some(f.btn));

        let err = f
            .ctx
            .replace("d2", None, DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::InvalidConfiguration(_)));
        // The current dialog is untouched.
        assert_eq!(f.ctx.stack().current().unwrap().container, f.d1);
        assert_listener_invariant(&f.ctx);
    }

    #[test]
    fn replace_with_empty_stack() {
        let mut f = fixture();
        let err = f
            .ctx
            .replace("d2", None, DialogOptions::default())
            .unwrap_err();
        assert!(matches!(err, DialogError::InvalidConfiguration(_)));
    }

    // ── Trap ─────────────────────────────────────────────────────────

    #[test]
    fn escaped_focus_redirects_to_first_descendant() {
        let (mut ctx, btn, i1, i2) = two_input_dialog();
        ctx.focus_node(i2); // legitimate move inside, recorded
        assert_eq!(ctx.stack().current().unwrap().last_focused, Some(i2));

        ctx.focus_node(btn); // escape attempt
        assert_eq!(ctx.focus.focused(), Some(i1));
        assert_eq!(ctx.stack().current().unwrap().last_focused, Some(i1));
    }

    #[test]
    fn forward_wrap_when_first_search_sticks() {
        // Single focusable element: the first-descendant search lands back on
        // the previously focused node, so the trap must try the last.
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_eq!(f.ctx.stack().current().unwrap().last_focused, Some(f.input1));

        f.ctx.focus_node(f.btn);
        assert_eq!(f.ctx.focus.focused(), Some(f.input1));
    }

    #[test]
    fn backward_wrap_via_pre_sentinel() {
        let (mut ctx, _btn, i1, i2) = two_input_dialog();
        assert_eq!(ctx.focus.focused(), Some(i1));
        let pre = ctx.stack().current().unwrap().pre_sentinel;

        // Shift-tab off the front edge lands on the pre-sentinel; the first
        // search sticks on i1, so focus wraps to the end of the dialog.
        ctx.focus_node(pre);
        assert_eq!(ctx.focus.focused(), Some(i2));
    }

    #[test]
    fn focus_inside_container_is_recorded_not_redirected() {
        let (mut ctx, _btn, _i1, i2) = two_input_dialog();
        ctx.focus_node(i2);
        assert_eq!(ctx.focus.focused(), Some(i2));
        assert_eq!(ctx.stack().current().unwrap().last_focused, Some(i2));
    }

    #[test]
    fn focus_events_ignored_without_open_dialog() {
        let mut f = fixture();
        f.ctx.focus_node(f.btn);
        assert_eq!(f.ctx.focus.focused(), Some(f.btn));
    }

    #[test]
    fn focus_node_refused_for_stale_node() {
        let mut f = fixture();
        let stale = f.ctx.dom.insert(NodeData::new(NodeKind::Button));
        f.ctx.dom.remove(stale);
        assert!(!f.ctx.focus_node(stale));
        assert_eq!(f.ctx.focus.focused(), None);
    }

    // ── Cancel key ───────────────────────────────────────────────────

    #[test]
    fn escape_closes_current_and_consumes() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        let consumed = f.ctx.handle_key(KeyEvent::new(Key::Escape, Modifiers::NONE));
        assert!(consumed);
        assert!(f.ctx.stack().is_empty());
        assert_eq!(f.ctx.focus.focused(), Some(f.btn));
    }

    #[test]
    fn escape_without_dialog_propagates() {
        let mut f = fixture();
        assert!(!f.ctx.handle_key(KeyEvent::new(Key::Escape, Modifiers::NONE)));
    }

    #[test]
    fn non_escape_keys_propagate() {
        let mut f = fixture();
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert!(!f.ctx.handle_key(KeyEvent::new(Key::Enter, Modifiers::NONE)));
        assert_eq!(f.ctx.stack().len(), 1);
    }

    #[test]
    fn escape_ignored_for_exempt_origin() {
        let mut f = fixture();
        f.ctx.dom.get_mut(f.input1).unwrap().cancel_exempt = true;
        f.ctx.open("d1", "open-btn", DialogOptions::default()).unwrap();
        assert_eq!(f.ctx.focus.focused(), Some(f.input1));

        assert!(!f.ctx.handle_key(KeyEvent::new(Key::Escape, Modifiers::NONE)));
        assert_eq!(f.ctx.stack().len(), 1);
    }
}
