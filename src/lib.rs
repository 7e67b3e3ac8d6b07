//! # modal-trap
//!
//! A modal dialog stack with focus trapping over a retained document tree.
//!
//! modal-trap keeps keyboard focus inside the active overlay of a stack of
//! modal dialogs and restores it predictably when overlays close. Dialogs are
//! opened over nodes of a slotmap-backed tree; every capturing focus change
//! is routed through the current dialog's trap, which redirects focus that
//! escaped back inside the dialog within the same synchronous turn.
//!
//! ## Core Systems
//!
//! - **[`dom`]** — Slotmap-backed document tree with sibling insertion and id lookup
//! - **[`focus`]** — Focusability rules and the focus director (first/last descendant search)
//! - **[`modal`]** — Dialog, dialog stack, and the owning [`ModalContext`](modal::ModalContext)
//! - **[`event`]** — Key events decoupled from crossterm
//! - **[`testing`]** — Headless [`Pilot`](testing::Pilot) harness with tab-navigation simulation
//!
//! ## Example
//!
//! ```
//! use modal_trap::dom::{NodeData, NodeKind};
//! use modal_trap::modal::{DialogOptions, ModalContext};
//!
//! let mut ctx = ModalContext::new();
//! let root = ctx.dom.insert(NodeData::new(NodeKind::Container).with_id("root"));
//! let trigger = ctx
//!     .dom
//!     .insert_child(root, NodeData::new(NodeKind::Button).with_id("open-btn"));
//! let dialog = ctx.dom.insert_child(
//!     root,
//!     NodeData::new(NodeKind::Container).with_id("confirm").modal(true),
//! );
//! let input = ctx
//!     .dom
//!     .insert_child(dialog, NodeData::new(NodeKind::Input).with_id("name"));
//!
//! ctx.open("confirm", "open-btn", DialogOptions::default()).unwrap();
//! assert_eq!(ctx.focus.focused(), Some(input));
//!
//! // Focus cannot leave the dialog...
//! ctx.focus_node(trigger);
//! assert_eq!(ctx.focus.focused(), Some(input));
//!
//! // ...until the dialog closes, which restores it.
//! ctx.close_current();
//! assert_eq!(ctx.focus.focused(), Some(trigger));
//! ```

// Document tree
pub mod dom;

// Focus rules and director
pub mod focus;

// Modal sessions
pub mod modal;

// Input events
pub mod event;

// Test harness
pub mod testing;
