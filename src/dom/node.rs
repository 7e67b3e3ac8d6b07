//! Node types: NodeId, NodeKind, NodeData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a tree node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// The kind of a tree node, as far as focus rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Navigation link. Focusable only with a non-empty `href` and a `rel`
    /// other than `"ignore"`.
    Link,
    /// Text input. Focusable unless its `input_type` is `"hidden"`.
    Input,
    Button,
    Select,
    TextArea,
    /// Generic grouping node. Focusable only when it carries the modal marker.
    Container,
    /// Plain text content. Never focusable.
    Text,
}

/// Data associated with a single tree node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Node kind, drives kind-specific focus rules.
    pub kind: NodeKind,
    /// Optional unique id for lookup.
    pub id: Option<String>,
    /// Marker classes (e.g. `has-dialog`, `dialog-backdrop`).
    pub classes: Vec<String>,
    /// Explicit tab-order index. `None` means unset; negative means the node
    /// is removed from tab navigation entirely.
    pub tab_index: Option<i32>,
    /// Whether this node is disabled.
    pub disabled: bool,
    /// The "is-modal" marker. Required on dialog containers.
    pub modal: bool,
    /// Navigation target, only meaningful for `Link` nodes.
    pub href: Option<String>,
    /// Link relation attribute, only meaningful for `Link` nodes.
    pub rel: Option<String>,
    /// Input type, only meaningful for `Input` nodes (e.g. `"text"`, `"hidden"`).
    pub input_type: Option<String>,
    /// Current value, only meaningful for `Input` nodes.
    pub value: String,
    /// Whether this node is exempt from the cancel-key coordinator while it
    /// owns focus (e.g. a native picker widget mid-interaction).
    pub cancel_exempt: bool,
}

impl NodeData {
    /// Create a new `NodeData` of the given kind with everything else unset.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            tab_index: None,
            disabled: false,
            modal: false,
            href: None,
            rel: None,
            input_type: None,
            value: String::new(),
            cancel_exempt: false,
        }
    }

    /// Set the lookup id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single marker class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set the explicit tab-order index (builder).
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    /// Set whether this node is disabled (builder).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the modal marker (builder).
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Set the navigation target (builder).
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the link relation (builder).
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    /// Set the input type (builder).
    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Set the current value (builder).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Exempt this node from the cancel-key coordinator (builder).
    pub fn cancel_exempt(mut self, exempt: bool) -> Self {
        self.cancel_exempt = exempt;
        self
    }

    /// Check whether this node has a given marker class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a marker class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a marker class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}
