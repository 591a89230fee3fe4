//! Arena-backed views of the runtime's element trees.
//!
//! The wire [`ModelElement`] is a nested tree. The core flattens each tree
//! into an arena of nodes addressed by [`NodeId`], with an id index for
//! reference resolution. Cross references stay id-strings and are resolved
//! by lookup, so no pointer cycles can form.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use runtime_protocol::types::{AttributeValue, ChildValue, Location, ModelElement, RefValue};

/// Index of a node within its owning [`ModelTree`].
pub type NodeId = usize;

/// Which of the two element trees a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Ast,
    RuntimeState,
}

/// The value of a containment field, with children as arena ids.
#[derive(Debug, Clone)]
pub enum ChildSlot {
    Single(NodeId),
    Many(Vec<NodeId>),
}

/// The value of a reference field. Reference targets stay id-strings; they
/// may point into either tree and are resolved at lookup time.
#[derive(Debug, Clone)]
pub enum RefSlot {
    Single(String),
    Many(Vec<String>),
}

/// One element, with its containment edges rewritten to arena ids.
#[derive(Debug)]
pub struct ModelNode {
    pub id: String,
    pub types: Vec<String>,
    pub attributes: IndexMap<String, AttributeValue>,
    pub refs: IndexMap<String, RefSlot>,
    pub children: IndexMap<String, ChildSlot>,
    pub location: Option<Location>,
    pub label: Option<String>,
}

/// An element tree flattened into an arena.
#[derive(Debug)]
pub struct ModelTree {
    kind: TreeKind,
    nodes: Vec<ModelNode>,
    by_id: HashMap<String, NodeId>,
}

impl ModelTree {
    /// Flatten a wire tree. The root becomes node 0.
    pub fn build(kind: TreeKind, root: ModelElement) -> Self {
        let mut tree = Self {
            kind,
            nodes: Vec::new(),
            by_id: HashMap::new(),
        };
        tree.insert(root);
        tree
    }

    fn insert(&mut self, element: ModelElement) -> NodeId {
        let ModelElement {
            id,
            types,
            children,
            refs,
            attributes,
            location,
            label,
        } = element;

        let node_id = self.nodes.len();
        self.nodes.push(ModelNode {
            id: id.clone(),
            types,
            attributes,
            refs: IndexMap::new(),
            children: IndexMap::new(),
            location,
            label,
        });
        self.by_id.insert(id, node_id);

        let mut child_slots = IndexMap::new();
        for (field, value) in children {
            let slot = match value {
                ChildValue::Single(child) => ChildSlot::Single(self.insert(*child)),
                ChildValue::Many(list) => {
                    ChildSlot::Many(list.into_iter().map(|c| self.insert(c)).collect())
                }
            };
            child_slots.insert(field, slot);
        }

        let ref_slots = refs
            .into_iter()
            .map(|(field, value)| {
                let slot = match value {
                    RefValue::Single(target) => RefSlot::Single(target),
                    RefValue::Many(targets) => RefSlot::Many(targets),
                };
                (field, slot)
            })
            .collect();

        self.nodes[node_id].children = child_slots;
        self.nodes[node_id].refs = ref_slots;

        node_id
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &ModelNode {
        &self.nodes[id]
    }

    /// Resolve an element id to its node.
    pub fn lookup(&self, element_id: &str) -> Option<NodeId> {
        self.by_id.get(element_id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ModelNode)> {
        self.nodes.iter().enumerate()
    }

    /// Project a node to its client-facing reference.
    pub fn reference(&self, id: NodeId) -> ModelElementReference {
        let node = self.node(id);
        ModelElementReference {
            id: node.id.clone(),
            types: node.types.clone(),
            label: node.label.clone().unwrap_or_else(|| node.id.clone()),
        }
    }
}

/// The client-facing projection of an element: id, types, and a display
/// label defaulting to the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelElementReference {
    pub id: String,
    pub types: Vec<String>,
    pub label: String,
}
