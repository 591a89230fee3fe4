//! Projection of the element trees into the client's variable model.
//!
//! The client walks structured values lazily through integer handles.
//! Handle 1 always designates the AST root and handle 2 the runtime-state
//! root; every other handle is minted monotonically from 3 and memoized, so
//! the same object keeps its handle until the next invalidation.

use std::collections::HashMap;

use runtime_protocol::types::AttributeValue;
use transport::types::Variable;

use crate::model::{ChildSlot, ModelNode, ModelTree, NodeId, RefSlot, TreeKind};

/// The permanent handle of the AST root.
pub const AST_ROOT_REFERENCE: i64 = 1;
/// The permanent handle of the runtime-state root.
pub const RUNTIME_ROOT_REFERENCE: i64 = 2;

const FIRST_MINTED_HANDLE: i64 = 3;

/// What a variable handle points at.
///
/// Sequences are addressed structurally (owner node plus field index), which
/// also distinguishes reference sequences from containment sequences by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VarObject {
    Element(TreeKind, NodeId),
    /// The sequence value of the node's n-th containment field.
    Children(TreeKind, NodeId, usize),
    /// The sequence value of the node's n-th reference field.
    Refs(TreeKind, NodeId, usize),
}

/// The handle table and rendering rules for `variables` requests.
#[derive(Debug)]
pub struct VariableHandler {
    table: HashMap<i64, VarObject>,
    memo: HashMap<VarObject, i64>,
    next_handle: i64,
}

impl VariableHandler {
    /// A fresh table knowing only the AST root.
    pub fn new() -> Self {
        let mut handler = Self {
            table: HashMap::new(),
            memo: HashMap::new(),
            next_handle: FIRST_MINTED_HANDLE,
        };
        handler.seed_ast_root();
        handler
    }

    /// Drop everything minted so far; runtime state is gone until the next
    /// [`VariableHandler::runtime_updated`].
    pub fn invalidate(&mut self) {
        self.table.clear();
        self.memo.clear();
        self.next_handle = FIRST_MINTED_HANDLE;
        self.seed_ast_root();
    }

    /// A fresh runtime-state tree is in place; reseed both roots.
    pub fn runtime_updated(&mut self) {
        self.invalidate();
        self.seed(
            RUNTIME_ROOT_REFERENCE,
            VarObject::Element(TreeKind::RuntimeState, 0),
        );
    }

    fn seed_ast_root(&mut self) {
        self.seed(AST_ROOT_REFERENCE, VarObject::Element(TreeKind::Ast, 0));
    }

    fn seed(&mut self, handle: i64, object: VarObject) {
        self.table.insert(handle, object);
        self.memo.insert(object, handle);
    }

    fn handle_for(&mut self, object: VarObject) -> i64 {
        if let Some(handle) = self.memo.get(&object) {
            return *handle;
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.seed(handle, object);
        handle
    }

    /// Render the children of `reference`.
    ///
    /// Returns `None` for handles the table does not know (stale handles
    /// after an invalidation, or handle 2 before runtime state is loaded).
    pub fn variables(
        &mut self,
        reference: i64,
        ast: &ModelTree,
        runtime: Option<&ModelTree>,
    ) -> Option<Vec<Variable>> {
        let object = self.table.get(&reference).copied()?;

        let variables = match object {
            VarObject::Element(kind, node) => {
                let tree = tree_of(kind, ast, runtime)?;
                self.render_element_children(kind, tree.node(node), node, ast, runtime)
            }
            VarObject::Children(kind, node, field) => {
                let tree = tree_of(kind, ast, runtime)?;
                let (_, slot) = tree.node(node).children.get_index(field)?;
                let ChildSlot::Many(list) = slot else {
                    return None;
                };
                list.iter()
                    .enumerate()
                    .map(|(i, &child)| self.render_element(i.to_string(), kind, child, tree))
                    .collect()
            }
            VarObject::Refs(kind, node, field) => {
                let tree = tree_of(kind, ast, runtime)?;
                let (_, slot) = tree.node(node).refs.get_index(field)?;
                let RefSlot::Many(targets) = slot else {
                    return None;
                };
                targets
                    .iter()
                    .enumerate()
                    .map(|(i, target)| self.render_reference(i.to_string(), target, ast, runtime))
                    .collect()
            }
        };

        Some(variables)
    }

    /// One variable per attribute, then per reference field, then per
    /// containment field.
    fn render_element_children(
        &mut self,
        kind: TreeKind,
        node: &ModelNode,
        node_id: NodeId,
        ast: &ModelTree,
        runtime: Option<&ModelTree>,
    ) -> Vec<Variable> {
        let mut variables = Vec::new();

        for (name, value) in &node.attributes {
            variables.push(Variable {
                name: name.clone(),
                value: attribute_text(value),
                variables_reference: 0,
                indexed_variables: None,
            });
        }

        for (field, (name, slot)) in node.refs.iter().enumerate() {
            match slot {
                RefSlot::Single(target) => {
                    variables.push(self.render_reference(name.clone(), target, ast, runtime));
                }
                RefSlot::Many(targets) => {
                    variables.push(self.render_sequence(
                        name.clone(),
                        targets.len(),
                        VarObject::Refs(kind, node_id, field),
                    ));
                }
            }
        }

        let tree = match tree_of(kind, ast, runtime) {
            Some(tree) => tree,
            None => return variables,
        };
        for (field, (name, slot)) in node.children.iter().enumerate() {
            match slot {
                ChildSlot::Single(child) => {
                    variables.push(self.render_element(name.clone(), kind, *child, tree));
                }
                ChildSlot::Many(list) => {
                    variables.push(self.render_sequence(
                        name.clone(),
                        list.len(),
                        VarObject::Children(kind, node_id, field),
                    ));
                }
            }
        }

        variables
    }

    /// A contained element: bracketed type list as value, child handle.
    fn render_element(
        &mut self,
        name: String,
        kind: TreeKind,
        node: NodeId,
        tree: &ModelTree,
    ) -> Variable {
        Variable {
            name,
            value: types_text(tree.node(node)),
            variables_reference: self.handle_for(VarObject::Element(kind, node)),
            indexed_variables: None,
        }
    }

    /// A non-empty sequence: `Array[N]` with a handle for the sequence
    /// itself; an empty sequence is a leaf.
    fn render_sequence(&mut self, name: String, len: usize, object: VarObject) -> Variable {
        Variable {
            name,
            value: format!("Array[{len}]"),
            variables_reference: if len == 0 { 0 } else { self.handle_for(object) },
            indexed_variables: Some(len as i64),
        }
    }

    /// A reference: resolve the id against the AST then the runtime-state
    /// tree; the referenced element renders with its label and a handle. An
    /// unresolvable id stays a leaf.
    fn render_reference(
        &mut self,
        name: String,
        target: &str,
        ast: &ModelTree,
        runtime: Option<&ModelTree>,
    ) -> Variable {
        let resolved = ast
            .lookup(target)
            .map(|node| (TreeKind::Ast, ast, node))
            .or_else(|| {
                runtime.and_then(|tree| {
                    tree.lookup(target)
                        .map(|node| (TreeKind::RuntimeState, tree, node))
                })
            });

        match resolved {
            Some((kind, tree, node)) => Variable {
                name,
                value: label_text(tree.node(node)),
                variables_reference: self.handle_for(VarObject::Element(kind, node)),
                indexed_variables: None,
            },
            None => Variable {
                name,
                value: serde_json::Value::String(target.to_string()).to_string(),
                variables_reference: 0,
                indexed_variables: None,
            },
        }
    }
}

impl Default for VariableHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn tree_of<'t>(
    kind: TreeKind,
    ast: &'t ModelTree,
    runtime: Option<&'t ModelTree>,
) -> Option<&'t ModelTree> {
    match kind {
        TreeKind::Ast => Some(ast),
        TreeKind::RuntimeState => runtime,
    }
}

/// JSON-serialized primitive, e.g. `null`, `true`, `3`, `"x"`.
fn attribute_text(value: &AttributeValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// `[Type1, Type2]` rendering of an element value.
fn types_text(node: &ModelNode) -> String {
    format!("[{}]", node.types.join(", "))
}

/// Display label of a referenced element, falling back to its types.
fn label_text(node: &ModelNode) -> String {
    node.label.clone().unwrap_or_else(|| types_text(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_protocol::types::ModelElement;
    use serde_json::json;

    fn ast() -> ModelTree {
        let root: ModelElement = serde_json::from_value(json!({
            "id": "root",
            "types": ["Program"],
            "attributes": {"name": "demo", "steps": 3, "done": false, "error": null},
            "refs": {"entry": "s1", "all": ["s1", "s2"]},
            "children": {
                "states": [
                    {"id": "s1", "types": ["State"], "label": "initial"},
                    {"id": "s2", "types": ["State", "Final"]}
                ],
                "clock": {"id": "clk", "types": ["Clock"]}
            }
        }))
        .unwrap();
        ModelTree::build(TreeKind::Ast, root)
    }

    #[test]
    fn element_renders_attributes_then_refs_then_children() {
        let ast = ast();
        let mut handler = VariableHandler::new();

        let variables = handler
            .variables(AST_ROOT_REFERENCE, &ast, None)
            .unwrap();

        let names: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["name", "steps", "done", "error", "entry", "all", "states", "clock"]
        );

        // attributes are JSON-serialized leaves
        assert_eq!(variables[0].value, "\"demo\"");
        assert_eq!(variables[1].value, "3");
        assert_eq!(variables[2].value, "false");
        assert_eq!(variables[3].value, "null");
        assert!(variables[..4].iter().all(|v| v.variables_reference == 0));

        // single ref resolves to the labeled element
        assert_eq!(variables[4].value, "initial");
        assert!(variables[4].variables_reference >= 3);

        // multivalued ref renders as an array with a handle
        assert_eq!(variables[5].value, "Array[2]");
        assert!(variables[5].variables_reference >= 3);

        // children: sequence and single element
        assert_eq!(variables[6].value, "Array[2]");
        assert_eq!(variables[7].value, "[Clock]");
    }

    #[test]
    fn child_sequences_render_elements_by_index() {
        let ast = ast();
        let mut handler = VariableHandler::new();

        let root_vars = handler.variables(AST_ROOT_REFERENCE, &ast, None).unwrap();
        let states_handle = root_vars
            .iter()
            .find(|v| v.name == "states")
            .unwrap()
            .variables_reference;

        let states = handler.variables(states_handle, &ast, None).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].name, "0");
        assert_eq!(states[0].value, "[State]");
        assert_eq!(states[1].name, "1");
        assert_eq!(states[1].value, "[State, Final]");
    }

    #[test]
    fn ref_sequences_render_references_by_index() {
        let ast = ast();
        let mut handler = VariableHandler::new();

        let root_vars = handler.variables(AST_ROOT_REFERENCE, &ast, None).unwrap();
        let all_handle = root_vars
            .iter()
            .find(|v| v.name == "all")
            .unwrap()
            .variables_reference;

        let all = handler.variables(all_handle, &ast, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "initial");
        assert_eq!(all[1].value, "[State, Final]");
        assert!(all.iter().all(|v| v.variables_reference >= 3));
    }

    #[test]
    fn handles_are_memoized_until_invalidation() {
        let ast = ast();
        let mut handler = VariableHandler::new();

        let first = handler.variables(AST_ROOT_REFERENCE, &ast, None).unwrap();
        let second = handler.variables(AST_ROOT_REFERENCE, &ast, None).unwrap();
        let entry_first = first.iter().find(|v| v.name == "entry").unwrap();
        let entry_second = second.iter().find(|v| v.name == "entry").unwrap();
        assert_eq!(
            entry_first.variables_reference,
            entry_second.variables_reference
        );

        let stale = entry_first.variables_reference;
        handler.invalidate();

        // stale handles are gone, the AST root still resolves
        assert!(handler.variables(stale, &ast, None).is_none());
        assert!(handler.variables(AST_ROOT_REFERENCE, &ast, None).is_some());
        // runtime root is unknown until the next runtime update
        assert!(handler.variables(RUNTIME_ROOT_REFERENCE, &ast, None).is_none());
    }

    #[test]
    fn runtime_update_reseeds_both_roots() {
        let ast = ast();
        let runtime_root: ModelElement = serde_json::from_value(json!({
            "id": "rt",
            "types": ["Trace"],
            "refs": {"current": "s2"}
        }))
        .unwrap();
        let runtime = ModelTree::build(TreeKind::RuntimeState, runtime_root);

        let mut handler = VariableHandler::new();
        handler.runtime_updated();

        let variables = handler
            .variables(RUNTIME_ROOT_REFERENCE, &ast, Some(&runtime))
            .unwrap();
        assert_eq!(variables.len(), 1);
        // runtime refs resolve through the AST index first
        assert_eq!(variables[0].name, "current");
        assert_eq!(variables[0].value, "[State, Final]");
    }

    #[test]
    fn unresolved_reference_is_a_leaf() {
        let root: ModelElement = serde_json::from_value(json!({
            "id": "root",
            "types": ["Program"],
            "refs": {"broken": "nowhere"}
        }))
        .unwrap();
        let ast = ModelTree::build(TreeKind::Ast, root);
        let mut handler = VariableHandler::new();

        let variables = handler.variables(AST_ROOT_REFERENCE, &ast, None).unwrap();
        assert_eq!(variables[0].value, "\"nowhere\"");
        assert_eq!(variables[0].variables_reference, 0);
    }
}
