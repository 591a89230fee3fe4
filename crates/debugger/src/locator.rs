//! Source-position and type indexing of the element trees.

use std::collections::{BTreeMap, HashMap};

use runtime_protocol::types::Location;

use crate::model::{ModelElementReference, ModelTree, NodeId};

/// Coordinate origin of the connected client.
///
/// The runtime reports zero-based positions; the client announces its own
/// origin in the `initialize` request. The bases are applied as additive
/// offsets: subtracted from inbound positions, added to outbound ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub line_base: i64,
    pub column_base: i64,
}

impl Default for Origin {
    /// Lines and columns start at 1 unless the client says otherwise.
    fn default() -> Self {
        Self {
            line_base: 1,
            column_base: 1,
        }
    }
}

impl Origin {
    pub fn new(lines_start_at1: bool, columns_start_at1: bool) -> Self {
        Self {
            line_base: lines_start_at1 as i64,
            column_base: columns_start_at1 as i64,
        }
    }
}

/// Per-line index over the located elements of one tree.
///
/// Lines are scanned downward from the query line; the first element whose
/// span contains the query position wins.
#[derive(Debug)]
pub struct ElementLocator {
    /// Start line to elements starting there, sorted by line descending.
    lines: Vec<(i64, Vec<NodeId>)>,
}

impl ElementLocator {
    pub fn new(tree: &ModelTree) -> Self {
        let mut by_line: BTreeMap<i64, Vec<NodeId>> = BTreeMap::new();
        for (id, node) in tree.iter() {
            if let Some(location) = node.location {
                by_line.entry(location.line).or_default().push(id);
            }
        }

        Self {
            lines: by_line.into_iter().rev().collect(),
        }
    }

    /// Resolve a client position to the element containing it.
    ///
    /// `line` and `column` are in client coordinates; `origin` translates
    /// them into the runtime's zero-based coordinates before the scan.
    pub fn element_from_position(
        &self,
        tree: &ModelTree,
        line: i64,
        column: i64,
        origin: Origin,
    ) -> Option<NodeId> {
        let line = line - origin.line_base;
        let column = column - origin.column_base;

        for (start_line, nodes) in &self.lines {
            if *start_line > line {
                continue;
            }
            for &node in nodes {
                let location = tree
                    .node(node)
                    .location
                    .expect("indexed elements have locations");
                if contains(&location, line, column) {
                    return Some(node);
                }
            }
        }

        None
    }
}

/// Whether `location` spans the (runtime-origin) position.
fn contains(location: &Location, line: i64, column: i64) -> bool {
    if line == location.line {
        if column < location.column {
            return false;
        }
        if location.line == location.end_line && column > location.end_column {
            return false;
        }
        true
    } else if line == location.end_line {
        column <= location.end_column
    } else {
        location.line <= line && line <= location.end_line
    }
}

/// Type-tag index over both element trees.
///
/// An element with N types is registered under each of them. Queries list
/// AST elements first, then runtime-state elements.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    ast: HashMap<String, Vec<NodeId>>,
    runtime: HashMap<String, Vec<NodeId>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_ast(&mut self, tree: &ModelTree) {
        self.ast = index(tree);
    }

    pub fn index_runtime(&mut self, tree: &ModelTree) {
        self.runtime = index(tree);
    }

    pub fn clear_runtime(&mut self) {
        self.runtime.clear();
    }

    /// All elements carrying `type_tag`, AST first.
    pub fn elements_of_type(
        &self,
        type_tag: &str,
        ast: &ModelTree,
        runtime: Option<&ModelTree>,
    ) -> Vec<ModelElementReference> {
        let mut elements = Vec::new();
        if let Some(nodes) = self.ast.get(type_tag) {
            elements.extend(nodes.iter().map(|&n| ast.reference(n)));
        }
        if let (Some(nodes), Some(runtime)) = (self.runtime.get(type_tag), runtime) {
            elements.extend(nodes.iter().map(|&n| runtime.reference(n)));
        }
        elements
    }
}

fn index(tree: &ModelTree) -> HashMap<String, Vec<NodeId>> {
    let mut map: HashMap<String, Vec<NodeId>> = HashMap::new();
    for (id, node) in tree.iter() {
        for type_tag in &node.types {
            map.entry(type_tag.clone()).or_default().push(id);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeKind;
    use runtime_protocol::types::ModelElement;

    fn located_tree() -> ModelTree {
        let root: ModelElement = serde_json::from_value(serde_json::json!({
            "id": "root",
            "types": ["Program"],
            "location": {"line": 0, "column": 0, "endLine": 9, "endColumn": 0},
            "children": {
                "statements": [
                    {
                        "id": "assign",
                        "types": ["Assignment", "Statement"],
                        "location": {"line": 2, "column": 4, "endLine": 2, "endColumn": 17}
                    },
                    {
                        "id": "loop",
                        "types": ["Loop", "Statement"],
                        "location": {"line": 4, "column": 0, "endLine": 7, "endColumn": 3}
                    }
                ]
            }
        }))
        .unwrap();
        ModelTree::build(TreeKind::Ast, root)
    }

    fn runtime_origin() -> Origin {
        Origin {
            line_base: 0,
            column_base: 0,
        }
    }

    #[test]
    fn exact_single_line_containment() {
        let tree = located_tree();
        let locator = ElementLocator::new(&tree);

        let node = locator
            .element_from_position(&tree, 2, 10, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "assign");

        // before the start column
        let node = locator
            .element_from_position(&tree, 2, 3, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "root");

        // past the end column on a single-line span
        let node = locator
            .element_from_position(&tree, 2, 18, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "root");
    }

    #[test]
    fn multi_line_span_containment() {
        let tree = located_tree();
        let locator = ElementLocator::new(&tree);

        // middle line of the loop
        let node = locator
            .element_from_position(&tree, 5, 0, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "loop");

        // end line honours the end column
        let node = locator
            .element_from_position(&tree, 7, 3, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "loop");
        let node = locator
            .element_from_position(&tree, 7, 4, runtime_origin())
            .unwrap();
        assert_eq!(tree.node(node).id, "root");
    }

    #[test]
    fn origin_offset_is_applied() {
        let tree = located_tree();
        let locator = ElementLocator::new(&tree);

        // one-based client coordinates for the runtime position (2, 10)
        let node = locator
            .element_from_position(&tree, 3, 11, Origin::default())
            .unwrap();
        assert_eq!(tree.node(node).id, "assign");
    }

    #[test]
    fn position_before_any_element_misses() {
        let tree = located_tree();
        let locator = ElementLocator::new(&tree);
        // root starts at line 0 and every query line below it is scanned
        // downward, so only a negative line misses everything
        assert!(locator
            .element_from_position(&tree, -1, 0, runtime_origin())
            .is_none());
    }

    #[test]
    fn type_registry_concatenates_ast_then_runtime() {
        let ast = located_tree();
        let runtime_root: ModelElement = serde_json::from_value(serde_json::json!({
            "id": "rt",
            "types": ["Trace"],
            "children": {
                "frames": [{"id": "f0", "types": ["Statement"]}]
            }
        }))
        .unwrap();
        let runtime = ModelTree::build(TreeKind::RuntimeState, runtime_root);

        let mut registry = TypeRegistry::new();
        registry.index_ast(&ast);
        registry.index_runtime(&runtime);

        let statements = registry.elements_of_type("Statement", &ast, Some(&runtime));
        let ids: Vec<&str> = statements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["assign", "loop", "f0"]);

        registry.clear_runtime();
        let statements = registry.elements_of_type("Statement", &ast, None);
        assert_eq!(statements.len(), 2);
    }
}
