//! Turns a parsed [`Tree`] into a flat [`Graph`].
//!
//! Two depth-first passes over the tree. The collect pass allocates every
//! variable and constant (constants get `c0`, `c1`, ... in traversal order)
//! and records variables by name. The resolve pass walks the same edges
//! post-order: each edge's subtree is finished before the edge itself is
//! appended, references are replaced by the named variable, and inverse
//! relations (`ARG0-of`) are normalized by stripping the marker and swapping
//! the endpoints.

use crate::error::{Error, Result};
use crate::graph::{Constant, Edge, Graph, Node, NodeId, Variable};
use crate::tree::Tree;
use std::collections::HashMap;

pub const INVERSE_SUFFIX: &str = "-of";

/// Ends in the inverse marker but is a relation in its own right.
pub const NON_INVERSE_RELATION: &str = "consist-of";

/// Edge target as seen by the collect pass, before resolution.
enum Pending {
    Node(NodeId),
    Reference(String),
}

struct PendingEdge {
    relation: String,
    target: Pending,
}

struct Builder {
    graph: Graph,
    pending: HashMap<NodeId, Vec<PendingEdge>>,
    lookup: HashMap<String, NodeId>,
    constants: usize,
    dual_invert: bool,
}

/// Builds a graph from `tree`.
///
/// With `dual_invert`, every inverted edge is also registered with its new
/// source variable, so it shows up among that variable's outbound edges.
/// Without it, an inverted edge stays visible only through the flat edge
/// list.
pub fn build(tree: &Tree, dual_invert: bool) -> Result<Graph> {
    let mut builder = Builder {
        graph: Graph::new(),
        pending: HashMap::new(),
        lookup: HashMap::new(),
        constants: 0,
        dual_invert,
    };

    let root = builder.collect(tree)?;
    builder.resolve(root)?;

    let mut graph = builder.graph;
    graph.set_root(root);
    tracing::debug!(
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        dual_invert,
        "built AMR graph"
    );
    Ok(graph)
}

/// Normalized form of `relation`, if it is an inverse relation.
pub fn normalize_inverse(relation: &str) -> Option<&str> {
    if relation == NON_INVERSE_RELATION {
        return None;
    }
    relation.strip_suffix(INVERSE_SUFFIX)
}

impl Builder {
    fn collect(&mut self, tree: &Tree) -> Result<NodeId> {
        match tree {
            Tree::Literal(literal) => {
                let id = format!("c{}", self.constants);
                self.constants += 1;
                Ok(self.graph.add_node(Node::Constant(Constant::new(
                    literal.value.clone(),
                    id,
                    literal.quoted,
                ))))
            }
            Tree::Variable {
                name,
                concept,
                edges,
            } => {
                if self.lookup.contains_key(name) {
                    return Err(Error::DuplicateVariable { name: name.clone() });
                }
                let id = self
                    .graph
                    .add_node(Node::Variable(Variable::new(name.clone(), concept.clone())));
                self.lookup.insert(name.clone(), id);

                let mut pending = Vec::with_capacity(edges.len());
                for edge in edges {
                    let target = match &edge.target {
                        Tree::Reference { name } => Pending::Reference(name.clone()),
                        child => Pending::Node(self.collect(child)?),
                    };
                    pending.push(PendingEdge {
                        relation: edge.relation.clone(),
                        target,
                    });
                }
                self.pending.insert(id, pending);
                Ok(id)
            }
            // A reference only resolves as an edge target; as a root it has
            // nothing to point at.
            Tree::Reference { name } => Err(Error::UnresolvedReference { name: name.clone() }),
        }
    }

    fn resolve(&mut self, node: NodeId) -> Result<()> {
        let Some(pending) = self.pending.remove(&node) else {
            return Ok(());
        };

        for edge in pending {
            let target = match edge.target {
                Pending::Node(child) => {
                    self.resolve(child)?;
                    child
                }
                Pending::Reference(name) => *self
                    .lookup
                    .get(&name)
                    .ok_or(Error::UnresolvedReference { name })?,
            };

            let (source, target, relation, inverted) = match normalize_inverse(&edge.relation) {
                Some(relation) => (target, node, relation.to_string(), true),
                None => (node, target, edge.relation, false),
            };

            let id = self.graph.push_edge(Edge {
                source,
                target,
                relation,
            });
            // The parse-time owner keeps its handle even when the edge now
            // starts elsewhere; the outbound view filters it out.
            self.graph.attach(node, id);
            if inverted && self.dual_invert {
                self.graph.attach(source, id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::graph::Value;

    fn build_text(text: &str, dual_invert: bool) -> Result<Graph> {
        let tree = Grammar::shared()?.parse(text)?;
        build(&tree, dual_invert)
    }

    fn relations_of(graph: &Graph, name: &str) -> Vec<String> {
        let id = graph.find(name).unwrap();
        graph
            .outbound(id)
            .into_iter()
            .map(|e| graph.edge(e).relation.clone())
            .collect()
    }

    #[test]
    fn test_inverse_relation_is_normalized() -> Result<()> {
        let graph = build_text("(a1 / city :location-of (b1 / station))", false)?;
        let a = graph.find("a1").unwrap();
        let b = graph.find("b1").unwrap();

        assert_eq!(graph.num_edges(), 1);
        let (_, edge) = graph.edges().next().unwrap();
        assert_eq!(edge.relation, "location");
        assert_eq!(edge.source, b);
        assert_eq!(edge.target, a);
        Ok(())
    }

    #[test]
    fn test_consist_of_is_not_inverted() -> Result<()> {
        let graph = build_text("(z0 / team :consist-of (z1 / person))", false)?;
        let (_, edge) = graph.edges().next().unwrap();
        assert_eq!(edge.relation, "consist-of");
        assert_eq!(edge.source, graph.find("z0").unwrap());
        Ok(())
    }

    #[test]
    fn test_dual_invert_controls_outbound_view() -> Result<()> {
        let text = "(z0 / person :ARG0-of (z1 / lead-02 :ARG1 (z2 / team)))";

        let single = build_text(text, false)?;
        assert_eq!(relations_of(&single, "z1"), vec!["ARG1"]);
        assert!(relations_of(&single, "z0").is_empty());

        let dual = build_text(text, true)?;
        assert_eq!(relations_of(&dual, "z1"), vec!["ARG0", "ARG1"]);
        assert!(relations_of(&dual, "z0").is_empty());
        // still one edge object per relation
        assert_eq!(dual.num_edges(), 2);
        Ok(())
    }

    #[test]
    fn test_references_resolve_to_variables() -> Result<()> {
        let graph = build_text("(z0 / want-01 :ARG0 (z1 / boy) :ARG1 (z2 / go-02 :ARG0 z1))", false)?;
        let boy = graph.find("z1").unwrap();
        let go = graph.find("z2").unwrap();
        assert_eq!(graph.get(go, "ARG0"), Some(boy));
        assert!(graph
            .nodes()
            .all(|(_, node)| !matches!(node, Node::Reference(_))));
        Ok(())
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let err = build_text("(z0 / want-01 :ARG0 z7)", false).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { name } if name == "z7"));
    }

    #[test]
    fn test_duplicate_variable_fails() {
        let err = build_text("(z0 / a :ARG0 (z1 / b) :ARG1 (z1 / c))", false).unwrap_err();
        assert!(matches!(err, Error::DuplicateVariable { name } if name == "z1"));

        // the root name counts too
        let err = build_text("(z0 / a :ARG0 (z0 / b))", true).unwrap_err();
        assert!(matches!(err, Error::DuplicateVariable { name } if name == "z0"));
    }

    #[test]
    fn test_constant_ids_follow_traversal_order() -> Result<()> {
        let graph = build_text(
            r#"(z0 / have-03 :ARG0 (z1 / person :name (z2 / name :op1 "Ann")) :quant 2 :ARG1 (z3 / cat :mod "big"))"#,
            false,
        )?;
        let constants: Vec<(String, Value)> = graph
            .nodes()
            .filter_map(|(_, node)| node.as_constant())
            .map(|c| (c.id.clone(), c.value.clone()))
            .collect();
        assert_eq!(
            constants,
            vec![
                ("c0".to_string(), Value::String("Ann".into())),
                ("c1".to_string(), Value::Int(2)),
                ("c2".to_string(), Value::String("big".into())),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_edges_are_appended_post_order() -> Result<()> {
        let graph = build_text("(z0 / a :ARG0 (z1 / b :ARG0 (z2 / c)) :ARG1 (z3 / d))", false)?;
        let order: Vec<(String, String)> = graph
            .edges()
            .map(|(_, e)| {
                (
                    graph.node(e.source).name().to_string(),
                    graph.node(e.target).name().to_string(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("z1".to_string(), "z2".to_string()),
                ("z0".to_string(), "z1".to_string()),
                ("z0".to_string(), "z3".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_build_is_deterministic() -> Result<()> {
        let text = r#"(z0 / page :ARG1-of (z2 / base-01 :location (z3 / country :name (z4 / name :op1 "China"))) :poss z3)"#;
        assert_eq!(build_text(text, true)?, build_text(text, true)?);
        Ok(())
    }
}
