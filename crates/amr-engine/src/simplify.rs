//! Presentation cleanup of a built graph.
//!
//! `wiki` annotations are dropped, and every `name` subtree
//! (`(n / name :op1 "Google" :op2 "Inc")`) collapses into one string
//! constant (`"Google Inc"`) that takes the name variable's place as the
//! target of its incoming edges. The input graph is left untouched.

use crate::graph::{Constant, Edge, EdgeId, Graph, Node, NodeId, Value, Variable};
use std::collections::{HashMap, HashSet};

pub const WIKI_RELATION: &str = "wiki";
pub const NAME_CONCEPT: &str = "name";

pub fn simplify(graph: &Graph) -> Graph {
    let mut removed: HashSet<NodeId> = HashSet::new();
    let mut collapsed: Vec<(NodeId, Constant)> = Vec::new();
    let mut collapsed_ids: HashSet<NodeId> = HashSet::new();
    let mut kept: Vec<EdgeId> = Vec::new();

    for (id, edge) in graph.edges() {
        if edge.relation == WIKI_RELATION {
            if graph.node(edge.target).as_constant().is_some() {
                removed.insert(edge.target);
            }
            continue;
        }
        if is_name(graph, edge.source) {
            if collapsed_ids.insert(edge.source) {
                collapsed.push((edge.source, collapse(graph, edge.source, &mut removed)));
            }
            // edges of a name node disappear with it
            continue;
        }
        kept.push(id);
    }

    // name nodes that never appear as an edge source still collapse
    for (id, _) in graph.variables() {
        if is_name(graph, id) && collapsed_ids.insert(id) {
            collapsed.push((id, collapse(graph, id, &mut removed)));
        }
    }

    let mut out = Graph::new();
    let mut node_map: Vec<Option<NodeId>> = vec![None; graph.num_nodes()];

    for (id, node) in graph.nodes() {
        if removed.contains(&id) || collapsed_ids.contains(&id) {
            continue;
        }
        let copy = match node {
            Node::Variable(v) => Node::Variable(Variable::new(v.name.clone(), v.concept.clone())),
            other => other.clone(),
        };
        node_map[id.index()] = Some(out.add_node(copy));
    }
    for (id, constant) in collapsed {
        node_map[id.index()] = Some(out.add_node(Node::Constant(constant)));
    }

    let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::with_capacity(kept.len());
    for old in kept {
        let edge = graph.edge(old);
        if let (Some(source), Some(target)) = (
            node_map[edge.source.index()],
            node_map[edge.target.index()],
        ) {
            let new = out.push_edge(Edge {
                source,
                target,
                relation: edge.relation.clone(),
            });
            edge_map.insert(old, new);
        }
    }

    for (id, var) in graph.variables() {
        let Some(new_id) = node_map[id.index()] else {
            continue;
        };
        for handle in var.local_edges() {
            if let Some(&new) = edge_map.get(handle) {
                out.attach(new_id, new);
            }
        }
    }

    if let Some(root) = graph.root().and_then(|r| node_map[r.index()]) {
        out.set_root(root);
    }

    tracing::debug!(
        before = graph.num_nodes(),
        after = out.num_nodes(),
        names = collapsed_ids.len(),
        "simplified AMR graph"
    );
    out
}

fn is_name(graph: &Graph, id: NodeId) -> bool {
    graph.node(id).concept() == Some(NAME_CONCEPT)
}

/// Joins `op1`, `op2`, ... of a name variable, stopping at the first gap.
fn collapse(graph: &Graph, name: NodeId, removed: &mut HashSet<NodeId>) -> Constant {
    let mut parts = Vec::new();
    for i in 1.. {
        let op = format!("op{}", i);
        let Some(target) = graph.get(name, &op) else {
            break;
        };
        let Node::Constant(part) = graph.node(target) else {
            break;
        };
        parts.push(part.value.to_string());
        removed.insert(target);
    }
    Constant::new(
        Value::String(parts.join(" ")),
        format!("c{}", graph.node(name).name()),
        // quoted so a multi-word name linearizes and re-parses as one string
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::grammar::Grammar;
    use crate::error::Result;

    fn graph(text: &str) -> Result<Graph> {
        build(&Grammar::shared()?.parse(text)?, false)
    }

    fn names(graph: &Graph) -> HashSet<String> {
        graph.nodes().map(|(_, n)| n.name().to_string()).collect()
    }

    #[test]
    fn test_name_collapses_into_literal() -> Result<()> {
        let g = graph(r#"(z0 / appoint-01 :ARG0 (z1 / company :name (z2 / name :op1 "Google" :op2 "Inc")))"#)?;
        let s = simplify(&g);

        let before = names(&g);
        let after = names(&s);
        let gone: Vec<&String> = before.difference(&after).collect();
        assert_eq!(gone.len(), 3);
        assert!(!after.contains("z2") && !after.contains("c0") && !after.contains("c1"));

        let company = s.find("z1").unwrap();
        let target = s.get(company, "name").unwrap();
        let literal = s.node(target).as_constant().unwrap();
        assert_eq!(literal.value, Value::String("Google Inc".into()));
        assert_eq!(literal.id, "cz2");
        assert!(literal.literal);
        Ok(())
    }

    #[test]
    fn test_wiki_edges_are_dropped() -> Result<()> {
        let g = graph(r#"(z0 / country :wiki "China" :name (z1 / name :op1 "China"))"#)?;
        let s = simplify(&g);
        assert!(s.edges().all(|(_, e)| e.relation != WIKI_RELATION));
        assert_eq!(s.num_nodes(), 2);
        assert_eq!(s.num_edges(), 1);
        let root = s.root().unwrap();
        assert_eq!(s.outbound(root).len(), 1);
        Ok(())
    }

    #[test]
    fn test_gap_stops_scan_and_missing_op1_is_empty() -> Result<()> {
        let g = graph(
            r#"(z0 / and :op1 (z1 / person :name (z2 / name :op1 "Ann" :op3 "Lee")) :op2 (z3 / person :name (z4 / name :op2 "Bo")))"#,
        )?;
        let s = simplify(&g);

        let first = s.get(s.find("z1").unwrap(), "name").unwrap();
        let second = s.get(s.find("z3").unwrap(), "name").unwrap();
        assert_ne!(first, second);
        assert_eq!(s.node(first).as_constant().unwrap().value, Value::String("Ann".into()));
        assert_eq!(s.node(second).as_constant().unwrap().value, Value::String(String::new()));
        // "Lee" and "Bo" were never consumed, so they stay behind as orphans
        assert!(s
            .nodes()
            .any(|(_, n)| n.as_constant().map(|c| c.value.to_string()) == Some("Lee".into())));
        Ok(())
    }

    #[test]
    fn test_simplify_is_idempotent() -> Result<()> {
        let g = build(
            &Grammar::shared()?.parse(
                r#"(z0 / page :ARG1-of (z2 / base-01 :location (z3 / country :wiki "China" :name (z4 / name :op1 "China"))) :poss (z9 / company :wiki "Google" :name (z10 / name :op1 "Google.cn")))"#,
            )?,
            true,
        )?;
        let once = simplify(&g);
        let twice = simplify(&once);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_input_graph_is_not_mutated() -> Result<()> {
        let g = graph(r#"(z0 / person :name (z1 / name :op1 "Ann"))"#)?;
        let copy = g.clone();
        let _ = simplify(&g);
        assert_eq!(g, copy);
        Ok(())
    }
}
