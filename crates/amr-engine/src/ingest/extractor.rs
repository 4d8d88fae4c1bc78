use crate::graph::{Graph, Node, NodeId, Reference, Variable};
use once_cell::sync::Lazy;
use regex::Regex;

/// Concept of the form `word-NN`, i.e. a PropBank frame sense such as `close-01`.
static FRAME_SENSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*-\d{2}$").expect("valid regex"));

/// Relations kept on any node, whatever its concept.
pub const ATTRIBUTES: [&str; 5] = ["name", "location", "time", "polarity", "topic"];

/// Concepts whose edges are all kept.
const VERBATIM_CONCEPTS: [&str; 2] = ["name", "date-entity"];

const PERSON_CONCEPT: &str = "person";
const CONJUNCTION_CONCEPT: &str = "and";

/// Pulls detached subgraphs out of a built graph.
pub trait Extractor {
    fn extract(&self, graph: &Graph) -> Vec<Graph>;
}

/// Clones the relations a named person takes part in.
///
/// Expects a graph built with dual inversion bookkeeping, otherwise an
/// inverted `ARGn-of` edge never shows up on the node it now starts from.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonRelationExtractor;

impl Extractor for PersonRelationExtractor {
    fn extract(&self, graph: &Graph) -> Vec<Graph> {
        let persons: Vec<NodeId> = graph
            .variables()
            .filter(|(id, v)| v.concept == PERSON_CONCEPT && graph.get(*id, "name").is_some())
            .map(|(id, _)| id)
            .collect();

        let mut relations = Vec::new();
        for (id, _) in graph.variables() {
            let is_root = graph.outbound(id).into_iter().any(|e| {
                let edge = graph.edge(e);
                edge.relation.starts_with("ARG") && persons.contains(&edge.target)
            });
            if is_root {
                let mut cloner = Cloner {
                    graph,
                    path: Vec::new(),
                };
                relations.extend(cloner.clone_node(id, true));
            }
        }
        tracing::debug!(
            persons = persons.len(),
            relations = relations.len(),
            "extracted person relations"
        );
        relations
    }
}

struct Cloner<'g> {
    graph: &'g Graph,
    /// Variables on the way from the relation root to the node being cloned.
    path: Vec<NodeId>,
}

impl Cloner<'_> {
    /// Every alternative clone of the subtree under `id`.
    fn clone_node(&mut self, id: NodeId, is_top: bool) -> Vec<Graph> {
        let graph = self.graph;
        let var = match graph.node(id) {
            Node::Constant(c) => return vec![leaf(Node::Constant(c.clone()))],
            Node::Reference(r) => return vec![leaf(Node::Reference(r.clone()))],
            Node::Variable(v) => v,
        };
        // a conjunction is bypassed rather than emitted, so it never closes a cycle
        if self.path.contains(&id) && var.concept != CONJUNCTION_CONCEPT {
            return vec![leaf(Node::Reference(Reference {
                name: var.name.clone(),
            }))];
        }

        self.path.push(id);
        let clones = if var.concept == CONJUNCTION_CONCEPT {
            self.bypass_conjunction(id, is_top)
        } else {
            self.clone_variable(id, var, is_top)
        };
        self.path.pop();
        clones
    }

    fn bypass_conjunction(&mut self, id: NodeId, is_top: bool) -> Vec<Graph> {
        if is_top {
            let parents: Vec<NodeId> = self
                .graph
                .parents(id)
                .into_iter()
                .filter(|p| !self.path.contains(p))
                .collect();
            return parents
                .into_iter()
                .flat_map(|p| self.clone_node(p, true))
                .collect();
        }

        let graph = self.graph;
        let ops: Vec<NodeId> = graph
            .outbound(id)
            .into_iter()
            .map(|e| graph.edge(e))
            .filter(|edge| is_op(&edge.relation))
            .map(|edge| edge.target)
            .collect();
        ops.into_iter()
            .flat_map(|target| self.clone_node(target, false))
            .collect()
    }

    fn clone_variable(&mut self, id: NodeId, var: &Variable, is_top: bool) -> Vec<Graph> {
        let graph = self.graph;
        let is_entity = FRAME_SENSE.is_match(&var.concept);
        let verbatim = VERBATIM_CONCEPTS.contains(&var.concept.as_str());

        let mut relations = Vec::new();
        let mut alternatives = Vec::new();
        for e in graph.outbound(id) {
            let edge = graph.edge(e);
            let attribute = ATTRIBUTES.contains(&edge.relation.as_str());
            let keep = (is_entity && attribute)
                || verbatim
                || attribute
                || (is_top && edge.relation.starts_with("ARG"));
            if keep {
                relations.push(edge.relation.clone());
                alternatives.push(self.clone_node(edge.target, false));
            }
        }

        product(&alternatives)
            .into_iter()
            .map(|choice| {
                let mut clone = Graph::new();
                let root = clone.add_node(Node::Variable(Variable::new(
                    var.name.clone(),
                    var.concept.clone(),
                )));
                clone.set_root(root);
                for (relation, child) in relations.iter().zip(choice) {
                    if let Some(target) = clone.graft(child) {
                        clone.add_edge(root, target, relation.clone());
                    }
                }
                clone
            })
            .collect()
    }
}

fn leaf(node: Node) -> Graph {
    let mut graph = Graph::new();
    let root = graph.add_node(node);
    graph.set_root(root);
    graph
}

/// `op` followed by one or more digits.
fn is_op(relation: &str) -> bool {
    relation
        .strip_prefix("op")
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Cartesian product of `lists`, last list varying fastest. No lists yields
/// one empty tuple; any empty list yields nothing.
fn product<T>(lists: &[Vec<T>]) -> Vec<Vec<&T>> {
    let mut tuples: Vec<Vec<&T>> = vec![Vec::new()];
    for list in lists {
        tuples = tuples
            .into_iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut tuple = prefix.clone();
                    tuple.push(item);
                    tuple
                })
            })
            .collect();
    }
    tuples
}
