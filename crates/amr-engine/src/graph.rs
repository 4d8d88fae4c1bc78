//! Arena representation of a rooted AMR graph.
//!
//! A [`Graph`] owns a flat node list and a flat edge list. Variables do not
//! own their edges: they hold [`EdgeId`] handles into the graph's edge list,
//! and their outbound view is the subset of handles whose edge starts at the
//! variable. A handle may be present in more than one variable's list (see
//! the dual bookkeeping of inverted edges in [`crate::builder`]); the edge
//! itself exists exactly once.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value carried by a constant leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            // Debug keeps the fractional part of whole floats ("2.0", not "2")
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub concept: String,
    edges: Vec<EdgeId>,
}

impl Variable {
    pub fn new(name: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concept: concept.into(),
            edges: Vec::new(),
        }
    }

    /// Insertion-ordered handles, including edges that no longer start here.
    pub fn local_edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub value: Value,
    /// Synthetic id assigned when the graph is collected (`c0`, `c1`, ...).
    #[serde(rename = "name")]
    pub id: String,
    /// Whether the value was written as a quoted string.
    pub literal: bool,
}

impl Constant {
    pub fn new(value: Value, id: impl Into<String>, literal: bool) -> Self {
        Self {
            value,
            id: id.into(),
            literal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Variable(Variable),
    Constant(Constant),
    Reference(Reference),
}

impl Node {
    /// Variable or reference name, or the constant id.
    pub fn name(&self) -> &str {
        match self {
            Node::Variable(v) => &v.name,
            Node::Constant(c) => &c.id,
            Node::Reference(r) => &r.name,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Node::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Node::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn concept(&self) -> Option<&str> {
        self.as_variable().map(|v| v.concept.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: Option<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| (EdgeId(i as u32), edge))
    }

    pub fn variables(&self) -> impl Iterator<Item = (NodeId, &Variable)> + '_ {
        self.nodes()
            .filter_map(|(id, node)| node.as_variable().map(|v| (id, v)))
    }

    /// First node carrying `name` (variable name or constant id).
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Appends an edge and registers its handle with the source variable.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, relation: impl Into<String>) -> EdgeId {
        let id = self.push_edge(Edge {
            source,
            target,
            relation: relation.into(),
        });
        self.attach(source, id);
        id
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(edge);
        id
    }

    /// Adds `edge` to the local list of `node`. No-op for non-variables.
    pub(crate) fn attach(&mut self, node: NodeId, edge: EdgeId) {
        if let Some(Node::Variable(v)) = self.nodes.get_mut(node.index()) {
            v.edges.push(edge);
        }
    }

    /// Outbound edges of `id`, stably sorted by relation label.
    pub fn outbound(&self, id: NodeId) -> Vec<EdgeId> {
        let Some(var) = self.node(id).as_variable() else {
            return Vec::new();
        };
        let mut edges: Vec<EdgeId> = var
            .edges
            .iter()
            .copied()
            .filter(|&e| self.edge(e).source == id)
            .collect();
        edges.sort_by(|a, b| self.edge(*a).relation.cmp(&self.edge(*b).relation));
        edges
    }

    /// Target of the first local edge of `id` labeled `relation`.
    pub fn get(&self, id: NodeId, relation: &str) -> Option<NodeId> {
        let var = self.node(id).as_variable()?;
        var.edges
            .iter()
            .map(|&e| self.edge(e))
            .find(|edge| edge.source == id && edge.relation == relation)
            .map(|edge| edge.target)
    }

    /// Sources of every edge in the flat list that points at `id`.
    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.target == id)
            .map(|edge| edge.source)
            .collect()
    }

    /// Copies every node and edge of `other` into this graph and returns
    /// the position of `other`'s root here.
    pub fn graft(&mut self, other: &Graph) -> Option<NodeId> {
        let node_offset = self.nodes.len() as u32;
        let edge_offset = self.edges.len() as u32;

        for node in &other.nodes {
            let mut node = node.clone();
            if let Node::Variable(v) = &mut node {
                for e in v.edges.iter_mut() {
                    e.0 += edge_offset;
                }
            }
            self.nodes.push(node);
        }
        for edge in &other.edges {
            self.edges.push(Edge {
                source: NodeId(edge.source.0 + node_offset),
                target: NodeId(edge.target.0 + node_offset),
                relation: edge.relation.clone(),
            });
        }
        other.root.map(|r| NodeId(r.0 + node_offset))
    }

    /// Indented multi-line rendering of the subtree under `id`.
    pub fn pretty_tree(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.write_tree(id, 0, &mut path, &mut out);
        out
    }

    fn write_tree(&self, id: NodeId, indent: usize, path: &mut Vec<NodeId>, out: &mut String) {
        let pad = " ".repeat(indent);
        match self.node(id) {
            Node::Variable(v) if !path.contains(&id) => {
                out.push_str(&format!("{}[{} / {}]\n", pad, v.name, v.concept));
                path.push(id);
                for e in self.outbound(id) {
                    let edge = self.edge(e);
                    out.push_str(&format!("{}--> {}\n", pad, edge.relation));
                    self.write_tree(edge.target, indent + 8, path, out);
                }
                path.pop();
            }
            Node::Constant(c) => out.push_str(&format!("{}{}\n", pad, c.value)),
            node => out.push_str(&format!("{}{}\n", pad, node.name())),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum NodeRecord<'a> {
    Variable { name: &'a str, concept: &'a str },
    Constant(&'a Constant),
    Reference { name: &'a str },
}

#[derive(Serialize)]
struct EdgeRecord<'a> {
    var1: &'a str,
    var2: &'a str,
    relationship: &'a str,
}

#[derive(Serialize)]
struct GraphRecord<'a> {
    nodes: Vec<NodeRecord<'a>>,
    edges: Vec<EdgeRecord<'a>>,
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match node {
                Node::Variable(v) => NodeRecord::Variable {
                    name: &v.name,
                    concept: &v.concept,
                },
                Node::Constant(c) => NodeRecord::Constant(c),
                Node::Reference(r) => NodeRecord::Reference { name: &r.name },
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|edge| EdgeRecord {
                var1: self.node(edge.source).name(),
                var2: self.node(edge.target).name(),
                relationship: &edge.relation,
            })
            .collect();
        GraphRecord { nodes, edges }.serialize(serializer)
    }
}
