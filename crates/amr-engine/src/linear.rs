//! Single-line pointer notation.
//!
//! Graph-to-text models consume AMR as one line in which variable names are
//! replaced by `<pointer:N>` tokens and every token is preceded by a
//! delimiter (`Ġ` for the BPE vocabulary, a plain space for the text
//! interface). [`to_penman`] maps a model's pointer output back into
//! notation the grammar accepts.

use crate::graph::{Graph, Node, NodeId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static POINTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<pointer:(\d+)>").expect("valid regex"));
static REFERENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"z(\d+)\s+/\s+\)").expect("valid regex"));
static REFERENCE_ROLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"z(\d+)\s+/\s+:").expect("valid regex"));

pub const BPE_DELIMITER: &str = "\u{0120}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linearizer {
    pub delimiter: String,
    pub literal_begin: String,
    pub literal_end: String,
}

impl Default for Linearizer {
    fn default() -> Self {
        Self {
            delimiter: BPE_DELIMITER.to_string(),
            literal_begin: "<lit> ".to_string(),
            literal_end: " </lit>".to_string(),
        }
    }
}

impl Linearizer {
    /// Space-delimited output with quoted literals, as sent to the text
    /// generation interface.
    pub fn plain() -> Self {
        Self {
            delimiter: " ".to_string(),
            literal_begin: "\"".to_string(),
            literal_end: "\"".to_string(),
        }
    }

    /// Renders the subtree under `id`. A variable reached a second time is
    /// written as a bare pointer.
    pub fn render(&self, graph: &Graph, id: NodeId) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        self.write(graph, id, &mut visited, &mut out);
        out
    }

    /// Renders from the graph root; empty for a graph without one.
    pub fn render_root(&self, graph: &Graph) -> String {
        graph
            .root()
            .map(|root| self.render(graph, root))
            .unwrap_or_default()
    }

    fn write(&self, graph: &Graph, id: NodeId, visited: &mut HashSet<NodeId>, out: &mut String) {
        let d = &self.delimiter;
        match graph.node(id) {
            Node::Variable(v) if visited.insert(id) => {
                out.push_str(&format!("{d}( {d}{} {d}{} ", pointer(&v.name), v.concept));
                for e in graph.outbound(id) {
                    let edge = graph.edge(e);
                    out.push_str(&format!("{d}:{} ", edge.relation));
                    self.write(graph, edge.target, visited, out);
                    out.push(' ');
                }
                out.push_str(&format!("{d})"));
            }
            Node::Constant(c) if c.literal => out.push_str(&format!(
                "{d}{}{}{}{d}",
                self.literal_begin, c.value, self.literal_end
            )),
            Node::Constant(c) => out.push_str(&format!("{d}{} ", c.value)),
            node => out.push_str(&format!("{d}{}", pointer(node.name()))),
        }
    }
}

/// `<pointer:N>` for a variable named `zN`.
fn pointer(name: &str) -> String {
    let mut chars = name.chars();
    chars.next();
    format!("<pointer:{}>", chars.as_str())
}

/// Turns pointer notation back into PENMAN.
///
/// When the parentheses do not balance, unmatched closing ones are dropped
/// and missing ones appended, ignoring anything between the literal
/// markers. Pointers become variables (`<pointer:3>` is `z3 /`, or just
/// `z3` when it is a re-entrant reference) and the literal markers become
/// double quotes.
pub fn to_penman(text: &str, linearizer: &Linearizer) -> String {
    let mut output = if linearizer.delimiter.trim().is_empty() {
        text.to_string()
    } else {
        text.replace(linearizer.delimiter.as_str(), " ")
    };
    if output.matches('(').count() != output.matches(')').count() {
        output = repair_brackets(&output, linearizer);
    }
    output = POINTER.replace_all(&output, "z${1} /").into_owned();
    output = REFERENCE_CLOSE.replace_all(&output, "z${1} )").into_owned();
    output = REFERENCE_ROLE.replace_all(&output, "z${1} :").into_owned();
    if linearizer.literal_begin != "\"" {
        output = output.replace(linearizer.literal_begin.as_str(), "\"");
    }
    if linearizer.literal_end != "\"" {
        output = output.replace(linearizer.literal_end.as_str(), "\"");
    }
    output
}

fn repair_brackets(text: &str, linearizer: &Linearizer) -> String {
    let begin = linearizer.literal_begin.trim();
    let end = linearizer.literal_end.trim();
    let symmetric = begin == end;

    let mut lines = Vec::new();
    let mut open = 0usize;
    let mut in_literal = false;
    for line in text.lines() {
        let mut tokens = Vec::new();
        for token in line.split_whitespace() {
            if symmetric && !begin.is_empty() {
                if token.matches(begin).count() % 2 == 1 {
                    in_literal = !in_literal;
                }
            } else if token == begin {
                in_literal = true;
            } else if token == end {
                in_literal = false;
            }
            if !in_literal {
                if token == "(" {
                    open += 1;
                } else if token == ")" {
                    if open == 0 {
                        continue;
                    }
                    open -= 1;
                }
            }
            tokens.push(token);
        }
        lines.push(tokens.join(" "));
    }
    let mut repaired = lines.join("\n");
    for _ in 0..open {
        repaired.push_str(" )");
    }
    repaired
}
