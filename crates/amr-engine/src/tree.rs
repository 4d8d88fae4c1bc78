//! Concrete syntax tree produced by [`crate::grammar::Grammar::parse`].

use crate::graph::Value;

/// Bare tokens that stay strings even though they are unquoted.
const KEYWORDS: [&str; 4] = ["+", "-", "imperative", "expressive"];

#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// `(name / concept :role child ...)`
    Variable {
        name: String,
        concept: String,
        edges: Vec<TreeEdge>,
    },
    /// A bare variable name pointing at a definition elsewhere in the tree.
    Reference { name: String },
    Literal(Literal),
}

/// Which grammar rule produced the edge. Both kinds build the same graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Arg,
    Attr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEdge {
    pub kind: EdgeKind,
    pub relation: String,
    pub target: Tree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub quoted: bool,
}

impl Literal {
    /// Classifies a literal token.
    ///
    /// Quoted strings lose their quotes and are flagged. The polarity and
    /// mode keywords are kept verbatim. Anything else is tried as an integer,
    /// then as a float, and falls back to a bare string.
    pub fn classify(token: &str) -> Self {
        if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            return Self {
                value: Value::String(token[1..token.len() - 1].to_string()),
                quoted: true,
            };
        }
        if KEYWORDS.contains(&token) {
            return Self {
                value: Value::String(token.to_string()),
                quoted: false,
            };
        }
        let value = if let Ok(i) = token.parse::<i64>() {
            Value::Int(i)
        } else if let Ok(f) = token.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::String(token.to_string())
        };
        Self {
            value,
            quoted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(
            Literal::classify("\"Google\""),
            Literal {
                value: Value::String("Google".into()),
                quoted: true
            }
        );
        assert_eq!(Literal::classify("-").value, Value::String("-".into()));
        assert_eq!(Literal::classify("imperative").value, Value::String("imperative".into()));
        assert_eq!(Literal::classify("42").value, Value::Int(42));
        assert_eq!(Literal::classify("-7").value, Value::Int(-7));
        assert_eq!(Literal::classify("0.25").value, Value::Float(0.25));
        assert_eq!(Literal::classify("date-entity").value, Value::String("date-entity".into()));
        assert!(!Literal::classify("2010").quoted);
    }

    #[test]
    fn test_classify_quoted_number_stays_string() {
        let lit = Literal::classify("\"2010\"");
        assert_eq!(lit.value, Value::String("2010".into()));
        assert!(lit.quoted);
    }

    #[test]
    fn test_classify_empty_quotes() {
        let lit = Literal::classify("\"\"");
        assert_eq!(lit.value, Value::String(String::new()));
        assert!(lit.quoted);
    }
}
