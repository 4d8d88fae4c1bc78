//! PENMAN grammar: terminal definitions loaded from a grammar resource and
//! the recursive-descent rules that turn notation text into a [`Tree`].
//!
//! The resource is a list of `NAME: /regex/` lines (see
//! `grammar/penman.grammar`). Compiling it is the expensive part, so the
//! built-in grammar is compiled once per process and shared through
//! [`Grammar::shared`]. A compiled grammar is immutable and can be used from
//! any number of threads.

use crate::error::{Error, Result};
use crate::tree::{EdgeKind, Literal, Tree, TreeEdge};
use nom::branch::alt;
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map};
use nom::error::{Error as NomError, ErrorKind};
use nom::multi::many0;
use nom::sequence::{delimited, preceded};
use nom::IResult;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const PENMAN: &str = include_str!("../grammar/penman.grammar");

const TERMINALS: [&str; 5] = ["VARIABLE", "CONCEPT", "ROLE", "STRING", "CONSTANT"];

static SHARED: OnceCell<Arc<Grammar>> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct Grammar {
    variable: Regex,
    reference: Regex,
    concept: Regex,
    role: Regex,
    string: Regex,
    constant: Regex,
}

impl Grammar {
    /// Compiles a grammar resource.
    pub fn from_source(source: &str) -> Result<Self> {
        let mut patterns = HashMap::new();
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let (name, rule) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidGrammar(format!("malformed rule: {}", line)))?;
            let rule = rule.trim();
            let pattern = rule
                .strip_prefix('/')
                .and_then(|r| r.strip_suffix('/'))
                .ok_or_else(|| Error::InvalidGrammar(format!("pattern must be /.../: {}", line)))?;
            patterns.insert(name.trim().to_string(), pattern.to_string());
        }

        if let Some(missing) = TERMINALS.iter().find(|t| !patterns.contains_key(**t)) {
            return Err(Error::InvalidGrammar(format!("missing terminal {}", missing)));
        }

        let compile = |name: &str, exact: bool| -> Result<Regex> {
            let anchored = if exact {
                format!("^(?:{})$", patterns[name])
            } else {
                format!("^(?:{})", patterns[name])
            };
            Regex::new(&anchored).map_err(|e| Error::InvalidGrammar(format!("{}: {}", name, e)))
        };

        let grammar = Self {
            variable: compile("VARIABLE", false)?,
            reference: compile("VARIABLE", true)?,
            concept: compile("CONCEPT", false)?,
            role: compile("ROLE", false)?,
            string: compile("STRING", false)?,
            constant: compile("CONSTANT", false)?,
        };
        tracing::debug!("compiled AMR grammar");
        Ok(grammar)
    }

    /// Compiles a grammar resource read from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_source(&source)
    }

    /// The built-in PENMAN grammar, compiled on first use.
    pub fn shared() -> Result<Arc<Grammar>> {
        SHARED
            .get_or_try_init(|| Self::from_source(PENMAN).map(Arc::new))
            .cloned()
    }

    /// Parses one rooted tree. Leading and trailing whitespace is ignored;
    /// anything else after the closing parenthesis is an error.
    pub fn parse(&self, text: &str) -> Result<Tree> {
        match self.tree(text) {
            Ok((_, tree)) => Ok(tree),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::Grammar {
                text: text.to_string(),
                offset: text.len() - e.input.len(),
            }),
            Err(nom::Err::Incomplete(_)) => Err(Error::Grammar {
                text: text.to_string(),
                offset: text.len(),
            }),
        }
    }

    fn tree<'a>(&self, input: &'a str) -> IResult<&'a str, Tree> {
        all_consuming(delimited(
            multispace0,
            |i: &'a str| self.var_def(i),
            multispace0,
        ))(input)
    }

    fn var_def<'a>(&self, input: &'a str) -> IResult<&'a str, Tree> {
        let (input, _) = char('(')(input)?;
        let (input, _) = multispace0(input)?;
        let (input, name) = terminal(&self.variable, input)?;
        let (input, _) = delimited(multispace0, char('/'), multispace0)(input)?;
        let (input, concept) = terminal(&self.concept, input)?;
        let (input, edges) = many0(preceded(multispace0, |i: &'a str| self.edge(i)))(input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((
            input,
            Tree::Variable {
                name: name.to_string(),
                concept: concept.to_string(),
                edges,
            },
        ))
    }

    fn edge<'a>(&self, input: &'a str) -> IResult<&'a str, TreeEdge> {
        let (input, role) = terminal(&self.role, input)?;
        let (input, _) = multispace0(input)?;
        let (input, (kind, target)) = alt((
            map(|i: &'a str| self.var_def(i), |tree| (EdgeKind::Arg, tree)),
            map(
                |i: &'a str| terminal(&self.string, i),
                |token| (EdgeKind::Attr, Tree::Literal(Literal::classify(token))),
            ),
            map(
                |i: &'a str| terminal(&self.constant, i),
                |token| self.bare(token),
            ),
        ))(input)?;
        Ok((
            input,
            TreeEdge {
                kind,
                relation: role.strip_prefix(':').unwrap_or(role).to_string(),
                target,
            },
        ))
    }

    fn bare(&self, token: &str) -> (EdgeKind, Tree) {
        if self.reference.is_match(token) {
            (
                EdgeKind::Arg,
                Tree::Reference {
                    name: token.to_string(),
                },
            )
        } else {
            (EdgeKind::Attr, Tree::Literal(Literal::classify(token)))
        }
    }
}

/// Matches an anchored terminal at the start of `input`.
fn terminal<'a>(pattern: &Regex, input: &'a str) -> IResult<&'a str, &'a str> {
    match pattern.find(input) {
        Some(m) if m.end() > 0 => Ok((&input[m.end()..], m.as_str())),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::RegexpMatch))),
    }
}
