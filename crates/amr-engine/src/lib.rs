//! Parsing and transformation of Abstract Meaning Representation graphs.
//!
//! PENMAN text is parsed by [`grammar::Grammar`] into a [`tree::Tree`],
//! flattened by [`builder::build`] into a [`graph::Graph`], and from there
//! simplified ([`simplify::simplify`]), mined for person relations
//! ([`ingest::extractor::PersonRelationExtractor`]) or linearized for a
//! graph-to-text model ([`linear::Linearizer`]).

pub mod builder;
pub mod config;
pub mod error;
pub mod generation;
pub mod grammar;
pub mod graph;
pub mod ingest;
pub mod linear;
pub mod mcp;
pub mod mcp_stdio;
pub mod mcp_types;
pub mod simplify;
pub mod tree;

pub use error::{Error, Result};
pub use graph::{Graph, Node, NodeId, Value};
