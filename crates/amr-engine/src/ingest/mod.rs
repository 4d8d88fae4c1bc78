use crate::builder::build;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::grammar::Grammar;
use crate::graph::Graph;
use crate::linear::Linearizer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

pub mod extractor;
pub mod processor;

use extractor::{Extractor, PersonRelationExtractor};
use processor::{split_blocks, Block};

/// A block of a dump that parsed into a graph.
#[derive(Debug, Clone)]
pub struct ParsedBlock {
    pub sentence: String,
    pub graph: Graph,
}

#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
}

/// One extracted person relation, ready to be sent for generation.
#[derive(Debug, Clone, Serialize)]
pub struct RelationRecord {
    pub sentence: String,
    /// Linearized relation.
    pub amr: String,
    /// Indented rendering for reports.
    pub tree: String,
    pub provenance: Provenance,
}

impl RelationRecord {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest::new(self.amr.clone())
    }
}

/// Reads parser dumps and turns them into graphs and relation records.
pub struct IngestionEngine {
    grammar: Arc<Grammar>,
    linearizer: Linearizer,
}

impl IngestionEngine {
    pub fn new(grammar: Arc<Grammar>, linearizer: Linearizer) -> Self {
        Self {
            grammar,
            linearizer,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.grammar()?, config.linearizer.clone()))
    }

    pub fn linearizer(&self) -> &Linearizer {
        &self.linearizer
    }

    /// Parses and builds a single AMR. Any failure is returned to the caller.
    pub fn parse_graph(&self, text: &str, dual_invert: bool) -> Result<Graph> {
        let tree = self.grammar.parse(text)?;
        build(&tree, dual_invert)
    }

    /// Every block of `content` with its own parse outcome.
    pub fn blocks(&self, content: &str, dual_invert: bool) -> Vec<(Block, Result<Graph>)> {
        split_blocks(content)
            .into_iter()
            .map(|block| {
                let graph = self.parse_graph(&block.text, dual_invert);
                (block, graph)
            })
            .collect()
    }

    /// Parses every block of a dump, skipping the ones that fail.
    pub fn parse_document(&self, content: &str, dual_invert: bool) -> Vec<ParsedBlock> {
        self.blocks(content, dual_invert)
            .into_iter()
            .filter_map(|(block, graph)| match graph {
                Ok(graph) => Some(ParsedBlock {
                    sentence: block.sentence,
                    graph,
                }),
                Err(e) => {
                    tracing::warn!(line = block.line, error = %e, "skipping AMR block");
                    None
                }
            })
            .collect()
    }

    pub async fn ingest_file(&self, path: &Path, dual_invert: bool) -> Result<Vec<ParsedBlock>> {
        let content = tokio::fs::read_to_string(path).await?;
        let parsed = self.parse_document(&content, dual_invert);
        tracing::info!(path = %path.display(), graphs = parsed.len(), "ingested AMR dump");
        Ok(parsed)
    }

    /// Person relations of every block in `content`, in block order.
    pub fn extract_relations(&self, content: &str, source: &str) -> Vec<RelationRecord> {
        let extractor = PersonRelationExtractor;
        let timestamp = Utc::now();
        let mut records = Vec::new();

        for block in self.parse_document(content, true) {
            for relation in extractor.extract(&block.graph) {
                let Some(root) = relation.root() else {
                    continue;
                };
                records.push(RelationRecord {
                    sentence: block.sentence.clone(),
                    amr: self.linearizer.render(&relation, root),
                    tree: relation.pretty_tree(root),
                    provenance: Provenance {
                        source: source.to_string(),
                        timestamp,
                        method: "person_relation".to_string(),
                    },
                });
            }
        }
        records
    }

    /// Sends the records' AMR to `generator` as one batch and pairs each
    /// record with its text.
    pub async fn generate_texts<G>(
        &self,
        records: Vec<RelationRecord>,
        generator: &G,
    ) -> Result<Vec<(RelationRecord, String)>>
    where
        G: TextGenerator + ?Sized,
    {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let amrs: Vec<String> = records.iter().map(|r| r.amr.clone()).collect();
        let texts = generator.generate(&amrs).await?;
        if texts.len() != records.len() {
            return Err(Error::Generation(format!(
                "expected {} texts, got {}",
                records.len(),
                texts.len()
            )));
        }
        Ok(records.into_iter().zip(texts).collect())
    }
}
