//! Boundary to the graph-to-text model.
//!
//! The model itself runs elsewhere. This side only prepares its batch
//! payload (one JSON object per line) and defines the call contract.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One line of the generation batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Reference sentence; left empty for unseen relations.
    pub sent: String,
    /// Linearized AMR.
    pub amr: String,
}

impl GenerationRequest {
    pub fn new(amr: impl Into<String>) -> Self {
        Self {
            sent: String::new(),
            amr: amr.into(),
        }
    }
}

/// Turns linearized AMR into text. Must return exactly one text per input,
/// in input order.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, amrs: &[String]) -> Result<Vec<String>>;
}

/// Writes `requests` as JSON lines.
pub fn write_jsonl<W: Write>(mut writer: W, requests: &[GenerationRequest]) -> Result<()> {
    for request in requests {
        serde_json::to_writer(&mut writer, request)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
