use amr_core::config::Config;
use amr_core::generation::{write_jsonl, GenerationRequest};
use amr_core::ingest::IngestionEngine;
use amr_core::mcp::McpServer;
use amr_core::mcp_stdio::run_mcp_stdio;
use amr_core::simplify::simplify;
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: amr (parse | simplify | extract [--report]) <file>\n       amr --mcp";

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries data and JSON-RPC, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env();
    let engine = Arc::new(
        IngestionEngine::from_config(&config).context("failed to load AMR grammar")?,
    );

    if args.iter().any(|a| a == "--mcp") {
        tracing::info!("starting AMR MCP server (stdio mode)");
        return run_mcp_stdio(Arc::new(McpServer::new(engine))).await;
    }

    let report = args.iter().any(|a| a == "--report");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    let (command, path) = match positional.as_slice() {
        [command, path] => (*command, PathBuf::from(path)),
        _ => bail!(USAGE),
    };

    match command {
        "parse" | "simplify" => {
            let parsed = engine
                .ingest_file(&path, false)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut out = std::io::stdout().lock();
            for block in parsed {
                let graph = if command == "simplify" {
                    simplify(&block.graph)
                } else {
                    block.graph
                };
                serde_json::to_writer(&mut out, &json!({ "sentence": block.sentence, "graph": graph }))?;
                writeln!(out)?;
            }
        }
        "extract" => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let records = engine.extract_relations(&content, &path.display().to_string());
            let mut out = std::io::stdout().lock();
            if report {
                let mut sentence = None;
                for record in &records {
                    if sentence != Some(&record.sentence) {
                        writeln!(out, "# ::snt {}", record.sentence)?;
                        sentence = Some(&record.sentence);
                    }
                    writeln!(out, "{}", record.tree)?;
                }
            } else {
                let requests: Vec<GenerationRequest> = records.iter().map(|r| r.request()).collect();
                write_jsonl(&mut out, &requests)?;
            }
            tracing::info!(relations = records.len(), "extracted person relations");
        }
        other => bail!("unknown command {}\n{}", other, USAGE),
    }

    Ok(())
}
