use crate::ingest::IngestionEngine;
use crate::linear::Linearizer;
use crate::mcp_types::Tool;
use crate::simplify::simplify;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Arguments of `parse_amr`.
#[derive(Debug, Deserialize)]
pub struct ParseParams {
    pub amr: String,
    #[serde(default)]
    pub dual_invert: bool,
}

/// Arguments of `simplify_amr`.
#[derive(Debug, Deserialize)]
pub struct SimplifyParams {
    pub amr: String,
}

/// Arguments of `extract_person_relations`.
#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    /// A parser dump, one or more blocks.
    pub content: String,
    pub source: Option<String>,
}

/// Arguments of `linearize_amr`.
#[derive(Debug, Deserialize)]
pub struct LinearizeParams {
    pub amr: String,
    /// Emit the `Ġ`-delimited model vocabulary instead of the configured form.
    #[serde(default)]
    pub bpe: bool,
}

/// Exposes the AMR engine as MCP tools.
pub struct McpServer {
    engine: Arc<IngestionEngine>,
}

impl McpServer {
    pub fn new(engine: Arc<IngestionEngine>) -> Self {
        Self { engine }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        let amr_only = json!({
            "type": "object",
            "properties": { "amr": { "type": "string" } },
            "required": ["amr"]
        });
        vec![
            Tool {
                name: "parse_amr".to_string(),
                description: "Parse one AMR in PENMAN notation into nodes and edges".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "amr": { "type": "string" },
                        "dual_invert": { "type": "boolean", "default": false }
                    },
                    "required": ["amr"]
                }),
            },
            Tool {
                name: "simplify_amr".to_string(),
                description: "Collapse name subtrees and drop wiki links".to_string(),
                input_schema: amr_only,
            },
            Tool {
                name: "extract_person_relations".to_string(),
                description: "Extract the relations named persons take part in from a parser dump"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "content": { "type": "string" },
                        "source": { "type": "string" }
                    },
                    "required": ["content"]
                }),
            },
            Tool {
                name: "linearize_amr".to_string(),
                description: "Render an AMR as single-line pointer notation".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "amr": { "type": "string" },
                        "bpe": { "type": "boolean", "default": false }
                    },
                    "required": ["amr"]
                }),
            },
        ]
    }

    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        match tool_name {
            "parse_amr" => self.parse_amr(parse_args(arguments)?),
            "simplify_amr" => self.simplify_amr(parse_args(arguments)?),
            "extract_person_relations" => self.extract_person_relations(parse_args(arguments)?),
            "linearize_amr" => self.linearize_amr(parse_args(arguments)?),
            _ => Err(format!("Tool not found: {}", tool_name)),
        }
    }

    fn parse_amr(&self, params: ParseParams) -> Result<serde_json::Value, String> {
        let graph = self
            .engine
            .parse_graph(&params.amr, params.dual_invert)
            .map_err(|e| e.to_string())?;
        serde_json::to_value(&graph).map_err(|e| e.to_string())
    }

    fn simplify_amr(&self, params: SimplifyParams) -> Result<serde_json::Value, String> {
        let graph = self
            .engine
            .parse_graph(&params.amr, false)
            .map_err(|e| e.to_string())?;
        let simplified = simplify(&graph);
        let tree = simplified
            .root()
            .map(|root| simplified.pretty_tree(root))
            .unwrap_or_default();
        Ok(json!({ "graph": simplified, "tree": tree }))
    }

    fn extract_person_relations(&self, params: ExtractParams) -> Result<serde_json::Value, String> {
        let source = params.source.as_deref().unwrap_or("mcp");
        let records = self.engine.extract_relations(&params.content, source);
        serde_json::to_value(&records).map_err(|e| e.to_string())
    }

    fn linearize_amr(&self, params: LinearizeParams) -> Result<serde_json::Value, String> {
        let graph = self
            .engine
            .parse_graph(&params.amr, false)
            .map_err(|e| e.to_string())?;
        let bpe;
        let linearizer = if params.bpe {
            bpe = Linearizer::default();
            &bpe
        } else {
            self.engine.linearizer()
        };
        Ok(json!(linearizer.render_root(&graph)))
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn server() -> McpServer {
        let engine = IngestionEngine::new(Grammar::shared().unwrap(), Linearizer::plain());
        McpServer::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_list_tools() {
        let names: Vec<String> = server().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["parse_amr", "simplify_amr", "extract_person_relations", "linearize_amr"]
        );
    }

    #[tokio::test]
    async fn test_parse_amr_tool() {
        let result = server()
            .call_tool("parse_amr", json!({ "amr": "(z0 / city :location-of (z1 / station))" }))
            .await
            .unwrap();
        assert_eq!(result["edges"][0]["relationship"], "location");
        assert_eq!(result["edges"][0]["var1"], "z1");
    }

    #[tokio::test]
    async fn test_simplify_amr_tool() {
        let result = server()
            .call_tool(
                "simplify_amr",
                json!({ "amr": "(z0 / company :wiki \"Google\" :name (z1 / name :op1 \"Google\" :op2 \"Inc\"))" }),
            )
            .await
            .unwrap();
        assert_eq!(result["graph"]["nodes"][1]["value"], "Google Inc");
        assert_eq!(result["tree"], "[z0 / company]\n--> name\n        Google Inc\n");
    }

    #[tokio::test]
    async fn test_linearize_amr_tool() {
        let server = server();
        let plain = server
            .call_tool("linearize_amr", json!({ "amr": "(z0 / rain-01)" }))
            .await
            .unwrap();
        assert_eq!(plain, " (  <pointer:0>  rain-01  )");
        let bpe = server
            .call_tool("linearize_amr", json!({ "amr": "(z0 / rain-01)", "bpe": true }))
            .await
            .unwrap();
        assert_eq!(bpe, "\u{0120}( \u{0120}<pointer:0> \u{0120}rain-01 \u{0120})");
    }

    #[tokio::test]
    async fn test_errors_are_reported() {
        let server = server();
        let err = server
            .call_tool("parse_amr", json!({ "amr": "(z0 / a" }))
            .await
            .unwrap_err();
        assert!(err.contains("failed to parse AMR"));
        assert!(server.call_tool("parse_amr", json!({})).await.unwrap_err().starts_with("Invalid arguments"));
        assert!(server.call_tool("query_graph", json!({})).await.is_err());
    }
}
