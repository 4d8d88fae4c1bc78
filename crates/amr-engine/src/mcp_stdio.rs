use crate::mcp::McpServer;
use crate::mcp_types::{McpRequest, McpResponse, INVALID_PARAMS, METHOD_NOT_FOUND};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Serves JSON-RPC requests read line by line from stdin until it closes.
pub async fn run_mcp_stdio(server: Arc<McpServer>) -> anyhow::Result<()> {
    let mut reader = BufReader::new(stdin()).lines();
    let mut out = stdout();

    while let Some(line) = reader.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: McpRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed JSON-RPC line");
                continue;
            }
        };

        if let Some(response) = handle_request(&server, request).await {
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            out.write_all(&payload).await?;
            out.flush().await?;
        }
    }

    Ok(())
}

/// Answers one request. Notifications (no `id`) get no response.
pub async fn handle_request(server: &McpServer, request: McpRequest) -> Option<McpResponse> {
    let id = request.id.clone()?;
    tracing::debug!(method = %request.method, "JSON-RPC request");

    let response = match request.method.as_str() {
        "initialize" => McpResponse::result(
            Some(id),
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "amr-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),
        "tools/list" => McpResponse::result(Some(id), json!({ "tools": server.list_tools() })),
        "tools/call" => {
            let params = request.params.unwrap_or_default();
            let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
                return Some(McpResponse::error(Some(id), INVALID_PARAMS, "missing tool name"));
            };
            let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

            match server.call_tool(name, arguments).await {
                Ok(value) => {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    McpResponse::result(
                        Some(id),
                        json!({ "content": [{ "type": "text", "text": text }] }),
                    )
                }
                Err(message) if message.starts_with("Tool not found") => {
                    McpResponse::error(Some(id), METHOD_NOT_FOUND, message)
                }
                Err(message) => McpResponse::result(
                    Some(id),
                    json!({
                        "content": [{ "type": "text", "text": message }],
                        "isError": true
                    }),
                ),
            }
        }
        _ => McpResponse::result(Some(id), json!({})),
    };
    Some(response)
}
