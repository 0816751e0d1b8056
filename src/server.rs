//! JSON-RPC service entry point.
//!
//! Serves the analysis operation and a health check over stdio, one
//! JSON-RPC 2.0 frame per line. Analysis failures are reported inside the
//! result payload as error-status module results; only malformed frames and
//! bad parameters surface as JSON-RPC errors.

use crate::analyzer::{run_modules, AnalysisOptions, MODULES};
use crate::error::Result;
use crate::model::Container;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use tracing::{info, warn};

const FALLBACK_RESPONSE: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#;

#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, value: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(value),
            error: None,
        }
    }

    fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    container: Value,
    #[serde(default)]
    modules: Vec<String>,
    #[serde(default)]
    options: AnalysisOptions,
}

pub struct RpcServer;

impl RpcServer {
    pub fn new() -> Self {
        Self
    }

    /// Serve requests from stdin until EOF or a `shutdown` request.
    pub fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let reader = BufReader::new(stdin.lock());

        info!("gtm-audit analysis server started");

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("error reading input: {}", e);
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError {
                            code: -32700,
                            message: format!("Parse error: {}", e),
                            data: None,
                        },
                    );
                    write_response(&mut stdout, &response);
                    continue;
                }
            };

            let stop = request.method == "shutdown";
            let response = self.handle_request(request);
            write_response(&mut stdout, &response);

            if stop {
                info!("analysis server shutting down");
                break;
            }
        }

        Ok(())
    }

    fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = match request.method.as_str() {
            "analyze" => self.handle_analyze(&request.params),
            "health" => self.handle_health(),
            "shutdown" => Ok(json!({})),
            _ => Err(JsonRpcError {
                code: -32601,
                message: format!("Method not found: {}", request.method),
                data: None,
            }),
        };

        match result {
            Ok(value) => JsonRpcResponse::result(request.id, value),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }

    fn handle_analyze(&self, params: &Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params = params
            .as_ref()
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;

        let params: AnalyzeParams = serde_json::from_value(params.clone())
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;

        for name in &params.modules {
            if !MODULES.contains(&name.as_str()) {
                return Err(JsonRpcError::invalid_params(format!(
                    "Unknown analysis module: {}",
                    name
                )));
            }
        }

        let results = match Container::from_export(params.container) {
            Ok(container) => {
                info!(
                    "analyze request: {} elements, modules={:?}",
                    container.element_count(),
                    if params.modules.is_empty() {
                        MODULES.to_vec()
                    } else {
                        params.modules.iter().map(String::as_str).collect()
                    }
                );
                run_modules(&container, &params.modules, &params.options)
                    .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?
            }
            // A bad container is an analysis failure, not a transport fault:
            // every requested module reports an error result.
            Err(e) => {
                warn!("failed to parse container payload: {}", e);
                let message = format!("Failed to parse request data: {}", e);
                let selected: Vec<&str> = if params.modules.is_empty() {
                    MODULES.to_vec()
                } else {
                    params.modules.iter().map(String::as_str).collect()
                };
                selected
                    .into_iter()
                    .map(|module| crate::aggregator::ModuleResult::error(message.clone(), module))
                    .collect()
            }
        };

        Ok(json!({ "results": results }))
    }

    fn handle_health(&self) -> std::result::Result<Value, JsonRpcError> {
        Ok(json!({
            "status": "serving",
            "message": "GTM analysis service is healthy",
            "service": "gtm-audit",
            "version": env!("CARGO_PKG_VERSION"),
            "modules": MODULES,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_response(stdout: &mut std::io::Stdout, response: &JsonRpcResponse) {
    let encoded =
        serde_json::to_string(response).unwrap_or_else(|_| FALLBACK_RESPONSE.to_string());
    let _ = writeln!(stdout, "{}", encoded);
    let _ = stdout.flush();
}
