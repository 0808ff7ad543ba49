//! respond Plugin SDK — lets a chat host drive a message plugin over stdio.
//!
//! The host writes NDJSON JSON-RPC 2.0 requests on the plugin's stdin and
//! reads responses from its stdout, one JSON object per line.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use respond_plugin_sdk::{InitializeParams, MessagePlugin, run_plugin};
//! use respond_types::{InboundMessage, OutboundMessage, PluginStatus};
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl MessagePlugin for Echo {
//!     fn name(&self) -> &str { "echo" }
//!
//!     async fn initialize(&mut self, _params: &InitializeParams) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn on_message(&self, msg: InboundMessage) -> anyhow::Result<Vec<OutboundMessage>> {
//!         Ok(vec![OutboundMessage::send(&msg, msg.text.clone())])
//!     }
//!
//!     fn status(&self) -> PluginStatus { PluginStatus::Running }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_plugin(Echo).await
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub use respond_types::{InboundMessage, OutboundMessage, PluginStatus};

const PARSE_ERROR: i64 = -32700;
const INTERNAL_ERROR: i64 = -32603;

// ──────────────────── JSON-RPC types ────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcMessage {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<u64>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<u64>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

/// Parameters of the `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    /// Name the robot is addressed by in the host's rooms.
    pub robot_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot_alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InitializeResult {
    plugin: String,
    version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageParams {
    message: InboundMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResult {
    replies: Vec<OutboundMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatusResult {
    status: PluginStatus,
}

// ──────────────────── Plugin trait ────────────────────

/// A plugin that listens to chat messages and may answer them.
///
/// Implement this trait and pass it to [`run_plugin`].
#[async_trait::async_trait]
pub trait MessagePlugin: Send + Sync + 'static {
    /// Plugin identifier reported to the host.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Called once before any message is delivered.
    async fn initialize(&mut self, params: &InitializeParams) -> anyhow::Result<()>;

    /// Handle one message heard in a room; returns the messages to post.
    async fn on_message(&self, message: InboundMessage) -> anyhow::Result<Vec<OutboundMessage>>;

    fn status(&self) -> PluginStatus;

    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

// ──────────────────── Main loop ────────────────────

/// Run the plugin on stdin/stdout until stdin closes or `shutdown` is received.
pub async fn run_plugin(plugin: impl MessagePlugin) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(plugin, stdin, stdout).await
}

/// Run the plugin loop over arbitrary line-oriented streams.
pub async fn serve<R, W>(
    mut plugin: impl MessagePlugin,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let msg: JsonRpcMessage = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Unparseable request: {e}");
                let resp = JsonRpcResponse::err(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_line(&mut writer, &resp).await?;
                continue;
            }
        };

        let result = handle_request(&mut plugin, &msg).await;

        if let Some(req_id) = msg.id {
            let resp = match result {
                Ok(value) => JsonRpcResponse::ok(Some(req_id), value),
                Err(e) => {
                    tracing::error!(method = %msg.method, "Request failed: {e:#}");
                    JsonRpcResponse::err(Some(req_id), INTERNAL_ERROR, e.to_string())
                }
            };
            write_line(&mut writer, &resp).await?;
        }

        if msg.method == "shutdown" {
            break;
        }
    }

    Ok(())
}

/// Write a JSON-RPC message as a single NDJSON line.
async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &impl Serialize,
) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn parse_params<T: serde::de::DeserializeOwned>(msg: &JsonRpcMessage) -> anyhow::Result<T> {
    msg.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("Missing params for {}", msg.method))
}

async fn handle_request(
    plugin: &mut impl MessagePlugin,
    msg: &JsonRpcMessage,
) -> anyhow::Result<Value> {
    match msg.method.as_str() {
        "initialize" => {
            let params: InitializeParams = parse_params(msg)?;
            plugin.initialize(&params).await?;
            tracing::info!(robot = %params.robot_name, "Plugin initialized");

            Ok(serde_json::to_value(InitializeResult {
                plugin: plugin.name().to_string(),
                version: plugin.version().to_string(),
            })?)
        }
        "message" => {
            let params: MessageParams = parse_params(msg)?;
            let replies = plugin.on_message(params.message).await?;
            Ok(serde_json::to_value(MessageResult { replies })?)
        }
        "status" => Ok(serde_json::to_value(StatusResult {
            status: plugin.status(),
        })?),
        "shutdown" => {
            plugin.shutdown().await?;
            Ok(Value::Null)
        }
        other => anyhow::bail!("Unknown method: {other}"),
    }
}
