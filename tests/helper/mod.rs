//! Shared helpers for E2E tests
//!
//! `FakeClient` plays the editor side of the socket: it answers server to
//! client requests (`workspace/configuration`, `workspace/applyEdit`,
//! `client/registerCapability`) and forwards every message it sees to the
//! test through a channel.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower_lsp::ClientSocket;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::lsp_types::{PublishDiagnosticsParams, Url};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding that a message will not arrive
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct FakeClient {
    settings: Arc<Mutex<Value>>,
    apply_edits: bool,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            settings: Arc::new(Mutex::new(json!({}))),
            apply_edits: true,
        }
    }

    /// Value returned for every `workspace/configuration` item
    pub fn with_settings(self, settings: Value) -> Self {
        self.set_settings(settings);
        self
    }

    /// Answers `workspace/applyEdit` with `applied: false`
    pub fn rejecting_edits(mut self) -> Self {
        self.apply_edits = false;
        self
    }

    pub fn set_settings(&self, settings: Value) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn spawn(&self, socket: ClientSocket) -> mpsc::UnboundedReceiver<Request> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.clone();

        tokio::spawn(async move {
            let (mut requests, mut responses) = socket.split();
            while let Some(request) = requests.next().await {
                if let Some(id) = request.id().cloned() {
                    let response = Response::from_ok(id, client.respond(&request));
                    if responses.send(response).await.is_err() {
                        break;
                    }
                }
                let _ = tx.send(request);
            }
        });

        rx
    }

    fn respond(&self, request: &Request) -> Value {
        match request.method() {
            "workspace/configuration" => {
                let items = request
                    .params()
                    .and_then(|params| params.get("items"))
                    .and_then(Value::as_array)
                    .map_or(1, Vec::len);
                let settings = self.settings.lock().unwrap().clone();
                Value::Array(vec![settings; items])
            }
            "workspace/applyEdit" if self.apply_edits => json!({ "applied": true }),
            "workspace/applyEdit" => json!({
                "applied": false,
                "failureReason": "rejected by test client"
            }),
            _ => Value::Null,
        }
    }
}

/// Waits for the next message with `method`, skipping everything else
pub async fn wait_for_message(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
) -> Option<Request> {
    wait_with_timeout(rx, method, WAIT_TIMEOUT).await
}

/// Returns true when no message with `method` arrives within [`QUIET_PERIOD`]
pub async fn stays_quiet(rx: &mut mpsc::UnboundedReceiver<Request>, method: &str) -> bool {
    wait_with_timeout(rx, method, QUIET_PERIOD).await.is_none()
}

async fn wait_with_timeout(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
    timeout: Duration,
) -> Option<Request> {
    tokio::time::timeout(timeout, async {
        while let Some(request) = rx.recv().await {
            if request.method() == method {
                return Some(request);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

pub async fn wait_for_diagnostics(
    rx: &mut mpsc::UnboundedReceiver<Request>,
) -> PublishDiagnosticsParams {
    let notification = wait_for_message(rx, "textDocument/publishDiagnostics")
        .await
        .expect("Expected publishDiagnostics notification");
    serde_json::from_value(notification.params().unwrap().clone()).unwrap()
}

pub fn test_uri(name: &str) -> Url {
    Url::parse(&format!("file:///test/{}", name)).unwrap()
}

/// Capabilities of a client supporting scoped configuration and related
/// diagnostic information
pub fn full_capabilities() -> Value {
    json!({
        "workspace": {
            "configuration": true,
            "workspaceFolders": true
        },
        "textDocument": {
            "publishDiagnostics": { "relatedInformation": true }
        }
    })
}

/// Capabilities of a client without configuration support
pub fn minimal_capabilities() -> Value {
    json!({})
}

pub fn create_initialize_request(id: i64, capabilities: Value) -> Request {
    Request::build("initialize")
        .params(json!({ "capabilities": capabilities }))
        .id(id)
        .finish()
}

pub fn create_initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

pub fn create_did_open_notification(uri: &Url, text: &str, version: i32) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "plaintext",
                "version": version,
                "text": text
            }
        }))
        .finish()
}

pub fn create_did_change_notification(uri: &Url, version: i32, changes: Value) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": { "uri": uri, "version": version },
            "contentChanges": changes
        }))
        .finish()
}

pub fn create_did_close_notification(uri: &Url) -> Request {
    Request::build("textDocument/didClose")
        .params(json!({ "textDocument": { "uri": uri } }))
        .finish()
}

pub fn create_did_change_configuration_notification(settings: Value) -> Request {
    Request::build("workspace/didChangeConfiguration")
        .params(json!({ "settings": settings }))
        .finish()
}

pub fn create_code_action_request(
    id: i64,
    uri: &Url,
    range: Value,
    diagnostics: Value,
    only: Option<Vec<&str>>,
) -> Request {
    let mut context = json!({ "diagnostics": diagnostics });
    if let Some(only) = only {
        context["only"] = json!(only);
    }

    Request::build("textDocument/codeAction")
        .params(json!({
            "textDocument": { "uri": uri },
            "range": range,
            "context": context
        }))
        .id(id)
        .finish()
}

pub fn create_formatting_request(id: i64, uri: &Url) -> Request {
    Request::build("textDocument/formatting")
        .params(json!({
            "textDocument": { "uri": uri },
            "options": { "tabSize": 4, "insertSpaces": true }
        }))
        .id(id)
        .finish()
}

pub fn create_execute_command_request(id: i64, command: &str, arguments: Value) -> Request {
    Request::build("workspace/executeCommand")
        .params(json!({ "command": command, "arguments": arguments }))
        .id(id)
        .finish()
}

pub fn range(start: (u32, u32), end: (u32, u32)) -> Value {
    json!({
        "start": { "line": start.0, "character": start.1 },
        "end": { "line": end.0, "character": end.1 }
    })
}
