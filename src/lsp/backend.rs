use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use futures::future::BoxFuture;
use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::document::{DocumentError, DocumentStore};
use crate::lsp::code_action::generate_quick_fixes;
use crate::lsp::command::{REVERSE_COMMAND, ReverseRequest, execute_reverse};
use crate::lsp::completion::{completion_items, resolve_completion};
use crate::lsp::diagnostics::generate_diagnostics;
use crate::lsp::edit::{ClientEditSink, EditSink};
use crate::lsp::error::CommandError;
use crate::lsp::formatting::format_document;
use crate::lsp::publisher::{DiagnosticPublisher, Ticket};
use crate::settings::{ClientSettingsSource, Settings, SettingsCache, SettingsSource};
use crate::sync::lock;

/// Client capabilities that change server behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientFlags {
    pub configuration: bool,
    pub workspace_folders: bool,
    pub related_information: bool,
}

impl ClientFlags {
    pub fn from_capabilities(capabilities: &ClientCapabilities) -> Self {
        let workspace = capabilities.workspace.as_ref();
        Self {
            configuration: workspace.and_then(|w| w.configuration).unwrap_or(false),
            workspace_folders: workspace
                .and_then(|w| w.workspace_folders)
                .unwrap_or(false),
            related_information: capabilities
                .text_document
                .as_ref()
                .and_then(|t| t.publish_diagnostics.as_ref())
                .and_then(|p| p.related_information)
                .unwrap_or(false),
        }
    }
}

pub struct Backend {
    client: Client,
    documents: Arc<Mutex<DocumentStore>>,
    settings: SettingsCache,
    publisher: Arc<DiagnosticPublisher>,
    edits: Arc<dyn EditSink>,
    flags: RwLock<ClientFlags>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let settings = Arc::new(ClientSettingsSource::new(client.clone()));
        let edits = Arc::new(ClientEditSink::new(client.clone()));
        Self::build(client, settings, edits)
    }

    /// Creates a backend with explicit settings and edit boundaries
    pub fn build(
        client: Client,
        settings: Arc<dyn SettingsSource>,
        edits: Arc<dyn EditSink>,
    ) -> Self {
        Self {
            client,
            documents: Arc::new(Mutex::new(DocumentStore::new())),
            settings: SettingsCache::new(settings),
            publisher: Arc::new(DiagnosticPublisher::new()),
            edits,
            flags: RwLock::new(ClientFlags::default()),
        }
    }

    pub fn server_capabilities(flags: ClientFlags) -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..Default::default()
                },
            )),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(true),
                ..Default::default()
            }),
            code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
            document_formatting_provider: Some(OneOf::Left(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![REVERSE_COMMAND.to_string()],
                ..Default::default()
            }),
            workspace: flags
                .workspace_folders
                .then(|| WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: None,
                    }),
                    file_operations: None,
                }),
            ..Default::default()
        }
    }

    /// Version of an open document, if any
    pub fn document_version(&self, uri: &Url) -> Option<i32> {
        self.documents().get(uri).ok().map(|d| d.version())
    }

    /// Number of cached per-document settings entries
    pub fn cached_settings_count(&self) -> usize {
        self.settings.len()
    }

    fn documents(&self) -> MutexGuard<'_, DocumentStore> {
        lock(&self.documents)
    }

    fn flags(&self) -> ClientFlags {
        *self.flags.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts a diagnostic pass for `uri`.
    ///
    /// The ticket and the settings cache entry are taken here, synchronously.
    /// Waiting for settings, scanning and publishing run on a spawned task,
    /// so a settings fetch that never answers holds no handler slot.
    fn schedule_diagnostics(&self, uri: &Url) {
        let Some(version) = self.document_version(uri) else {
            return;
        };

        let pass = DiagnosticPass {
            ticket: self.publisher.issue(uri, version),
            settings: self.settings.request(uri),
            related_information: self.flags().related_information,
            client: self.client.clone(),
            documents: Arc::clone(&self.documents),
            publisher: Arc::clone(&self.publisher),
        };
        tokio::spawn(pass.run());
    }

    fn schedule_all_diagnostics(&self) {
        let uris = self.documents().uris();
        info!("Revalidating {} open documents", uris.len());
        for uri in &uris {
            self.schedule_diagnostics(uri);
        }
    }

    async fn register_configuration_change(&self) {
        let registration = Registration {
            id: "workspace/didChangeConfiguration".to_string(),
            method: "workspace/didChangeConfiguration".to_string(),
            register_options: None,
        };

        if let Err(e) = self.client.register_capability(vec![registration]).await {
            error!("Failed to register for configuration changes: {}", e);
        }
    }
}

/// One diagnostic computation, detached from the handler that started it
struct DiagnosticPass {
    ticket: Ticket,
    settings: BoxFuture<'static, Settings>,
    related_information: bool,
    client: Client,
    documents: Arc<Mutex<DocumentStore>>,
    publisher: Arc<DiagnosticPublisher>,
}

impl DiagnosticPass {
    /// Awaits settings, then publishes unless the document moved on, closed,
    /// or a newer pass was started meanwhile.
    async fn run(self) {
        let DiagnosticPass {
            ticket,
            settings,
            related_information,
            client,
            documents,
            publisher,
        } = self;
        let uri = ticket.uri().clone();

        let settings = settings.await;

        let diagnostics = {
            let documents = lock(&documents);
            let Ok(document) = documents.get(&uri) else {
                debug!("{} closed before diagnostics completed", uri);
                return;
            };
            if document.version() != ticket.version() || !publisher.is_current(&ticket) {
                debug!(
                    "Skipping stale diagnostics for {} at version {}",
                    uri,
                    ticket.version()
                );
                return;
            }
            generate_diagnostics(document, &settings, related_information)
        };

        let count = diagnostics.len();
        let published = publisher
            .publish(ticket, diagnostics, |uri, diagnostics, version| {
                client.publish_diagnostics(uri, diagnostics, Some(version))
            })
            .await;

        if published {
            debug!("Published {} diagnostics for {}", count, uri);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let flags = ClientFlags::from_capabilities(&params.capabilities);
        info!("Client capabilities: {:?}", flags);

        *self.flags.write().unwrap_or_else(|e| e.into_inner()) = flags;
        self.settings.set_scoped(flags.configuration);

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(flags),
            server_info: Some(ServerInfo {
                name: "lsp-sample".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("LSP server initialized");
        if self.flags().configuration {
            self.register_configuration_change().await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("LSP server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, version, text, ..
        } = params.text_document;

        if let Err(e) = self.documents().open(uri.clone(), text, version) {
            warn!("Ignoring didOpen: {}", e);
            return;
        }
        info!("Document opened: {}", uri);

        self.schedule_diagnostics(&uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let result = self
            .documents()
            .apply_changes(&uri, version, params.content_changes)
            .map(|_| ());
        match result {
            Ok(()) => self.schedule_diagnostics(&uri),
            Err(e @ DocumentError::StaleVersion { .. }) => {
                warn!("Ignoring out-of-order change: {}", e);
            }
            Err(e) => warn!("Ignoring didChange: {}", e),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        if let Err(e) = self.documents().close(&uri) {
            warn!("Ignoring didClose: {}", e);
            return;
        }
        self.settings.evict(&uri);
        self.publisher.forget(&uri);
        info!("Document closed: {}", uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.settings.on_global_change(&params.settings);
        self.schedule_all_diagnostics();
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        info!(
            "Workspace folder change event received: {} added, {} removed",
            params.event.added.len(),
            params.event.removed.len()
        );
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        info!("Received {} watched file changes", params.changes.len());
    }

    async fn completion(&self, _params: CompletionParams) -> Result<Option<CompletionResponse>> {
        Ok(Some(CompletionResponse::Array(completion_items())))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(resolve_completion(item))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let documents = self.documents();
        let Ok(document) = documents.get(&params.text_document.uri) else {
            debug!("Code action for unknown document {}", params.text_document.uri);
            return Ok(Some(Vec::new()));
        };

        Ok(Some(generate_quick_fixes(document, &params.context)))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let documents = self.documents();
        let Ok(document) = documents.get(&params.text_document.uri) else {
            return Ok(None);
        };

        Ok(Some(format_document(document)))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let request = match ReverseRequest::from_params(&params) {
            Ok(request) => request,
            Err(e) => {
                warn!("Ignoring executeCommand: {}", e);
                return Ok(None);
            }
        };

        match execute_reverse(&self.documents, self.edits.as_ref(), &request).await {
            Ok(()) => {}
            Err(e @ CommandError::Edit(_)) => error!("Reverse command failed: {}", e),
            Err(e) => info!("Skipping reverse command: {}", e),
        }
        Ok(None)
    }
}
