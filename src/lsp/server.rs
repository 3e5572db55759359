use crate::log::init;
use tower_lsp::{LspService, Server};
use tracing::info;

use crate::lsp::backend::Backend;

pub async fn run_server(log_level: &str) -> anyhow::Result<()> {
    let _guard = init(log_level)?;

    info!("Starting lsp-sample server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("lsp-sample server stopped");
    Ok(())
}
