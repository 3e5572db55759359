use clap::Parser;

use lsp_sample::lsp::server::run_server;

/// Sample language server speaking LSP over stdio
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Communicate over stdin/stdout (the only supported transport)
    #[arg(long)]
    stdio: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !cli.stdio {
        eprintln!("lsp-sample: no transport given, using stdio");
    }
    run_server(&cli.log_level).await
}
