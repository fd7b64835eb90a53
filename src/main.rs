//! Ward - main entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ward::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Pipeline output goes through the event bus; tracing is for diagnostics
    // and stays quiet unless WARD_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli::run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("[error] {error:#}");
            cli::exit_codes::FAILURE
        }
    };
    std::process::exit(code);
}
