use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis::cli::{run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run_cli(&cli, &mut stdout.lock())
}
