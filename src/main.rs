use anyhow::Result;
use kpi_history::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // a missing .env is fine; flags and the real environment still apply
    let _ = dotenvy::dotenv();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    cli.execute()
}
