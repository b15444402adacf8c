//! CLI entry point - the composition root.
//!
//! This is the only place where infrastructure is wired together, via
//! `speechbench_axum::bootstrap`. Command dispatch routes to handlers which
//! delegate to the bootstrapped context.

use clap::Parser;

use speechbench_cli::{Cli, Commands, handlers};
use speechbench_core::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            handlers::serve::execute(&settings, port).await?;
        }
        Commands::Run {
            mode,
            service,
            chain,
            vendors,
            input,
            texts,
            voice_id,
            language,
            poll_interval_ms,
        } => {
            let ctx = speechbench_axum::bootstrap(&settings).await?;
            let args = handlers::run::RunArgs {
                mode,
                service,
                chain,
                vendors,
                input,
                texts,
                voice_id,
                language,
                poll_interval_ms,
            };
            handlers::run::execute(&ctx, args).await?;
        }
    }

    Ok(())
}
