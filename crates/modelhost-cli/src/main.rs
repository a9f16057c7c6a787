//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use modelhost_cli::handlers::{backend, serve};
use modelhost_cli::{Cli, Commands, bootstrap};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap()?;

    match command {
        Commands::Detect { backend, json } => {
            backend::detect(&ctx, backend, json).await?;
        }
        Commands::Install { backend } => {
            backend::install(&ctx, backend).await?;
        }
        Commands::Download { backend, model } => {
            backend::download(&ctx, backend, &model).await?;
        }
        Commands::Instructions { backend } => {
            backend::instructions(backend);
        }
        Commands::DefaultPort { name } => {
            backend::default_port(&name);
        }
        Commands::Serve {
            backend,
            model,
            port,
            ctx_size,
            gpu_layers,
        } => {
            let args = serve::ServeArgs {
                backend,
                model,
                port,
                ctx_size,
                gpu_layers,
            };
            serve::execute(&ctx, args).await?;
        }
    }

    Ok(())
}
