use clap::Parser;
use docstore::cli::{Cli, Commands};
use docstore::types::config::Config;
use docstore::DocstoreResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> DocstoreResult<()> {
    let cli = Cli::parse();

    // A broken configuration file is fatal before anything else runs
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("docstore={}", log_level)
            .parse()
            .unwrap_or_else(|_| "docstore=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            docstore::cli::commands::init(path).await?;
        }
        Commands::Parse { query } => {
            docstore::cli::commands::parse(&query)?;
        }
        Commands::Inspect { query } => {
            docstore::cli::commands::inspect(&query, &config).await?;
        }
        Commands::Replay { input, no_cache } => {
            docstore::cli::commands::replay(&input, no_cache, &config).await?;
        }
        Commands::Config => {
            docstore::cli::commands::config_cmd(&config)?;
        }
        Commands::Version => {
            docstore::cli::commands::version();
        }
    }

    Ok(())
}
