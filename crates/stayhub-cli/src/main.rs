use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stayhub_application::AppContext;
use stayhub_application::telemetry::init_tracing;
use stayhub_core::config::ClientConfig;
use stayhub_infrastructure::ConfigService;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "stayhub")]
#[command(about = "Stayhub CLI - sign in and talk to the marketplace API", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/stayhub/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GraphQL endpoint override
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level, e.g. `debug` (RUST_LOG wins when set)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session on this device
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session and cache
    Logout,
    /// Show the signed-in profile
    Whoami {
        /// Ask the server instead of the stored profile
        #[arg(long)]
        remote: bool,
    },
    /// Run a GraphQL document from a file
    Query {
        file: PathBuf,
        /// Variables as a JSON object
        #[arg(long)]
        vars: Option<String>,
        /// Skip the cache read
        #[arg(long)]
        network_only: bool,
    },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop every cached result
    Clear,
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::new_default()?,
    };
    let mut config = service
        .load()
        .with_context(|| format!("Failed to load {}", service.path().display()))?;

    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log_level);

    let ctx = AppContext::bootstrap(config).await?;

    let outcome = match cli.command {
        Commands::Login { email, password } => commands::auth::login(&ctx, &email, &password).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami { remote } => commands::auth::whoami(&ctx, remote).await,
        Commands::Query {
            file,
            vars,
            network_only,
        } => commands::query::run(&ctx, &file, vars.as_deref(), network_only).await,
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(&ctx).await,
        },
    };

    ctx.shutdown().await?;
    outcome
}
