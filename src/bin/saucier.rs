//! saucier: command-line front end.
//!
//! Runs recipe searches through the same cache/provider stack the service
//! uses. Mostly useful for trying prompts and configuration by hand.

use clap::{Parser, Subcommand};

use saucier::{Config, Saucier, SaucierError};

/// Saucier CLI
#[derive(Parser)]
#[command(name = "saucier")]
#[command(version = saucier::PKG_VERSION)]
#[command(about = "Stampede-safe recipe generation")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate (or look up) a recipe
    Search {
        /// Ingredient to use (repeatable)
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        /// Dietary restriction (repeatable)
        #[arg(short, long = "restriction")]
        restrictions: Vec<String>,
        /// API key (defaults to the ANTHROPIC_API_KEY environment variable)
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Run the search twice to show the cached result
        #[arg(long)]
        repeat: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Search {
            ingredients,
            restrictions,
            api_key,
            repeat,
        } => {
            let api_key = api_key.or_else(Config::api_key).ok_or_else(|| {
                SaucierError::Configuration(format!(
                    "no API key: pass --api-key or set {}",
                    saucier::config::API_KEY_ENV_VAR
                ))
            })?;

            let orchestrator = Saucier::builder()
                .provider_config(config.provider_config())
                .cache(config.cache_config())
                .anthropic(api_key)
                .build()?;

            let runs = if repeat { 2 } else { 1 };
            for _ in 0..runs {
                let recipe = orchestrator.search(&ingredients, &restrictions).await?;
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            }
        }
    }

    Ok(())
}
