//! gh-sourcing - metadata source resolution
//!
//! Usage:
//!   gh-sourcing resolve <URL>      # Download and extract the metadata source
//!   gh-sourcing handles <URL>      # Show which resolver claims a URL
//!   gh-sourcing providers          # List providers in consultation order
//!   gh-sourcing config list        # Show configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use gh_sourcing_core::config::{GITHUB_TOKEN, default_config_path};
use gh_sourcing_core::prelude::*;

#[derive(Parser)]
#[command(name = "gh-sourcing")]
#[command(about = "Resolve license metadata sources", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/gh-sourcing/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URL into a local metadata source
    Resolve {
        /// Repository or archive URL
        url: String,

        /// GitHub token (overrides github.token)
        #[arg(long)]
        token: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show which resolver would handle a URL
    Handles {
        /// Repository or archive URL
        url: String,
    },

    /// List registered providers in the order they are consulted
    Providers,

    /// Read and write configuration values
    Config(ConfigArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print a single value
    Get {
        /// Dotted key, e.g. github.token
        key: String,
    },

    /// Store a value in the configuration file
    Set {
        /// Dotted key, e.g. sourcing.cache_dir
        key: String,
        value: String,
    },

    /// Print all values, including environment overrides
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gh_sourcing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path().context("Unable to determine the config directory")?,
    };

    match cli.command {
        Commands::Resolve { url, token, format } => run_resolve(&config_path, &url, token, format),
        Commands::Handles { url } => run_handles(&config_path, &url),
        Commands::Providers => {
            run_providers();
            Ok(())
        }
        Commands::Config(args) => run_config(&config_path, args.command),
    }
}

fn load_config(path: &Path) -> Result<KeyedConfigurationStore> {
    let store = KeyedConfigurationStore::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(store.with_process_env())
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).with_context(|| format!("Invalid URL: {}", raw))
}

fn run_resolve(
    config_path: &Path,
    raw: &str,
    token: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let url = parse_url(raw)?;
    let mut config = load_config(config_path)?;
    if let Some(token) = token {
        config.set_string(GITHUB_TOKEN, &token);
    }

    let chain = ResolverRegistry::with_defaults().build();
    let source = chain
        .resolve(&url, &config)
        .with_context(|| format!("Failed to resolve {}", url))?;

    let Some(source) = source else {
        anyhow::bail!("No metadata source found for {}", url);
    };

    match format {
        OutputFormat::Table => print_source(&source),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&source)?),
    }

    Ok(())
}

fn print_source(source: &MetadataSource) {
    match source {
        MetadataSource::GitHub(github) => {
            println!("✓ {}/{}", github.username(), github.repository());
            println!("  {:<10} {}", "branch", github.branch());
            println!("  {:<10} {}", "commit", github.commit());
            if !github.tags().is_empty() {
                let tags: Vec<&str> = github.tags().iter().map(String::as_str).collect();
                println!("  {:<10} {}", "tags", tags.join(", "));
            }
        }
        MetadataSource::Archive(_) => println!("✓ archive"),
    }
    println!("  {:<10} {}", "path", source.path().display());
    println!("  {:<10} {}", "origin", source.origin());
}

fn run_handles(config_path: &Path, raw: &str) -> Result<()> {
    let url = parse_url(raw)?;
    let config = load_config(config_path)?;
    let chain = ResolverRegistry::with_defaults().build();

    match chain.resolver_for(&url, &config) {
        Some(name) => println!("{}", name),
        None => anyhow::bail!("No resolver handles {}", url),
    }

    Ok(())
}

fn run_providers() {
    let registry = ResolverRegistry::with_defaults();
    println!("{:<10} PRIORITY", "NAME");
    for provider in registry.providers() {
        println!("{:<10} {}", provider.name(), provider.priority());
    }
}

fn run_config(config_path: &Path, command: ConfigSubcommand) -> Result<()> {
    match command {
        ConfigSubcommand::Get { key } => {
            let config = load_config(config_path)?;
            match config.get(&key) {
                Some(value) => println!("{}", value),
                None => anyhow::bail!("Key '{}' is not set", key),
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Only persist what is in the file, never environment overrides
            let mut config = KeyedConfigurationStore::load(config_path)
                .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
            config.set_string(&key, &value);
            config
                .save(config_path)
                .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
            println!("✓ Set {}", key);
        }
        ConfigSubcommand::List => {
            let config = load_config(config_path)?;
            for (key, value) in config.iter() {
                let shown = if key == GITHUB_TOKEN {
                    "********".to_string()
                } else {
                    value.to_string()
                };
                println!("{} = {}", key, shown);
            }
        }
    }

    Ok(())
}
