//! factcache — command-line front end for the verified-fact cache
//!
//! # Subcommands
//! - `init`                    — ensure the store's uniqueness constraint
//! - `verify <claim>`          — cached-or-verified truth of a claim
//! - `probe <claim>`           — read-only cache probe, never calls the verifier
//! - `show <claim> [--json]`   — print the stored Query fact
//! - `fingerprint <claim>`     — print the cache key
//! - `repl`                    — interactive verification loop

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use factcache_core::{create_store, create_verifier, fingerprint, FactCache, FactCacheConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

const REPL_PROMPT: &str = "Enter your query (or 'exit' to quit): ";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(author, version, about = "Verified-fact cache over a graph store", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "FACTCACHE_CONFIG", default_value = "factcache.toml")]
    config: String,

    /// Check store connectivity and exit
    #[arg(long)]
    health: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ensure the query_id uniqueness constraint exists
    Init,

    /// Verify a claim, using the cache when possible
    Verify {
        /// Claim text, verified exactly as given
        claim: String,
    },

    /// Look a claim up in the cache without verifying it
    Probe {
        /// Claim text
        claim: String,
    },

    /// Print the stored fact for a claim
    Show {
        /// Claim text
        claim: String,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cache key for a claim
    Fingerprint {
        /// Claim text
        claim: String,
    },

    /// Interactive loop: verify one claim per line until `exit`
    Repl,
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials may come from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Fingerprinting needs neither config nor store
    if let Some(Commands::Fingerprint { claim }) = &cli.command {
        println!("{}", fingerprint(claim));
        return Ok(());
    }

    let config_path = shellexpand::tilde(&cli.config).into_owned();
    let config = match FactCacheConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let store = match create_store(&config.store).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to fact store: {}", e);
            std::process::exit(1);
        }
    };

    if cli.health {
        match store.health_check().await {
            Ok(v) => println!("✅ {} connected: {}", store.name(), v),
            Err(e) => {
                println!("❌ {} health check failed: {}", store.name(), e);
                std::process::exit(1);
            }
        }
        store.close().await;
        return Ok(());
    }

    let verifier = create_verifier(&config.verifier)?;
    let cache = FactCache::new(store, verifier);

    let outcome = run_command(&cache, cli.command.unwrap_or(Commands::Repl)).await;
    cache.close().await;
    outcome
}

async fn run_command(cache: &FactCache, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => {
            cache.initialize().await?;
            println!("✅ Query fact constraint ensured");
        }
        Commands::Verify { claim } => {
            cache.initialize().await?;
            let resolution = cache.resolve(&claim).await?;
            tracing::debug!(?resolution, "Claim resolved");
            println!("{}", resolution.is_true());
        }
        Commands::Probe { claim } => {
            let answer = match cache.lookup_truth_only(&claim).await? {
                Some(is_true) => is_true.to_string(),
                None => "unknown".to_string(),
            };
            println!("{}", answer);
        }
        Commands::Show { claim, json } => match cache.fact(&claim).await? {
            Some(fact) if json => println!("{}", serde_json::to_string_pretty(&fact)?),
            Some(fact) => {
                println!("query_id:   {}", fact.query_id);
                println!("text:       {}", fact.text);
                println!("is_true:    {}", fact.is_true);
                println!("confidence: {:.3}", fact.confidence);
                println!("timestamp:  {}", fact.timestamp.to_rfc3339());
            }
            None => anyhow::bail!("No stored fact for {}", fingerprint(&claim)),
        },
        Commands::Repl => {
            cache.initialize().await?;
            run_repl(cache).await?;
        }
        Commands::Fingerprint { claim } => println!("{}", fingerprint(&claim)),
    }
    Ok(())
}

/// Read claims from stdin until `exit` or EOF. A failed claim is reported and
/// the loop continues.
async fn run_repl(cache: &FactCache) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", REPL_PROMPT);
        io::stdout().flush()?;

        let Some(claim) = lines.next_line().await? else {
            break;
        };
        if claim.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        match cache.verify(&claim).await {
            Ok(is_true) => println!("\nVerification Result: {}\n", is_true),
            Err(e) => {
                tracing::error!(error = %e, "Verification failed");
                println!("\nVerification failed: {}\n", e);
            }
        }
    }

    Ok(())
}
