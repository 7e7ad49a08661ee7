//! # VSCTL CLI
//!
//! Command-line interface for operating on the vanishing secrets table.
//!
//! Configuration comes from the environment (and a `.env` file if present);
//! see `vanishing_secrets::config` for the variables.
//!
//! ## Usage
//!
//! ```bash
//! # Store a secret for 10 minutes under a generated id
//! vsctl create --payload-file secret.bin --ttl-secs 600
//!
//! # Redeem it (prints the record as JSON, payload base64-encoded)
//! vsctl fetch --id 6f1c...
//!
//! # Remove it without reading
//! vsctl delete --id 6f1c...
//! ```

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use vanishing_secrets::config::load_config;
use vanishing_secrets::observability::{init_tracing, metrics};
use vanishing_secrets::{CreateOutcome, DeleteOutcome, EncryptedSecret, FetchOutcome, SecretStore};

/// Vanishing secrets CLI
#[derive(Parser)]
#[command(name = "vsctl")]
#[command(about = "Store and redeem one-time secrets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// DynamoDB table (overrides SECRETS_TABLE_NAME)
    #[arg(short, long, global = true)]
    table: Option<String>,

    /// Print Prometheus metrics for this invocation to stderr when done
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new secret
    Create {
        /// Secret id (a random UUID is generated when omitted)
        #[arg(short, long)]
        id: Option<String>,

        #[command(flatten)]
        payload: PayloadSource,

        /// Seconds until the secret expires if never read
        #[arg(long, allow_negative_numbers = true)]
        ttl_secs: i64,
    },
    /// Read a secret once; later reads will not find it
    Fetch {
        #[arg(short, long)]
        id: String,

        /// Write only the raw payload bytes to stdout
        #[arg(long)]
        payload_only: bool,
    },
    /// Delete a secret without reading it
    Delete {
        #[arg(short, long)]
        id: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PayloadSource {
    /// Ciphertext given inline
    #[arg(long)]
    payload: Option<String>,

    /// File containing the ciphertext
    #[arg(long)]
    payload_file: Option<PathBuf>,
}

impl PayloadSource {
    fn read(self) -> Result<EncryptedSecret> {
        match (self.payload, self.payload_file) {
            (Some(inline), _) => Ok(EncryptedSecret::from(inline)),
            (None, Some(path)) => std::fs::read(&path)
                .map(EncryptedSecret::from)
                .with_context(|| format!("Failed to read payload file {}", path.display())),
            (None, None) => anyhow::bail!("either --payload or --payload-file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();
    metrics::register_metrics()?;

    let cli = Cli::parse();

    let mut config = load_config().context("Failed to load store configuration")?;
    if let Some(table) = cli.table {
        config.table_name = table;
    }

    let store = SecretStore::open(&config).await;

    let result = match cli.command {
        Commands::Create {
            id,
            payload,
            ttl_secs,
        } => create_command(&store, id, payload, ttl_secs).await,
        Commands::Fetch { id, payload_only } => fetch_command(&store, &id, payload_only).await,
        Commands::Delete { id } => delete_command(&store, &id).await,
    };

    store.close();

    if cli.print_metrics {
        eprintln!("{}", metrics::render_metrics()?);
    }

    result
}

type DynamoStore = SecretStore<vanishing_secrets::DynamoDbBackend>;

async fn create_command(
    store: &DynamoStore,
    id: Option<String>,
    payload: PayloadSource,
    ttl_secs: i64,
) -> Result<()> {
    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let ttl = TimeDelta::try_seconds(ttl_secs)
        .with_context(|| format!("TTL of {ttl_secs} seconds is out of range"))?;
    let payload = payload.read()?;

    match store
        .create(&id, payload, ttl)
        .await
        .with_context(|| format!("Failed to store secret '{id}'"))?
    {
        CreateOutcome::Created => println!("{id}"),
        CreateOutcome::AlreadyExists => {
            eprintln!("Secret '{id}' already exists; existing record kept");
            println!("{id}");
        }
    }

    Ok(())
}

async fn fetch_command(store: &DynamoStore, id: &str, payload_only: bool) -> Result<()> {
    match store
        .fetch_and_consume(id)
        .await
        .with_context(|| format!("Failed to fetch secret '{id}'"))?
    {
        FetchOutcome::Consumed(record) if payload_only => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(record.encrypted_secret.as_bytes())
                .context("Failed to write payload")?;
            stdout.flush().context("Failed to write payload")?;
        }
        FetchOutcome::Consumed(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        FetchOutcome::NotFound => anyhow::bail!("Secret '{id}' not found"),
    }

    Ok(())
}

async fn delete_command(store: &DynamoStore, id: &str) -> Result<()> {
    match store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete secret '{id}'"))?
    {
        DeleteOutcome::Deleted => println!("Deleted secret '{id}'"),
        DeleteOutcome::NotFound => println!("Secret '{id}' did not exist"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse_error(args: &[&str]) -> Option<ErrorKind> {
        Cli::try_parse_from(args).err().map(|err| err.kind())
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_print_metrics_is_global() {
        let cli =
            Cli::try_parse_from(["vsctl", "fetch", "--id", "abc", "--print-metrics"]).unwrap();
        assert!(cli.print_metrics);
        let Commands::Fetch { id, payload_only } = cli.command else {
            panic!("expected fetch command");
        };
        assert_eq!(id, "abc");
        assert!(!payload_only);
    }

    #[test]
    fn test_metrics_are_a_flag_not_a_subcommand() {
        assert_eq!(
            parse_error(&["vsctl", "metrics"]),
            Some(ErrorKind::InvalidSubcommand)
        );
    }

    #[test]
    fn test_create_requires_exactly_one_payload_source() {
        assert_eq!(
            parse_error(&[
                "vsctl", "create", "--payload", "x", "--payload-file", "p.bin", "--ttl-secs", "60",
            ]),
            Some(ErrorKind::ArgumentConflict)
        );
        assert_eq!(
            parse_error(&["vsctl", "create", "--ttl-secs", "60"]),
            Some(ErrorKind::MissingRequiredArgument)
        );
    }
}
