#![allow(unknown_lints, renamed_and_removed_lints)]
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use docstore::config::{load_config, load_config_from};
use docstore::logging::{init_logging, parse_rotation, LogConfig};
use docstore::storage::SYSTEM_USER;
use docstore::{open_store, DocumentType, HealthStatus, ListQuery, StorageKind, StoreHandle};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Docstore - inspect and maintain a versioned document store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.docstore/config.toml)
    #[arg(long, env = "DOCSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured backend: filesystem or key-value
    #[arg(long, env = "DOCSTORE_BACKEND")]
    backend: Option<StorageKind>,

    /// Override the filesystem root directory
    #[arg(long, env = "DOCSTORE_ROOT")]
    root: Option<PathBuf>,

    /// Override the key-value substrate URL (`[key_value] url` in the config)
    #[arg(long, env = "DOCSTORE_KV_URL")]
    kv_url: Option<String>,

    /// Enable JSON log format
    #[arg(long, env = "DOCSTORE_LOG_JSON", default_value = "false")]
    log_json: bool,

    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "DOCSTORE_LOG_ROTATION", default_value = "daily")]
    log_rotation: String,

    /// Custom log directory (default: ~/.docstore/logs)
    #[arg(long, env = "DOCSTORE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report backend health as JSON
    Health,
    /// List document metadata
    List {
        /// Only documents created by this user
        #[arg(long)]
        user: Option<String>,
        /// Only documents of this type
        #[arg(long = "type")]
        document_type: Option<DocumentType>,
        #[arg(long, default_value_t = docstore::storage::DEFAULT_LIST_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print a document
    Show { id: String },
    /// Print the version ledger of a document
    Versions { id: String },
    /// Revert a document to an earlier version
    Revert {
        id: String,
        version: u32,
        #[arg(long, default_value = SYSTEM_USER)]
        user: String,
    },
    /// Delete a document with its versions
    Delete { id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(store: &StoreHandle, command: Command) -> Result<()> {
    match command {
        Command::Health => {
            let report = store.health_check().await;
            print_json(&report)?;
            if report.status == HealthStatus::Unhealthy {
                bail!("{} store is unhealthy", report.storage_type);
            }
        }
        Command::List {
            user,
            document_type,
            limit,
            offset,
        } => {
            let mut query = ListQuery::new().limit(limit).offset(offset);
            if let Some(user) = user {
                query = query.user(user);
            }
            if let Some(document_type) = document_type {
                query = query.document_type(document_type);
            }
            print_json(&store.list_documents(&query).await?)?;
        }
        Command::Show { id } => {
            let document = store
                .load(&id)
                .await?
                .ok_or_else(|| eyre!("Document not found: {id}"))?;
            print_json(&document)?;
        }
        Command::Versions { id } => {
            print_json(&store.get_versions(&id).await?)?;
        }
        Command::Revert { id, version, user } => {
            let document = store.revert_to_version(&id, version, &user).await?;
            print_json(&document.metadata)?;
        }
        Command::Delete { id } => {
            let deleted = store.delete(&id).await?;
            print_json(&serde_json::json!({ "document_id": id, "deleted": deleted }))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut log_config = LogConfig {
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..LogConfig::default()
    };
    if let Some(dir) = args.log_dir {
        log_config.log_dir = dir;
    }
    init_logging(&log_config).wrap_err_with(|| {
        format!(
            "Failed to initialize logging (logs: {})",
            log_config.log_file().display()
        )
    })?;

    let mut config = match &args.config {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config().wrap_err("Failed to load config")?,
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(root) = args.root {
        config.filesystem.root = root;
    }
    if let Some(url) = args.kv_url {
        config.key_value.url = url;
    }

    let store = open_store(&config).await?;
    info!(backend = %store.kind(), "Store ready");

    let result = run(&store, args.command).await;
    if let Err(e) = store.close().await {
        warn!("Failed to close store: {e}");
    }
    result
}
