//! Trailhead seeder
//!
//! Loads route records into the configured document store:
//! - Seed the built-in routes (or a JSON file of routes)
//! - List what a collection holds
//! - Update or delete a single route
//! - Print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trailhead::config::{generate_default_config, Config, StoreBackend};
use trailhead::seed::{default_routes, delete_route, load_routes, seed_routes, update_route};
use trailhead::store;

#[derive(Parser)]
#[command(name = "trailhead-seed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Seed hiking routes into the document store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store backend (sqlite, firestore); overrides the config file
    #[arg(short, long, global = true)]
    pub backend: Option<StoreBackend>,

    /// Target collection; overrides the config file
    #[arg(long, global = true)]
    pub collection: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert route records (the default command)
    Seed {
        /// JSON file with an array of route records (default: built-in routes)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print every document in the collection
    List,

    /// Merge fields into a stored route
    Update {
        /// Document id
        id: String,

        /// JSON object of top-level fields, e.g. '{"name": "Nuuksio"}'
        #[arg(long)]
        fields: String,
    },

    /// Delete a stored route
    Delete {
        /// Document id
        id: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Seed { file: None }) {
        Commands::Seed { file } => {
            let config = load_config(&cli)?;
            let store = store::open(&config.store).context("opening document store")?;
            let collection = config.store.collection.as_str();

            let routes = match file {
                Some(path) => load_routes(path)?,
                None => default_routes(),
            };

            tracing::info!(
                "Seeding {} route(s) into '{}' ({})",
                routes.len(),
                collection,
                store.name()
            );

            let ids = seed_routes(store.as_ref(), collection, &routes).await?;
            println!("Routes uploaded ({} documents)", ids.len());
        }

        Commands::List => {
            let config = load_config(&cli)?;
            let store = store::open(&config.store).context("opening document store")?;
            let collection = config.store.collection.as_str();

            let documents = store.list(collection).await?;
            for doc in &documents {
                println!("{}\t{}", doc.id, serde_json::to_string(&doc.data)?);
            }
            eprintln!("{} document(s) in '{}'", documents.len(), collection);
        }

        Commands::Update { id, fields } => {
            let config = load_config(&cli)?;
            let store = store::open(&config.store).context("opening document store")?;

            update_route(store.as_ref(), &config.store.collection, id, fields).await?;
            println!("Route {} updated", id);
        }

        Commands::Delete { id } => {
            let config = load_config(&cli)?;
            let store = store::open(&config.store).context("opening document store")?;

            delete_route(store.as_ref(), &config.store.collection, id).await?;
            println!("Route {} deleted", id);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)
                        .with_context(|| format!("writing config to {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Resolve configuration, apply command-line overrides and start logging
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;
    if let Some(backend) = cli.backend {
        config.store.backend = backend;
    }
    if let Some(collection) = &cli.collection {
        config.store.collection = collection.clone();
    }

    trailhead::logging::init(&config.logging);
    Ok(config)
}
