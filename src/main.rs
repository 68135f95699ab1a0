use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rental_engine::application::engine::RentalEngine;
use rental_engine::application::ingest::clean_batch;
use rental_engine::domain::ports::{RentalStore, RentalStoreBox};
use rental_engine::domain::subscription::SubscriptionMap;
use rental_engine::infrastructure::in_memory::InMemoryRentalStore;
#[cfg(feature = "storage-sqlite")]
use rental_engine::infrastructure::sqlite::SqliteRentalStore;
use rental_engine::interfaces::tsv::catalogue_reader::CatalogueReader;
use rental_engine::interfaces::tsv::rental_reader::RentalReader;
use rental_engine::interfaces::tsv::subscription_reader::load_subscriptions;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the rental company database. Omitting it runs against an
    /// in-process store that lives only for this invocation.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean a raw customer rental data file and load the accepted records.
    Ingest {
        /// Customer rental data file (tab-separated, header line first).
        rentals: PathBuf,

        /// Business games file used to seed the catalogue.
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
    /// Rent a game out to a customer.
    Rent {
        customer_id: String,
        game_id: String,

        /// Customer subscription data file.
        #[arg(long)]
        subscriptions: PathBuf,
    },
    /// Process the return of a game.
    Return { game_id: String },
    /// Report whether a game is currently out on loan.
    Status { game_id: String },
}

async fn open_store(db: Option<&Path>) -> Result<RentalStoreBox> {
    match db {
        #[cfg(feature = "storage-sqlite")]
        Some(path) => Ok(Box::new(
            SqliteRentalStore::open(path).await.into_diagnostic()?,
        )),
        #[cfg(not(feature = "storage-sqlite"))]
        Some(_) => Err(miette::miette!(
            "this build has no persistent storage; rebuild with the storage-sqlite feature"
        )),
        None => Ok(Box::new(InMemoryRentalStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.db.as_deref()).await?;

    match cli.command {
        Command::Ingest { rentals, catalogue } => {
            if let Some(path) = catalogue {
                let file = File::open(path).into_diagnostic()?;
                let mut games = Vec::new();
                for result in CatalogueReader::new(file).games() {
                    match result {
                        Ok(game) => games.push(game),
                        Err(e) => eprintln!("Error reading catalogue entry: {e}"),
                    }
                }
                store.seed_catalogue(&games).await.into_diagnostic()?;
                println!("Seeded {} catalogue entries.", games.len());
            }

            let file = File::open(rentals).into_diagnostic()?;
            let mut raws = Vec::new();
            for result in RentalReader::new(file).records() {
                match result {
                    Ok(raw) => raws.push(raw),
                    Err(e) => eprintln!("Error reading rental record: {e}"),
                }
            }

            let report = clean_batch(raws);
            for rejected in &report.rejected {
                warn!(reason = %rejected.reason, raw = ?rejected.raw, "rental record dropped");
            }
            store.load_batch(&report.rows()).await.into_diagnostic()?;
            println!(
                "Accepted {} rental records, rejected {}.",
                report.accepted.len(),
                report.rejected.len()
            );
        }
        Command::Rent {
            customer_id,
            game_id,
            subscriptions,
        } => {
            let directory = load_subscriptions(subscriptions).into_diagnostic()?;
            let engine = RentalEngine::new(store, Box::new(directory));
            let outcome = engine.rent(&customer_id, &game_id).await.into_diagnostic()?;
            println!("{outcome}");
        }
        Command::Return { game_id } => {
            let engine = RentalEngine::new(store, Box::new(SubscriptionMap::new()));
            let outcome = engine.return_game(&game_id).await.into_diagnostic()?;
            println!("{outcome}");
        }
        Command::Status { game_id } => {
            let engine = RentalEngine::new(store, Box::new(SubscriptionMap::new()));
            let availability = engine.availability(&game_id).await.into_diagnostic()?;
            println!("Game Id {game_id} is {availability}.");
        }
    }

    Ok(())
}
