use clap::{Parser, Subcommand};
mod arcmage;
mod error;
mod utils;

use utils::files::ProjectLayout;
use utils::http::HttpFetcher;

/// Fetch Arcmage decks and card artwork for the local front-end
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the Arcmage API
    #[arg(long, global = true, default_value = arcmage::DEFAULT_BASE)]
    base: String,

    /// Project root that holds public/ and src/data/
    #[arg(long, global = true, default_value = ".")]
    root: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one deck into src/data/decks/<deck-guid>.json
    Deck {
        /// Deck guid, e.g. 6776ddb8-3ce0-470b-8d2c-afb26bd29359
        deck_guid: String,
    },
    /// Fetch the full Rebirth set into src/data/rebirth.json
    Rebirth,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let base = args.base.trim_end_matches('/');
    let layout = ProjectLayout::new(&args.root);
    let fetcher = HttpFetcher::new();

    let result = match args.command {
        Commands::Deck { deck_guid } => {
            arcmage::deck::fetch_deck(&fetcher, base, &layout, &deck_guid).await
        }
        Commands::Rebirth => arcmage::rebirth::fetch_rebirth(&fetcher, base, &layout).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
