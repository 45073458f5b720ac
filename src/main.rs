use std::sync::Arc;

use clap::Parser;
use linknest::cli::{
    handle_category, handle_doc, handle_favorites, handle_link, handle_note, handle_recent,
    handle_reset, handle_search, handle_tag, Cli, Commands,
};
use linknest::storage::{JsonDirStore, LocalFileStore};
use linknest::{Config, Repository, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.data_dir)?;
    let repo = Repository::open(
        Arc::new(JsonDirStore::new(config.store_dir())),
        Arc::new(LocalFileStore::new()),
        &config,
    )
    .await;

    let result = match cli.command {
        Commands::Link(link) => handle_link(&repo, link.action).await,
        Commands::Note(note) => handle_note(&repo, note.action).await,
        Commands::Doc(doc) => handle_doc(&repo, doc.action).await,
        Commands::Category(category) => handle_category(&repo, category.action).await,
        Commands::Tag(tag) => handle_tag(&repo, tag.action).await,
        Commands::Recent { limit, json } => handle_recent(&repo, limit, json).await,
        Commands::Favorites { limit, json } => handle_favorites(&repo, limit, json).await,
        Commands::Search { query, json } => handle_search(&repo, query, json).await,
        Commands::Reset { yes } => handle_reset(&repo, yes).await,
    };

    // Writes are in the background; finish them before the process exits.
    repo.flush_pending().await;
    result
}
