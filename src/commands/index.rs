use anyhow::{Context, Result};
use hindex::config::Config;
use hindex::content;
use hindex::embedding;
use hindex::index::{IndexBuilder, IndexStore};
use std::path::Path;
use tracing::{info, warn};

pub fn run(config: Config, content_dir: &Path) -> Result<()> {
    let (documents, load_errors) = content::load_documents(content_dir);
    for err in &load_errors {
        warn!("{}", err);
    }
    if documents.is_empty() {
        anyhow::bail!("no documents found under {}", content_dir.display());
    }
    info!(
        "Loaded {} documents from {}",
        documents.len(),
        content_dir.display()
    );

    let provider = embedding::create_provider(&config.embedding)
        .context("failed to initialize embedding provider")?;
    let builder = IndexBuilder::new(provider, &config);
    let (bundle, report) = builder.build(&documents)?;

    for err in &report.errors {
        warn!("{}", err);
    }

    let store = IndexStore::new(config.store.data_dir.clone());
    store.write(&bundle)?;

    let skipped = load_errors.len() + report.errors.len();
    println!(
        "Indexed {} documents into {} chunks ({} skipped)",
        report.indexed_documents, report.chunk_count, skipped
    );
    println!("Bundle written to {}", config.store.data_dir.display());
    Ok(())
}
