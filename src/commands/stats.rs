use anyhow::{Context, Result};
use hindex::config::Config;
use hindex::index::IndexStore;

pub fn run(config: Config) -> Result<()> {
    let store = IndexStore::new(config.store.data_dir.clone());
    let bundle = store.load().context("failed to load index bundle")?;
    let summary = &bundle.summary;

    println!("Index bundle at {}", config.store.data_dir.display());
    println!("  Model:      {} ({} dims)", summary.embedding_model_id, summary.embedding_dimension);
    println!("  Documents:  {}", summary.document_count);
    println!("  Chunks:     {}", summary.chunk_count);
    println!("  Vocabulary: {} terms", bundle.sparse.vocabulary_size());
    println!("  Built at:   {}", summary.built_at.to_rfc3339());
    println!("  Tags:       {}", summary.tag_roster.join(", "));
    Ok(())
}
