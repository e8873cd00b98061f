use anyhow::{Context, Result};
use hindex::config::Config;
use hindex::embedding;
use hindex::index::IndexStore;
use hindex::retrieval::HybridRetriever;
use hindex::types::{Query, SearchResult};
use hindex::util::truncate_str;
use std::sync::Arc;

pub fn run(
    config: Config,
    query_text: &str,
    top_k: usize,
    tags: Vec<String>,
    format: &str,
) -> Result<()> {
    let provider = embedding::create_provider(&config.embedding)
        .context("failed to initialize embedding provider")?;
    let store = IndexStore::new(config.store.data_dir.clone());
    let bundle = store
        .load_for(provider.as_ref())
        .context("failed to load index bundle")?;

    let retriever = HybridRetriever::new(Arc::new(bundle), provider, config.retrieval.clone())?;

    let mut query = Query::new(query_text, top_k);
    if !tags.is_empty() {
        query = query.with_tags(tags);
    }
    let results = retriever.search(&query)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => print_text(query_text, &results),
    }
    Ok(())
}

fn print_text(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results for '{}'", query);
        return;
    }

    println!("Results for '{}':\n", query);
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:2}. [{:.4}] {} ({})",
            i + 1,
            result.score,
            result.chunk.document_title,
            result.chunk.url()
        );
        if let Some(heading) = &result.chunk.heading {
            println!("    Section: {}", heading);
        }
        println!("    {}", truncate_str(&result.chunk.text, 160));
        println!();
    }
}
