//! Comandos da CLI do docstore.

use std::path::{Path, PathBuf};

use crate::graphql::{self, query_hash};
use crate::server::{CacheOutcome, DocumentPipeline, DocumentStoreOption, OperatingMode};
use crate::store::{DocumentCacheFactory, Store};
use crate::types::config::Config;
use crate::DocstoreResult;

/// Cria a configuração padrão no diretório especificado.
pub async fn init(path: Option<PathBuf>) -> DocstoreResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("docstore.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default().save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    Ok(())
}

/// Parseia uma query e mostra seu hash e AST.
pub fn parse(query: &str) -> DocstoreResult<()> {
    let document = graphql::parse(query)?;

    println!("hash: {}", query_hash(query));
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Armazena uma query num store embutido novo e mostra o resultado.
pub async fn inspect(query: &str, config: &Config) -> DocstoreResult<()> {
    let factory = DocumentCacheFactory::from_config(&config.document_store)?;
    let store = factory.create()?;

    let hash = query_hash(query);
    let document = graphql::parse(query)?;
    store.set(&hash, document, None).await?;

    let total = store.total_size().await?.unwrap_or(0);
    let cached = store.has(&hash).await?;

    println!("hash:       {}", hash);
    println!("key:        {}", store.backend_key(&hash));
    println!("cached:     {}", if cached { "yes" } else { "no (exceeds budget)" });
    println!("total size: {} bytes", total);
    println!("budget:     {} bytes", factory.max_size());
    Ok(())
}

/// Reexecuta queries pelo document store configurado.
pub async fn replay(input: &Path, no_cache: bool, config: &Config) -> DocstoreResult<()> {
    let option = if no_cache {
        DocumentStoreOption::Disabled
    } else {
        DocumentStoreOption::from_config(&config.document_store)
    };
    let pipeline = DocumentPipeline::new(OperatingMode::resolve(option, &config.document_store)?);

    let content = std::fs::read_to_string(input)?;
    let mut failures = 0usize;

    for (line_no, query) in content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
    {
        match pipeline.document(query).await {
            Ok(resolved) => {
                let label = match resolved.outcome {
                    CacheOutcome::Hit => "hit",
                    CacheOutcome::Miss => "miss",
                    CacheOutcome::Bypassed => "bypass",
                };
                tracing::debug!(line = line_no + 1, outcome = label, "Query resolved");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(line = line_no + 1, error = %e, "Query failed to parse");
            }
        }
    }

    let stats = pipeline.stats();
    println!("mode:       {}", pipeline.mode().name());
    println!("hits:       {}", stats.hits);
    println!("misses:     {}", stats.misses);
    println!("bypassed:   {}", stats.bypassed);
    println!("failures:   {}", failures);
    println!("hit rate:   {:.1}%", stats.hit_rate() * 100.0);
    if let Some(total) = pipeline.store_size().await? {
        println!("total size: {} bytes", total);
    }
    Ok(())
}

/// Mostra a configuração efetiva.
pub fn config_cmd(config: &Config) -> DocstoreResult<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("docstore {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Size-aware LRU cache for parsed GraphQL documents");
}
