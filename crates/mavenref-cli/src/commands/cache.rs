//! Cache commands - inspect or remove the graph cache

use console::style;
use mavenref_core::ReferenceManifest;
use mavenref_resolve::CacheStore;
use std::path::Path;

use crate::error::Result;

fn store(manifest: &ReferenceManifest) -> CacheStore {
    CacheStore::new(manifest.settings.cache_path())
}

pub fn show(path: &Path) -> Result<()> {
    let manifest = ReferenceManifest::load(path)?;
    let store = store(&manifest);

    let Some(cache_path) = store.path() else {
        println!("Caching is disabled (no cacheFile in settings).");
        return Ok(());
    };

    println!("{}: {}", style("Cache file").bold(), cache_path.display());

    let Some(snapshot) = store.read()? else {
        println!("No snapshot written yet.");
        return Ok(());
    };

    println!("{}: {}", style("Format").bold(), snapshot.version);
    println!(
        "{}: {}",
        style("Generated").bold(),
        snapshot.generated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "{}: {}",
        style("Test scope").bold(),
        if snapshot.include_test_scope { "included" } else { "excluded" }
    );
    println!(
        "{}: {}",
        style("Dependencies").bold(),
        snapshot.dependencies.as_ref().map_or(0, Vec::len)
    );
    if let Some(repositories) = &snapshot.repositories {
        println!("{}:", style("Repositories").bold());
        for repo in repositories {
            println!("  - {} ({})", repo.id, repo.url);
        }
    }
    println!(
        "{}: {}",
        style("Graph nodes").bold(),
        snapshot.graph.as_ref().map_or(0, |g| g.artifact_count())
    );

    println!();
    match snapshot.miss_reason(
        &manifest.references,
        &manifest.repositories,
        manifest.settings.include_test_scope,
    ) {
        None => println!("{} Snapshot matches the manifest", style("✓").green().bold()),
        Some(reason) => println!("{} Stale: {}", style("✗").yellow().bold(), reason),
    }

    Ok(())
}

pub fn clear(path: &Path) -> Result<()> {
    let manifest = ReferenceManifest::load(path)?;
    let store = store(&manifest);

    match store.path() {
        None => println!("Caching is disabled (no cacheFile in settings)."),
        Some(cache_path) => {
            if store.clear()? {
                println!(
                    "{} Removed {}",
                    style("✓").green().bold(),
                    cache_path.display()
                );
            } else {
                println!("Nothing to remove.");
            }
        }
    }

    Ok(())
}
