//! Resolve command - turn the manifest's references into items

use console::style;
use mavenref_core::OutputItem;
use mavenref_resolve::ResolutionDriver;
use serde::Serialize;

use super::ResolveOptions;
use crate::error::{CliError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
    cache_hit: bool,
    items: Vec<&'a OutputItem>,
}

pub fn run(options: &ResolveOptions, sources: bool, json_output: bool) -> Result<()> {
    let mut manifest = options.load_manifest()?;
    if sources {
        manifest.settings.include_sources = true;
    }

    let oracle = options.oracle()?;
    let driver =
        ResolutionDriver::new(&oracle, manifest.settings.clone()).with_session(options.session());
    let resolution = driver.resolve(&manifest.repositories, &manifest.references)?;

    let mut items: Vec<&OutputItem> = resolution.items.iter().collect();
    items.sort_by(|a, b| a.item_spec.cmp(&b.item_spec));

    if json_output {
        let report = ResolveReport {
            cache_hit: resolution.cache_hit,
            items,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Other { message: e.to_string() })?;
        println!("{}", json);
        return Ok(());
    }

    if items.is_empty() {
        println!("No items resolved.");
        return Ok(());
    }

    println!("{:<60} {:<8} {:<10} REFERENCES", "ITEM", "PRIVATE", "REFERENCE");
    println!("{}", "-".repeat(92));

    for item in &items {
        println!(
            "{:<60} {:<8} {:<10} {}",
            item.item_spec,
            yes_no(item.private),
            yes_no(item.reference_output_assembly),
            item.references.len()
        );
        if let Some(source) = &item.source_path {
            println!("  {} {}", style("sources:").dim(), source.display());
        }
    }

    println!();
    let cache = if resolution.cache_hit {
        " (from cache)"
    } else {
        ""
    };
    println!(
        "{} Resolved {} item(s){}",
        style("✓").green().bold(),
        items.len(),
        cache
    );

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
