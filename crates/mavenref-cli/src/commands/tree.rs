//! Tree command - show the resolved dependency graph

use console::style;
use mavenref_resolve::ResolutionDriver;

use super::ResolveOptions;
use crate::error::Result;

pub fn run(options: &ResolveOptions) -> Result<()> {
    let manifest = options.load_manifest()?;
    let oracle = options.oracle()?;

    let driver =
        ResolutionDriver::new(&oracle, manifest.settings.clone()).with_session(options.session());
    let (graph, cached) = driver.resolve_graph(&manifest.repositories, &manifest.references)?;

    println!("{}", style("Dependency tree").bold());
    if cached {
        println!("{}", style("(from cache)").dim());
    }
    println!();

    if graph.children.is_empty() {
        println!("No dependencies.");
    } else {
        println!("{}", graph.render_tree());
    }

    println!();
    println!("Total: {} artifact node(s)", graph.artifact_count());

    Ok(())
}
