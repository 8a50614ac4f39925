//! mavenref Resolution Pipeline
//!
//! This crate turns declared Maven references into a deduplicated set of
//! reference items:
//!
//! - **Cache store**: Skip the oracle entirely when the request is unchanged
//! - **Graph resolver boundary**: The external oracle that produces a dependency graph
//! - **Collector**: Walk compile/provided edges, one item per distinct jar
//! - **Classifier**: Two scoped re-resolutions flag items private / referenced
//! - **Driver**: Orchestrates the above into the final item set
//!
//! ## Example
//!
//! ```rust,no_run
//! use mavenref_core::ReferenceManifest;
//! use mavenref_resolve::{IndexResolver, ResolutionDriver};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = ReferenceManifest::load("mavenref.yaml")?;
//! let oracle = IndexResolver::from_path("index.yaml")?;
//!
//! let driver = ResolutionDriver::new(&oracle, manifest.settings.clone());
//! let resolution = driver.resolve(&manifest.repositories, &manifest.references)?;
//!
//! for item in &resolution.items {
//!     println!("{} private={}", item.item_spec, item.private);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod cache;
pub mod oracle;
pub mod index;
pub mod mock;
pub mod collect;
pub mod classify;
pub mod driver;

// Re-exports for convenience
pub use error::{ResolveError, Result};
pub use cache::{CACHE_FORMAT_VERSION, CacheMiss, CacheSnapshot, CacheStore};
pub use oracle::{GraphResolver, ScopeFilter, Session, filter_graph, resolve_scoped_artifacts};
pub use index::{ArtifactIndex, IndexEntry, IndexResolver, derive_scope};
pub use mock::{MockGraphResolver, OperationCounts};
pub use collect::{OutputMap, collect, collect_references};
pub use classify::{Classification, classify, classify_pass};
pub use driver::{Phase, Resolution, ResolutionDriver};
