//! Resolution driver
//!
//! Runs one resolution end to end:
//!
//! ```text
//! Start -> CacheCheck -> CacheHit ------------------------------> GraphReady
//!                     -> CacheMiss -> OracleResolve -> CacheWrite -> GraphReady
//! GraphReady -> Collect -> ClassifyPrivate -> ClassifyReferenced -> Done
//! ```
//!
//! Input and oracle errors abort the run with no partial output. Cache I/O
//! never does.

use mavenref_core::{
    Coordinate, DeclaredDependency, DependencyNode, OutputItem, RepositoryDescriptor,
    ResolveSettings,
};
use std::fmt;

use crate::cache::{CacheSnapshot, CacheStore};
use crate::classify::{Classification, classify_pass};
use crate::collect::{OutputMap, collect};
use crate::error::Result;
use crate::oracle::{GraphResolver, ScopeFilter, Session};

/// Driver state machine phases, in the order they were passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    CacheCheck,
    CacheHit,
    CacheMiss,
    OracleResolve,
    CacheWrite,
    GraphReady,
    Collect,
    ClassifyPrivate,
    ClassifyReferenced,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct Resolution {
    /// One item per distinct jar, unique by item spec
    pub items: Vec<OutputItem>,
    /// The graph came from the cache
    pub cache_hit: bool,
    /// The graph the items were built from
    pub graph: DependencyNode,
    /// Phases passed, ending with [`Phase::Done`]
    pub phases: Vec<Phase>,
}

impl Resolution {
    pub fn item(&self, spec: &str) -> Option<&OutputItem> {
        self.items.iter().find(|item| item.item_spec == spec)
    }
}

#[derive(Debug, Default)]
struct PhaseLog {
    phases: Vec<Phase>,
}

impl PhaseLog {
    fn enter(&mut self, phase: Phase) {
        tracing::trace!("Resolution phase: {}", phase);
        self.phases.push(phase);
    }
}

/// Resolves declared references into output items through a [`GraphResolver`]
pub struct ResolutionDriver<'a, R: GraphResolver + ?Sized> {
    resolver: &'a R,
    session: Session,
    cache: CacheStore,
    settings: ResolveSettings,
}

impl<'a, R: GraphResolver + ?Sized> ResolutionDriver<'a, R> {
    /// Driver using the cache file named by `settings`
    pub fn new(resolver: &'a R, settings: ResolveSettings) -> Self {
        let cache = CacheStore::new(settings.cache_path());
        Self {
            resolver,
            session: Session::default(),
            cache,
            settings,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    /// Resolve `dependencies` against `repositories` into output items
    pub fn resolve(
        &self,
        repositories: &[RepositoryDescriptor],
        dependencies: &[DeclaredDependency],
    ) -> Result<Resolution> {
        let mut log = PhaseLog::default();
        log.enter(Phase::Start);

        let (graph, cache_hit) = self.obtain_graph(repositories, dependencies, &mut log)?;
        let include_test = self.settings.include_test_scope;

        log.enter(Phase::Collect);
        let mut map = OutputMap::new(self.settings.item_defaults());
        collect(&mut map, &graph)?;
        tracing::debug!("Collected {} items", map.len());

        log.enter(Phase::ClassifyPrivate);
        classify_pass(
            &mut map,
            self.resolver,
            &self.session,
            &graph,
            Classification::Private,
            include_test,
        )?;

        log.enter(Phase::ClassifyReferenced);
        classify_pass(
            &mut map,
            self.resolver,
            &self.session,
            &graph,
            Classification::ReferenceOutputAssembly,
            include_test,
        )?;

        if self.settings.include_sources {
            self.attach_sources(&mut map, repositories);
        }

        log.enter(Phase::Done);
        tracing::info!(
            "Resolved {} items{}",
            map.len(),
            if cache_hit { " (cached graph)" } else { "" }
        );

        Ok(Resolution {
            items: map.into_items(),
            cache_hit,
            graph,
            phases: log.phases,
        })
    }

    /// Resolve only the graph, through the cache when it matches.
    /// Returns the graph and whether it came from the cache.
    pub fn resolve_graph(
        &self,
        repositories: &[RepositoryDescriptor],
        dependencies: &[DeclaredDependency],
    ) -> Result<(DependencyNode, bool)> {
        let mut log = PhaseLog::default();
        log.enter(Phase::Start);
        self.obtain_graph(repositories, dependencies, &mut log)
    }

    fn obtain_graph(
        &self,
        repositories: &[RepositoryDescriptor],
        dependencies: &[DeclaredDependency],
        log: &mut PhaseLog,
    ) -> Result<(DependencyNode, bool)> {
        for dependency in dependencies {
            dependency.validate()?;
        }
        let include_test = self.settings.include_test_scope;

        log.enter(Phase::CacheCheck);
        if let Some(snapshot) = self.cache.try_read() {
            match snapshot.miss_reason(dependencies, repositories, include_test) {
                None => {
                    if let Some(graph) = snapshot.into_graph() {
                        log.enter(Phase::CacheHit);
                        tracing::debug!("Using cached dependency graph");
                        log.enter(Phase::GraphReady);
                        return Ok((graph, true));
                    }
                }
                Some(reason) => tracing::debug!("Cache miss: {}", reason),
            }
        }
        log.enter(Phase::CacheMiss);

        log.enter(Phase::OracleResolve);
        tracing::debug!(
            "Resolving {} dependencies against {} repositories",
            dependencies.len(),
            repositories.len()
        );
        let filter = ScopeFilter::compile_graph(include_test);
        let graph =
            self.resolver
                .resolve_full_graph(&self.session, dependencies, repositories, &filter)?;

        log.enter(Phase::CacheWrite);
        self.cache.try_write(&CacheSnapshot::new(
            dependencies,
            repositories,
            include_test,
            graph.clone(),
        ));

        log.enter(Phase::GraphReady);
        Ok((graph, false))
    }

    /// Best-effort `sources` lookup for every item
    fn attach_sources(&self, map: &mut OutputMap, repositories: &[RepositoryDescriptor]) {
        for item in map.iter_mut() {
            let mut coordinate = Coordinate::new(&item.group_id, &item.artifact_id, &item.version);
            coordinate.classifier = item.classifier.clone();
            let sources = coordinate.sources();

            item.source_path = match self
                .resolver
                .resolve_artifact(&self.session, &sources, repositories)
            {
                Ok(artifact) => artifact.file,
                Err(e) => {
                    tracing::debug!("No sources for {}: {}", item.item_spec, e);
                    None
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGraphResolver;
    use mavenref_core::{ResolvedArtifact, Scope};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn jar(name: &str) -> DependencyNode {
        DependencyNode::with_artifact(ResolvedArtifact::jar(
            &Coordinate::new("org.example", name, "1.0"),
            Some(PathBuf::from(format!("/m2/{name}-1.0.jar"))),
        ))
    }

    fn request() -> Vec<DeclaredDependency> {
        vec![DeclaredDependency::new(
            Coordinate::new("org.example", "a", "1.0"),
            Scope::Compile,
        )]
    }

    fn repositories() -> Vec<RepositoryDescriptor> {
        vec![RepositoryDescriptor::central()]
    }

    #[test]
    fn test_phases_on_miss() {
        let mock = MockGraphResolver::new(DependencyNode::root().child(Scope::Compile, jar("a")));
        let driver = ResolutionDriver::new(&mock, ResolveSettings::default());

        let resolution = driver.resolve(&repositories(), &request()).unwrap();
        assert!(!resolution.cache_hit);
        assert_eq!(
            resolution.phases,
            vec![
                Phase::Start,
                Phase::CacheCheck,
                Phase::CacheMiss,
                Phase::OracleResolve,
                Phase::CacheWrite,
                Phase::GraphReady,
                Phase::Collect,
                Phase::ClassifyPrivate,
                Phase::ClassifyReferenced,
                Phase::Done,
            ]
        );
    }

    #[test]
    fn test_phases_on_hit() {
        let dir = TempDir::new().unwrap();
        let settings = ResolveSettings {
            cache_file: Some(dir.path().join("cache.json")),
            ..Default::default()
        };
        let mock = MockGraphResolver::new(DependencyNode::root().child(Scope::Compile, jar("a")));
        let driver = ResolutionDriver::new(&mock, settings);

        driver.resolve(&repositories(), &request()).unwrap();
        let resolution = driver.resolve(&repositories(), &request()).unwrap();

        assert!(resolution.cache_hit);
        assert_eq!(
            &resolution.phases[..4],
            &[
                Phase::Start,
                Phase::CacheCheck,
                Phase::CacheHit,
                Phase::GraphReady
            ]
        );
        assert_eq!(mock.operation_counts().full_graphs, 1);
    }

    #[test]
    fn test_items_carry_defaults() {
        let mock = MockGraphResolver::new(DependencyNode::root().child(Scope::Compile, jar("a")));
        let settings = ResolveSettings {
            debug: true,
            class_loader: Some("AppDomainAssemblyClassLoader".to_string()),
            key_file: Some(PathBuf::from("/keys/strong.snk")),
            ..Default::default()
        };
        let driver = ResolutionDriver::new(&mock, settings);

        let resolution = driver.resolve(&repositories(), &request()).unwrap();
        let item = resolution.item("maven$org.example:a:1.0").unwrap();
        assert!(item.debug);
        assert_eq!(item.class_loader.as_deref(), Some("AppDomainAssemblyClassLoader"));
        assert_eq!(item.key_file.as_deref(), Some(PathBuf::from("/keys/strong.snk").as_path()));
        assert!(item.private);
        assert!(item.reference_output_assembly);
        assert_eq!(item.fallback_name, "a");
        assert_eq!(item.fallback_version, "1.0");
    }

    #[test]
    fn test_sources_attached_when_available() {
        let sources = ResolvedArtifact::jar(
            &Coordinate::new("org.example", "a", "1.0").sources(),
            Some(PathBuf::from("/m2/a-1.0-sources.jar")),
        );
        let mock = MockGraphResolver::new(
            DependencyNode::root()
                .child(Scope::Compile, jar("a"))
                .child(Scope::Compile, jar("b")),
        )
        .with_artifact(sources);
        let settings = ResolveSettings {
            include_sources: true,
            ..Default::default()
        };
        let driver = ResolutionDriver::new(&mock, settings);

        let resolution = driver.resolve(&repositories(), &request()).unwrap();
        assert_eq!(
            resolution
                .item("maven$org.example:a:1.0")
                .unwrap()
                .source_path
                .as_deref(),
            Some(PathBuf::from("/m2/a-1.0-sources.jar").as_path())
        );
        assert!(
            resolution
                .item("maven$org.example:b:1.0")
                .unwrap()
                .source_path
                .is_none()
        );
    }

    #[test]
    fn test_resolve_graph_only() {
        let mock = MockGraphResolver::new(
            DependencyNode::root()
                .child(Scope::Compile, jar("a"))
                .child(Scope::Test, jar("t")),
        );
        let driver = ResolutionDriver::new(&mock, ResolveSettings::default());

        let (graph, cached) = driver.resolve_graph(&repositories(), &request()).unwrap();
        assert!(!cached);
        assert_eq!(graph.artifact_count(), 1);
        assert_eq!(mock.operation_counts().scoped, 0);
    }
}
