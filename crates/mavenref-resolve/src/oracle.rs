//! Graph resolver boundary
//!
//! The oracle that turns a dependency request into a graph lives outside
//! this crate's core. The pipeline only talks to it through [`GraphResolver`].

use mavenref_core::{
    Coordinate, DeclaredDependency, DependencyEdge, DependencyNode, RepositoryDescriptor,
    ResolvedArtifact, Scope,
};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use crate::error::Result;

/// Opaque per-run resolver state
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Local artifact store
    pub local_repository: Option<PathBuf>,
}

/// Scope predicate applied to graph edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Accept edges whose scope is in the set
    Scopes(BTreeSet<Scope>),
    /// Accept edges either side accepts
    Or(Box<ScopeFilter>, Box<ScopeFilter>),
}

impl ScopeFilter {
    pub fn scopes(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self::Scopes(scopes.into_iter().collect())
    }

    /// Loosen this filter with another; never narrows
    pub fn or(self, other: ScopeFilter) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn accepts(&self, scope: Scope) -> bool {
        match self {
            Self::Scopes(scopes) => scopes.contains(&scope),
            Self::Or(a, b) => a.accepts(scope) || b.accepts(scope),
        }
    }

    /// Filter for the compile-time graph: compile, runtime and provided,
    /// plus test when requested.
    pub fn compile_graph(include_test: bool) -> Self {
        let base = Self::scopes([Scope::Compile, Scope::Runtime, Scope::Compile, Scope::Provided]);
        if include_test {
            base.or(Self::scopes([Scope::Test]))
        } else {
            base
        }
    }
}

/// The external dependency-resolution oracle
pub trait GraphResolver: Send + Sync {
    /// Resolve the transitive graph for `request`, keeping only edges the
    /// filter accepts. Fails with `GraphResolution` when no graph can be produced.
    fn resolve_full_graph(
        &self,
        session: &Session,
        request: &[DeclaredDependency],
        repositories: &[RepositoryDescriptor],
        filter: &ScopeFilter,
    ) -> Result<DependencyNode>;

    /// Artifacts of an already resolved graph reachable through edges of
    /// the given scopes. Must not go back to the network for artifacts the
    /// graph already binds.
    ///
    /// Path semantics: descent stops at the first edge whose scope is not in
    /// the set, so an artifact is excluded when every path to it crosses one.
    fn resolve_artifacts_for_scopes(
        &self,
        _session: &Session,
        graph: &DependencyNode,
        scopes: &[Scope],
    ) -> Result<Vec<ResolvedArtifact>> {
        Ok(resolve_scoped_artifacts(graph, scopes))
    }

    /// Resolve a single artifact. `ArtifactNotResolved` when it does not exist.
    fn resolve_artifact(
        &self,
        session: &Session,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact>;
}

/// Re-walk a resolved graph, collecting artifacts reachable through edges
/// whose scope is in `scopes`. Descent stops at the first rejected edge.
/// Pre-order, each distinct artifact once.
pub fn resolve_scoped_artifacts(graph: &DependencyNode, scopes: &[Scope]) -> Vec<ResolvedArtifact> {
    let mut seen = HashSet::new();
    let mut artifacts = Vec::new();
    let mut stack: Vec<&DependencyNode> = vec![graph];

    while let Some(node) = stack.pop() {
        for edge in node.children.iter().rev() {
            if scopes.contains(&edge.scope) {
                stack.push(&edge.node);
            }
        }
        if std::ptr::eq(node, graph) {
            continue;
        }
        if let Some(artifact) = &node.artifact
            && seen.insert(artifact)
        {
            artifacts.push(artifact.clone());
        }
    }

    artifacts
}

/// Copy of `graph` without the subtrees behind edges the filter rejects
pub fn filter_graph(graph: &DependencyNode, filter: &ScopeFilter) -> DependencyNode {
    DependencyNode {
        artifact: graph.artifact.clone(),
        children: graph
            .children
            .iter()
            .filter(|edge| filter.accepts(edge.scope))
            .map(|edge| DependencyEdge {
                scope: edge.scope,
                optional: edge.optional,
                node: filter_graph(&edge.node, filter),
            })
            .collect(),
    }
}
