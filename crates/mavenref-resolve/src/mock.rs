//! Mock graph resolver for testing
//!
//! Serves a fixed graph from memory and counts every call, so tests can
//! assert that a cache hit never reaches the oracle.

use mavenref_core::{
    Coordinate, DeclaredDependency, DependencyNode, RepositoryDescriptor, ResolvedArtifact, Scope,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ResolveError, Result};
use crate::oracle::{GraphResolver, ScopeFilter, Session, filter_graph, resolve_scoped_artifacts};

/// In-memory oracle for testing
#[derive(Clone)]
pub struct MockGraphResolver {
    /// Graph returned (after filtering) for every request
    graph: DependencyNode,
    /// Standalone artifacts served by `resolve_artifact`
    artifacts: Arc<RwLock<HashMap<Coordinate, ResolvedArtifact>>>,
    /// Fail every graph request
    failing: bool,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub full_graphs: usize,
    pub scoped: usize,
    pub artifacts: usize,
}

impl MockGraphResolver {
    /// Serve `graph` for every request
    pub fn new(graph: DependencyNode) -> Self {
        Self {
            graph,
            artifacts: Arc::new(RwLock::new(HashMap::new())),
            failing: false,
            operations: Arc::new(RwLock::new(OperationCounts::default())),
        }
    }

    /// An oracle that cannot produce any graph
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(DependencyNode::root())
        }
    }

    /// Serve `artifact` from `resolve_artifact`
    pub fn with_artifact(self, artifact: ResolvedArtifact) -> Self {
        self.artifacts
            .write()
            .unwrap()
            .insert(artifact.coordinate(), artifact);
        self
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        let mut ops = self.operations.write().unwrap();
        *ops = OperationCounts::default();
    }
}

impl Default for MockGraphResolver {
    fn default() -> Self {
        Self::new(DependencyNode::root())
    }
}

impl GraphResolver for MockGraphResolver {
    fn resolve_full_graph(
        &self,
        _session: &Session,
        request: &[DeclaredDependency],
        _repositories: &[RepositoryDescriptor],
        filter: &ScopeFilter,
    ) -> Result<DependencyNode> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.full_graphs += 1;
        }

        if self.failing {
            return Err(ResolveError::graph(format!(
                "mock oracle failed for {} dependencies",
                request.len()
            )));
        }

        Ok(filter_graph(&self.graph, filter))
    }

    fn resolve_artifacts_for_scopes(
        &self,
        _session: &Session,
        graph: &DependencyNode,
        scopes: &[Scope],
    ) -> Result<Vec<ResolvedArtifact>> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.scoped += 1;
        }

        Ok(resolve_scoped_artifacts(graph, scopes))
    }

    fn resolve_artifact(
        &self,
        _session: &Session,
        coordinate: &Coordinate,
        _repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.artifacts += 1;
        }

        let artifacts = self.artifacts.read().unwrap();
        artifacts
            .get(coordinate)
            .cloned()
            .ok_or_else(|| ResolveError::ArtifactNotResolved {
                coordinate: coordinate.clone(),
            })
    }
}
