//! Scope classifier
//!
//! Each pass asks the oracle which artifacts of the resolved graph are
//! reachable through a set of scopes and raises one flag on their items.
//! Flags are only ever set, so repeating a pass changes nothing.

use mavenref_core::{DependencyNode, OutputItem, Scope};

use crate::collect::OutputMap;
use crate::error::Result;
use crate::oracle::{GraphResolver, Session};

/// The two classification questions asked of every resolved graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Needed at run time: copied into the output
    Private,
    /// Needed at compile time: visible to the compiler
    ReferenceOutputAssembly,
}

impl Classification {
    pub const ALL: [Classification; 2] = [Self::Private, Self::ReferenceOutputAssembly];

    /// Scopes queried by this pass
    pub fn scopes(&self, include_test: bool) -> Vec<Scope> {
        let mut scopes = match self {
            Self::Private => vec![Scope::Compile, Scope::Runtime],
            Self::ReferenceOutputAssembly => vec![Scope::Compile, Scope::Provided],
        };
        if include_test {
            scopes.push(Scope::Test);
        }
        scopes
    }

    pub fn apply(&self, item: &mut OutputItem) {
        match self {
            Self::Private => item.mark_private(),
            Self::ReferenceOutputAssembly => item.mark_reference_output_assembly(),
        }
    }
}

/// Resolve the artifacts of `graph` reachable through `scopes` and run
/// `set_flag` on each one's item, creating items as needed. Returns the
/// number of items flagged.
pub fn classify<R, F>(
    map: &mut OutputMap,
    resolver: &R,
    session: &Session,
    graph: &DependencyNode,
    scopes: &[Scope],
    mut set_flag: F,
) -> Result<usize>
where
    R: GraphResolver + ?Sized,
    F: FnMut(&mut OutputItem),
{
    let artifacts = resolver.resolve_artifacts_for_scopes(session, graph, scopes)?;

    let mut flagged = 0;
    for artifact in &artifacts {
        if let Some(spec) = map.obtain_or_create(artifact)?
            && let Some(item) = map.get_mut(&spec)
        {
            set_flag(item);
            flagged += 1;
        }
    }

    Ok(flagged)
}

/// Run one [`Classification`] pass
pub fn classify_pass<R: GraphResolver + ?Sized>(
    map: &mut OutputMap,
    resolver: &R,
    session: &Session,
    graph: &DependencyNode,
    classification: Classification,
    include_test: bool,
) -> Result<usize> {
    let scopes = classification.scopes(include_test);
    let flagged = classify(map, resolver, session, graph, &scopes, |item| {
        classification.apply(item)
    })?;
    tracing::debug!("{:?} pass flagged {} items", classification, flagged);
    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect;
    use crate::mock::MockGraphResolver;
    use mavenref_core::{Coordinate, ResolvedArtifact};

    fn jar(name: &str) -> DependencyNode {
        DependencyNode::with_artifact(ResolvedArtifact::jar(
            &Coordinate::new("org.example", name, "1.0"),
            None,
        ))
    }

    fn spec(name: &str) -> String {
        format!("maven$org.example:{name}:1.0")
    }

    fn graph() -> DependencyNode {
        DependencyNode::root()
            .child(Scope::Compile, jar("a").child(Scope::Runtime, jar("d")))
            .child(Scope::Provided, jar("api"))
            .child(Scope::Test, jar("junit"))
    }

    #[test]
    fn test_pass_scopes() {
        assert_eq!(
            Classification::Private.scopes(false),
            vec![Scope::Compile, Scope::Runtime]
        );
        assert_eq!(
            Classification::ReferenceOutputAssembly.scopes(true),
            vec![Scope::Compile, Scope::Provided, Scope::Test]
        );
    }

    #[test]
    fn test_private_pass() {
        let graph = graph();
        let mock = MockGraphResolver::new(graph.clone());
        let mut map = OutputMap::default();
        collect(&mut map, &graph).unwrap();

        let flagged = classify_pass(
            &mut map,
            &mock,
            &Session::default(),
            &graph,
            Classification::Private,
            false,
        )
        .unwrap();

        assert_eq!(flagged, 2);
        assert!(map.get(&spec("a")).unwrap().private);
        assert!(map.get(&spec("d")).unwrap().private);
        assert!(!map.get(&spec("api")).unwrap().private);
        assert_eq!(mock.operation_counts().scoped, 1);
    }

    #[test]
    fn test_reference_pass() {
        let graph = graph();
        let mock = MockGraphResolver::new(graph.clone());
        let mut map = OutputMap::default();

        classify_pass(
            &mut map,
            &mock,
            &Session::default(),
            &graph,
            Classification::ReferenceOutputAssembly,
            false,
        )
        .unwrap();

        assert!(map.get(&spec("a")).unwrap().reference_output_assembly);
        assert!(map.get(&spec("api")).unwrap().reference_output_assembly);
        assert!(map.get(&spec("d")).is_none());
        assert!(map.get(&spec("junit")).is_none());
    }

    #[test]
    fn test_rerun_without_test_scope_keeps_flags() {
        let graph = graph();
        let mock = MockGraphResolver::new(graph.clone());
        let mut map = OutputMap::default();
        let session = Session::default();

        for classification in Classification::ALL {
            classify_pass(&mut map, &mock, &session, &graph, classification, true).unwrap();
        }
        for classification in Classification::ALL {
            classify_pass(&mut map, &mock, &session, &graph, classification, false).unwrap();
        }

        for name in ["a", "d", "junit"] {
            assert!(map.get(&spec(name)).unwrap().private, "{name} lost private");
        }
        for name in ["a", "api", "junit"] {
            assert!(
                map.get(&spec(name)).unwrap().reference_output_assembly,
                "{name} lost referenceOutputAssembly"
            );
        }
        assert!(!map.get(&spec("api")).unwrap().private);
        assert!(!map.get(&spec("d")).unwrap().reference_output_assembly);
    }
}
