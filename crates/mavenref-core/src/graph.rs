//! Resolved dependency graph
//!
//! The graph is a tree: the same artifact may appear under several parents
//! (diamond dependencies), so consumers deduplicate by artifact identity and
//! never by tree position.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

use crate::coordinate::{Coordinate, Scope, normalize_classifier};
use crate::error::{CoreError, Result};

/// The only extension that produces reference items
pub const JAR_EXTENSION: &str = "jar";

/// A resolved artifact bound to a graph node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArtifact {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    pub version: String,
    /// Local file, once the artifact has been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_extension() -> String {
    JAR_EXTENSION.to_string()
}

impl ResolvedArtifact {
    pub fn jar(coordinate: &Coordinate, file: Option<PathBuf>) -> Self {
        Self {
            group_id: coordinate.group_id.clone(),
            artifact_id: coordinate.artifact_id.clone(),
            classifier: coordinate.classifier().map(String::from),
            extension: default_extension(),
            version: coordinate.version.clone(),
            file,
        }
    }

    pub fn classifier(&self) -> Option<&str> {
        normalize_classifier(self.classifier.as_deref())
    }

    pub fn is_jar(&self) -> bool {
        self.extension == JAR_EXTENSION
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier().map(String::from),
            version: self.version.clone(),
        }
    }
}

/// A node in the resolved dependency tree
///
/// Serializes as a flat [`GraphArena`], so the persisted form has the same
/// nesting depth however deep the tree is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyNode {
    /// `None` for the synthetic request root
    pub artifact: Option<ResolvedArtifact>,
    pub children: Vec<DependencyEdge>,
}

/// Edge from a parent node to one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub scope: Scope,
    pub optional: bool,
    pub node: DependencyNode,
}

/// Flat form of a dependency tree: node 0 is the root, and every child
/// index is greater than its parent's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphArena {
    pub nodes: Vec<ArenaNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ResolvedArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ArenaEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaEdge {
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
    pub node: usize,
}

impl GraphArena {
    /// Flatten a tree, numbering nodes so children follow their parent
    pub fn from_tree(root: &DependencyNode) -> Self {
        let mut nodes = vec![ArenaNode {
            artifact: root.artifact.clone(),
            children: Vec::new(),
        }];
        let mut stack = vec![(root, 0usize)];

        while let Some((node, index)) = stack.pop() {
            for edge in &node.children {
                let child = nodes.len();
                nodes.push(ArenaNode {
                    artifact: edge.node.artifact.clone(),
                    children: Vec::new(),
                });
                nodes[index].children.push(ArenaEdge {
                    scope: edge.scope,
                    optional: edge.optional,
                    node: child,
                });
                stack.push((&edge.node, child));
            }
        }

        Self { nodes }
    }

    /// Rebuild the tree. Fails unless every node but the root has exactly
    /// one parent with a lower index.
    pub fn into_tree(self) -> Result<DependencyNode> {
        let count = self.nodes.len();
        if count == 0 {
            return Ok(DependencyNode::root());
        }

        let mut built: Vec<Option<DependencyNode>> = Vec::with_capacity(count);
        built.resize_with(count, || None);
        let mut claimed = vec![false; count];

        for (index, node) in self.nodes.into_iter().enumerate().rev() {
            let mut children = Vec::with_capacity(node.children.len());
            for edge in node.children {
                if edge.node <= index || edge.node >= count || claimed[edge.node] {
                    return Err(CoreError::InvalidGraph {
                        message: format!("node {} has an invalid child {}", index, edge.node),
                    });
                }
                claimed[edge.node] = true;
                let child = built[edge.node].take().ok_or_else(|| CoreError::InvalidGraph {
                    message: format!("node {} was not built", edge.node),
                })?;
                children.push(DependencyEdge {
                    scope: edge.scope,
                    optional: edge.optional,
                    node: child,
                });
            }
            built[index] = Some(DependencyNode {
                artifact: node.artifact,
                children,
            });
        }

        if let Some(orphan) = claimed.iter().skip(1).position(|c| !c) {
            return Err(CoreError::InvalidGraph {
                message: format!("node {} has no parent", orphan + 1),
            });
        }

        built[0].take().ok_or_else(|| CoreError::InvalidGraph {
            message: "missing root node".to_string(),
        })
    }
}

impl Serialize for DependencyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        GraphArena::from_tree(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DependencyNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        GraphArena::deserialize(deserializer)?
            .into_tree()
            .map_err(serde::de::Error::custom)
    }
}

impl DependencyNode {
    /// A root node without an artifact
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_artifact(artifact: ResolvedArtifact) -> Self {
        Self {
            artifact: Some(artifact),
            children: Vec::new(),
        }
    }

    /// Append a child reached through an edge of `scope`
    pub fn push_child(&mut self, scope: Scope, node: DependencyNode) {
        self.children.push(DependencyEdge {
            scope,
            optional: false,
            node,
        });
    }

    /// Builder form of [`push_child`](Self::push_child)
    pub fn child(mut self, scope: Scope, node: DependencyNode) -> Self {
        self.push_child(scope, node);
        self
    }

    /// Number of artifact-bearing nodes in the tree (counting repeats)
    pub fn artifact_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.artifact.is_some() {
                count += 1;
            }
            stack.extend(node.children.iter().map(|e| &e.node));
        }
        count
    }

    /// Render as tree for display
    pub fn render_tree(&self) -> String {
        let mut lines = Vec::new();
        let count = self.children.len();
        for (i, edge) in self.children.iter().enumerate() {
            render_tree_node(edge, &mut lines, "", i == count - 1);
        }
        lines.join("\n")
    }
}

fn render_tree_node(edge: &DependencyEdge, lines: &mut Vec<String>, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    let label = match &edge.node.artifact {
        Some(artifact) => {
            let mut label = artifact.coordinate().to_string();
            if !artifact.is_jar() {
                label.push_str(&format!(" ({})", artifact.extension));
            }
            label
        }
        None => "<unbound>".to_string(),
    };
    let optional = if edge.optional { " optional" } else { "" };

    lines.push(format!("{}{}{} [{}{}]", prefix, connector, label, edge.scope, optional));

    let new_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });
    let count = edge.node.children.len();
    for (i, child) in edge.node.children.iter().enumerate() {
        render_tree_node(child, lines, &new_prefix, i == count - 1);
    }
}
