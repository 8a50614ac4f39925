//! Graph walker and reference collector
//!
//! [`collect`] creates items only along compile and provided edges, while
//! the references of each created item come from an unpruned walk of its
//! whole subtree. Runtime-only artifacts therefore show up as references
//! (and get their own item through that walk) without being walked as new
//! roots. Both traversals use explicit stacks so deep graphs cannot
//! overflow the call stack.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use mavenref_core::{DependencyNode, ItemDefaults, OutputItem, ResolvedArtifact};

use crate::error::Result;

/// Output items keyed by item spec, in creation order
#[derive(Debug, Clone, Default)]
pub struct OutputMap {
    items: IndexMap<String, OutputItem>,
    defaults: ItemDefaults,
}

impl OutputMap {
    pub fn new(defaults: ItemDefaults) -> Self {
        Self {
            items: IndexMap::new(),
            defaults,
        }
    }

    /// Return the spec of the item for `artifact`, creating the item on first
    /// sight. Non-jar artifacts have no item. An existing item is never
    /// replaced.
    pub fn obtain_or_create(&mut self, artifact: &ResolvedArtifact) -> Result<Option<String>> {
        if !artifact.is_jar() {
            return Ok(None);
        }

        let spec = mavenref_core::item_spec(
            &artifact.group_id,
            &artifact.artifact_id,
            artifact.classifier(),
            &artifact.version,
        )?;

        match self.items.entry(spec) {
            Entry::Occupied(entry) => Ok(Some(entry.key().clone())),
            Entry::Vacant(entry) => {
                let item = OutputItem::from_artifact(artifact, &self.defaults)?;
                let spec = entry.key().clone();
                tracing::debug!("Created item {}", spec);
                entry.insert(item);
                Ok(Some(spec))
            }
        }
    }

    pub fn get(&self, spec: &str) -> Option<&OutputItem> {
        self.items.get(spec)
    }

    pub fn get_mut(&mut self, spec: &str) -> Option<&mut OutputItem> {
        self.items.get_mut(spec)
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.items.contains_key(spec)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputItem> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OutputItem> {
        self.items.values_mut()
    }

    pub fn into_items(self) -> Vec<OutputItem> {
        self.items.into_values().collect()
    }
}

enum Frame<'g> {
    Enter(&'g DependencyNode),
    Exit(&'g DependencyNode, String),
}

/// Walk `root`, creating items along compile and provided edges and wiring
/// each created item to every artifact below it.
pub fn collect(map: &mut OutputMap, root: &DependencyNode) -> Result<()> {
    let mut stack = vec![Frame::Enter(root)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                if let Some(artifact) = &node.artifact
                    && let Some(spec) = map.obtain_or_create(artifact)?
                {
                    stack.push(Frame::Exit(node, spec));
                }
                for edge in node.children.iter().rev() {
                    if edge.scope.is_compile_visible() {
                        stack.push(Frame::Enter(&edge.node));
                    }
                }
            }
            Frame::Exit(node, spec) => {
                let references = collect_references(map, node)?;
                if let Some(item) = map.get_mut(&spec) {
                    for reference in &references {
                        item.add_reference(reference);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Specs of every artifact-bearing descendant of `node`, following edges of
/// any scope, in pre-order. Items are created as needed.
pub fn collect_references(map: &mut OutputMap, node: &DependencyNode) -> Result<IndexSet<String>> {
    let mut references = IndexSet::new();
    let mut stack: Vec<&DependencyNode> = node.children.iter().rev().map(|e| &e.node).collect();

    while let Some(current) = stack.pop() {
        if let Some(artifact) = &current.artifact
            && let Some(spec) = map.obtain_or_create(artifact)?
        {
            references.insert(spec);
        }
        stack.extend(current.children.iter().rev().map(|e| &e.node));
    }

    Ok(references)
}
