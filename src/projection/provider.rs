use indexmap::IndexMap;
use std::sync::Arc;

use super::node::ProjectedNode;
use super::property::ProjectedProperty;
use crate::tree::path::{concat, parent_of};
use crate::tree::{
    JCR_DATA, JCR_PRIMARY_TYPE, NT_FOLDER, NT_RESOURCE, NodePath, RemoteNode, TreeSnapshot,
};

/// Path-indexed access to a snapshot, materializing nodes on demand.
///
/// Cloning is cheap: the snapshot is shared and never mutated.
#[derive(Debug, Clone)]
pub struct NodeProvider {
    snapshot: Arc<TreeSnapshot>,
    mount_point: NodePath,
}

impl NodeProvider {
    pub fn new(snapshot: Arc<TreeSnapshot>, mount_point: &str) -> Self {
        NodeProvider {
            snapshot,
            mount_point: NodePath::parse(mount_point),
        }
    }

    pub fn snapshot(&self) -> &Arc<TreeSnapshot> {
        &self.snapshot
    }

    pub fn mount_point(&self) -> &NodePath {
        &self.mount_point
    }

    /// Node at `path`.
    ///
    /// The mount point and every path above it resolve to virtual folders
    /// carrying only `jcr:primaryType`. Children of the mount point still
    /// come from the snapshot.
    pub fn get_node(&self, path: &str) -> Option<ProjectedNode> {
        let target = NodePath::parse(path);
        if target.is_ancestor_or_self(&self.mount_point) {
            return Some(self.virtual_ancestor(&target));
        }

        let key = target.to_string();
        self.snapshot
            .get(&key)
            .map(|descriptor| self.materialize(&parent_of(&key), descriptor))
    }

    /// Property at an absolute `path`, looked up on its parent node
    pub fn get_property(&self, path: &str) -> Option<ProjectedProperty> {
        let target = NodePath::parse(path);
        let name = target.name()?;
        let parent = self.get_node(&parent_of(&target.to_string()))?;
        parent.properties().find(|p| p.name() == name).cloned()
    }

    /// Children of `path` in enumeration order, materialized lazily
    pub fn get_children(&self, path: &str) -> Children {
        Children {
            provider: self.clone(),
            parent: NodePath::parse(path).to_string(),
            position: 0,
        }
    }

    fn virtual_ancestor(&self, path: &NodePath) -> ProjectedNode {
        let path = path.to_string();
        let mut properties = IndexMap::new();
        properties.insert(
            JCR_PRIMARY_TYPE.to_string(),
            ProjectedProperty::string(concat(&path, JCR_PRIMARY_TYPE), NT_FOLDER),
        );
        ProjectedNode::new(self.clone(), path, NT_FOLDER.to_string(), properties, None)
    }

    /// Turn a descriptor into a node parented at `parent`
    fn materialize(&self, parent: &str, descriptor: &RemoteNode) -> ProjectedNode {
        let path = concat(parent, descriptor.name());
        let is_resource = descriptor.primary_type() == NT_RESOURCE;

        let mut properties = IndexMap::new();
        let mut primary = None;

        for (key, attribute) in descriptor.attributes() {
            let property = ProjectedProperty::from_attribute(concat(&path, key), attribute);
            if is_resource && key == JCR_DATA {
                primary = Some(key.clone());
            }
            properties.insert(key.clone(), property);
        }

        if !properties.contains_key(JCR_PRIMARY_TYPE) {
            properties.insert(
                JCR_PRIMARY_TYPE.to_string(),
                ProjectedProperty::string(
                    concat(&path, JCR_PRIMARY_TYPE),
                    descriptor.primary_type(),
                ),
            );
        }

        ProjectedNode::new(
            self.clone(),
            path,
            descriptor.primary_type().to_string(),
            properties,
            primary,
        )
    }
}

/// Lazy iterator over a node's children
#[derive(Debug, Clone)]
pub struct Children {
    provider: NodeProvider,
    parent: String,
    position: usize,
}

impl Children {
    /// Total number of children, independent of the iteration position
    pub fn size(&self) -> usize {
        self.provider.snapshot.children(&self.parent).len()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for Children {
    type Item = ProjectedNode;

    fn next(&mut self) -> Option<ProjectedNode> {
        let descriptor = Arc::clone(
            self.provider
                .snapshot
                .children(&self.parent)
                .get(self.position)?,
        );
        self.position += 1;
        Some(self.provider.materialize(&self.parent, &descriptor))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size().saturating_sub(self.position);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<ProjectedNode> {
        self.position = self.position.saturating_add(n);
        self.next()
    }
}

impl ExactSizeIterator for Children {}
