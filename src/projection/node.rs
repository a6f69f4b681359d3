use indexmap::IndexMap;

use super::property::ProjectedProperty;
use super::provider::{Children, NodeProvider};
use super::value::Value;
use crate::error::{MountError, Result};
use crate::tree::NodePath;
use crate::tree::path::{concat, name_of, parent_of};

/// A materialized, read-only node.
///
/// Created per lookup and never cached: two lookups of one path give two
/// equal but independent instances. Every mutating operation is rejected
/// with a fixed error (see [`MountError`]).
#[derive(Debug, Clone)]
pub struct ProjectedNode {
    provider: NodeProvider,
    path: String,
    primary_type: String,
    properties: IndexMap<String, ProjectedProperty>,
    /// Name of the property designated as primary item
    primary: Option<String>,
}

impl ProjectedNode {
    pub(crate) fn new(
        provider: NodeProvider,
        path: String,
        primary_type: String,
        properties: IndexMap<String, ProjectedProperty>,
        primary: Option<String>,
    ) -> Self {
        ProjectedNode {
            provider,
            path,
            primary_type,
            properties,
            primary,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        name_of(&self.path)
    }

    pub fn depth(&self) -> usize {
        NodePath::parse(&self.path).depth()
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Nodes carry no stable identifier, so identity is the path
    pub fn identifier(&self) -> &str {
        &self.path
    }

    pub fn uuid(&self) -> Result<String> {
        Err(MountError::unsupported("uuid"))
    }

    /// Same-name siblings do not exist
    pub fn index(&self) -> usize {
        0
    }

    pub fn is_node(&self) -> bool {
        true
    }

    pub fn is_same(&self, other: &ProjectedNode) -> bool {
        self.path == other.path
    }

    /// Property by name, relative path (`jcr:content/jcr:data`) or absolute path
    pub fn property(&self, rel_path: &str) -> Result<ProjectedProperty> {
        if rel_path.contains('/') {
            let full = self.resolve(rel_path);
            return self
                .provider
                .get_property(&full)
                .ok_or_else(|| MountError::not_found(full));
        }

        self.properties
            .get(rel_path)
            .cloned()
            .ok_or_else(|| MountError::not_found(concat(&self.path, rel_path)))
    }

    pub fn has_property(&self, rel_path: &str) -> bool {
        if rel_path.contains('/') {
            return self.provider.get_property(&self.resolve(rel_path)).is_some();
        }
        self.properties.contains_key(rel_path)
    }

    /// Properties in descriptor order
    pub fn properties(&self) -> impl Iterator<Item = &ProjectedProperty> {
        self.properties.values()
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// The designated primary item (the payload of a resource node)
    pub fn primary_item(&self) -> Result<ProjectedProperty> {
        self.primary
            .as_deref()
            .and_then(|name| self.properties.get(name))
            .cloned()
            .ok_or_else(|| MountError::ItemNotFound {
                name: format!("primary item of {}", self.path),
            })
    }

    /// Node at a path relative to this one
    pub fn node(&self, rel_path: &str) -> Result<ProjectedNode> {
        let full = self.resolve(rel_path);
        self.provider
            .get_node(&full)
            .ok_or_else(|| MountError::not_found(full))
    }

    pub fn has_node(&self, rel_path: &str) -> bool {
        self.provider.get_node(&self.resolve(rel_path)).is_some()
    }

    /// Children in remote enumeration order
    pub fn children(&self) -> Children {
        self.provider.get_children(&self.path)
    }

    pub fn has_children(&self) -> bool {
        self.children().size() > 0
    }

    pub fn parent(&self) -> Result<ProjectedNode> {
        if NodePath::parse(&self.path).is_root() {
            return Err(MountError::ItemNotFound {
                name: "parent of /".to_string(),
            });
        }
        let parent = parent_of(&self.path);
        self.provider
            .get_node(&parent)
            .ok_or_else(|| MountError::not_found(parent))
    }

    /// Ancestor at `depth` (0 is the root)
    pub fn ancestor(&self, depth: usize) -> Result<ProjectedNode> {
        let path = NodePath::parse(&self.path);
        if depth > path.depth() {
            return Err(MountError::ItemNotFound {
                name: format!("ancestor {depth} of {}", self.path),
            });
        }
        let ancestor = NodePath::parse(&path.segments()[..depth].join("/")).to_string();
        self.provider
            .get_node(&ancestor)
            .ok_or_else(|| MountError::not_found(ancestor))
    }

    /// No type registry is available, so only the primary type name matches
    pub fn is_node_type(&self, node_type: &str) -> bool {
        self.primary_type == node_type
    }

    pub fn mixin_types(&self) -> &[String] {
        &[]
    }

    pub fn can_add_mixin(&self, _mixin: &str) -> bool {
        false
    }

    pub fn references(&self) -> Vec<ProjectedProperty> {
        Vec::new()
    }

    pub fn weak_references(&self) -> Vec<ProjectedProperty> {
        Vec::new()
    }

    pub fn is_new(&self) -> bool {
        false
    }

    pub fn is_modified(&self) -> bool {
        false
    }

    pub fn is_checked_out(&self) -> bool {
        true
    }

    pub fn is_locked(&self) -> bool {
        false
    }

    pub fn holds_lock(&self) -> bool {
        false
    }

    /// Accepted; there is never anything to persist
    pub fn save(&self) -> Result<()> {
        Ok(())
    }

    pub fn refresh(&self, _keep_changes: bool) -> Result<()> {
        Ok(())
    }

    fn resolve(&self, rel_path: &str) -> String {
        if rel_path.starts_with('/') {
            NodePath::parse(rel_path).to_string()
        } else {
            NodePath::parse(&self.path).join(rel_path).to_string()
        }
    }

    // Structural mutations

    pub fn set_property(&self, name: &str, _value: Value) -> Result<ProjectedProperty> {
        Err(MountError::constraint("set_property", concat(&self.path, name)))
    }

    pub fn add_node(&self, rel_path: &str, _primary_type: Option<&str>) -> Result<ProjectedNode> {
        Err(MountError::constraint("add_node", self.resolve(rel_path)))
    }

    pub fn order_before(&self, _src: &str, _dest: Option<&str>) -> Result<()> {
        Err(MountError::constraint("order_before", &self.path))
    }

    pub fn set_primary_type(&self, _node_type: &str) -> Result<()> {
        Err(MountError::constraint("set_primary_type", &self.path))
    }

    pub fn add_mixin(&self, _mixin: &str) -> Result<()> {
        Err(MountError::constraint("add_mixin", &self.path))
    }

    pub fn remove_mixin(&self, _mixin: &str) -> Result<()> {
        Err(MountError::constraint("remove_mixin", &self.path))
    }

    pub fn remove(&self) -> Result<()> {
        Err(MountError::AccessDenied {
            operation: "remove",
            path: self.path.clone(),
        })
    }

    // Versioning, locking and workspace operations

    pub fn checkin(&self) -> Result<()> {
        Err(MountError::unsupported("checkin"))
    }

    pub fn checkout(&self) -> Result<()> {
        Err(MountError::unsupported("checkout"))
    }

    pub fn restore(&self, _version: &str, _remove_existing: bool) -> Result<()> {
        Err(MountError::unsupported("restore"))
    }

    pub fn restore_by_label(&self, _label: &str, _remove_existing: bool) -> Result<()> {
        Err(MountError::unsupported("restore_by_label"))
    }

    pub fn merge(&self, _src_workspace: &str, _best_effort: bool) -> Result<Children> {
        Err(MountError::unsupported("merge"))
    }

    pub fn done_merge(&self, _version: &str) -> Result<()> {
        Err(MountError::unsupported("done_merge"))
    }

    pub fn cancel_merge(&self, _version: &str) -> Result<()> {
        Err(MountError::unsupported("cancel_merge"))
    }

    pub fn update(&self, _src_workspace: &str) -> Result<()> {
        Err(MountError::unsupported("update"))
    }

    pub fn corresponding_node_path(&self, _workspace: &str) -> Result<String> {
        Err(MountError::unsupported("corresponding_node_path"))
    }

    pub fn lock(&self, _is_deep: bool, _session_scoped: bool) -> Result<()> {
        Err(MountError::unsupported("lock"))
    }

    pub fn unlock(&self) -> Result<()> {
        Err(MountError::unsupported("unlock"))
    }

    pub fn get_lock(&self) -> Result<()> {
        Err(MountError::unsupported("get_lock"))
    }

    pub fn follow_lifecycle_transition(&self, _transition: &str) -> Result<()> {
        Err(MountError::unsupported("follow_lifecycle_transition"))
    }

    pub fn allowed_lifecycle_transitions(&self) -> Result<Vec<String>> {
        Err(MountError::unsupported("allowed_lifecycle_transitions"))
    }
}

/// Structural equality: same path, type and properties
impl PartialEq for ProjectedNode {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.primary_type == other.primary_type
            && self.primary == other.primary
            && self.properties == other.properties
    }
}
