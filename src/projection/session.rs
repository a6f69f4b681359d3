use super::node::ProjectedNode;
use super::property::ProjectedProperty;
use super::provider::NodeProvider;
use super::query::{MountRoot, QueryManager};
use crate::error::{MountError, Result};
use crate::tree::NodePath;

/// Either side of a path lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Node(ProjectedNode),
    Property(ProjectedProperty),
}

impl Item {
    pub fn path(&self) -> &str {
        match self {
            Item::Node(node) => node.path(),
            Item::Property(property) => property.path(),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    pub fn as_node(&self) -> Option<&ProjectedNode> {
        match self {
            Item::Node(node) => Some(node),
            Item::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&ProjectedProperty> {
        match self {
            Item::Node(_) => None,
            Item::Property(property) => Some(property),
        }
    }
}

/// Read-only view over a mounted snapshot, addressed by absolute path
#[derive(Debug, Clone)]
pub struct Session {
    provider: NodeProvider,
}

impl Session {
    pub fn new(provider: NodeProvider) -> Self {
        Session { provider }
    }

    pub fn provider(&self) -> &NodeProvider {
        &self.provider
    }

    pub fn mount_point(&self) -> String {
        self.provider.mount_point().to_string()
    }

    /// The repository root, always a virtual folder
    pub fn root_node(&self) -> Result<ProjectedNode> {
        self.get_node("/")
    }

    pub fn get_node_or_none(&self, path: &str) -> Option<ProjectedNode> {
        self.provider.get_node(path)
    }

    pub fn get_node(&self, path: &str) -> Result<ProjectedNode> {
        self.provider
            .get_node(path)
            .ok_or_else(|| MountError::not_found(path))
    }

    pub fn get_property_or_none(&self, path: &str) -> Option<ProjectedProperty> {
        self.provider.get_property(path)
    }

    pub fn get_property(&self, path: &str) -> Result<ProjectedProperty> {
        self.provider
            .get_property(path)
            .ok_or_else(|| MountError::not_found(path))
    }

    /// Node at `path`, or else the property of that name on the parent node
    pub fn get_item(&self, path: &str) -> Result<Item> {
        if let Some(node) = self.provider.get_node(path) {
            return Ok(Item::Node(node));
        }
        self.get_property(path).map(Item::Property)
    }

    pub fn node_exists(&self, path: &str) -> bool {
        self.provider.get_node(path).is_some()
    }

    pub fn property_exists(&self, path: &str) -> bool {
        self.provider.get_property(path).is_some()
    }

    pub fn item_exists(&self, path: &str) -> bool {
        self.node_exists(path) || self.property_exists(path)
    }

    /// Query manager whose only mount root is this session's mount point
    pub fn query_manager(&self) -> QueryManager {
        let root = MountRoot::Path(NodePath::parse(&self.mount_point()));
        QueryManager::new(self.clone(), vec![root])
    }

    pub fn has_pending_changes(&self) -> bool {
        false
    }

    pub fn save(&self) -> Result<()> {
        Ok(())
    }

    pub fn refresh(&self, _keep_changes: bool) -> Result<()> {
        Ok(())
    }

    pub fn remove_item(&self, path: &str) -> Result<()> {
        match self.get_item(path) {
            Ok(Item::Node(node)) => node.remove(),
            Ok(Item::Property(property)) => property.remove(),
            Err(err) => Err(err),
        }
    }

    pub fn move_item(&self, _src: &str, _dest: &str) -> Result<()> {
        Err(MountError::unsupported("move"))
    }

    /// Workspace copy
    pub fn copy(&self, _src: &str, _dest: &str) -> Result<()> {
        Err(MountError::unsupported("copy"))
    }
}
