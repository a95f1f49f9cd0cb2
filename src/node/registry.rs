//! Registry of node kinds.
//!
//! The editor instantiates nodes by type name through this catalog.

use std::collections::HashMap;

use super::{NodeInfo, NodeKind};

/// Factory function type for node kinds.
pub type NodeFactory = fn() -> Box<dyn NodeKind>;

/// Central catalog of node kinds, keyed by [`NodeInfo::id`].
///
/// # Example
///
/// ```ignore
/// let mut registry = NodeRegistry::new();
/// registry.register::<AddNode>();
///
/// let mut editor = GraphEditor::with_registry(registry);
/// let add = editor.create_node("math.add", None)?;
/// ```
pub struct NodeRegistry {
    factories: HashMap<&'static str, NodeFactory>,
    /// Registration order, for listing.
    infos: Vec<NodeInfo>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Registers a node kind.
    ///
    /// # Panics
    ///
    /// Panics if a kind with the same id is already registered.
    pub fn register<K: NodeKind + Default>(&mut self) {
        let info = K::default().info().clone();
        let id = info.id;

        if self.factories.contains_key(id) {
            panic!("Node type '{}' is already registered", id);
        }

        self.factories.insert(id, create_kind::<K>);
        self.infos.push(info);
    }

    /// Instantiates the kind registered under `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn NodeKind>> {
        self.factories.get(id).map(|factory| factory())
    }

    /// Information about the kind registered under `id`.
    pub fn info(&self, id: &str) -> Option<&NodeInfo> {
        self.infos.iter().find(|info| info.id == id)
    }

    /// All registered kinds, in registration order.
    pub fn list(&self) -> &[NodeInfo] {
        &self.infos
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn create_kind<K: NodeKind + Default>() -> Box<dyn NodeKind> {
    Box::new(K::default())
}
