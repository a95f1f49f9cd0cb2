//! Nodes: named owners of a parameter tree.

use crate::graph::{ParameterArena, ParameterId};
use crate::param::ParameterGroup;

/// Name of every node's root parameter group.
pub const ROOT_GROUP_NAME: &str = "Parameters";

/// A node in the graph.
///
/// The node owns its parameter tree; the parameters themselves sit in the
/// editor's arena and point back at the node.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    type_name: String,
    root: ParameterGroup,
    type_unknown: bool,
    saveable: bool,
    time_parameter: Option<ParameterId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            root: ParameterGroup::new(ROOT_GROUP_NAME),
            type_unknown: false,
            saveable: true,
            time_parameter: None,
        }
    }

    /// A stand-in for a node whose type is not registered.
    ///
    /// Its parameters are synthesized on demand so that loaded connections
    /// survive.
    pub(crate) fn placeholder(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_unknown: true,
            ..Self::new(name, type_name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// True for placeholder nodes created for unregistered types.
    pub fn is_type_unknown(&self) -> bool {
        self.type_unknown
    }

    /// Whether the node is written to scene files.
    pub fn is_saveable(&self) -> bool {
        self.saveable
    }

    /// The parameter driven by the editor's current frame, if any.
    pub fn time_parameter(&self) -> Option<ParameterId> {
        self.time_parameter
    }

    pub fn root(&self) -> &ParameterGroup {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut ParameterGroup {
        &mut self.root
    }

    /// Resolves a parameter by path, see [`ParameterGroup::parameter`].
    pub fn parameter(&self, path: &str, arena: &ParameterArena) -> Option<ParameterId> {
        self.root.parameter(path, arena)
    }

    /// Resolves a parameter group by path; an empty path is the root.
    pub fn parameter_group(&self, path: &str) -> Option<&ParameterGroup> {
        if path.is_empty() {
            Some(&self.root)
        } else {
            self.root.group(path)
        }
    }

    /// All parameters in display order.
    pub fn parameter_ids(&self) -> Vec<ParameterId> {
        self.root.parameter_ids()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_saveable(&mut self, saveable: bool) {
        self.saveable = saveable;
    }

    /// Hooks the node up to frame changes through `parameter`.
    pub(crate) fn set_up_time_dependencies(&mut self, parameter: Option<ParameterId>) {
        self.time_parameter = parameter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node() {
        let node = Node::new("Add1", "math.add");
        assert_eq!(node.name(), "Add1");
        assert_eq!(node.type_name(), "math.add");
        assert!(node.is_saveable());
        assert!(!node.is_type_unknown());
        assert!(node.root().is_empty());
        assert_eq!(node.parameter_group("").map(|g| g.name()), Some(ROOT_GROUP_NAME));
    }

    #[test]
    fn test_placeholder_node() {
        let node = Node::placeholder("Legacy", "render.ogre");
        assert!(node.is_type_unknown());
        assert_eq!(node.type_name(), "render.ogre");
    }
}
