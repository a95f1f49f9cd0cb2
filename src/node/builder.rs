//! Building a node's parameters.

use crate::error::GraphError;
use crate::graph::{ConnectionId, GraphEditor, NodeId, ParameterId};
use crate::param::{
    CallbackKind, ConnectionHook, ParameterDefinition, ParameterGroup, ProcessContext, PATH_SEPARATOR,
};

/// Populates a freshly created node.
///
/// Parameters are added to the current group, which starts at the node's
/// root and changes inside [`NodeBuilder::group`]. Paths given to the other
/// methods are resolved against the whole node.
pub struct NodeBuilder<'a> {
    editor: &'a mut GraphEditor,
    node: NodeId,
    group_path: Vec<String>,
}

impl<'a> NodeBuilder<'a> {
    pub(crate) fn new(editor: &'a mut GraphEditor, node: NodeId) -> Self {
        Self {
            editor,
            node,
            group_path: Vec::new(),
        }
    }

    /// The node being built.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Adds a parameter to the current group.
    pub fn parameter(&mut self, definition: ParameterDefinition) -> Result<ParameterId, GraphError> {
        let group = self.current_group_path();
        self.editor
            .add_parameter(self.node, group.as_deref(), definition)
    }

    /// Adds a nested group and fills it with `contents`.
    pub fn group<F>(&mut self, name: &str, contents: F) -> Result<(), GraphError>
    where
        F: FnOnce(&mut NodeBuilder<'a>) -> Result<(), GraphError>,
    {
        let group = self.current_group_path();
        self.editor
            .add_parameter_group(self.node, group.as_deref(), ParameterGroup::new(name))?;
        self.group_path.push(name.to_string());
        let result = contents(self);
        self.group_path.pop();
        result
    }

    /// Declares that changing `affecting` dirties `affected`.
    pub fn affection(&mut self, affecting: &str, affected: &str) -> Result<(), GraphError> {
        let from = self.resolve(affecting)?;
        let to = self.resolve(affected)?;
        self.editor.add_affection(from, to)
    }

    /// Sets the callback that recomputes `path` when it is dirty.
    pub fn processing<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>) + 'static,
    {
        self.callback(path, CallbackKind::Processing, callback)
    }

    /// Sets the side effect run when `path` is aux-dirty.
    pub fn aux_processing<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>) + 'static,
    {
        self.callback(path, CallbackKind::AuxProcessing, callback)
    }

    /// Sets the callback run after an interactive edit of `path`.
    pub fn change<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>) + 'static,
    {
        self.callback(path, CallbackKind::Change, callback)
    }

    /// Sets the callback run when the command parameter `path` is triggered.
    pub fn command<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>) + 'static,
    {
        self.callback(path, CallbackKind::Command, callback)
    }

    fn callback<F>(&mut self, path: &str, kind: CallbackKind, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>) + 'static,
    {
        let id = self.resolve(path)?;
        self.editor.set_callback(id, kind, Some(Box::new(callback)))
    }

    /// Sets the hook run when a connection is established on `path`.
    pub fn on_connect<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>, ConnectionId) + 'static,
    {
        let id = self.resolve(path)?;
        self.editor
            .set_connection_hook(id, ConnectionHook::Connect, Some(Box::new(callback)))
    }

    /// Sets the hook run when a connection is removed from `path`.
    pub fn on_disconnect<F>(&mut self, path: &str, callback: F) -> Result<(), GraphError>
    where
        F: FnMut(&mut ProcessContext<'_>, ConnectionId) + 'static,
    {
        let id = self.resolve(path)?;
        self.editor
            .set_connection_hook(id, ConnectionHook::Disconnect, Some(Box::new(callback)))
    }

    /// Lets the editor's current frame drive `path`.
    pub fn time_dependent(&mut self, path: &str) -> Result<(), GraphError> {
        let id = self.resolve(path)?;
        self.editor.set_up_time_dependencies(self.node, Some(id))
    }

    /// Excludes the node from scene files.
    pub fn not_saveable(&mut self) {
        if let Some(node) = self.editor.node_mut(self.node) {
            node.set_saveable(false);
        }
    }

    /// Direct access for anything the builder does not cover.
    pub fn editor(&mut self) -> &mut GraphEditor {
        self.editor
    }

    fn resolve(&self, path: &str) -> Result<ParameterId, GraphError> {
        self.editor
            .parameter_id(self.node, path)
            .ok_or_else(|| GraphError::UnknownParameter(path.to_string()))
    }

    fn current_group_path(&self) -> Option<String> {
        if self.group_path.is_empty() {
            None
        } else {
            Some(self.group_path.join(&PATH_SEPARATOR.to_string()))
        }
    }
}
