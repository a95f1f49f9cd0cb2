//! The graph editor: owner of every node, parameter and connection.
//!
//! Value access lives in `values.rs`, propagation in `propagation.rs`,
//! connection management in `wiring.rs` and node-level edits in
//! `structure.rs`; all of them extend [`GraphEditor`].

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::config::GraphConfig;
use crate::error::{GraphError, ValueError};
use crate::node::{Node, NodeRegistry};
use crate::param::{
    validate_multiplicity, Callback, CallbackKind, ConnectionCallback, ConnectionHook,
    Multiplicity, Parameter, ParameterDefinition, ParameterGroup, ProcessContext, MAX_SIZE,
    PATH_SEPARATOR,
};

use super::{
    Connection, ConnectionId, NodeId, Notification, NotificationSink, ParameterArena, ParameterId,
};

/// Owns the node graph and drives propagation through it.
///
/// All mutation happens on the thread that owns the editor. Other threads
/// talk to it through [`crate::engine`] channels or [`crate::param::ValueHandle`]s.
pub struct GraphEditor {
    pub(super) config: GraphConfig,
    pub(super) registry: NodeRegistry,
    pub(super) nodes: SlotMap<NodeId, Node>,
    /// Node name to handle.
    pub(super) names: HashMap<String, NodeId>,
    pub(super) parameters: ParameterArena,
    pub(super) connections: SlotMap<ConnectionId, Connection>,
    /// Named node groups.
    pub(super) node_groups: BTreeMap<String, Vec<NodeId>>,
    pub(super) notifications: Vec<Notification>,
    /// Parameters currently being evaluated, innermost last.
    pub(super) evaluating: HashSet<ParameterId>,
    pub(super) current_frame: i32,
}

impl GraphEditor {
    /// Creates an empty editor without any node kinds.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default(), NodeRegistry::new())
    }

    /// Creates an empty editor that instantiates nodes from `registry`.
    pub fn with_registry(registry: NodeRegistry) -> Self {
        Self::with_config(GraphConfig::default(), registry)
    }

    pub fn with_config(config: GraphConfig, registry: NodeRegistry) -> Self {
        Self {
            config,
            registry,
            nodes: SlotMap::with_key(),
            names: HashMap::new(),
            parameters: SlotMap::with_key(),
            connections: SlotMap::with_key(),
            node_groups: BTreeMap::new(),
            notifications: Vec::new(),
            evaluating: HashSet::new(),
            current_frame: 0,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parameter(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.get(id)
    }

    /// The parameter arena, for group lookups.
    pub fn parameters(&self) -> &ParameterArena {
        &self.parameters
    }

    /// Resolves a parameter on `node` by path.
    pub fn parameter_id(&self, node: NodeId, path: &str) -> Option<ParameterId> {
        self.nodes.get(node)?.parameter(path, &self.parameters)
    }

    /// Resolves `"node.path"` against node names.
    pub fn parameter_by_qualified_name(&self, qualified: &str) -> Option<ParameterId> {
        let (node, path) = qualified.split_once('.')?;
        self.parameter_id(self.node_by_name(node)?, path)
    }

    /// `"node.path"` of a parameter, for messages.
    pub fn parameter_path(&self, id: ParameterId) -> String {
        let Some(parameter) = self.parameters.get(id) else {
            return "<stale parameter>".to_string();
        };
        match self.nodes.get(parameter.node()) {
            Some(node) => {
                let path = node
                    .root()
                    .path_of(id, &self.parameters)
                    .unwrap_or_else(|| parameter.name().to_string());
                format!("{}.{}", node.name(), path)
            }
            None => parameter.name().to_string(),
        }
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Adds a parameter to `node`, inside the group at `group_path` (root if `None`).
    pub fn add_parameter(
        &mut self,
        node: NodeId,
        group_path: Option<&str>,
        definition: ParameterDefinition,
    ) -> Result<ParameterId, GraphError> {
        definition.validate()?;
        let owner = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode)?;
        let group = match group_path {
            Some(path) => owner
                .root_mut()
                .group_mut(path)
                .ok_or_else(|| GraphError::UnknownParameterGroup(path.to_string()))?,
            None => owner.root_mut(),
        };
        if group.contains_name(&definition.name, &self.parameters) {
            return Err(GraphError::DuplicateParameter(definition.name));
        }
        let id = self
            .parameters
            .insert(Parameter::from_definition(node, definition));
        group.add_parameter(id);
        Ok(id)
    }

    /// Adds an empty parameter group to `node`.
    pub fn add_parameter_group(
        &mut self,
        node: NodeId,
        group_path: Option<&str>,
        group: ParameterGroup,
    ) -> Result<(), GraphError> {
        let owner = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode)?;
        let parent = match group_path {
            Some(path) => owner
                .root_mut()
                .group_mut(path)
                .ok_or_else(|| GraphError::UnknownParameterGroup(path.to_string()))?,
            None => owner.root_mut(),
        };
        if parent.contains_name(group.name(), &self.parameters) {
            return Err(GraphError::DuplicateParameter(group.name().to_string()));
        }
        parent.add_group(group);
        Ok(())
    }

    /// Creates every missing group along `path` (e.g. `"Transform.Pivot"`).
    ///
    /// Each segment is looked up among the direct children of the previous
    /// one, so a group of the same name deeper in the tree is never reused.
    pub(crate) fn ensure_parameter_group(&mut self, node: NodeId, path: &str) -> Result<(), GraphError> {
        let owner = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode)?;
        let mut group = owner.root_mut();
        for name in path.split(PATH_SEPARATOR) {
            if group.child_group(name).is_none() {
                if group.contains_name(name, &self.parameters) {
                    return Err(GraphError::DuplicateParameter(name.to_string()));
                }
                group.add_group(ParameterGroup::new(name));
            }
            group = group
                .child_group_mut(name)
                .ok_or_else(|| GraphError::UnknownParameterGroup(path.to_string()))?;
        }
        Ok(())
    }

    /// Destroys a parameter group and everything inside it.
    ///
    /// Every contained parameter is removed through
    /// [`GraphEditor::remove_parameter`], so its connections and affections
    /// are torn down before the group goes. Returns how many parameters were
    /// removed.
    pub fn remove_parameter_group(&mut self, node: NodeId, path: &str) -> Result<usize, GraphError> {
        let owner = self.nodes.get(node).ok_or(GraphError::UnknownNode)?;
        let ids = owner
            .root()
            .descendant(path)
            .ok_or_else(|| GraphError::UnknownParameterGroup(path.to_string()))?
            .parameter_ids();
        for id in &ids {
            self.remove_parameter(*id);
        }

        let (parent, name) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parent, name)) => (Some(parent), name),
            None => (None, path),
        };
        if let Some(owner) = self.nodes.get_mut(node) {
            let parent = match parent {
                Some(parent) => owner.root_mut().descendant_mut(parent),
                None => Some(owner.root_mut()),
            };
            if let Some(parent) = parent {
                parent.remove_group(name);
            }
        }
        debug!("Removed parameter group \"{}\" with {} parameter(s)", path, ids.len());
        Ok(ids.len())
    }

    /// Removes a parameter, tearing down its connections and affections.
    pub fn remove_parameter(&mut self, id: ParameterId) -> bool {
        let Some(parameter) = self.parameters.get(id) else {
            return false;
        };
        let node = parameter.node();
        let connections = parameter.connections().to_vec();
        let affecting = parameter.affecting().to_vec();
        let affected = parameter.affected().to_vec();

        for connection in connections {
            self.disconnect(connection);
        }
        for other in affecting {
            if let Some(p) = self.parameters.get_mut(other) {
                p.remove_affected(id);
            }
        }
        for other in affected {
            if let Some(p) = self.parameters.get_mut(other) {
                p.remove_affecting(id);
            }
        }
        if let Some(owner) = self.nodes.get_mut(node) {
            owner.root_mut().remove_parameter(id);
            if owner.time_parameter() == Some(id) {
                owner.set_up_time_dependencies(None);
            }
        }
        self.evaluating.remove(&id);
        self.parameters.remove(id).is_some()
    }

    /// Declares that a change of `affecting` dirties `affected`.
    ///
    /// Both sides are updated; declaring the same pair twice has no effect.
    pub fn add_affection(&mut self, affecting: ParameterId, affected: ParameterId) -> Result<(), GraphError> {
        if !self.parameters.contains_key(affecting) || !self.parameters.contains_key(affected) {
            return Err(GraphError::Value(ValueError::UnknownParameter));
        }
        if let Some(p) = self.parameters.get_mut(affecting) {
            p.add_affected(affected);
        }
        if let Some(p) = self.parameters.get_mut(affected) {
            p.add_affecting(affecting);
        }
        Ok(())
    }

    /// Removes an affection from both sides.
    pub fn remove_affection(&mut self, affecting: ParameterId, affected: ParameterId) {
        if let Some(p) = self.parameters.get_mut(affecting) {
            p.remove_affected(affected);
        }
        if let Some(p) = self.parameters.get_mut(affected) {
            p.remove_affecting(affecting);
        }
    }

    /// Installs (or clears, with `None`) a callback.
    pub fn set_callback(
        &mut self,
        id: ParameterId,
        kind: CallbackKind,
        callback: Option<Callback>,
    ) -> Result<(), GraphError> {
        let parameter = self
            .parameters
            .get_mut(id)
            .ok_or(GraphError::Value(ValueError::UnknownParameter))?;
        parameter.callbacks.set(kind, callback);
        Ok(())
    }

    /// Installs (or clears) a connection hook.
    pub fn set_connection_hook(
        &mut self,
        id: ParameterId,
        hook: ConnectionHook,
        callback: Option<ConnectionCallback>,
    ) -> Result<(), GraphError> {
        let parameter = self
            .parameters
            .get_mut(id)
            .ok_or(GraphError::Value(ValueError::UnknownParameter))?;
        parameter.callbacks.set_hook(hook, callback);
        Ok(())
    }

    // ========================================================================
    // Parameter flags
    // ========================================================================

    /// Enables or disables a parameter. Returns true if the state changed.
    pub fn set_enabled(&mut self, id: ParameterId, enabled: bool) -> bool {
        let changed = self
            .parameters
            .get_mut(id)
            .is_some_and(|p| p.set_enabled(enabled));
        if changed {
            self.notify(Notification::EnabledChanged {
                parameter: id,
                enabled,
            });
        }
        changed
    }

    pub fn set_visible(&mut self, id: ParameterId, visible: bool) {
        if let Some(p) = self.parameters.get_mut(id) {
            p.set_visible(visible);
        }
    }

    pub fn set_read_only(&mut self, id: ParameterId, read_only: bool) {
        if let Some(p) = self.parameters.get_mut(id) {
            p.set_read_only(read_only);
        }
    }

    pub fn set_self_evaluating(&mut self, id: ParameterId, self_evaluating: bool) {
        if let Some(p) = self.parameters.get_mut(id) {
            p.set_self_evaluating(self_evaluating);
        }
    }

    pub fn set_description(&mut self, id: ParameterId, description: impl Into<String>) {
        if let Some(p) = self.parameters.get_mut(id) {
            p.set_description(description.into());
        }
    }

    /// Changes how many connections an input accepts.
    ///
    /// Existing connections are kept even if they now exceed the limit.
    pub fn set_multiplicity(&mut self, id: ParameterId, multiplicity: Multiplicity) -> Result<(), ValueError> {
        let parameter = self
            .parameters
            .get_mut(id)
            .ok_or(ValueError::UnknownParameter)?;
        validate_multiplicity(parameter.ty(), multiplicity)?;
        parameter.set_multiplicity(multiplicity);
        Ok(())
    }

    /// Changes the number of values a parameter holds.
    ///
    /// Both ends of a connection must keep the same size, so a connected
    /// parameter cannot be resized; disconnect it first.
    pub fn set_size(&mut self, id: ParameterId, size: usize) -> Result<(), ValueError> {
        if size == 0 || size > MAX_SIZE {
            return Err(ValueError::InvalidSize(size));
        }
        let parameter = self
            .parameters
            .get_mut(id)
            .ok_or(ValueError::UnknownParameter)?;
        if parameter.size() != size && parameter.is_connected() {
            return Err(ValueError::Connected);
        }
        if parameter.size() != size {
            parameter.resize(size);
            self.notify(Notification::ValueChanged(id));
        }
        Ok(())
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Drains the notifications recorded since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    /// Drains pending notifications into `sink`. Returns how many were delivered.
    pub fn dispatch_notifications(&mut self, sink: &mut dyn NotificationSink) -> usize {
        let pending = self.take_notifications();
        for notification in &pending {
            sink.notify(notification);
        }
        pending.len()
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Runs a parameter's callback of the given kind. Returns false if none is set.
    pub(crate) fn run_callback(&mut self, id: ParameterId, kind: CallbackKind) -> bool {
        let Some(parameter) = self.parameters.get_mut(id) else {
            return false;
        };
        let node = parameter.node();
        let generation = parameter.callbacks.generation(kind);
        let Some(mut callback) = parameter.callbacks.take(kind) else {
            return false;
        };
        trace!("Running {} callback of \"{}\"", kind.name(), self.parameter_path(id));
        callback(&mut ProcessContext::new(self, node, id));
        if let Some(parameter) = self.parameters.get_mut(id) {
            parameter.callbacks.restore(kind, callback, generation);
        }
        true
    }

    pub(crate) fn run_connection_hook(
        &mut self,
        id: ParameterId,
        hook: ConnectionHook,
        connection: ConnectionId,
    ) -> bool {
        let Some(parameter) = self.parameters.get_mut(id) else {
            return false;
        };
        let node = parameter.node();
        let generation = parameter.callbacks.hook_generation(hook);
        let Some(mut callback) = parameter.callbacks.take_hook(hook) else {
            return false;
        };
        callback(&mut ProcessContext::new(self, node, id), connection);
        if let Some(parameter) = self.parameters.get_mut(id) {
            parameter.callbacks.restore_hook(hook, callback, generation);
        }
        true
    }

    /// Removes every node, parameter, connection and group.
    pub fn clear(&mut self) {
        let nodes: Vec<NodeId> = self.nodes.keys().collect();
        for node in nodes {
            if let Err(err) = self.delete_node(node) {
                warn!("Could not delete node while clearing: {}", err);
            }
        }
        self.node_groups.clear();
        self.current_frame = 0;
    }
}

impl Default for GraphEditor {
    fn default() -> Self {
        Self::new()
    }
}
