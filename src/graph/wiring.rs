//! Creating and removing connections.

use log::{debug, error};

use crate::error::ConnectError;
use crate::param::{ConnectionHook, Multiplicity, ParameterDefinition, ParameterType, PinKind, PATH_SEPARATOR};

use super::{validate_connection, Connection, ConnectionId, GraphEditor, NodeId, Notification, ParameterId};

impl GraphEditor {
    /// Connects `source_node.source_path` (an output) to
    /// `target_node.target_path` (an input).
    ///
    /// On placeholder nodes a missing parameter is synthesized to match the
    /// other end. Every failure is logged and leaves the connections as they were.
    pub fn connect_parameters(
        &mut self,
        source_node: NodeId,
        source_path: &str,
        target_node: NodeId,
        target_path: &str,
    ) -> Result<ConnectionId, ConnectError> {
        let result = self
            .resolve_endpoints(source_node, source_path, target_node, target_path)
            .and_then(|(source, target)| self.connect(source, target));
        if let Err(err) = &result {
            error!(
                "Could not connect \"{}.{}\" to \"{}.{}\": {}",
                self.node_name(source_node),
                source_path,
                self.node_name(target_node),
                target_path,
                err
            );
        }
        result
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|n| n.name()).unwrap_or("<unknown>")
    }

    fn resolve_endpoints(
        &mut self,
        source_node: NodeId,
        source_path: &str,
        target_node: NodeId,
        target_path: &str,
    ) -> Result<(ParameterId, ParameterId), ConnectError> {
        let source_owner = self.nodes.get(source_node).ok_or(ConnectError::UnknownNode)?;
        let target_owner = self.nodes.get(target_node).ok_or(ConnectError::UnknownNode)?;
        let source_unknown = source_owner.is_type_unknown();
        let target_unknown = target_owner.is_type_unknown();
        let existing_source = source_owner.parameter(source_path, &self.parameters);
        let existing_target = target_owner.parameter(target_path, &self.parameters);

        let source = match existing_source {
            Some(id) => Some(id),
            None if source_unknown => {
                self.synthesize_pin(source_node, source_path, PinKind::Output, existing_target)
            }
            None => None,
        };
        let source = source.ok_or_else(|| ConnectError::UnknownParameter {
            node: self.node_name(source_node).to_string(),
            path: source_path.to_string(),
        })?;
        let target = match existing_target {
            Some(id) => Some(id),
            None if target_unknown => {
                self.synthesize_pin(target_node, target_path, PinKind::Input, Some(source))
            }
            None => None,
        };
        let target = target.ok_or_else(|| ConnectError::UnknownParameter {
            node: self.node_name(target_node).to_string(),
            path: target_path.to_string(),
        })?;
        Ok((source, target))
    }

    /// Adds a stand-in parameter to a placeholder node, shaped like `peer`.
    fn synthesize_pin(
        &mut self,
        node: NodeId,
        path: &str,
        pin: PinKind,
        peer: Option<ParameterId>,
    ) -> Option<ParameterId> {
        let (ty, size) = peer
            .and_then(|p| self.parameters.get(p))
            .map(|p| (p.ty(), p.size()))
            .unwrap_or((ParameterType::Generic, 1));
        let (group, name) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((group, name)) => (Some(group), name),
            None => (None, path),
        };
        let mut definition = ParameterDefinition::new(name, ty).with_pin(pin).with_size(size);
        if pin.is_input() && ty.supports_multiplicity() {
            definition = definition.with_multiplicity(Multiplicity::OneOrMore);
        }
        if let Some(group) = group {
            self.ensure_parameter_group(node, group).ok()?;
        }
        let id = self.add_parameter(node, group, definition).ok()?;
        debug!("Synthesized {} \"{}\" on placeholder node", pin.name(), self.parameter_path(id));
        Some(id)
    }

    /// Connects two parameters by handle.
    ///
    /// After validation the connection is registered on both ends, both ends
    /// are notified and the target is dirtied.
    pub fn connect(&mut self, source: ParameterId, target: ParameterId) -> Result<ConnectionId, ConnectError> {
        let source_param = self.parameters.get(source).ok_or(ConnectError::StaleParameter)?;
        let target_param = self.parameters.get(target).ok_or(ConnectError::StaleParameter)?;
        validate_connection(source_param, target_param)?;

        let id = self
            .connections
            .insert_with_key(|id| Connection::new(id, source, target));
        for endpoint in [source, target] {
            if let Some(p) = self.parameters.get_mut(endpoint) {
                p.add_connection(id);
            }
        }
        self.notify(Notification::ConnectionCreated(id));
        for endpoint in [source, target] {
            self.notify(Notification::ConnectionEstablished {
                parameter: endpoint,
                connection: id,
            });
            self.run_connection_hook(endpoint, ConnectionHook::Connect, id);
        }
        debug!(
            "Connected \"{}\" to \"{}\"",
            self.parameter_path(source),
            self.parameter_path(target)
        );
        self.propagate_dirty(target, true);
        Ok(id)
    }

    /// Removes a connection. Returns false if it did not exist.
    ///
    /// The target hears about it before the connection is detached, the
    /// source afterwards. Nothing is dirtied; nodes that care react in their
    /// disconnect hooks.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.connections.get(id).copied() else {
            return false;
        };
        let (source, target) = (connection.source(), connection.target());

        self.notify(Notification::ConnectionDestroyed {
            parameter: target,
            connection: id,
        });
        self.run_connection_hook(target, ConnectionHook::Disconnect, id);

        for endpoint in [source, target] {
            if let Some(p) = self.parameters.get_mut(endpoint) {
                p.remove_connection(id);
            }
        }
        self.connections.remove(id);

        self.notify(Notification::ConnectionDestroyed {
            parameter: source,
            connection: id,
        });
        self.run_connection_hook(source, ConnectionHook::Disconnect, id);
        debug!(
            "Disconnected \"{}\" from \"{}\"",
            self.parameter_path(source),
            self.parameter_path(target)
        );
        true
    }

    /// Removes every connection of a parameter. Returns how many were removed.
    pub fn disconnect_parameter(&mut self, id: ParameterId) -> usize {
        let connections = self
            .parameters
            .get(id)
            .map(|p| p.connections().to_vec())
            .unwrap_or_default();
        connections
            .into_iter()
            .filter(|c| self.disconnect(*c))
            .count()
    }

    /// Connects every parameter of `source_node` to the parameter with the
    /// same path on `target_node`.
    ///
    /// Each pair succeeds or fails on its own; the result lists every
    /// attempted path with its outcome.
    pub fn connect_by_name(
        &mut self,
        source_node: NodeId,
        target_node: NodeId,
    ) -> Vec<(String, Result<ConnectionId, ConnectError>)> {
        let (Some(source), Some(target)) = (self.nodes.get(source_node), self.nodes.get(target_node))
        else {
            return Vec::new();
        };
        let pairs: Vec<String> = source
            .parameter_ids()
            .into_iter()
            .filter_map(|id| source.root().path_of(id, &self.parameters))
            .filter(|path| target.parameter(path, &self.parameters).is_some())
            .collect();

        pairs
            .into_iter()
            .map(|path| {
                let result = self.connect_parameters(source_node, &path, target_node, &path);
                (path, result)
            })
            .collect()
    }

    /// Connections between two nodes, in either direction.
    pub fn connections_between(&self, a: NodeId, b: NodeId) -> Vec<ConnectionId> {
        self.connections
            .values()
            .filter(|c| {
                let ends = (
                    self.parameters.get(c.source()).map(|p| p.node()),
                    self.parameters.get(c.target()).map(|p| p.node()),
                );
                ends == (Some(a), Some(b)) || ends == (Some(b), Some(a))
            })
            .map(|c| c.id())
            .collect()
    }
}
