//! Node-level edits: creation, deletion, renaming and node groups.

use log::{debug, error, info, warn};

use crate::error::{GraphError, ValueError};
use crate::node::{Node, NodeBuilder};
use crate::param::{CallbackKind, Key, ParameterType, Value};

use super::{ConnectionId, GraphEditor, NodeId, Notification, ParameterId};

/// Turns an arbitrary string into a valid node name.
///
/// German umlauts are transliterated, every other character outside
/// `[A-Za-z0-9_]` becomes an underscore.
pub fn sanitize_node_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'ß' => sanitized.push_str("ss"),
            'ä' => sanitized.push_str("ae"),
            'ö' => sanitized.push_str("oe"),
            'ü' => sanitized.push_str("ue"),
            'Ä' => sanitized.push_str("Ae"),
            'Ö' => sanitized.push_str("Oe"),
            'Ü' => sanitized.push_str("Ue"),
            c if c.is_ascii_alphanumeric() || c == '_' => sanitized.push(c),
            _ => sanitized.push('_'),
        }
    }
    sanitized
}

impl GraphEditor {
    /// Instantiates a registered node kind.
    ///
    /// Without a name, one is derived from the kind's display name. A
    /// kind whose build fails leaves nothing behind.
    pub fn create_node(&mut self, type_id: &str, name: Option<&str>) -> Result<NodeId, GraphError> {
        let Some(kind) = self.registry.create(type_id) else {
            error!("Unknown node type \"{}\"", type_id);
            return Err(GraphError::UnknownNodeType(type_id.to_string()));
        };
        let name = match name {
            Some(name) => self.claim_name(name)?,
            None => self.unique_name(kind.info().name),
        };
        let id = self.insert_node(Node::new(name, type_id));

        if let Err(err) = kind.build(&mut NodeBuilder::new(self, id)) {
            error!("Could not build node of type \"{}\": {}", type_id, err);
            // The node was just inserted, so deletion cannot fail.
            let _ = self.delete_node(id);
            return Err(err);
        }
        self.notify(Notification::NodeCreated(id));
        debug!("Created {} node \"{}\"", type_id, self.node_name_of(id));
        Ok(id)
    }

    /// Creates an empty stand-in for a node type that is not registered.
    ///
    /// Parameters appear on it as connections ask for them.
    pub fn create_placeholder_node(&mut self, type_name: &str, name: &str) -> Result<NodeId, GraphError> {
        let name = self.claim_name(name)?;
        warn!("Creating placeholder \"{}\" for node type \"{}\"", name, type_name);
        let id = self.insert_node(Node::placeholder(name, type_name));
        self.notify(Notification::NodeCreated(id));
        Ok(id)
    }

    fn insert_node(&mut self, node: Node) -> NodeId {
        let name = node.name().to_string();
        let id = self.nodes.insert(node);
        self.names.insert(name, id);
        id
    }

    fn node_name_of(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|n| n.name()).unwrap_or("")
    }

    /// Sanitizes `name` and checks that it is free.
    fn claim_name(&self, name: &str) -> Result<String, GraphError> {
        let name = sanitize_node_name(name);
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateNodeName(name));
        }
        Ok(name)
    }

    pub(crate) fn unique_name(&self, base: &str) -> String {
        let base = sanitize_node_name(base);
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or(base)
    }

    /// Removes a node after disconnecting all of its parameters.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let Some(node) = self.nodes.get(id) else {
            error!("Cannot delete node: handle is stale");
            return Err(GraphError::UnknownNode);
        };
        let name = node.name().to_string();
        let parameters = node.parameter_ids();

        for parameter in &parameters {
            self.disconnect_parameter(*parameter);
        }
        for parameter in parameters {
            self.remove_parameter(parameter);
        }
        self.nodes.remove(id);
        self.names.remove(&name);
        self.node_groups.retain(|_, members| {
            members.retain(|n| *n != id);
            !members.is_empty()
        });
        self.notify(Notification::NodeDeleted(id));
        debug!("Deleted node \"{}\"", name);
        Ok(())
    }

    /// Creates a node of the same type and copies every edited value.
    pub fn duplicate_node(&mut self, id: NodeId) -> Result<NodeId, GraphError> {
        let node = self.nodes.get(id).ok_or(GraphError::UnknownNode)?;
        let type_name = node.type_name().to_string();
        let base = node.name().trim_end_matches(|c: char| c.is_ascii_digit()).to_string();
        let copy = if node.is_type_unknown() {
            let name = self.unique_name(&base);
            self.create_placeholder_node(&type_name, &name)?
        } else {
            let name = self.unique_name(&base);
            self.create_node(&type_name, Some(&name))?
        };

        let edited: Vec<(String, Vec<Value>, Vec<Key>)> = self
            .nodes
            .get(id)
            .map(|n| {
                n.parameter_ids()
                    .into_iter()
                    .filter_map(|p| {
                        let parameter = self.parameters.get(p)?;
                        if (parameter.has_default_value() && !parameter.is_animated())
                            || !parameter.ty().is_persistable()
                            || parameter.has_callback(CallbackKind::Processing)
                        {
                            return None;
                        }
                        Some((
                            n.root().path_of(p, &self.parameters)?,
                            parameter.values(),
                            parameter.keys().to_vec(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();
        for (path, values, keys) in edited {
            let Some(target) = self.parameter_id(copy, &path) else {
                continue;
            };
            if let Err(err) = self.set_values(target, values, true) {
                warn!("Could not copy \"{}\" while duplicating: {}", path, err);
            }
            for key in keys {
                if let Err(err) = self.add_key(target, key) {
                    warn!("Could not copy a key of \"{}\" while duplicating: {}", path, err);
                }
            }
        }
        Ok(copy)
    }

    /// Renames a node. Returns the name actually given, after sanitizing.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<String, GraphError> {
        let node = self.nodes.get(id).ok_or(GraphError::UnknownNode)?;
        let old = node.name().to_string();
        let new = sanitize_node_name(name);
        if new == old {
            debug!("Node \"{}\" already has that name", old);
            return Ok(new);
        }
        if self.names.contains_key(&new) {
            warn!("Cannot rename \"{}\": a node named \"{}\" already exists", old, new);
            return Err(GraphError::DuplicateNodeName(new));
        }
        self.names.remove(&old);
        self.names.insert(new.clone(), id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_name(new.clone());
        }
        self.notify(Notification::NodeRenamed(id));
        info!("Renamed node \"{}\" to \"{}\"", old, new);
        Ok(new)
    }

    /// Lets the current frame drive `parameter` of `node` (or stops it, with `None`).
    ///
    /// The parameter must belong to the node and be an integer or float.
    pub fn set_up_time_dependencies(
        &mut self,
        node: NodeId,
        parameter: Option<ParameterId>,
    ) -> Result<(), GraphError> {
        if !self.nodes.contains_key(node) {
            return Err(GraphError::UnknownNode);
        }
        if let Some(id) = parameter {
            let p = self
                .parameters
                .get(id)
                .filter(|p| p.node() == node)
                .ok_or(GraphError::Value(ValueError::UnknownParameter))?;
            if !matches!(
                p.ty(),
                ParameterType::Int | ParameterType::UnsignedInt | ParameterType::Float
            ) {
                return Err(GraphError::Value(ValueError::TypeMismatch {
                    expected: ParameterType::Int,
                    found: p.ty(),
                }));
            }
        }
        if let Some(owner) = self.nodes.get_mut(node) {
            owner.set_up_time_dependencies(parameter);
        }
        Ok(())
    }

    // ========================================================================
    // Node groups
    // ========================================================================

    /// Collects `nodes` under a new group name.
    ///
    /// A node belongs to at most one group; grouping it again moves it.
    pub fn group_nodes(&mut self, name: &str, nodes: &[NodeId]) -> Result<(), GraphError> {
        if self.node_groups.contains_key(name) {
            return Err(GraphError::DuplicateGroup(name.to_string()));
        }
        if nodes.iter().any(|n| !self.nodes.contains_key(*n)) {
            return Err(GraphError::UnknownNode);
        }
        self.node_groups.retain(|_, members| {
            members.retain(|n| !nodes.contains(n));
            !members.is_empty()
        });
        let mut members: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !members.contains(node) {
                members.push(*node);
            }
        }
        self.node_groups.insert(name.to_string(), members);
        debug!("Grouped {} node(s) as \"{}\"", nodes.len(), name);
        Ok(())
    }

    /// Dissolves a group. Returns its former members.
    pub fn ungroup_nodes(&mut self, name: &str) -> Result<Vec<NodeId>, GraphError> {
        self.node_groups
            .remove(name)
            .ok_or_else(|| GraphError::UnknownGroup(name.to_string()))
    }

    pub fn group_of(&self, node: NodeId) -> Option<&str> {
        self.node_groups
            .iter()
            .find(|(_, members)| members.contains(&node))
            .map(|(name, _)| name.as_str())
    }

    pub fn grouped_nodes(&self, name: &str) -> Option<&[NodeId]> {
        self.node_groups.get(name).map(Vec::as_slice)
    }

    /// Every group with its members, ordered by name.
    pub fn node_groups(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.node_groups
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Connections with exactly one end inside the group.
    pub fn group_boundary_connections(&self, name: &str) -> Vec<ConnectionId> {
        let Some(members) = self.node_groups.get(name) else {
            return Vec::new();
        };
        let inside = |p: ParameterId| {
            self.parameters
                .get(p)
                .is_some_and(|p| members.contains(&p.node()))
        };
        self.connections
            .values()
            .filter(|c| inside(c.source()) != inside(c.target()))
            .map(|c| c.id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeCategory, NodeInfo, NodeKind, NodeRegistry};
    use crate::param::ParameterDefinition;

    struct Pass {
        info: NodeInfo,
    }

    impl Default for Pass {
        fn default() -> Self {
            Self {
                info: NodeInfo::new("test.pass", "Pass", NodeCategory::Utility, "Copies In to Out"),
            }
        }
    }

    impl NodeKind for Pass {
        fn info(&self) -> &NodeInfo {
            &self.info
        }

        fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
            node.parameter(ParameterDefinition::float("In", 0.0).input())?;
            node.parameter(ParameterDefinition::float("Out", 0.0).output())?;
            node.parameter(ParameterDefinition::float("Gain", 1.0))?;
            node.affection("In", "Out")?;
            node.processing("Out", |ctx| {
                let value = ctx.float("In") * ctx.float("Gain");
                ctx.set_own_value(Value::Float(value));
            })
        }
    }

    struct Broken {
        info: NodeInfo,
    }

    impl Default for Broken {
        fn default() -> Self {
            Self {
                info: NodeInfo::new("test.broken", "Broken", NodeCategory::Utility, "Fails to build"),
            }
        }
    }

    impl NodeKind for Broken {
        fn info(&self) -> &NodeInfo {
            &self.info
        }

        fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
            node.parameter(ParameterDefinition::float("X", 0.0))?;
            node.affection("X", "Missing")
        }
    }

    fn editor() -> GraphEditor {
        let mut registry = NodeRegistry::new();
        registry.register::<Pass>();
        registry.register::<Broken>();
        GraphEditor::with_registry(registry)
    }

    #[test]
    fn test_sanitize_node_name() {
        assert_eq!(sanitize_node_name("Größe"), "Groesse");
        assert_eq!(sanitize_node_name("Über Äpfel"), "Ueber_Aepfel");
        assert_eq!(sanitize_node_name("a-b.c"), "a_b_c");
        assert_eq!(sanitize_node_name("Plain_1"), "Plain_1");
    }

    #[test]
    fn test_create_node_generates_names() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", None).unwrap();
        let b = editor.create_node("test.pass", None).unwrap();
        assert_eq!(editor.node(a).unwrap().name(), "Pass1");
        assert_eq!(editor.node(b).unwrap().name(), "Pass2");
        assert_eq!(editor.node_by_name("Pass2"), Some(b));
        assert!(editor.parameter_id(a, "Gain").is_some());
        assert!(editor
            .take_notifications()
            .contains(&Notification::NodeCreated(a)));
    }

    #[test]
    fn test_create_node_errors() {
        let mut editor = editor();
        assert_eq!(
            editor.create_node("test.missing", None),
            Err(GraphError::UnknownNodeType("test.missing".to_string()))
        );
        editor.create_node("test.pass", Some("P")).unwrap();
        assert_eq!(
            editor.create_node("test.pass", Some("P")),
            Err(GraphError::DuplicateNodeName("P".to_string()))
        );
        assert_eq!(
            editor.create_node("test.broken", Some("B")),
            Err(GraphError::UnknownParameter("Missing".to_string()))
        );
        assert_eq!(editor.node_by_name("B"), None);
        assert_eq!(editor.node_count(), 1);
        assert_eq!(editor.parameters().len(), 3);
    }

    #[test]
    fn test_delete_node_tears_down_connections() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("A")).unwrap();
        let b = editor.create_node("test.pass", Some("B")).unwrap();
        let c = editor.connect_parameters(a, "Out", b, "In").unwrap();
        let b_in = editor.parameter_id(b, "In").unwrap();
        let a_out = editor.parameter_id(a, "Out").unwrap();
        editor.take_notifications();

        editor.delete_node(a).unwrap();
        assert!(editor.node(a).is_none());
        assert!(editor.parameter(a_out).is_none());
        assert!(editor.connection(c).is_none());
        assert!(!editor.parameter(b_in).unwrap().is_connected());
        assert_eq!(editor.node_by_name("A"), None);
        assert!(editor
            .take_notifications()
            .contains(&Notification::NodeDeleted(a)));
        assert_eq!(editor.delete_node(a), Err(GraphError::UnknownNode));
    }

    #[test]
    fn test_duplicate_node_copies_edited_values() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("Pass1")).unwrap();
        let gain = editor.parameter_id(a, "Gain").unwrap();
        editor.set_value(gain, Value::Float(3.0), true).unwrap();

        let copy = editor.duplicate_node(a).unwrap();
        assert_eq!(editor.node(copy).unwrap().name(), "Pass2");
        assert_eq!(editor.node_value(copy, "Gain", false), Some(Value::Float(3.0)));
        assert_eq!(editor.node_value(copy, "In", false), Some(Value::Float(0.0)));
    }

    #[test]
    fn test_duplicate_node_copies_keys() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("Pass1")).unwrap();
        let gain = editor.parameter_id(a, "Gain").unwrap();
        editor.add_key(gain, Key::new(0.0, 1.0)).unwrap();
        editor.add_key(gain, Key::new(10.0, 3.0)).unwrap();

        let copy = editor.duplicate_node(a).unwrap();
        let copied = editor.parameter_id(copy, "Gain").unwrap();
        assert_eq!(editor.parameter(copied).unwrap().keys().len(), 2);
        editor.set_current_frame(5);
        assert_eq!(editor.get_value(copied, false), Some(Value::Float(2.0)));
    }

    #[test]
    fn test_rename_node() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("A")).unwrap();
        editor.create_node("test.pass", Some("Taken")).unwrap();
        editor.take_notifications();

        assert_eq!(editor.rename_node(a, "Grün Wert").unwrap(), "Gruen_Wert");
        assert_eq!(editor.node_by_name("Gruen_Wert"), Some(a));
        assert_eq!(editor.node_by_name("A"), None);
        assert_eq!(editor.take_notifications(), vec![Notification::NodeRenamed(a)]);

        assert_eq!(editor.rename_node(a, "Gruen_Wert").unwrap(), "Gruen_Wert");
        assert!(editor.take_notifications().is_empty());

        assert_eq!(
            editor.rename_node(a, "Taken"),
            Err(GraphError::DuplicateNodeName("Taken".to_string()))
        );
        assert_eq!(editor.node(a).unwrap().name(), "Gruen_Wert");
    }

    #[test]
    fn test_node_groups() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("A")).unwrap();
        let b = editor.create_node("test.pass", Some("B")).unwrap();
        let c = editor.create_node("test.pass", Some("C")).unwrap();
        let inner = editor.connect_parameters(a, "Out", b, "In").unwrap();
        let boundary = editor.connect_parameters(b, "Out", c, "In").unwrap();

        editor.group_nodes("Chain", &[a, b]).unwrap();
        assert_eq!(editor.group_of(a), Some("Chain"));
        assert_eq!(editor.group_of(c), None);
        assert_eq!(editor.grouped_nodes("Chain"), Some(&[a, b][..]));
        assert_eq!(
            editor.group_nodes("Chain", &[c]),
            Err(GraphError::DuplicateGroup("Chain".to_string()))
        );
        assert_eq!(editor.group_boundary_connections("Chain"), vec![boundary]);
        assert!(!editor.group_boundary_connections("Chain").contains(&inner));

        editor.delete_node(a).unwrap();
        assert_eq!(editor.grouped_nodes("Chain"), Some(&[b][..]));
        assert_eq!(editor.ungroup_nodes("Chain").unwrap(), vec![b]);
        assert_eq!(
            editor.ungroup_nodes("Chain"),
            Err(GraphError::UnknownGroup("Chain".to_string()))
        );
        assert_eq!(editor.node_groups().count(), 0);
    }

    #[test]
    fn test_time_dependencies_require_numeric_parameter() {
        let mut editor = editor();
        let a = editor.create_node("test.pass", Some("A")).unwrap();
        let b = editor.create_node("test.pass", Some("B")).unwrap();
        let gain = editor.parameter_id(a, "Gain").unwrap();
        let other = editor.parameter_id(b, "Gain").unwrap();
        let label = editor
            .add_parameter(a, None, ParameterDefinition::text("Label", ""))
            .unwrap();

        editor.set_up_time_dependencies(a, Some(gain)).unwrap();
        assert_eq!(editor.node(a).unwrap().time_parameter(), Some(gain));
        assert!(editor.set_up_time_dependencies(a, Some(other)).is_err());
        assert!(matches!(
            editor.set_up_time_dependencies(a, Some(label)),
            Err(GraphError::Value(ValueError::TypeMismatch { .. }))
        ));
        editor.set_up_time_dependencies(a, None).unwrap();
        assert_eq!(editor.node(a).unwrap().time_parameter(), None);
    }
}
