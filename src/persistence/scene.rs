//! Scene serialization for save/load functionality.
//!
//! A scene records every saveable node with its edited parameter values, the
//! connections between nodes addressed by name and path, and the node groups.
//! Opaque payloads are never written.

use std::collections::HashMap;
use std::path::Path;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{GraphEditor, NodeId};
use crate::param::{
    CallbackKind, Color, Key, Multiplicity, ParameterDefinition, ParameterType, PinKind, Value,
    PATH_SEPARATOR,
};

/// Current scene format version.
/// Increment this when making breaking changes to the format.
pub const SCENE_VERSION: u32 = 1;

/// A complete saved graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    /// Format version, for compatibility checks on load.
    pub version: u32,
    /// The editor's current frame.
    #[serde(default)]
    pub frame: i32,
    pub nodes: Vec<NodeData>,
    pub connections: Vec<ConnectionData>,
    #[serde(default)]
    pub groups: Vec<GroupData>,
}

/// One node and its edited values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    /// Registered node type (e.g. `"math.add"`).
    pub type_name: String,
    pub parameters: Vec<ParameterData>,
}

/// The values of one parameter, addressed by path within its node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterData {
    pub path: String,
    /// Needed to recreate parameters on placeholder nodes.
    #[serde(rename = "type")]
    pub ty: ParameterType,
    pub pin: PinKind,
    /// Connection limit of input pins, so recreated placeholder inputs keep
    /// accepting every saved connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    pub values: Vec<PersistedValue>,
    /// Animation keys of numeric parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Key>,
}

/// A connection, addressed by node name and parameter path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub from_node: String,
    pub from_parameter: String,
    pub to_node: String,
    pub to_parameter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub name: String,
    pub nodes: Vec<String>,
}

/// A value that preserves type information for proper restoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PersistedValue {
    Bool(bool),
    Int(i32),
    UnsignedInt(u32),
    Float(f64),
    String(String),
    Filename(String),
    Directory(String),
    Color(Color),
    Enumeration(usize),
    TextInfo(String),
    Label(String),
}

impl PersistedValue {
    /// Converts a value for saving; `None` for commands and payloads.
    pub fn from_value(value: &Value) -> Option<Self> {
        let persisted = match value {
            Value::Bool(v) => Self::Bool(*v),
            Value::Int(v) => Self::Int(*v),
            Value::UnsignedInt(v) => Self::UnsignedInt(*v),
            Value::Float(v) => Self::Float(*v),
            Value::String(v) => Self::String(v.clone()),
            Value::Filename(v) => Self::Filename(v.clone()),
            Value::Directory(v) => Self::Directory(v.clone()),
            Value::Color(v) => Self::Color(*v),
            Value::Enumeration(v) => Self::Enumeration(*v),
            Value::TextInfo(v) => Self::TextInfo(v.clone()),
            Value::Label(v) => Self::Label(v.clone()),
            _ => return None,
        };
        Some(persisted)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(*v),
            Self::Int(v) => Value::Int(*v),
            Self::UnsignedInt(v) => Value::UnsignedInt(*v),
            Self::Float(v) => Value::Float(*v),
            Self::String(v) => Value::String(v.clone()),
            Self::Filename(v) => Value::Filename(v.clone()),
            Self::Directory(v) => Value::Directory(v.clone()),
            Self::Color(v) => Value::Color(*v),
            Self::Enumeration(v) => Value::Enumeration(*v),
            Self::TextInfo(v) => Value::TextInfo(v.clone()),
            Self::Label(v) => Value::Label(v.clone()),
        }
    }
}

/// Error type for scene operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("incompatible scene version: found {found}, expected <= {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
    #[error("unknown node type \"{0}\" and placeholder nodes are disabled")]
    UnknownNodeType(String),
}

/// What an import produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Created nodes, in scene order.
    pub nodes: Vec<NodeId>,
    pub connections: usize,
    /// Connections that could not be restored; each was logged.
    pub failed_connections: usize,
    /// Parameter values that could not be restored; each was logged.
    pub failed_values: usize,
}

impl Scene {
    /// Create a new empty scene with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SCENE_VERSION,
            frame: 0,
            nodes: Vec::new(),
            connections: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Check if this scene version is compatible with the current format.
    pub fn is_compatible(&self) -> bool {
        self.version <= SCENE_VERSION
    }

    /// Captures the saveable part of `editor`.
    ///
    /// Only values that differ from their defaults and animated parameters
    /// are recorded, except on placeholder nodes where every parameter is
    /// kept so it can be recreated. Values computed by processing callbacks
    /// are left out.
    pub fn from_editor(editor: &GraphEditor, name: impl Into<String>) -> Self {
        let mut scene = Scene::new(name);
        scene.frame = editor.current_frame();

        for (_, node) in editor.nodes().filter(|(_, n)| n.is_saveable()) {
            let parameters = node
                .parameter_ids()
                .into_iter()
                .filter_map(|id| {
                    let parameter = editor.parameter(id)?;
                    let edited = !parameter.has_default_value()
                        || parameter.is_animated()
                        || node.is_type_unknown();
                    if !edited
                        || !parameter.ty().is_persistable()
                        || parameter.has_callback(CallbackKind::Processing)
                    {
                        return None;
                    }
                    Some(ParameterData {
                        path: node.root().path_of(id, editor.parameters())?,
                        ty: parameter.ty(),
                        pin: parameter.pin_kind(),
                        multiplicity: parameter.is_input().then(|| parameter.multiplicity()),
                        values: parameter
                            .values()
                            .iter()
                            .filter_map(PersistedValue::from_value)
                            .collect(),
                        keys: parameter.keys().to_vec(),
                    })
                })
                .collect();
            scene.nodes.push(NodeData {
                name: node.name().to_string(),
                type_name: node.type_name().to_string(),
                parameters,
            });
        }

        let saved = |id: NodeId| editor.node(id).filter(|n| n.is_saveable());
        for connection in editor.connections() {
            let (Some(source), Some(target)) = (
                editor.parameter(connection.source()),
                editor.parameter(connection.target()),
            ) else {
                continue;
            };
            let (Some(from), Some(to)) = (saved(source.node()), saved(target.node())) else {
                continue;
            };
            let (Some(from_parameter), Some(to_parameter)) = (
                from.root().path_of(connection.source(), editor.parameters()),
                to.root().path_of(connection.target(), editor.parameters()),
            ) else {
                continue;
            };
            scene.connections.push(ConnectionData {
                from_node: from.name().to_string(),
                from_parameter,
                to_node: to.name().to_string(),
                to_parameter,
            });
        }

        for (name, members) in editor.node_groups() {
            let nodes: Vec<String> = members
                .iter()
                .filter_map(|id| saved(*id))
                .map(|n| n.name().to_string())
                .collect();
            if !nodes.is_empty() {
                scene.groups.push(GroupData {
                    name: name.to_string(),
                    nodes,
                });
            }
        }
        scene
    }

    /// Recreates the scene inside `editor`, next to whatever it already holds.
    ///
    /// Nodes whose saved name is taken get a fresh one. A connection, value
    /// or group that cannot be restored is logged and skipped.
    pub fn apply_to(&self, editor: &mut GraphEditor) -> Result<ImportReport, SceneError> {
        if !self.is_compatible() {
            return Err(SceneError::IncompatibleVersion {
                found: self.version,
                expected: SCENE_VERSION,
            });
        }
        if !editor.config().allow_placeholder_nodes {
            if let Some(node) = self
                .nodes
                .iter()
                .find(|n| !editor.registry().contains(&n.type_name))
            {
                return Err(SceneError::UnknownNodeType(node.type_name.clone()));
            }
        }

        let mut report = ImportReport::default();
        let mut ids: HashMap<&str, NodeId> = HashMap::new();
        for data in &self.nodes {
            let Some(id) = create_node(editor, data) else {
                continue;
            };
            ids.insert(data.name.as_str(), id);
            report.nodes.push(id);
            report.failed_values += restore_values(editor, id, data);
        }

        for connection in &self.connections {
            let (Some(from), Some(to)) = (
                ids.get(connection.from_node.as_str()),
                ids.get(connection.to_node.as_str()),
            ) else {
                warn!(
                    "Skipping connection \"{}.{}\" -> \"{}.{}\": node missing",
                    connection.from_node,
                    connection.from_parameter,
                    connection.to_node,
                    connection.to_parameter
                );
                report.failed_connections += 1;
                continue;
            };
            match editor.connect_parameters(*from, &connection.from_parameter, *to, &connection.to_parameter) {
                Ok(_) => report.connections += 1,
                Err(_) => report.failed_connections += 1,
            }
        }

        for group in &self.groups {
            let members: Vec<NodeId> = group
                .nodes
                .iter()
                .filter_map(|name| ids.get(name.as_str()).copied())
                .collect();
            if let Err(err) = editor.group_nodes(&group.name, &members) {
                warn!("Could not restore node group \"{}\": {}", group.name, err);
            }
        }

        editor.set_current_frame(self.frame);
        info!(
            "Loaded scene \"{}\": {} node(s), {} connection(s), {} failed",
            self.name,
            report.nodes.len(),
            report.connections,
            report.failed_connections
        );
        Ok(report)
    }
}

fn create_node(editor: &mut GraphEditor, data: &NodeData) -> Option<NodeId> {
    let name = if editor.node_by_name(&data.name).is_some() {
        let fresh = editor.unique_name(&data.name);
        warn!("Node name \"{}\" is taken, loading it as \"{}\"", data.name, fresh);
        fresh
    } else {
        data.name.clone()
    };
    let result = if editor.registry().contains(&data.type_name) {
        editor.create_node(&data.type_name, Some(&name))
    } else {
        editor.create_placeholder_node(&data.type_name, &name)
    };
    match result {
        Ok(id) => Some(id),
        Err(err) => {
            error!("Could not load node \"{}\": {}", data.name, err);
            None
        }
    }
}

/// Writes saved values onto a freshly created node. Returns how many failed.
fn restore_values(editor: &mut GraphEditor, node: NodeId, data: &NodeData) -> usize {
    let placeholder = editor.node(node).is_some_and(|n| n.is_type_unknown());
    let mut failed = 0;
    for parameter in &data.parameters {
        let values: Vec<Value> = parameter.values.iter().map(PersistedValue::to_value).collect();
        let id = match editor.parameter_id(node, &parameter.path) {
            Some(id) => Some(id),
            None if placeholder => recreate_parameter(editor, node, parameter, &values),
            None => None,
        };
        let Some(id) = id else {
            warn!("Node \"{}\" has no parameter \"{}\"", data.name, parameter.path);
            failed += 1;
            continue;
        };
        let size_fits = editor
            .parameter(id)
            .is_some_and(|p| p.size() == values.len())
            || editor.set_size(id, values.len()).is_ok();
        let result = if size_fits {
            editor.set_values(id, values, true)
        } else {
            Err(crate::error::ValueError::InvalidSize(values.len()))
        };
        if let Err(err) = result {
            warn!("Could not restore \"{}.{}\": {}", data.name, parameter.path, err);
            failed += 1;
        }
        for key in &parameter.keys {
            if let Err(err) = editor.add_key(id, *key) {
                warn!("Could not restore a key of \"{}.{}\": {}", data.name, parameter.path, err);
                failed += 1;
            }
        }
    }
    failed
}

fn recreate_parameter(
    editor: &mut GraphEditor,
    node: NodeId,
    data: &ParameterData,
    values: &[Value],
) -> Option<crate::graph::ParameterId> {
    let (group, name) = match data.path.rsplit_once(PATH_SEPARATOR) {
        Some((group, name)) => (Some(group), name),
        None => (None, data.path.as_str()),
    };
    if let Some(group) = group {
        editor.ensure_parameter_group(node, group).ok()?;
    }
    let mut definition = ParameterDefinition::new(name, data.ty).with_pin(data.pin);
    if !values.is_empty() {
        definition = definition.with_defaults(values.to_vec());
    }
    // Older scenes did not record multiplicity; fall back to what pin
    // synthesis would have chosen.
    let multiplicity = data.multiplicity.or_else(|| {
        (data.pin.is_input() && data.ty.supports_multiplicity()).then_some(Multiplicity::OneOrMore)
    });
    if let Some(multiplicity) = multiplicity {
        definition = definition.with_multiplicity(multiplicity);
    }
    editor.add_parameter(node, group, definition).ok()
}

/// Save a scene to a JSON file.
pub fn save_to_file(scene: &Scene, path: &Path) -> Result<(), SceneError> {
    let json = serde_json::to_string_pretty(scene)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a scene from a JSON file.
pub fn load_from_file(path: &Path) -> Result<Scene, SceneError> {
    let json = std::fs::read_to_string(path)?;
    let scene: Scene = serde_json::from_str(&json)?;
    if !scene.is_compatible() {
        return Err(SceneError::IncompatibleVersion {
            found: scene.version,
            expected: SCENE_VERSION,
        });
    }
    Ok(scene)
}
