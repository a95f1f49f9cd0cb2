//! Live parameters stored in the graph's parameter arena.
//!
//! A [`Parameter`] keeps its values behind a shared slot so a producer thread
//! can read or write them through a [`ValueHandle`]; flags, connections and
//! affections are owned by the graph thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smallvec::SmallVec;

use crate::error::ValueError;
use crate::graph::{ConnectionId, NodeId, ParameterId};

use super::animation::{Key, KeyList};
use super::context::{CallbackKind, Callbacks};
use super::definition::{NumberRange, ParameterDefinition};
use super::{Multiplicity, ParameterType, PinKind, Value};

/// The values of a parameter plus the values gathered from its connections.
#[derive(Debug, Clone)]
pub(crate) struct ValueSlot {
    values: Vec<Value>,
    /// One entry per incoming connection, refreshed on evaluation.
    inputs: Vec<Value>,
}

fn lock(slot: &Mutex<ValueSlot>) -> MutexGuard<'_, ValueSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Thread-safe access to a parameter's values.
///
/// Writes through a handle do not dirty anything; the graph thread has to be
/// told (see `GraphCommand::Touch`). They are checked and clamped the same
/// way as writes on the graph thread.
#[derive(Clone, Debug)]
pub struct ValueHandle {
    ty: ParameterType,
    range: Option<NumberRange>,
    slot: Arc<Mutex<ValueSlot>>,
}

impl ValueHandle {
    pub fn ty(&self) -> ParameterType {
        self.ty
    }

    /// The first value.
    pub fn value(&self) -> Value {
        let slot = lock(&self.slot);
        slot.values
            .first()
            .cloned()
            .unwrap_or_else(|| self.ty.default_value())
    }

    pub fn values(&self) -> Vec<Value> {
        lock(&self.slot).values.clone()
    }

    /// Stores `value` as the first value. Returns true if it changed.
    pub fn store(&self, value: Value) -> Result<bool, ValueError> {
        let value = conform(self.ty, self.range.as_ref(), value)?;
        let mut slot = lock(&self.slot);
        match slot.values.first_mut() {
            Some(current) if *current == value => Ok(false),
            Some(current) => {
                *current = value;
                Ok(true)
            }
            None => Err(ValueError::IndexOutOfBounds { index: 0, size: 0 }),
        }
    }
}

fn conform(ty: ParameterType, range: Option<&NumberRange>, value: Value) -> Result<Value, ValueError> {
    if value.ty() != ty {
        return Err(ValueError::TypeMismatch {
            expected: ty,
            found: value.ty(),
        });
    }
    Ok(match range {
        Some(range) => range.clamp(value),
        None => value,
    })
}

/// A typed, named value on a node.
pub struct Parameter {
    name: String,
    node: NodeId,
    ty: ParameterType,
    pin: PinKind,
    multiplicity: Multiplicity,
    slot: Arc<Mutex<ValueSlot>>,
    defaults: Vec<Value>,
    description: String,
    enabled: bool,
    visible: bool,
    read_only: bool,
    self_evaluating: bool,
    dirty: bool,
    aux_dirty: bool,
    range: Option<NumberRange>,
    literals: Vec<String>,
    keys: KeyList,
    connections: SmallVec<[ConnectionId; 2]>,
    affecting: SmallVec<[ParameterId; 4]>,
    affected: SmallVec<[ParameterId; 4]>,
    pub(crate) callbacks: Callbacks,
}

impl Parameter {
    /// Instantiates a definition for `node`. The definition must be valid.
    pub(crate) fn from_definition(node: NodeId, definition: ParameterDefinition) -> Self {
        let ParameterDefinition {
            name,
            ty,
            pin,
            defaults,
            multiplicity,
            description,
            enabled,
            visible,
            read_only,
            self_evaluating,
            range,
            literals,
        } = definition;
        let slot = ValueSlot {
            values: defaults.clone(),
            inputs: Vec::new(),
        };
        Self {
            name,
            node,
            ty,
            pin,
            multiplicity,
            slot: Arc::new(Mutex::new(slot)),
            defaults,
            description,
            enabled,
            visible,
            read_only,
            self_evaluating,
            dirty: false,
            aux_dirty: false,
            range,
            literals,
            keys: KeyList::default(),
            connections: SmallVec::new(),
            affecting: SmallVec::new(),
            affected: SmallVec::new(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node that owns this parameter.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn ty(&self) -> ParameterType {
        self.ty
    }

    pub fn pin_kind(&self) -> PinKind {
        self.pin
    }

    pub fn is_input(&self) -> bool {
        self.pin.is_input()
    }

    pub fn is_output(&self) -> bool {
        self.pin.is_output()
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Number of values the parameter holds.
    pub fn size(&self) -> usize {
        lock(&self.slot).values.len()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_self_evaluating(&self) -> bool {
        self.self_evaluating
    }

    /// True when the cached value may be stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when the auxiliary side effect has to run again.
    pub fn is_aux_dirty(&self) -> bool {
        self.aux_dirty
    }

    pub fn range(&self) -> Option<NumberRange> {
        self.range
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// The label an enumeration parameter currently selects.
    pub fn current_literal(&self) -> Option<&str> {
        match self.value() {
            Value::Enumeration(index) => self.literals.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// Index of an enumeration literal by label.
    pub fn literal_index(&self, literal: &str) -> Option<usize> {
        self.literals.iter().position(|l| l == literal)
    }

    /// Animation keys, ordered by time.
    pub fn keys(&self) -> &[Key] {
        self.keys.keys()
    }

    /// True when keys drive the value from the current frame.
    pub fn is_animated(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The animated value at `frame`, if the parameter has keys.
    pub fn sample(&self, frame: f64) -> Option<Value> {
        self.keys
            .sample(frame)
            .and_then(|value| super::keyed_value(self.ty, value))
    }

    /// Connections this parameter takes part in, in creation order.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Parameters whose change dirties this one.
    pub fn affecting(&self) -> &[ParameterId] {
        &self.affecting
    }

    /// Parameters this one dirties when it changes.
    pub fn affected(&self) -> &[ParameterId] {
        &self.affected
    }

    pub fn default_values(&self) -> &[Value] {
        &self.defaults
    }

    pub fn default_value(&self) -> Value {
        self.defaults
            .first()
            .cloned()
            .unwrap_or_else(|| self.ty.default_value())
    }

    /// The first value; vector parameters expose all of them via [`Parameter::values`].
    pub fn value(&self) -> Value {
        let slot = lock(&self.slot);
        slot.values
            .first()
            .cloned()
            .unwrap_or_else(|| self.ty.default_value())
    }

    pub fn values(&self) -> Vec<Value> {
        lock(&self.slot).values.clone()
    }

    /// Values collected from each incoming connection during the last evaluation.
    pub fn input_values(&self) -> Vec<Value> {
        lock(&self.slot).inputs.clone()
    }

    /// A handle other threads can use to reach the values.
    pub fn value_handle(&self) -> ValueHandle {
        ValueHandle {
            ty: self.ty,
            range: self.range,
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn has_callback(&self, kind: CallbackKind) -> bool {
        self.callbacks.has(kind)
    }

    /// True when the values equal the defaults.
    pub fn has_default_value(&self) -> bool {
        lock(&self.slot).values == self.defaults
    }

    /// Checks a value against the declared type and applies the range.
    pub(crate) fn conform(&self, value: Value) -> Result<Value, ValueError> {
        conform(self.ty, self.range.as_ref(), value)
    }

    // ------------------------------------------------------------------
    // Mutation, driven by the graph editor
    // ------------------------------------------------------------------

    /// Replaces every value. The caller has conformed them. Returns true if
    /// anything changed.
    pub(crate) fn write_values(&mut self, values: Vec<Value>) -> bool {
        let mut slot = lock(&self.slot);
        if slot.values == values {
            return false;
        }
        slot.values = values;
        true
    }

    pub(crate) fn write_value_at(&mut self, index: usize, value: Value) -> Result<bool, ValueError> {
        let mut slot = lock(&self.slot);
        let size = slot.values.len();
        let current = slot
            .values
            .get_mut(index)
            .ok_or(ValueError::IndexOutOfBounds { index, size })?;
        if *current == value {
            return Ok(false);
        }
        *current = value;
        Ok(true)
    }

    pub(crate) fn clear_inputs(&mut self) {
        lock(&self.slot).inputs.clear();
    }

    pub(crate) fn push_input(&mut self, value: Value) {
        lock(&self.slot).inputs.push(value);
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub(crate) fn set_aux_dirty(&mut self, aux_dirty: bool) {
        self.aux_dirty = aux_dirty;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub(crate) fn set_self_evaluating(&mut self, self_evaluating: bool) {
        self.self_evaluating = self_evaluating;
    }

    pub(crate) fn set_multiplicity(&mut self, multiplicity: Multiplicity) {
        self.multiplicity = multiplicity;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    /// Resizes values and defaults, padding with the first default.
    pub(crate) fn resize(&mut self, size: usize) {
        let fill = self.default_value();
        self.defaults.resize(size, fill.clone());
        lock(&self.slot).values.resize(size, fill);
    }

    pub(crate) fn keys_mut(&mut self) -> &mut KeyList {
        &mut self.keys
    }

    pub(crate) fn add_connection(&mut self, id: ConnectionId) {
        if !self.connections.contains(&id) {
            self.connections.push(id);
        }
    }

    pub(crate) fn remove_connection(&mut self, id: ConnectionId) {
        self.connections.retain(|c| *c != id);
    }

    pub(crate) fn add_affecting(&mut self, id: ParameterId) {
        if !self.affecting.contains(&id) {
            self.affecting.push(id);
        }
    }

    pub(crate) fn add_affected(&mut self, id: ParameterId) {
        if !self.affected.contains(&id) {
            self.affected.push(id);
        }
    }

    pub(crate) fn remove_affecting(&mut self, id: ParameterId) {
        self.affecting.retain(|p| *p != id);
    }

    pub(crate) fn remove_affected(&mut self, id: ParameterId) {
        self.affected.retain(|p| *p != id);
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("pin", &self.pin)
            .field("values", &self.values())
            .field("dirty", &self.dirty)
            .field("aux_dirty", &self.aux_dirty)
            .field("keys", &self.keys.len())
            .field("connections", &self.connections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn node_id() -> NodeId {
        NodeId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_parameter_from_definition() {
        let def = ParameterDefinition::number("Gain", 0.0, 2.0, 1.0).input();
        let param = Parameter::from_definition(node_id(), def);
        assert_eq!(param.name(), "Gain");
        assert_eq!(param.ty(), ParameterType::Float);
        assert!(param.is_input());
        assert_eq!(param.value(), Value::Float(1.0));
        assert!(!param.is_dirty());
        assert!(param.has_default_value());
    }

    #[test]
    fn test_conform_checks_type_and_range() {
        let def = ParameterDefinition::number("Gain", 0.0, 2.0, 1.0);
        let param = Parameter::from_definition(node_id(), def);
        assert_eq!(param.conform(Value::Float(9.0)), Ok(Value::Float(2.0)));
        assert!(matches!(
            param.conform(Value::Int(1)),
            Err(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_values_reports_change() {
        let mut param = Parameter::from_definition(node_id(), ParameterDefinition::float("X", 0.0));
        assert!(!param.write_values(vec![Value::Float(0.0)]));
        assert!(param.write_values(vec![Value::Float(1.0)]));
        assert!(!param.has_default_value());
        assert_eq!(
            param.write_value_at(3, Value::Float(1.0)),
            Err(ValueError::IndexOutOfBounds { index: 3, size: 1 })
        );
    }

    #[test]
    fn test_value_handle_shares_slot() {
        let param = Parameter::from_definition(node_id(), ParameterDefinition::float("X", 0.0));
        let handle = param.value_handle();
        assert_eq!(handle.store(Value::Float(4.0)), Ok(true));
        assert_eq!(param.value(), Value::Float(4.0));
        assert_eq!(handle.store(Value::Float(4.0)), Ok(false));
        assert!(handle.store(Value::Bool(true)).is_err());

        let remote = std::thread::spawn(move || handle.store(Value::Float(8.0)));
        assert_eq!(remote.join().unwrap(), Ok(true));
        assert_eq!(param.value(), Value::Float(8.0));
    }

    #[test]
    fn test_value_handle_applies_range() {
        let param = Parameter::from_definition(
            node_id(),
            ParameterDefinition::number("Gain", 0.0, 2.0, 1.0),
        );
        let handle = param.value_handle();
        let remote = std::thread::spawn(move || handle.store(Value::Float(9.0)));
        assert_eq!(remote.join().unwrap(), Ok(true));
        assert_eq!(param.value(), Value::Float(2.0));

        let handle = param.value_handle();
        assert_eq!(handle.store(Value::Float(-3.0)), Ok(true));
        assert_eq!(param.value(), Value::Float(0.0));
    }

    #[test]
    fn test_enumeration_literals() {
        let def = ParameterDefinition::choice("Mode", &["Add", "Multiply"], 1);
        let param = Parameter::from_definition(node_id(), def);
        assert_eq!(param.current_literal(), Some("Multiply"));
        assert_eq!(param.literal_index("Add"), Some(0));
    }

    #[test]
    fn test_resize_pads_with_default() {
        let mut param = Parameter::from_definition(node_id(), ParameterDefinition::float("P", 1.0));
        param.resize(3);
        assert_eq!(param.size(), 3);
        assert_eq!(param.values(), vec![Value::Float(1.0); 3]);
    }
}
