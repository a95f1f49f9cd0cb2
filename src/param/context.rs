//! Parameter callbacks and the context they run in.
//!
//! Callbacks are closures owned by their parameter. While one runs it is
//! lifted out of the parameter, so it can freely reach back into the graph
//! through its [`ProcessContext`].

use log::warn;

use crate::graph::{ConnectionId, GraphEditor, NodeId, ParameterId};

use super::Value;

/// A processing, change, aux-processing or command callback.
pub type Callback = Box<dyn FnMut(&mut ProcessContext<'_>)>;

/// A hook invoked when a connection is established on, or removed from, a parameter.
pub type ConnectionCallback = Box<dyn FnMut(&mut ProcessContext<'_>, ConnectionId)>;

/// Which behavior slot a callback occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Runs after an interactive edit changed the value.
    Change,
    /// Recomputes the value during evaluation of a dirty parameter.
    Processing,
    /// Side effect run during evaluation of an aux-dirty parameter.
    AuxProcessing,
    /// Runs when a command parameter is triggered.
    Command,
}

impl CallbackKind {
    fn index(self) -> usize {
        match self {
            CallbackKind::Change => 0,
            CallbackKind::Processing => 1,
            CallbackKind::AuxProcessing => 2,
            CallbackKind::Command => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CallbackKind::Change => "change",
            CallbackKind::Processing => "processing",
            CallbackKind::AuxProcessing => "aux processing",
            CallbackKind::Command => "command",
        }
    }
}

/// Connection lifecycle hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionHook {
    Connect,
    Disconnect,
}

impl ConnectionHook {
    fn index(self) -> usize {
        match self {
            ConnectionHook::Connect => 0,
            ConnectionHook::Disconnect => 1,
        }
    }
}

/// Callback slots of one parameter.
///
/// Every `set` bumps the slot's generation. A callback lifted out to run is
/// only put back if its slot was not set in the meantime, so a callback may
/// replace or clear itself.
#[derive(Default)]
pub(crate) struct Callbacks {
    change: Option<Callback>,
    processing: Option<Callback>,
    aux_processing: Option<Callback>,
    command: Option<Callback>,
    on_connect: Option<ConnectionCallback>,
    on_disconnect: Option<ConnectionCallback>,
    generations: [u32; 4],
    hook_generations: [u32; 2],
}

impl Callbacks {
    fn slot(&mut self, kind: CallbackKind) -> &mut Option<Callback> {
        match kind {
            CallbackKind::Change => &mut self.change,
            CallbackKind::Processing => &mut self.processing,
            CallbackKind::AuxProcessing => &mut self.aux_processing,
            CallbackKind::Command => &mut self.command,
        }
    }

    fn hook_slot(&mut self, hook: ConnectionHook) -> &mut Option<ConnectionCallback> {
        match hook {
            ConnectionHook::Connect => &mut self.on_connect,
            ConnectionHook::Disconnect => &mut self.on_disconnect,
        }
    }

    pub(crate) fn has(&self, kind: CallbackKind) -> bool {
        match kind {
            CallbackKind::Change => self.change.is_some(),
            CallbackKind::Processing => self.processing.is_some(),
            CallbackKind::AuxProcessing => self.aux_processing.is_some(),
            CallbackKind::Command => self.command.is_some(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.change.is_none()
            && self.processing.is_none()
            && self.aux_processing.is_none()
            && self.command.is_none()
            && self.on_connect.is_none()
            && self.on_disconnect.is_none()
    }

    pub(crate) fn set(&mut self, kind: CallbackKind, callback: Option<Callback>) {
        *self.slot(kind) = callback;
        let generation = &mut self.generations[kind.index()];
        *generation = generation.wrapping_add(1);
    }

    pub(crate) fn set_hook(&mut self, hook: ConnectionHook, callback: Option<ConnectionCallback>) {
        *self.hook_slot(hook) = callback;
        let generation = &mut self.hook_generations[hook.index()];
        *generation = generation.wrapping_add(1);
    }

    pub(crate) fn generation(&self, kind: CallbackKind) -> u32 {
        self.generations[kind.index()]
    }

    pub(crate) fn hook_generation(&self, hook: ConnectionHook) -> u32 {
        self.hook_generations[hook.index()]
    }

    pub(crate) fn take(&mut self, kind: CallbackKind) -> Option<Callback> {
        self.slot(kind).take()
    }

    pub(crate) fn take_hook(&mut self, hook: ConnectionHook) -> Option<ConnectionCallback> {
        self.hook_slot(hook).take()
    }

    /// Puts a callback back unless its slot was set since `generation`.
    pub(crate) fn restore(&mut self, kind: CallbackKind, callback: Callback, generation: u32) {
        if self.generation(kind) == generation {
            *self.slot(kind) = Some(callback);
        }
    }

    pub(crate) fn restore_hook(
        &mut self,
        hook: ConnectionHook,
        callback: ConnectionCallback,
        generation: u32,
    ) {
        if self.hook_generation(hook) == generation {
            *self.hook_slot(hook) = Some(callback);
        }
    }
}

/// Everything a callback may touch while it runs.
///
/// Paths are resolved against the node that owns the running parameter.
/// Writes through the context never dirty anything: they are how processing
/// stores its result.
pub struct ProcessContext<'a> {
    editor: &'a mut GraphEditor,
    node: NodeId,
    parameter: ParameterId,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(editor: &'a mut GraphEditor, node: NodeId, parameter: ParameterId) -> Self {
        Self {
            editor,
            node,
            parameter,
        }
    }

    /// The node owning the running parameter.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The parameter whose callback is running.
    pub fn parameter(&self) -> ParameterId {
        self.parameter
    }

    pub fn node_name(&self) -> &str {
        self.editor.node(self.node).map(|n| n.name()).unwrap_or("")
    }

    /// Current value of a sibling parameter, without evaluating it.
    pub fn value(&self, path: &str) -> Option<Value> {
        let id = self.editor.parameter_id(self.node, path)?;
        self.editor.parameter(id).map(|p| p.value())
    }

    /// Numeric value of a sibling parameter, `0.0` if missing or not numeric.
    pub fn float(&self, path: &str) -> f64 {
        self.value(path).and_then(|v| v.as_float()).unwrap_or(0.0)
    }

    /// Value of a sibling parameter after bringing it up to date.
    pub fn evaluate(&mut self, path: &str) -> Option<Value> {
        let id = self.editor.parameter_id(self.node, path)?;
        self.editor.get_value(id, true)
    }

    /// Values a sibling input received from each of its connections.
    pub fn input_values(&self, path: &str) -> Vec<Value> {
        self.editor
            .parameter_id(self.node, path)
            .map(|id| self.editor.input_values(id))
            .unwrap_or_default()
    }

    pub fn own_value(&self) -> Value {
        self.editor
            .parameter(self.parameter)
            .map(|p| p.value())
            .unwrap_or(Value::Command)
    }

    pub fn own_input_values(&self) -> Vec<Value> {
        self.editor.input_values(self.parameter)
    }

    /// Stores a value on a sibling parameter. Returns true if it changed.
    pub fn set_value(&mut self, path: &str, value: Value) -> bool {
        let Some(id) = self.editor.parameter_id(self.node, path) else {
            warn!(
                "Callback on node \"{}\" wrote to unknown parameter \"{}\"",
                self.node_name(),
                path
            );
            return false;
        };
        self.store(id, value)
    }

    /// Stores the running parameter's own value.
    pub fn set_own_value(&mut self, value: Value) -> bool {
        self.store(self.parameter, value)
    }

    /// Stores all of the running parameter's values.
    pub fn set_own_values(&mut self, values: Vec<Value>) -> bool {
        match self.editor.set_values(self.parameter, values, false) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(
                    "Callback could not store values on \"{}\": {}",
                    self.editor.parameter_path(self.parameter),
                    err
                );
                false
            }
        }
    }

    fn store(&mut self, id: ParameterId, value: Value) -> bool {
        match self.editor.set_value(id, value, false) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(
                    "Callback could not store a value on \"{}\": {}",
                    self.editor.parameter_path(id),
                    err
                );
                false
            }
        }
    }

    /// Full access to the graph for callbacks that need more than their node.
    pub fn editor(&mut self) -> &mut GraphEditor {
        self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callbacks_take_and_restore() {
        let mut callbacks = Callbacks::default();
        assert!(callbacks.is_empty());

        callbacks.set(CallbackKind::Processing, Some(Box::new(|_ctx| {})));
        assert!(callbacks.has(CallbackKind::Processing));
        assert!(!callbacks.has(CallbackKind::Change));

        let generation = callbacks.generation(CallbackKind::Processing);
        let taken = callbacks.take(CallbackKind::Processing).unwrap();
        assert!(!callbacks.has(CallbackKind::Processing));
        callbacks.restore(CallbackKind::Processing, taken, generation);
        assert!(callbacks.has(CallbackKind::Processing));
    }

    #[test]
    fn test_restore_keeps_replacement() {
        let mut callbacks = Callbacks::default();
        callbacks.set(CallbackKind::Command, Some(Box::new(|_ctx| {})));
        let generation = callbacks.generation(CallbackKind::Command);
        let original = callbacks.take(CallbackKind::Command).unwrap();
        callbacks.set(CallbackKind::Command, Some(Box::new(|_ctx| {})));
        callbacks.restore(CallbackKind::Command, original, generation);
        assert!(callbacks.has(CallbackKind::Command));
    }

    #[test]
    fn test_restore_respects_clearing() {
        let mut callbacks = Callbacks::default();
        callbacks.set(CallbackKind::Change, Some(Box::new(|_ctx| {})));
        let generation = callbacks.generation(CallbackKind::Change);
        let original = callbacks.take(CallbackKind::Change).unwrap();
        callbacks.set(CallbackKind::Change, None);
        // Other slots do not interfere.
        callbacks.set(CallbackKind::Command, None);
        callbacks.restore(CallbackKind::Change, original, generation);
        assert!(!callbacks.has(CallbackKind::Change));
    }

    #[test]
    fn test_connection_hooks() {
        let mut callbacks = Callbacks::default();
        callbacks.set_hook(ConnectionHook::Connect, Some(Box::new(|_ctx, _id| {})));
        assert!(!callbacks.is_empty());
        let generation = callbacks.hook_generation(ConnectionHook::Connect);
        let hook = callbacks.take_hook(ConnectionHook::Connect).unwrap();
        assert!(callbacks.is_empty());
        callbacks.restore_hook(ConnectionHook::Connect, hook, generation);
        assert!(!callbacks.is_empty());

        let generation = callbacks.hook_generation(ConnectionHook::Connect);
        let hook = callbacks.take_hook(ConnectionHook::Connect).unwrap();
        callbacks.set_hook(ConnectionHook::Connect, None);
        callbacks.restore_hook(ConnectionHook::Connect, hook, generation);
        assert!(callbacks.is_empty());
    }
}
