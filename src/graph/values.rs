//! Reading and writing parameter values.

use log::{debug, error, warn};

use crate::error::{GraphError, ValueError};
use crate::param::{CallbackKind, ParameterType, Value};

use super::{GraphEditor, NodeId, Notification, ParameterId};

impl GraphEditor {
    /// Returns a parameter's first value.
    ///
    /// With `trigger_evaluation`, stale upstream values of input and output
    /// pins are recomputed first. Evaluation failures are logged and the
    /// cached value is returned.
    pub fn get_value(&mut self, id: ParameterId, trigger_evaluation: bool) -> Option<Value> {
        self.refresh(id, trigger_evaluation)?;
        self.parameters.get(id).map(|p| p.value())
    }

    /// Like [`GraphEditor::get_value`], returning every value.
    pub fn get_values(&mut self, id: ParameterId, trigger_evaluation: bool) -> Option<Vec<Value>> {
        self.refresh(id, trigger_evaluation)?;
        self.parameters.get(id).map(|p| p.values())
    }

    fn refresh(&mut self, id: ParameterId, trigger_evaluation: bool) -> Option<()> {
        let pin = self.parameters.get(id)?.pin_kind();
        if trigger_evaluation && pin.is_connectable() {
            if let Err(err) = self.propagate_evaluation(id) {
                error!(
                    "Evaluation of \"{}\" aborted: {}",
                    self.parameter_path(id),
                    err
                );
            }
        }
        Some(())
    }

    /// Values an input received from each connection during its last evaluation.
    pub fn input_values(&self, id: ParameterId) -> Vec<Value> {
        self.parameters
            .get(id)
            .map(|p| p.input_values())
            .unwrap_or_default()
    }

    /// Reads a parameter of `node` by path.
    pub fn node_value(&mut self, node: NodeId, path: &str, trigger_evaluation: bool) -> Option<Value> {
        let id = self.parameter_id(node, path)?;
        self.get_value(id, trigger_evaluation)
    }

    /// Stores `value` as the parameter's first value.
    ///
    /// Returns `Ok(false)` without notifying or dirtying when the value is
    /// unchanged. Numeric values are clamped to the parameter's range.
    pub fn set_value(
        &mut self,
        id: ParameterId,
        value: Value,
        trigger_dirtying: bool,
    ) -> Result<bool, ValueError> {
        self.set_value_at(id, 0, value, trigger_dirtying)
    }

    /// Stores a single component of a vector parameter.
    pub fn set_value_at(
        &mut self,
        id: ParameterId,
        index: usize,
        value: Value,
        trigger_dirtying: bool,
    ) -> Result<bool, ValueError> {
        let result = self
            .parameters
            .get_mut(id)
            .ok_or(ValueError::UnknownParameter)
            .and_then(|p| {
                let value = p.conform(value)?;
                p.write_value_at(index, value)
            });
        let changed = self.log_rejected(id, result)?;
        Ok(self.finish_write(id, changed, trigger_dirtying))
    }

    /// Replaces every value. The list must match the parameter's size.
    pub fn set_values(
        &mut self,
        id: ParameterId,
        values: Vec<Value>,
        trigger_dirtying: bool,
    ) -> Result<bool, ValueError> {
        let result = self
            .parameters
            .get_mut(id)
            .ok_or(ValueError::UnknownParameter)
            .and_then(|p| {
                if values.len() != p.size() {
                    return Err(ValueError::SizeMismatch {
                        expected: p.size(),
                        found: values.len(),
                    });
                }
                let values = values
                    .into_iter()
                    .map(|v| p.conform(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(p.write_values(values))
            });
        let changed = self.log_rejected(id, result)?;
        Ok(self.finish_write(id, changed, trigger_dirtying))
    }

    fn log_rejected(&self, id: ParameterId, result: Result<bool, ValueError>) -> Result<bool, ValueError> {
        if let Err(err) = &result {
            warn!("Rejected value for \"{}\": {}", self.parameter_path(id), err);
        }
        result
    }

    fn finish_write(&mut self, id: ParameterId, changed: bool, trigger_dirtying: bool) -> bool {
        if changed {
            self.notify(Notification::ValueChanged(id));
            if trigger_dirtying {
                self.propagate_dirty(id, true);
            }
        }
        changed
    }

    /// Restores the defaults and marks the parameter clean.
    ///
    /// Dependents are dirtied since the value they saw may have changed.
    pub fn reset(&mut self, id: ParameterId) {
        let Some(parameter) = self.parameters.get_mut(id) else {
            return;
        };
        let defaults = parameter.default_values().to_vec();
        if parameter.write_values(defaults) {
            self.notify(Notification::ValueChanged(id));
        }
        self.propagate_dirty(id, false);
    }

    /// Resets every parameter of a node.
    pub fn reset_node(&mut self, node: NodeId) {
        let ids = self
            .nodes
            .get(node)
            .map(|n| n.parameter_ids())
            .unwrap_or_default();
        for id in ids {
            self.reset(id);
        }
    }

    /// Stores a value on `node` by path.
    pub fn set_node_value(
        &mut self,
        node: NodeId,
        path: &str,
        value: Value,
        trigger_dirtying: bool,
    ) -> Result<bool, GraphError> {
        let id = self
            .parameter_id(node, path)
            .ok_or_else(|| GraphError::UnknownParameter(path.to_string()))?;
        Ok(self.set_value(id, value, trigger_dirtying)?)
    }

    /// An interactive edit: stores and dirties, then runs the change callback
    /// if the value actually changed.
    pub fn edit_value(&mut self, id: ParameterId, value: Value) -> Result<bool, ValueError> {
        let changed = self.set_value(id, value, true)?;
        if changed {
            self.run_callback(id, CallbackKind::Change);
        }
        Ok(changed)
    }

    /// Runs a parameter's change callback. Returns false if it has none.
    pub fn execute_change(&mut self, id: ParameterId) -> bool {
        self.run_callback(id, CallbackKind::Change)
    }

    /// Triggers a command parameter. Returns false if it has no command callback.
    pub fn execute_command(&mut self, id: ParameterId) -> bool {
        let executed = self.run_callback(id, CallbackKind::Command);
        if !executed {
            warn!("\"{}\" has no command to execute", self.parameter_path(id));
        }
        executed
    }

    // ========================================================================
    // Time
    // ========================================================================

    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Moves to `frame`, dirtying every node's time parameter, then
    /// re-sampling every animated parameter.
    pub fn set_current_frame(&mut self, frame: i32) {
        if frame == self.current_frame {
            return;
        }
        self.current_frame = frame;
        debug!("Current frame set to {}", frame);
        let time_parameters: Vec<ParameterId> = self
            .nodes
            .values()
            .filter_map(|n| n.time_parameter())
            .collect();
        for id in time_parameters {
            let value = match self.parameters.get(id).map(|p| p.ty()) {
                Some(ParameterType::Int) => Value::Int(frame),
                Some(ParameterType::UnsignedInt) => Value::UnsignedInt(frame.max(0) as u32),
                Some(ParameterType::Float) => Value::Float(f64::from(frame)),
                _ => continue,
            };
            // Failures are logged by set_value.
            let _ = self.set_value(id, value, true);
        }
        self.animate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{NumberRange, ParameterDefinition};
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (GraphEditor, NodeId) {
        let mut editor = GraphEditor::new();
        let node = editor.create_placeholder_node("test.values", "N").unwrap();
        (editor, node)
    }

    #[test]
    fn test_set_value_then_get() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0))
            .unwrap();
        assert_eq!(editor.set_value(p, Value::Float(2.0), false), Ok(true));
        assert_eq!(editor.get_value(p, false), Some(Value::Float(2.0)));
        assert!(!editor.parameter(p).unwrap().is_dirty());
    }

    #[test]
    fn test_unchanged_value_is_noop() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 1.0))
            .unwrap();
        editor.take_notifications();
        assert_eq!(editor.set_value(p, Value::Float(1.0), true), Ok(false));
        assert!(editor.take_notifications().is_empty());
        assert!(!editor.parameter(p).unwrap().is_dirty());
    }

    #[test]
    fn test_repeated_set_dirties_descendants_once() {
        let (mut editor, node) = setup();
        let a = editor
            .add_parameter(node, None, ParameterDefinition::float("A", 0.0))
            .unwrap();
        let b = editor
            .add_parameter(node, None, ParameterDefinition::float("B", 0.0))
            .unwrap();
        let c = editor
            .add_parameter(node, None, ParameterDefinition::float("C", 0.0))
            .unwrap();
        editor.add_affection(a, b).unwrap();
        editor.add_affection(b, c).unwrap();
        editor.take_notifications();

        assert_eq!(editor.set_value(a, Value::Float(2.0), true), Ok(true));
        assert_eq!(editor.set_value(a, Value::Float(2.0), true), Ok(false));
        let notifications = editor.take_notifications();
        for id in [a, b, c] {
            let dirtied = notifications
                .iter()
                .filter(|n| **n == Notification::Dirtied(id))
                .count();
            assert_eq!(dirtied, 1);
        }
        assert_eq!(
            notifications
                .iter()
                .filter(|n| **n == Notification::ValueChanged(a))
                .count(),
            1
        );
    }

    #[test]
    fn test_set_value_with_dirtying() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0))
            .unwrap();
        editor.take_notifications();
        editor.set_value(p, Value::Float(1.0), true).unwrap();
        assert!(editor.parameter(p).unwrap().is_dirty());
        assert_eq!(
            editor.take_notifications(),
            vec![Notification::ValueChanged(p), Notification::Dirtied(p)]
        );
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0))
            .unwrap();
        assert_eq!(
            editor.set_value(p, Value::from("text"), true),
            Err(ValueError::TypeMismatch {
                expected: ParameterType::Float,
                found: ParameterType::String,
            })
        );
        assert_eq!(editor.get_value(p, false), Some(Value::Float(0.0)));
    }

    #[test]
    fn test_range_clamps_writes() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(
                node,
                None,
                ParameterDefinition::float("P", 0.5).with_range(NumberRange::new(0.0, 1.0)),
            )
            .unwrap();
        editor.set_value(p, Value::Float(7.0), false).unwrap();
        assert_eq!(editor.get_value(p, false), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_set_values_size_mismatch_leaves_values() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0).with_size(3))
            .unwrap();
        assert_eq!(
            editor.set_values(p, vec![Value::Float(1.0); 2], true),
            Err(ValueError::SizeMismatch { expected: 3, found: 2 })
        );
        assert_eq!(editor.get_values(p, false), Some(vec![Value::Float(0.0); 3]));

        let values = vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)];
        assert_eq!(editor.set_values(p, values.clone(), false), Ok(true));
        assert_eq!(editor.get_values(p, false), Some(values));
    }

    #[test]
    fn test_set_value_at_bounds() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0).with_size(2))
            .unwrap();
        assert_eq!(editor.set_value_at(p, 1, Value::Float(5.0), false), Ok(true));
        assert_eq!(
            editor.set_value_at(p, 2, Value::Float(5.0), false),
            Err(ValueError::IndexOutOfBounds { index: 2, size: 2 })
        );
        assert_eq!(
            editor.get_values(p, false),
            Some(vec![Value::Float(0.0), Value::Float(5.0)])
        );
    }

    #[test]
    fn test_reset_restores_default_and_cleans() {
        let (mut editor, node) = setup();
        let a = editor
            .add_parameter(node, None, ParameterDefinition::float("A", 1.0))
            .unwrap();
        let b = editor
            .add_parameter(node, None, ParameterDefinition::float("B", 0.0))
            .unwrap();
        editor.add_affection(a, b).unwrap();
        editor.set_value(a, Value::Float(4.0), true).unwrap();
        assert!(editor.parameter(a).unwrap().is_dirty());

        editor.reset(a);
        let param = editor.parameter(a).unwrap();
        assert_eq!(param.value(), Value::Float(1.0));
        assert!(!param.is_dirty());
        assert!(editor.parameter(b).unwrap().is_dirty());
    }

    #[test]
    fn test_edit_value_runs_change_callback() {
        let (mut editor, node) = setup();
        let p = editor
            .add_parameter(node, None, ParameterDefinition::float("P", 0.0))
            .unwrap();
        let changes = Rc::new(Cell::new(0));
        let seen = Rc::clone(&changes);
        editor
            .set_callback(
                p,
                CallbackKind::Change,
                Some(Box::new(move |_ctx| seen.set(seen.get() + 1))),
            )
            .unwrap();

        assert_eq!(editor.edit_value(p, Value::Float(1.0)), Ok(true));
        assert_eq!(editor.edit_value(p, Value::Float(1.0)), Ok(false));
        assert_eq!(changes.get(), 1);
        assert!(editor.execute_change(p));
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn test_execute_command() {
        let (mut editor, node) = setup();
        let cmd = editor
            .add_parameter(node, None, ParameterDefinition::command("Run"))
            .unwrap();
        let target = editor
            .add_parameter(node, None, ParameterDefinition::int("Count", 0))
            .unwrap();
        assert!(!editor.execute_command(cmd));

        editor
            .set_callback(
                cmd,
                CallbackKind::Command,
                Some(Box::new(|ctx| {
                    let count = ctx.value("Count").and_then(|v| v.as_int()).unwrap_or(0);
                    ctx.set_value("Count", Value::Int(count as i32 + 1));
                })),
            )
            .unwrap();
        assert!(editor.execute_command(cmd));
        assert!(editor.execute_command(cmd));
        assert_eq!(editor.get_value(target, false), Some(Value::Int(2)));
    }

    #[test]
    fn test_node_value_by_path() {
        let (mut editor, node) = setup();
        editor
            .add_parameter(node, None, ParameterDefinition::toggle("On", false))
            .unwrap();
        assert_eq!(editor.set_node_value(node, "On", Value::Bool(true), false), Ok(true));
        assert_eq!(editor.node_value(node, "On", false), Some(Value::Bool(true)));
        assert!(matches!(
            editor.set_node_value(node, "Off", Value::Bool(true), false),
            Err(GraphError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_current_frame_drives_time_parameter() {
        let (mut editor, node) = setup();
        let frame = editor
            .add_parameter(node, None, ParameterDefinition::int("Frame", 0))
            .unwrap();
        editor.set_up_time_dependencies(node, Some(frame)).unwrap();
        editor.set_current_frame(12);
        assert_eq!(editor.current_frame(), 12);
        assert_eq!(editor.get_value(frame, false), Some(Value::Int(12)));
        assert!(editor.parameter(frame).unwrap().is_dirty());
    }
}
