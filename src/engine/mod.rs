//! Engine module
//!
//! Feeds a graph owned by one thread from producers on other threads. The
//! graph thread calls [`service`] whenever it is idle; producers talk to it
//! through a [`ProducerHandle`].

pub mod channels;
pub mod commands;

pub use channels::{
    channel, channel_from_config, GraphHandle, ProducerHandle, DEFAULT_COMMAND_BUFFER_SIZE,
    DEFAULT_EVENT_BUFFER_SIZE,
};
pub use commands::{GraphCommand, GraphEvent};

use log::{trace, warn};

use crate::graph::GraphEditor;

impl GraphEditor {
    /// Applies one command. Returns the direct answer to it, if any.
    pub fn apply_command(&mut self, command: GraphCommand) -> Option<GraphEvent> {
        trace!("Applying {:?}", command);
        let parameter = command.parameter();
        let result = match command {
            GraphCommand::SetValue {
                value,
                trigger_dirtying,
                ..
            } => self.set_value(parameter, value, trigger_dirtying),
            GraphCommand::SetValues {
                values,
                trigger_dirtying,
                ..
            } => self.set_values(parameter, values, trigger_dirtying),
            GraphCommand::Touch { .. } => {
                self.propagate_dirty(parameter, true);
                Ok(true)
            }
            GraphCommand::Evaluate { .. } => {
                let values = self.get_values(parameter, true);
                return Some(GraphEvent::Evaluated { parameter, values });
            }
            GraphCommand::ExecuteCommand { .. } => {
                self.execute_command(parameter);
                Ok(true)
            }
        };
        result
            .err()
            .map(|error| GraphEvent::Rejected { parameter, error })
    }
}

/// Applies every queued command to `editor` and publishes the resulting events.
///
/// Returns how many commands were applied. Events that do not fit into the
/// queue are dropped by the handle and reported here in one warning.
pub fn service(editor: &mut GraphEditor, handle: &mut GraphHandle) -> usize {
    let mut applied = 0;
    while let Some(command) = handle.recv_command() {
        let answer = editor.apply_command(command);
        applied += 1;
        let notifications = editor.take_notifications();
        for event in notifications
            .iter()
            .filter_map(GraphEvent::from_notification)
            .chain(answer)
        {
            handle.send_event(event);
        }
    }
    let dropped = handle.take_dropped_events();
    if dropped > 0 {
        warn!("Event queue full, dropped {} event(s)", dropped);
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::nodes::builtin_registry;
    use crate::param::Value;
    use std::thread;

    #[test]
    fn test_service_applies_commands_in_order() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let source = editor.create_node("value.constant", None).unwrap();
        let scale = editor.create_node("math.scale", None).unwrap();
        editor.connect_parameters(source, "Value", scale, "Input").unwrap();
        let value = editor.parameter_id(source, "Value").unwrap();
        let factor = editor.parameter_id(scale, "Factor").unwrap();
        let output = editor.parameter_id(scale, "Output").unwrap();
        editor.take_notifications();

        let (mut producer, mut graph) = channel(16, 64);
        let worker = thread::spawn(move || {
            let commands = [
                GraphCommand::SetValue {
                    parameter: value,
                    value: Value::Float(4.0),
                    trigger_dirtying: true,
                },
                GraphCommand::SetValue {
                    parameter: factor,
                    value: Value::Float(0.5),
                    trigger_dirtying: true,
                },
                GraphCommand::Evaluate { parameter: output },
            ];
            for command in commands {
                producer.send_command(command).unwrap();
            }
            producer
        });
        let mut producer = worker.join().unwrap();

        assert_eq!(service(&mut editor, &mut graph), 3);
        let events = producer.drain_events();
        assert!(events.contains(&GraphEvent::ValueChanged(value)));
        assert!(events.contains(&GraphEvent::Dirtied(output)));
        assert_eq!(
            events.last(),
            Some(&GraphEvent::Evaluated {
                parameter: output,
                values: Some(vec![Value::Float(2.0)])
            })
        );
    }

    #[test]
    fn test_rejected_write_is_reported() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let source = editor.create_node("value.constant", None).unwrap();
        let value = editor.parameter_id(source, "Value").unwrap();
        editor.take_notifications();

        let answer = editor.apply_command(GraphCommand::SetValue {
            parameter: value,
            value: Value::Bool(true),
            trigger_dirtying: true,
        });
        assert_eq!(
            answer,
            Some(GraphEvent::Rejected {
                parameter: value,
                error: ValueError::TypeMismatch {
                    expected: crate::param::ParameterType::Float,
                    found: crate::param::ParameterType::Bool,
                }
            })
        );
        assert!(!editor.has_pending_notifications());
    }

    #[test]
    fn test_service_survives_a_full_event_queue() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let source = editor.create_node("value.constant", None).unwrap();
        let value = editor.parameter_id(source, "Value").unwrap();
        editor.take_notifications();

        let (mut producer, mut graph) = channel(4, 1);
        producer
            .send_command(GraphCommand::SetValue {
                parameter: value,
                value: Value::Float(1.0),
                trigger_dirtying: true,
            })
            .unwrap();
        producer.send_command(GraphCommand::Evaluate { parameter: value }).unwrap();

        assert_eq!(service(&mut editor, &mut graph), 2);
        assert_eq!(producer.drain_events(), vec![GraphEvent::ValueChanged(value)]);
        assert_eq!(graph.take_dropped_events(), 0);
        assert_eq!(editor.get_value(value, false), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_touch_dirties_dependents() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let scale = editor.create_node("math.scale", None).unwrap();
        let factor = editor.parameter_id(scale, "Factor").unwrap();
        let output = editor.parameter_id(scale, "Output").unwrap();

        assert_eq!(editor.apply_command(GraphCommand::Touch { parameter: factor }), None);
        assert!(editor.parameter(output).unwrap().is_dirty());
    }
}
