//! Graph Commands and Events
//!
//! Messages exchanged between producer threads and the thread that owns the
//! [`GraphEditor`](crate::graph::GraphEditor). Everything here is `Send`.

use crate::error::ValueError;
use crate::graph::{ConnectionId, NodeId, Notification, ParameterId};
use crate::param::Value;

/// Requests sent from a producer thread to the graph thread.
/// They are applied in order by [`service`](super::service).
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    /// Write the first value of a parameter.
    SetValue {
        parameter: ParameterId,
        value: Value,
        /// Mark dependents dirty after a successful change.
        trigger_dirtying: bool,
    },

    /// Write every value of a parameter at once.
    SetValues {
        parameter: ParameterId,
        values: Vec<Value>,
        trigger_dirtying: bool,
    },

    /// Mark a parameter and its dependents dirty without changing it.
    Touch { parameter: ParameterId },

    /// Bring a parameter up to date and report its value.
    Evaluate { parameter: ParameterId },

    /// Run a command parameter's callback.
    ExecuteCommand { parameter: ParameterId },
}

impl GraphCommand {
    /// The parameter the command is addressed to.
    pub fn parameter(&self) -> ParameterId {
        match self {
            GraphCommand::SetValue { parameter, .. }
            | GraphCommand::SetValues { parameter, .. }
            | GraphCommand::Touch { parameter }
            | GraphCommand::Evaluate { parameter }
            | GraphCommand::ExecuteCommand { parameter } => *parameter,
        }
    }
}

/// Feedback sent from the graph thread to producers.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Dirtied(ParameterId),
    ValueChanged(ParameterId),
    ConnectionCreated(ConnectionId),
    ConnectionDestroyed {
        parameter: ParameterId,
        connection: ConnectionId,
    },
    EnabledChanged {
        parameter: ParameterId,
        enabled: bool,
    },
    NodeCreated(NodeId),
    NodeDeleted(NodeId),
    NodeRenamed(NodeId),

    /// Answer to [`GraphCommand::Evaluate`]; `None` if the parameter is gone.
    Evaluated {
        parameter: ParameterId,
        values: Option<Vec<Value>>,
    },

    /// A write command was refused.
    Rejected {
        parameter: ParameterId,
        error: ValueError,
    },
}

impl GraphEvent {
    /// Converts a notification into an event.
    ///
    /// `ConnectionEstablished` has no event of its own; producers learn of
    /// new connections from `ConnectionCreated`.
    pub fn from_notification(notification: &Notification) -> Option<Self> {
        let event = match *notification {
            Notification::Dirtied(p) => GraphEvent::Dirtied(p),
            Notification::ValueChanged(p) => GraphEvent::ValueChanged(p),
            Notification::ConnectionCreated(c) => GraphEvent::ConnectionCreated(c),
            Notification::ConnectionEstablished { .. } => return None,
            Notification::ConnectionDestroyed {
                parameter,
                connection,
            } => GraphEvent::ConnectionDestroyed {
                parameter,
                connection,
            },
            Notification::EnabledChanged { parameter, enabled } => {
                GraphEvent::EnabledChanged { parameter, enabled }
            }
            Notification::NodeCreated(n) => GraphEvent::NodeCreated(n),
            Notification::NodeDeleted(n) => GraphEvent::NodeDeleted(n),
            Notification::NodeRenamed(n) => GraphEvent::NodeRenamed(n),
        };
        Some(event)
    }
}
