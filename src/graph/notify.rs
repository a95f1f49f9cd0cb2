//! Change notifications.
//!
//! The editor records what happened as a list of [`Notification`]s; observers
//! drain that list after an operation instead of being called back mid-walk.

use super::{ConnectionId, NodeId, ParameterId};

/// Something observable that changed in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    /// A parameter went from clean to dirty.
    Dirtied(ParameterId),
    /// A parameter's stored value changed.
    ValueChanged(ParameterId),
    /// A connection record was created.
    ConnectionCreated(ConnectionId),
    /// A connection became active on one of its endpoints.
    ConnectionEstablished {
        parameter: ParameterId,
        connection: ConnectionId,
    },
    /// A connection is being removed from one of its endpoints.
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
}

impl Notification {
    /// The parameter this notification concerns, if any.
    pub fn parameter(&self) -> Option<ParameterId> {
        match self {
            Notification::Dirtied(p) | Notification::ValueChanged(p) => Some(*p),
            Notification::ConnectionEstablished { parameter, .. }
            | Notification::ConnectionDestroyed { parameter, .. }
            | Notification::EnabledChanged { parameter, .. } => Some(*parameter),
            _ => None,
        }
    }
}

/// Receiver for drained notifications, e.g. a UI bridge.
pub trait NotificationSink {
    fn notify(&mut self, notification: &Notification);
}

impl<F> NotificationSink for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(*notification);
    }
}
