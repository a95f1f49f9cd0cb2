//! Connections between an output parameter and an input parameter.

use super::{ConnectionId, ParameterId};

/// A directed edge from an output pin to an input pin.
///
/// Connections own nothing; both endpoints list the connection's id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    source: ParameterId,
    target: ParameterId,
}

impl Connection {
    /// Creates a new connection record.
    pub fn new(id: ConnectionId, source: ParameterId, target: ParameterId) -> Self {
        Self { id, source, target }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The output parameter the value flows from.
    pub fn source(&self) -> ParameterId {
        self.source
    }

    /// The input parameter the value flows into.
    pub fn target(&self) -> ParameterId {
        self.target
    }

    /// Returns true if `parameter` is one of the endpoints.
    pub fn involves(&self, parameter: ParameterId) -> bool {
        self.source == parameter || self.target == parameter
    }

    /// The endpoint opposite `parameter`, if `parameter` is an endpoint.
    pub fn other_end(&self, parameter: ParameterId) -> Option<ParameterId> {
        if parameter == self.source {
            Some(self.target)
        } else if parameter == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}
