//! The parameter graph: arenas of nodes, parameters and connections plus the
//! propagation that keeps their values consistent.
//!
//! Writes mark dependents dirty; reads pull dirty values up to date. Nothing
//! is recomputed until somebody asks for it.

mod animation;
mod connection;
mod editor;
mod ids;
mod notify;
mod propagation;
mod structure;
mod validation;
mod values;
mod wiring;

pub use connection::Connection;
pub use editor::GraphEditor;
pub use ids::{ConnectionId, NodeId, ParameterId};
pub use notify::{Notification, NotificationSink};
pub use structure::sanitize_node_name;
pub use validation::validate_connection;

use crate::param::Parameter;

/// Storage for every parameter of every node.
pub type ParameterArena = slotmap::SlotMap<ParameterId, Parameter>;
