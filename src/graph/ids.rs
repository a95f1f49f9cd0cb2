//! Generation-checked handles into the graph's arenas.
//!
//! A handle outlives the item it names without dangling: once the item is
//! removed, lookups with the old handle return `None`.

slotmap::new_key_type! {
    /// Handle to a node.
    pub struct NodeId;

    /// Handle to a parameter in the parameter arena.
    pub struct ParameterId;

    /// Handle to a connection between an output and an input parameter.
    pub struct ConnectionId;
}
