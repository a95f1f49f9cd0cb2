//! Node module
//!
//! Nodes, the NodeKind trait, node construction and the node registry.

pub mod builder;
pub mod kind;
pub mod node;
pub mod registry;

pub use builder::NodeBuilder;
pub use kind::{NodeCategory, NodeInfo, NodeKind};
pub use node::{Node, ROOT_GROUP_NAME};
pub use registry::{NodeFactory, NodeRegistry};
