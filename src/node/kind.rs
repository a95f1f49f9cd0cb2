//! The NodeKind trait and supporting types.
//!
//! A node kind describes how to populate a fresh node: which parameters it
//! has, how they affect each other and what runs when they are evaluated.

use std::fmt;

use crate::error::GraphError;
use crate::param::Color;

use super::NodeBuilder;

/// Category of a node kind, used for organization and coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Nodes that produce values from nothing (constants, readers).
    Source,
    /// Arithmetic on incoming values.
    Math,
    /// Routing and bookkeeping.
    Utility,
    /// Nodes that present results (viewers, writers).
    Output,
}

impl NodeCategory {
    /// Returns the color associated with this category.
    pub fn color(&self) -> Color {
        match self {
            NodeCategory::Source => Color::rgb(66, 165, 245),
            NodeCategory::Math => Color::rgb(38, 166, 154),
            NodeCategory::Utility => Color::rgb(158, 158, 158),
            NodeCategory::Output => Color::rgb(126, 87, 194),
        }
    }

    /// Returns a human-readable name for the category.
    pub fn name(&self) -> &'static str {
        match self {
            NodeCategory::Source => "Source",
            NodeCategory::Math => "Math",
            NodeCategory::Utility => "Utility",
            NodeCategory::Output => "Output",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static information about a node kind.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    /// Unique type identifier (e.g. "math.add").
    pub id: &'static str,
    /// Human-readable name, also the stem of generated node names.
    pub name: &'static str,
    pub category: NodeCategory,
    pub description: &'static str,
}

impl NodeInfo {
    pub fn new(
        id: &'static str,
        name: &'static str,
        category: NodeCategory,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            category,
            description,
        }
    }
}

/// A type of node that can be instantiated in the graph.
///
/// # Example
///
/// ```ignore
/// struct Double { info: NodeInfo }
///
/// impl NodeKind for Double {
///     fn info(&self) -> &NodeInfo { &self.info }
///
///     fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
///         node.parameter(ParameterDefinition::float("In", 0.0).input())?;
///         node.parameter(ParameterDefinition::float("Out", 0.0).output())?;
///         node.affection("In", "Out")?;
///         node.processing("Out", |ctx| {
///             let v = ctx.float("In");
///             ctx.set_own_value(Value::Float(v * 2.0));
///         })
///     }
/// }
/// ```
pub trait NodeKind: 'static {
    /// Returns static information about this node kind.
    fn info(&self) -> &NodeInfo;

    /// Declares the parameters, affections and callbacks of a new node.
    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(NodeCategory::Math.name(), "Math");
        assert_eq!(NodeCategory::Output.to_string(), "Output");
        assert_ne!(NodeCategory::Source.color(), NodeCategory::Utility.color());
    }

    #[test]
    fn test_node_info() {
        let info = NodeInfo::new("math.add", "Add", NodeCategory::Math, "Adds two numbers");
        assert_eq!(info.id, "math.add");
        assert_eq!(info.category, NodeCategory::Math);
    }
}
