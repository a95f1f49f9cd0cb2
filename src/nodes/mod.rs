//! Built-in node kinds.
//!
//! Small sources, math operators and a viewer; enough to wire up and drive
//! a graph from the command line.

pub mod math;
pub mod source;
pub mod viewer;

pub use math::{Add, Scale, Sum};
pub use source::{Constant, Frame};
pub use viewer::Viewer;

use crate::node::NodeRegistry;

/// Registers every built-in kind with `registry`.
pub fn register_builtin(registry: &mut NodeRegistry) {
    registry.register::<Constant>();
    registry.register::<Frame>();
    registry.register::<Add>();
    registry.register::<Scale>();
    registry.register::<Sum>();
    registry.register::<Viewer>();
}

/// A registry holding only the built-in kinds.
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    register_builtin(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEditor;
    use crate::param::Value;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 6);
        for id in ["value.constant", "value.frame", "math.add", "math.scale", "math.sum", "output.viewer"] {
            assert!(registry.contains(id), "{} missing", id);
        }
    }

    #[test]
    fn test_constant_scale_viewer_chain() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let constant = editor.create_node("value.constant", None).unwrap();
        let scale = editor.create_node("math.scale", None).unwrap();
        let viewer = editor.create_node("output.viewer", None).unwrap();
        editor.connect_parameters(constant, "Value", scale, "Input").unwrap();
        editor.connect_parameters(scale, "Output", viewer, "Input").unwrap();

        editor.set_node_value(scale, "Factor", Value::Float(3.0), true).unwrap();
        editor.set_node_value(constant, "Value", Value::Float(2.0), true).unwrap();

        // The viewer's input evaluates itself as soon as it is dirtied.
        assert_eq!(editor.node_value(viewer, "Display", false), Some(Value::String("6.000".into())));
        let input = editor.parameter_id(viewer, "Input").unwrap();
        assert!(!editor.parameter(input).unwrap().is_dirty());
    }
}
