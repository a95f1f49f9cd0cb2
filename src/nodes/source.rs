//! Value sources.

use crate::error::GraphError;
use crate::node::{NodeBuilder, NodeCategory, NodeInfo, NodeKind};
use crate::param::ParameterDefinition;

/// A user-set number.
///
/// # Parameters
///
/// - **Value** (Float, Output): whatever was last written to it.
#[derive(Default)]
pub struct Constant;

impl NodeKind for Constant {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "value.constant",
            name: "Constant",
            category: NodeCategory::Source,
            description: "Outputs a fixed number",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(
            ParameterDefinition::float("Value", 0.0)
                .output()
                .with_description("The constant value"),
        )?;
        Ok(())
    }
}

/// The editor's current frame as a number.
///
/// # Parameters
///
/// - **Frame** (Float, Output): set whenever the current frame changes.
#[derive(Default)]
pub struct Frame;

impl NodeKind for Frame {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "value.frame",
            name: "Frame",
            category: NodeCategory::Source,
            description: "Outputs the current frame",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(ParameterDefinition::float("Frame", 0.0).output().read_only())?;
        node.time_dependent("Frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEditor;
    use crate::nodes::builtin_registry;
    use crate::param::Value;

    #[test]
    fn test_constant_info() {
        let constant = Constant;
        assert_eq!(constant.info().id, "value.constant");
        assert_eq!(constant.info().category, NodeCategory::Source);
    }

    #[test]
    fn test_frame_follows_current_frame() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let frame = editor.create_node("value.frame", None).unwrap();
        let output = editor.parameter_id(frame, "Frame").unwrap();
        assert_eq!(editor.node(frame).unwrap().time_parameter(), Some(output));

        editor.set_current_frame(24);
        assert_eq!(editor.get_value(output, true), Some(Value::Float(24.0)));
    }
}
