//! Arithmetic nodes.

use crate::error::GraphError;
use crate::node::{NodeBuilder, NodeCategory, NodeInfo, NodeKind};
use crate::param::{Multiplicity, ParameterDefinition, Value};

/// Adds two numbers.
///
/// # Parameters
///
/// - **A**, **B** (Float, Input): the operands.
/// - **Sum** (Float, Output): `A + B`.
#[derive(Default)]
pub struct Add;

impl NodeKind for Add {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "math.add",
            name: "Add",
            category: NodeCategory::Math,
            description: "Adds two numbers",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(ParameterDefinition::float("A", 0.0).input())?;
        node.parameter(ParameterDefinition::float("B", 0.0).input())?;
        node.parameter(ParameterDefinition::float("Sum", 0.0).output())?;
        node.affection("A", "Sum")?;
        node.affection("B", "Sum")?;
        node.processing("Sum", |ctx| {
            let sum = ctx.float("A") + ctx.float("B");
            ctx.set_own_value(Value::Float(sum));
        })
    }
}

/// Multiplies its input by a factor.
///
/// # Parameters
///
/// - **Input** (Float, Input)
/// - **Factor** (Float, -100 to 100): multiplier, 1 by default.
/// - **Output** (Float, Output): `Input × Factor`.
#[derive(Default)]
pub struct Scale;

impl NodeKind for Scale {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "math.scale",
            name: "Scale",
            category: NodeCategory::Math,
            description: "Multiplies a number by a factor",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(ParameterDefinition::float("Input", 0.0).input())?;
        node.parameter(ParameterDefinition::number("Factor", -100.0, 100.0, 1.0))?;
        node.parameter(ParameterDefinition::float("Output", 0.0).output())?;
        node.affection("Input", "Output")?;
        node.affection("Factor", "Output")?;
        node.processing("Output", |ctx| {
            let scaled = ctx.float("Input") * ctx.float("Factor");
            ctx.set_own_value(Value::Float(scaled));
        })
    }
}

/// Sums any number of connected values.
///
/// # Parameters
///
/// - **Inputs** (Float, Input, one or more connections)
/// - **Total** (Float, Output): sum over all connections.
#[derive(Default)]
pub struct Sum;

impl NodeKind for Sum {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "math.sum",
            name: "Sum",
            category: NodeCategory::Math,
            description: "Sums every connected input",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(
            ParameterDefinition::float("Inputs", 0.0)
                .input()
                .with_multiplicity(Multiplicity::OneOrMore),
        )?;
        node.parameter(ParameterDefinition::float("Total", 0.0).output())?;
        node.affection("Inputs", "Total")?;
        node.processing("Total", |ctx| {
            let total: f64 = ctx
                .input_values("Inputs")
                .iter()
                .filter_map(Value::as_float)
                .sum();
            ctx.set_own_value(Value::Float(total));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectError;
    use crate::graph::{GraphEditor, NodeId};
    use crate::nodes::builtin_registry;

    fn constant(editor: &mut GraphEditor, value: f64) -> NodeId {
        let node = editor.create_node("value.constant", None).unwrap();
        editor
            .set_node_value(node, "Value", Value::Float(value), true)
            .unwrap();
        node
    }

    #[test]
    fn test_add() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let a = constant(&mut editor, 2.0);
        let b = constant(&mut editor, 3.5);
        let add = editor.create_node("math.add", None).unwrap();
        editor.connect_parameters(a, "Value", add, "A").unwrap();
        editor.connect_parameters(b, "Value", add, "B").unwrap();

        assert_eq!(editor.node_value(add, "Sum", true), Some(Value::Float(5.5)));

        editor.set_node_value(b, "Value", Value::Float(-1.0), true).unwrap();
        assert_eq!(editor.node_value(add, "Sum", true), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_scale_clamps_factor() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let source = constant(&mut editor, 2.0);
        let scale = editor.create_node("math.scale", None).unwrap();
        editor.connect_parameters(source, "Value", scale, "Input").unwrap();

        editor
            .set_node_value(scale, "Factor", Value::Float(500.0), true)
            .unwrap();
        assert_eq!(editor.node_value(scale, "Factor", false), Some(Value::Float(100.0)));
        assert_eq!(editor.node_value(scale, "Output", true), Some(Value::Float(200.0)));
    }

    #[test]
    fn test_sum_accepts_many_inputs() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let sum = editor.create_node("math.sum", None).unwrap();
        for value in [1.0, 2.0, 4.0] {
            let source = constant(&mut editor, value);
            editor.connect_parameters(source, "Value", sum, "Inputs").unwrap();
        }
        assert_eq!(editor.node_value(sum, "Total", true), Some(Value::Float(7.0)));
    }

    #[test]
    fn test_add_inputs_take_one_connection() {
        let mut editor = GraphEditor::with_registry(builtin_registry());
        let a = constant(&mut editor, 1.0);
        let b = constant(&mut editor, 2.0);
        let add = editor.create_node("math.add", None).unwrap();
        editor.connect_parameters(a, "Value", add, "A").unwrap();
        assert!(matches!(
            editor.connect_parameters(b, "Value", add, "A"),
            Err(ConnectError::MultiplicityExceeded { .. })
        ));
    }
}
