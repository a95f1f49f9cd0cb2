//! Viewer node: shows whatever reaches it.

use crate::error::GraphError;
use crate::node::{NodeBuilder, NodeCategory, NodeInfo, NodeKind};
use crate::param::{ParameterDefinition, ParameterType, Value};

/// Displays a number as soon as it changes.
///
/// The input evaluates itself whenever it is dirtied, so the display never
/// waits for a read. Requesting aux processing on the input counts a redraw.
///
/// # Parameters
///
/// - **Input** (Float, Input, self-evaluating)
/// - **Display** (String, read-only): the input formatted with three decimals.
/// - **Redraws** (UnsignedInt, read-only): how many redraws were requested.
#[derive(Default)]
pub struct Viewer;

impl NodeKind for Viewer {
    fn info(&self) -> &NodeInfo {
        static INFO: NodeInfo = NodeInfo {
            id: "output.viewer",
            name: "Viewer",
            category: NodeCategory::Output,
            description: "Shows the value arriving at its input",
        };
        &INFO
    }

    fn build(&self, node: &mut NodeBuilder<'_>) -> Result<(), GraphError> {
        node.parameter(ParameterDefinition::float("Input", 0.0).input().self_evaluating())?;
        node.parameter(ParameterDefinition::text("Display", "").read_only())?;
        node.parameter(ParameterDefinition::new("Redraws", ParameterType::UnsignedInt).read_only())?;
        node.processing("Input", |ctx| {
            let text = format!("{:.3}", ctx.float("Input"));
            ctx.set_value("Display", Value::String(text));
        })?;
        node.aux_processing("Input", |ctx| {
            let redraws = ctx.value("Redraws").and_then(|v| v.as_int()).unwrap_or(0);
            ctx.set_value("Redraws", Value::UnsignedInt(redraws as u32 + 1));
        })?;
        Ok(())
    }
}
