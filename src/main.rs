//! Parameter Graph - command line front end
//!
//! Loads (or builds) a graph, applies `--set` writes, prints the values of
//! `--evaluate` parameters and optionally saves the result.

mod cli;

use anyhow::{bail, Context};
use clap::Parser;

use param_graph::config::GraphConfig;
use param_graph::graph::GraphEditor;
use param_graph::nodes::builtin_registry;
use param_graph::param::Value;
use param_graph::persistence::{load_from_file, save_to_file, Scene};

use crate::cli::CliArgs;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let config = match &args.config {
        Some(path) => GraphConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GraphConfig::default(),
    };
    let mut editor = GraphEditor::with_config(config, builtin_registry());

    let name = match &args.scene {
        Some(path) => {
            let scene = load_from_file(path)
                .with_context(|| format!("loading scene {}", path.display()))?;
            scene.apply_to(&mut editor)?;
            scene.name
        }
        None => {
            build_demo(&mut editor)?;
            "Demo".to_string()
        }
    };

    for assignment in &args.assignments {
        let Some(id) = editor.parameter_by_qualified_name(&assignment.parameter) else {
            bail!("no parameter \"{}\"", assignment.parameter);
        };
        editor
            .set_value(id, Value::Float(assignment.value), true)
            .with_context(|| format!("setting {}", assignment.parameter))?;
    }

    let targets = if args.evaluate.is_empty() && args.scene.is_none() {
        vec!["Viewer1.Display".to_string()]
    } else {
        args.evaluate.clone()
    };
    for target in &targets {
        let Some(id) = editor.parameter_by_qualified_name(target) else {
            bail!("no parameter \"{}\"", target);
        };
        match editor.get_values(id, true) {
            Some(values) => {
                let shown: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                println!("{} = {}", target, shown.join(", "));
            }
            None => println!("{} = <none>", target),
        }
    }

    if let Some(path) = &args.save {
        save_to_file(&Scene::from_editor(&editor, name), path)
            .with_context(|| format!("saving scene {}", path.display()))?;
        log::info!("Saved scene to {}", path.display());
    }
    Ok(())
}

/// Two constants summed, scaled and shown in a viewer.
fn build_demo(editor: &mut GraphEditor) -> anyhow::Result<()> {
    let a = editor.create_node("value.constant", None)?;
    let b = editor.create_node("value.constant", None)?;
    let sum = editor.create_node("math.sum", None)?;
    let scale = editor.create_node("math.scale", None)?;
    let viewer = editor.create_node("output.viewer", None)?;

    editor.set_node_value(a, "Value", Value::Float(1.0), true)?;
    editor.set_node_value(b, "Value", Value::Float(2.0), true)?;
    editor.set_node_value(scale, "Factor", Value::Float(10.0), true)?;

    editor.connect_parameters(a, "Value", sum, "Inputs")?;
    editor.connect_parameters(b, "Value", sum, "Inputs")?;
    editor.connect_parameters(sum, "Total", scale, "Input")?;
    editor.connect_parameters(scale, "Output", viewer, "Input")?;
    Ok(())
}
