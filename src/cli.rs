use std::path::PathBuf;
use std::str::FromStr;

use clap::{value_parser, Parser};

#[derive(Parser, Debug)]
#[command(name = "param_graph")]
#[command(version)]
#[command(about = "Loads a parameter graph, edits it and evaluates parameters")]
pub struct CliArgs {
    /// Scene file to load. Without one, a small demo graph is built.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Writes a value before evaluating, e.g. `--set Constant1.Value=2.5`.
    #[arg(long = "set", value_parser = value_parser!(Assignment))]
    pub assignments: Vec<Assignment>,

    /// Parameter to evaluate and print, e.g. `--evaluate Scale1.Output`.
    #[arg(long = "evaluate")]
    pub evaluate: Vec<String>,

    /// Writes the resulting scene to this file.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// `node.path=value` from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub parameter: String,
    pub value: f64,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (parameter, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected node.parameter=value, got \"{}\"", s))?;
        if !parameter.contains('.') {
            return Err(format!("\"{}\" does not name a node and a parameter", parameter));
        }
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number \"{}\": {}", value, e))?;
        Ok(Assignment {
            parameter: parameter.trim().to_string(),
            value,
        })
    }
}
