//! Pin kinds and connection multiplicity.
//!
//! A parameter's pin kind decides which side of a connection it may sit on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a parameter sits relative to connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PinKind {
    /// Receives values from upstream outputs.
    Input,
    /// Feeds values to downstream inputs.
    Output,
    /// Not connectable; only reachable through affections.
    #[default]
    None,
}

impl PinKind {
    /// Returns a human-readable name for the pin kind.
    pub fn name(&self) -> &'static str {
        match self {
            PinKind::Input => "Input",
            PinKind::Output => "Output",
            PinKind::None => "None",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, PinKind::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, PinKind::Output)
    }

    /// Input and output pins take part in evaluation on read.
    pub fn is_connectable(&self) -> bool {
        !matches!(self, PinKind::None)
    }
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many incoming connections an input pin accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    /// At most this many connections. Never zero.
    Limited(usize),
    /// Any number of connections.
    OneOrMore,
}

impl Multiplicity {
    /// The usual single-connection input.
    pub const SINGLE: Multiplicity = Multiplicity::Limited(1);

    /// Returns true if another connection may be added when `current`
    /// connections already exist.
    pub fn allows(&self, current: usize) -> bool {
        match self {
            Multiplicity::Limited(limit) => current < *limit,
            Multiplicity::OneOrMore => true,
        }
    }

    /// Returns true if more than one connection can be accepted.
    pub fn is_multiple(&self) -> bool {
        match self {
            Multiplicity::Limited(limit) => *limit > 1,
            Multiplicity::OneOrMore => true,
        }
    }

    /// The connection limit, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Multiplicity::Limited(limit) => Some(*limit),
            Multiplicity::OneOrMore => None,
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Multiplicity::SINGLE
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Limited(limit) => write!(f, "{}", limit),
            Multiplicity::OneOrMore => f.write_str("1..n"),
        }
    }
}
