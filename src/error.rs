//! Error types shared across the graph.
//!
//! Each concern has its own enum; structural failures are reported to the
//! caller, never panicked on.

use thiserror::Error;

use crate::param::{Multiplicity, ParameterType, PinKind};

/// Errors raised when writing values or changing a parameter's shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The parameter handle no longer refers to a live parameter.
    #[error("parameter handle is stale or unknown")]
    UnknownParameter,
    /// The value's type differs from the parameter's declared type.
    #[error("expected a {expected} value, got {found}")]
    TypeMismatch {
        expected: ParameterType,
        found: ParameterType,
    },
    /// A whole-list write did not match the parameter's size.
    #[error("expected {expected} values, got {found}")]
    SizeMismatch { expected: usize, found: usize },
    /// An indexed write fell outside the parameter's values.
    #[error("index {index} is out of bounds for a parameter of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },
    /// Multiplicity above one was requested for a type that cannot take it.
    #[error("type {ty} does not support multiplicity {multiplicity}")]
    UnsupportedMultiplicity {
        ty: ParameterType,
        multiplicity: Multiplicity,
    },
    /// Parameter sizes must lie in `1..=MAX_SIZE`.
    #[error("invalid parameter size {0}")]
    InvalidSize(usize),
    /// Connected parameters keep their size.
    #[error("cannot resize a parameter that has connections")]
    Connected,
    /// Only numeric parameters can carry animation keys.
    #[error("{0} parameters cannot be animated")]
    NotAnimatable(ParameterType),
}

/// Reasons a connection request was refused. The graph is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("node not found")]
    UnknownNode,
    #[error("parameter handle is stale or unknown")]
    StaleParameter,
    #[error("parameter \"{path}\" not found on node \"{node}\"")]
    UnknownParameter { node: String, path: String },
    #[error("parameter \"{parameter}\" is a {found} pin, expected {expected}")]
    WrongPinKind {
        parameter: String,
        expected: PinKind,
        found: PinKind,
    },
    #[error("cannot connect a {output} output to a {input} input")]
    TypeMismatch {
        output: ParameterType,
        input: ParameterType,
    },
    #[error("input \"{parameter}\" already holds {limit} connection(s)")]
    MultiplicityExceeded { parameter: String, limit: usize },
    #[error("output has {output} values but input has {input}")]
    SizeMismatch { output: usize, input: usize },
}

/// Programmer errors detected while pulling values through the graph.
///
/// These abort the current propagation; flags not yet cleared stay dirty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error("evaluation cycle through parameter \"{0}\"")]
    Cycle(String),
    #[error("evaluation nested deeper than {0} levels")]
    DepthExceeded(usize),
    #[error("parameter handle is stale or unknown")]
    StaleParameter,
}

/// Errors from structural edits: node creation, renaming, grouping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node type \"{0}\"")]
    UnknownNodeType(String),
    #[error("node not found")]
    UnknownNode,
    #[error("a node named \"{0}\" already exists")]
    DuplicateNodeName(String),
    #[error("node group \"{0}\" already exists")]
    DuplicateGroup(String),
    #[error("node group \"{0}\" not found")]
    UnknownGroup(String),
    #[error("parameter \"{0}\" not found")]
    UnknownParameter(String),
    #[error("parameter group \"{0}\" not found")]
    UnknownParameterGroup(String),
    #[error("\"{0}\" already exists in this parameter group")]
    DuplicateParameter(String),
    #[error(transparent)]
    Value(#[from] ValueError),
}
