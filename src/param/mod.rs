//! Parameter module
//!
//! Typed values, parameter definitions, live parameters, parameter groups,
//! keyframes and the callback context.

pub mod animation;
pub mod context;
pub mod definition;
pub mod group;
pub mod parameter;
pub mod pin;
pub mod value;

pub use animation::{keyed_value, Interpolation, Key, KeyList};
pub use context::{Callback, CallbackKind, ConnectionCallback, ConnectionHook, ProcessContext};
pub use definition::{validate_multiplicity, NumberRange, ParameterDefinition, MAX_SIZE};
pub use group::{GroupEntry, ParameterGroup, PATH_SEPARATOR};
pub use parameter::{Parameter, ValueHandle};
pub use pin::{Multiplicity, PinKind};
pub use value::{Color, ParameterType, Payload, Value};
