//! Declarative parameter definitions.
//!
//! Node kinds describe the parameters they need with [`ParameterDefinition`];
//! the graph turns each definition into a live parameter when a node is built.

use crate::error::ValueError;

use super::{Multiplicity, ParameterType, PinKind, Value};

/// The maximum number of values a single parameter can store.
pub const MAX_SIZE: usize = 65536;

/// Allowed range for a numeric parameter.
///
/// Writes outside `min..=max` are clamped. `step` is an editing hint only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl NumberRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
            step: None,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Clamps a numeric value into the range. Other values pass through.
    pub fn clamp(&self, value: Value) -> Value {
        match value {
            Value::Float(v) => Value::Float(v.clamp(self.min, self.max)),
            Value::Int(v) => Value::Int(f64::from(v).clamp(self.min, self.max).round() as i32),
            Value::UnsignedInt(v) => Value::UnsignedInt(
                f64::from(v).clamp(self.min.max(0.0), self.max.max(0.0)).round() as u32,
            ),
            other => other,
        }
    }

    /// Maps a value in the range to `0.0..=1.0`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Definition of a parameter on a node.
///
/// Built with one of the typed constructors and refined with the chained
/// setters, e.g. `ParameterDefinition::number("Gain", 0.0, 2.0, 1.0).input()`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDefinition {
    /// Name, unique within its parameter group.
    pub name: String,
    pub ty: ParameterType,
    pub pin: PinKind,
    /// Default values; the parameter's size is `defaults.len()`.
    pub defaults: Vec<Value>,
    pub multiplicity: Multiplicity,
    pub description: String,
    pub enabled: bool,
    pub visible: bool,
    pub read_only: bool,
    pub self_evaluating: bool,
    pub range: Option<NumberRange>,
    /// Labels of an enumeration parameter, indexed by its value.
    pub literals: Vec<String>,
}

impl ParameterDefinition {
    /// Creates a single-valued, unconnectable parameter holding the type's default.
    pub fn new(name: impl Into<String>, ty: ParameterType) -> Self {
        Self {
            name: name.into(),
            ty,
            pin: PinKind::None,
            defaults: vec![ty.default_value()],
            multiplicity: Multiplicity::default(),
            description: String::new(),
            enabled: true,
            visible: true,
            read_only: false,
            self_evaluating: false,
            range: None,
            literals: Vec::new(),
        }
    }

    /// Creates a float parameter.
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, ParameterType::Float).with_default(Value::Float(default))
    }

    /// Creates a float parameter clamped to `min..=max`.
    pub fn number(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self::float(name, default).with_range(NumberRange::new(min, max))
    }

    pub fn int(name: impl Into<String>, default: i32) -> Self {
        Self::new(name, ParameterType::Int).with_default(Value::Int(default))
    }

    /// Creates a boolean parameter.
    pub fn toggle(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, ParameterType::Bool).with_default(Value::Bool(default))
    }

    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, ParameterType::String).with_default(Value::String(default.into()))
    }

    pub fn filename(name: impl Into<String>) -> Self {
        Self::new(name, ParameterType::Filename)
    }

    /// Creates an enumeration parameter selecting one of `literals`.
    pub fn choice(name: impl Into<String>, literals: &[&str], default: usize) -> Self {
        let mut definition = Self::new(name, ParameterType::Enumeration)
            .with_default(Value::Enumeration(default.min(literals.len().saturating_sub(1))));
        definition.literals = literals.iter().map(|l| l.to_string()).collect();
        definition
    }

    /// Creates a command parameter; triggering it runs its command callback.
    pub fn command(name: impl Into<String>) -> Self {
        Self::new(name, ParameterType::Command)
    }

    /// Turns the parameter into an input pin.
    pub fn input(mut self) -> Self {
        self.pin = PinKind::Input;
        self
    }

    /// Turns the parameter into an output pin.
    pub fn output(mut self) -> Self {
        self.pin = PinKind::Output;
        self
    }

    pub fn with_pin(mut self, pin: PinKind) -> Self {
        self.pin = pin;
        self
    }

    /// Replaces the default with a single value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.defaults = vec![value];
        self
    }

    /// Makes the parameter hold `size` copies of its first default.
    pub fn with_size(mut self, size: usize) -> Self {
        let first = self
            .defaults
            .first()
            .cloned()
            .unwrap_or_else(|| self.ty.default_value());
        self.defaults = vec![first; size];
        self
    }

    /// Replaces the defaults with an explicit list.
    pub fn with_defaults(mut self, values: Vec<Value>) -> Self {
        self.defaults = values;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_range(mut self, range: NumberRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Input pins flagged this way evaluate as soon as they are dirtied.
    pub fn self_evaluating(mut self) -> Self {
        self.self_evaluating = true;
        self
    }

    /// Number of values the parameter holds.
    pub fn size(&self) -> usize {
        self.defaults.len()
    }

    /// Checks the definition's internal consistency.
    pub fn validate(&self) -> Result<(), ValueError> {
        let size = self.size();
        if size == 0 || size > MAX_SIZE {
            return Err(ValueError::InvalidSize(size));
        }
        if let Some(wrong) = self.defaults.iter().find(|v| v.ty() != self.ty) {
            return Err(ValueError::TypeMismatch {
                expected: self.ty,
                found: wrong.ty(),
            });
        }
        validate_multiplicity(self.ty, self.multiplicity)
    }
}

/// Checks that `ty` may carry `multiplicity`.
pub fn validate_multiplicity(
    ty: ParameterType,
    multiplicity: Multiplicity,
) -> Result<(), ValueError> {
    let valid = match multiplicity {
        Multiplicity::Limited(0) => false,
        Multiplicity::Limited(1) => true,
        _ => ty.supports_multiplicity(),
    };
    if valid {
        Ok(())
    } else {
        Err(ValueError::UnsupportedMultiplicity { ty, multiplicity })
    }
}
