//! Parameter types and the values they carry.
//!
//! Every parameter has a fixed [`ParameterType`]; the values it holds are
//! [`Value`]s of that same type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The type of data a parameter stores.
///
/// Connections may only join parameters of identical type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    Bool,
    Int,
    UnsignedInt,
    Float,
    String,
    Filename,
    Directory,
    Color,
    Enumeration,
    TextInfo,
    Command,
    Geometry,
    Light,
    Camera,
    Image,
    Group,
    PlugIn,
    Generic,
    Label,
}

impl ParameterType {
    /// All parameter types in declaration order.
    pub const ALL: [ParameterType; 19] = [
        ParameterType::Bool,
        ParameterType::Int,
        ParameterType::UnsignedInt,
        ParameterType::Float,
        ParameterType::String,
        ParameterType::Filename,
        ParameterType::Directory,
        ParameterType::Color,
        ParameterType::Enumeration,
        ParameterType::TextInfo,
        ParameterType::Command,
        ParameterType::Geometry,
        ParameterType::Light,
        ParameterType::Camera,
        ParameterType::Image,
        ParameterType::Group,
        ParameterType::PlugIn,
        ParameterType::Generic,
        ParameterType::Label,
    ];

    /// Returns the canonical name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            ParameterType::Bool => "Bool",
            ParameterType::Int => "Int",
            ParameterType::UnsignedInt => "UnsignedInt",
            ParameterType::Float => "Float",
            ParameterType::String => "String",
            ParameterType::Filename => "Filename",
            ParameterType::Directory => "Directory",
            ParameterType::Color => "Color",
            ParameterType::Enumeration => "Enumeration",
            ParameterType::TextInfo => "TextInfo",
            ParameterType::Command => "Command",
            ParameterType::Geometry => "Geometry",
            ParameterType::Light => "Light",
            ParameterType::Camera => "Camera",
            ParameterType::Image => "Image",
            ParameterType::Group => "Group",
            ParameterType::PlugIn => "PlugIn",
            ParameterType::Generic => "Generic",
            ParameterType::Label => "Label",
        }
    }

    /// Looks a type up by its canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<ParameterType> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
    }

    /// Returns the color used to draw pins of this type.
    pub fn color(&self) -> Color {
        match self {
            ParameterType::Bool => Color::rgb(158, 109, 158),
            ParameterType::Int => Color::rgb(226, 88, 62),
            ParameterType::UnsignedInt => Color::rgb(206, 68, 42),
            ParameterType::Float => Color::rgb(109, 173, 158),
            ParameterType::String => Color::rgb(109, 255, 255),
            ParameterType::Filename | ParameterType::Directory => Color::rgb(173, 173, 255),
            ParameterType::Color => Color::rgb(255, 109, 255),
            ParameterType::Enumeration => Color::rgb(173, 158, 173),
            ParameterType::TextInfo => Color::rgb(174, 174, 174),
            ParameterType::Command => Color::rgb(10, 78, 255),
            ParameterType::Geometry => Color::rgb(255, 192, 171),
            ParameterType::Light => Color::rgb(255, 255, 109),
            ParameterType::Camera => Color::rgb(109, 158, 255),
            ParameterType::Image => Color::rgb(109, 255, 109),
            ParameterType::Group => Color::rgb(100, 100, 100),
            ParameterType::PlugIn => Color::rgb(128, 128, 128),
            ParameterType::Generic => Color::rgb(255, 255, 255),
            ParameterType::Label => Color::rgb(255, 245, 195),
        }
    }

    /// Returns the value a freshly created parameter of this type holds.
    pub fn default_value(&self) -> Value {
        match self {
            ParameterType::Bool => Value::Bool(false),
            ParameterType::Int => Value::Int(0),
            ParameterType::UnsignedInt => Value::UnsignedInt(0),
            ParameterType::Float => Value::Float(0.0),
            ParameterType::String => Value::String(String::new()),
            ParameterType::Filename => Value::Filename(String::new()),
            ParameterType::Directory => Value::Directory(String::new()),
            ParameterType::Color => Value::Color(Color::BLACK),
            ParameterType::Enumeration => Value::Enumeration(0),
            ParameterType::TextInfo => Value::TextInfo(String::new()),
            ParameterType::Command => Value::Command,
            ParameterType::Geometry => Value::Geometry(Payload::empty()),
            ParameterType::Light => Value::Light(Payload::empty()),
            ParameterType::Camera => Value::Camera(Payload::empty()),
            ParameterType::Image => Value::Image(Payload::empty()),
            ParameterType::Group => Value::Group(Payload::empty()),
            ParameterType::PlugIn => Value::PlugIn(Payload::empty()),
            ParameterType::Generic => Value::Generic(Payload::empty()),
            ParameterType::Label => Value::Label(String::new()),
        }
    }

    /// Returns true if parameters of this type may accept more than one
    /// incoming connection.
    pub fn supports_multiplicity(&self) -> bool {
        matches!(
            self,
            ParameterType::Bool
                | ParameterType::Int
                | ParameterType::UnsignedInt
                | ParameterType::Float
                | ParameterType::Geometry
                | ParameterType::Light
                | ParameterType::Camera
                | ParameterType::Image
                | ParameterType::Group
                | ParameterType::Generic
        )
    }

    /// Returns true if values of this type are numbers that can carry a range.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ParameterType::Int | ParameterType::UnsignedInt | ParameterType::Float
        )
    }

    /// Returns true if values of this type can be written to a scene file.
    ///
    /// Renderer payloads live only in memory.
    pub fn is_persistable(&self) -> bool {
        !matches!(
            self,
            ParameterType::Command
                | ParameterType::Geometry
                | ParameterType::Light
                | ParameterType::Camera
                | ParameterType::Image
                | ParameterType::Group
                | ParameterType::PlugIn
                | ParameterType::Generic
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// An opaque payload produced by a node and consumed by another.
///
/// The graph never looks inside; two payloads are equal only when they are
/// the same allocation (or both empty).
#[derive(Clone, Default)]
pub struct Payload(Option<Arc<dyn Any + Send + Sync>>);

impl Payload {
    /// The empty payload, used as the default for renderer types.
    pub fn empty() -> Self {
        Self(None)
    }

    /// Wraps a value as a shared payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the payload as `T` if it holds one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|any| any.downcast_ref::<T>())
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("Payload(empty)"),
            Some(arc) => write!(f, "Payload({:p})", Arc::as_ptr(arc)),
        }
    }
}

/// A single typed value held by a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    UnsignedInt(u32),
    Float(f64),
    String(String),
    Filename(String),
    Directory(String),
    Color(Color),
    /// Index into the parameter's enumeration literals.
    Enumeration(usize),
    TextInfo(String),
    /// Commands carry no data; triggering one runs the command callback.
    Command,
    Geometry(Payload),
    Light(Payload),
    Camera(Payload),
    Image(Payload),
    Group(Payload),
    PlugIn(Payload),
    Generic(Payload),
    Label(String),
}

impl Value {
    /// Returns the type of this value.
    pub fn ty(&self) -> ParameterType {
        match self {
            Value::Bool(_) => ParameterType::Bool,
            Value::Int(_) => ParameterType::Int,
            Value::UnsignedInt(_) => ParameterType::UnsignedInt,
            Value::Float(_) => ParameterType::Float,
            Value::String(_) => ParameterType::String,
            Value::Filename(_) => ParameterType::Filename,
            Value::Directory(_) => ParameterType::Directory,
            Value::Color(_) => ParameterType::Color,
            Value::Enumeration(_) => ParameterType::Enumeration,
            Value::TextInfo(_) => ParameterType::TextInfo,
            Value::Command => ParameterType::Command,
            Value::Geometry(_) => ParameterType::Geometry,
            Value::Light(_) => ParameterType::Light,
            Value::Camera(_) => ParameterType::Camera,
            Value::Image(_) => ParameterType::Image,
            Value::Group(_) => ParameterType::Group,
            Value::PlugIn(_) => ParameterType::PlugIn,
            Value::Generic(_) => ParameterType::Generic,
            Value::Label(_) => ParameterType::Label,
        }
    }

    /// Numeric view of the value; integers and bools are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(f64::from(*v)),
            Value::UnsignedInt(v) => Some(f64::from(*v)),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::UnsignedInt(v) => Some(i64::from(*v)),
            Value::Enumeration(v) => i64::try_from(*v).ok(),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of string-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s)
            | Value::Filename(s)
            | Value::Directory(s)
            | Value::TextInfo(s)
            | Value::Label(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// The opaque payload of renderer-typed values.
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            Value::Geometry(p)
            | Value::Light(p)
            | Value::Camera(p)
            | Value::Image(p)
            | Value::Group(p)
            | Value::PlugIn(p)
            | Value::Generic(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UnsignedInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s)
            | Value::Filename(s)
            | Value::Directory(s)
            | Value::TextInfo(s)
            | Value::Label(s) => f.write_str(s),
            Value::Color(c) => write!(f, "#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a),
            Value::Enumeration(i) => write!(f, "#{}", i),
            Value::Command => f.write_str("<command>"),
            other => write!(f, "<{}>", other.ty().name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UnsignedInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}
