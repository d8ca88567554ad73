//! Form value types and input conversion.
//!
//! A [`TypeDescriptor`] names the type a form component converts its raw
//! input into: a scalar, or an array of up to three dimensions. Array input
//! is split on `,` for the innermost dimension, then `;`, then `|`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separators by array depth, innermost first.
pub const ARRAY_SEPARATORS: [char; 3] = [',', ';', '|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Bool,
    Char,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    fn convert(&self, input: &str) -> Result<Value, ConversionError> {
        let invalid = || ConversionError::Invalid {
            input: input.to_string(),
            type_name: self.name().to_string(),
        };
        Ok(match self {
            ScalarKind::String => Value::String(input.to_string()),
            ScalarKind::Bool => Value::Bool(parse_bool(input).ok_or_else(invalid)?),
            ScalarKind::Char => {
                let mut chars = input.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(invalid()),
                }
            }
            ScalarKind::I32 => Value::I32(input.parse().map_err(|_| invalid())?),
            ScalarKind::I64 => Value::I64(input.parse().map_err(|_| invalid())?),
            ScalarKind::U32 => Value::U32(input.parse().map_err(|_| invalid())?),
            ScalarKind::U64 => Value::U64(input.parse().map_err(|_| invalid())?),
            ScalarKind::F32 => Value::F32(input.parse().map_err(|_| invalid())?),
            ScalarKind::F64 => Value::F64(input.parse().map_err(|_| invalid())?),
        })
    }
}

impl FromStr for ScalarKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "String" | "string" => ScalarKind::String,
            "bool" => ScalarKind::Bool,
            "char" => ScalarKind::Char,
            "i32" => ScalarKind::I32,
            "i64" => ScalarKind::I64,
            "u32" => ScalarKind::U32,
            "u64" => ScalarKind::U64,
            "f32" => ScalarKind::F32,
            "f64" => ScalarKind::F64,
            other => return Err(ConversionError::UnknownType(other.to_string())),
        })
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Target type of a form component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub const MAX_DIMENSIONS: usize = ARRAY_SEPARATORS.len();

    pub fn scalar(kind: ScalarKind) -> Self {
        TypeDescriptor::Scalar(kind)
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element))
    }

    /// `kind` wrapped in `dimensions` array levels.
    pub fn array(kind: ScalarKind, dimensions: usize) -> Self {
        (0..dimensions).fold(TypeDescriptor::Scalar(kind), |inner, _| Self::array_of(inner))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_))
    }

    /// Number of array levels, 0 for scalars.
    pub fn dimensions(&self) -> usize {
        match self {
            TypeDescriptor::Scalar(_) => 0,
            TypeDescriptor::Array(inner) => 1 + inner.dimensions(),
        }
    }

    /// Innermost scalar kind.
    pub fn element_kind(&self) -> ScalarKind {
        match self {
            TypeDescriptor::Scalar(kind) => *kind,
            TypeDescriptor::Array(inner) => inner.element_kind(),
        }
    }

    /// Convert raw form input into a value of this type.
    pub fn convert(&self, input: &str) -> Result<Value, ConversionError> {
        let dimensions = self.dimensions();
        if dimensions > Self::MAX_DIMENSIONS {
            return Err(ConversionError::TooManyDimensions(dimensions));
        }
        match self {
            TypeDescriptor::Scalar(kind) => kind.convert(input.trim()),
            TypeDescriptor::Array(inner) => {
                let input = input.trim();
                if input.is_empty() {
                    return Ok(Value::Array(Vec::new()));
                }
                input
                    .split(ARRAY_SEPARATORS[dimensions - 1])
                    .map(|part| inner.convert(part))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
        }
    }
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        TypeDescriptor::Scalar(ScalarKind::String)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(kind) => f.write_str(kind.name()),
            TypeDescriptor::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = ConversionError;

    /// Parses names like `String`, `bool[]` or `i64[][]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut base = s.trim();
        let mut dimensions = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped;
            dimensions += 1;
        }
        Ok(TypeDescriptor::array(base.parse()?, dimensions))
    }
}

/// A converted form value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Char(char),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of scalar numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::I32(n) => Some(n as f64),
            Value::I64(n) => Some(n as f64),
            Value::U32(n) => Some(n as f64),
            Value::U64(n) => Some(n as f64),
            Value::F32(n) => Some(n as f64),
            Value::F64(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Value::Array(values) => 1 + values.first().map_or(0, Value::depth),
            _ => 0,
        }
    }
}

impl fmt::Display for Value {
    /// Formats back into form input syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Array(values) => {
                let separator = ARRAY_SEPARATORS[(self.depth() - 1).min(ARRAY_SEPARATORS.len() - 1)];
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", separator)?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("'{input}' is not a valid {type_name}")]
    Invalid { input: String, type_name: String },

    #[error("arrays of {0} dimensions are not supported")]
    TooManyDimensions(usize),

    #[error("unknown type '{0}'")]
    UnknownType(String),
}
