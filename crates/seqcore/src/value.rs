use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar element types understood by workspace variables and channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Char8,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" => ScalarType::Bool,
            "char8" => ScalarType::Char8,
            "int8" => ScalarType::Int8,
            "uint8" => ScalarType::UInt8,
            "int16" => ScalarType::Int16,
            "uint16" => ScalarType::UInt16,
            "int32" => ScalarType::Int32,
            "uint32" => ScalarType::UInt32,
            "int64" => ScalarType::Int64,
            "uint64" => ScalarType::UInt64,
            "float32" => ScalarType::Float32,
            "float64" => ScalarType::Float64,
            "string" => ScalarType::String,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Char8 => "char8",
            ScalarType::Int8 => "int8",
            ScalarType::UInt8 => "uint8",
            ScalarType::Int16 => "int16",
            ScalarType::UInt16 => "uint16",
            ScalarType::Int32 => "int32",
            ScalarType::UInt32 => "uint32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
        }
    }

    fn integer_bounds(&self) -> Option<(i128, i128, bool)> {
        let bounds = match self {
            ScalarType::Char8 => (0, u8::MAX as i128, false),
            ScalarType::Int8 => (i8::MIN as i128, i8::MAX as i128, true),
            ScalarType::UInt8 => (0, u8::MAX as i128, false),
            ScalarType::Int16 => (i16::MIN as i128, i16::MAX as i128, true),
            ScalarType::UInt16 => (0, u16::MAX as i128, false),
            ScalarType::Int32 => (i32::MIN as i128, i32::MAX as i128, true),
            ScalarType::UInt32 => (0, u32::MAX as i128, false),
            ScalarType::Int64 => (i64::MIN as i128, i64::MAX as i128, true),
            ScalarType::UInt64 => (0, u64::MAX as i128, false),
            _ => return None,
        };
        Some(bounds)
    }

    /// Converts `value` to this type, or `None` when it does not fit.
    fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            ScalarType::Bool => value.as_bool().map(Value::Bool),
            ScalarType::String => value.as_str().map(|s| Value::String(s.to_string())),
            ScalarType::Float32 | ScalarType::Float64 => {
                let f = match value {
                    Value::Int(i) => *i as f64,
                    Value::UInt(u) => *u as f64,
                    Value::Float(f) => *f,
                    _ => return None,
                };
                if *self == ScalarType::Float32 && f.is_finite() && f.abs() > f32::MAX as f64 {
                    return None;
                }
                Some(Value::Float(f))
            }
            _ => {
                let (min, max, signed) = self.integer_bounds()?;
                // char8 also takes a single-byte string
                if let (ScalarType::Char8, Value::String(s)) = (self, value) {
                    return match s.as_bytes() {
                        [b] => Some(Value::UInt(*b as u64)),
                        _ => None,
                    };
                }
                let n = match value {
                    Value::Int(i) => *i as i128,
                    Value::UInt(u) => *u as i128,
                    Value::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i128,
                    _ => return None,
                };
                if n < min || n > max {
                    return None;
                }
                if signed {
                    Some(Value::Int(n as i64))
                } else {
                    Some(Value::UInt(n as u64))
                }
            }
        }
    }
}

/// Parsed form of a serialized type descriptor such as `{"type":"uint32"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Scalar(ScalarType),
    Array {
        element: ScalarType,
        multiplicity: Option<usize>,
    },
}

#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    type_name: String,
    element: Option<Box<RawDescriptor>>,
    multiplicity: Option<usize>,
}

impl TypeDescriptor {
    /// Parses the JSON text form, e.g. `{"type":"float64"}` or
    /// `{"type":"array","element":{"type":"int32"},"multiplicity":4}`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw: RawDescriptor = serde_json::from_str(text.trim())
            .map_err(|e| format!("'{}' is not a type descriptor: {}", text, e))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDescriptor) -> Result<Self, String> {
        if raw.type_name == "array" {
            let element = raw
                .element
                .ok_or_else(|| "array type without 'element'".to_string())?;
            if element.element.is_some() || element.type_name == "array" {
                return Err("nested array types are not supported".to_string());
            }
            let element = ScalarType::from_name(&element.type_name)
                .ok_or_else(|| format!("unknown element type '{}'", element.type_name))?;
            return Ok(TypeDescriptor::Array {
                element,
                multiplicity: raw.multiplicity,
            });
        }
        ScalarType::from_name(&raw.type_name)
            .map(TypeDescriptor::Scalar)
            .ok_or_else(|| format!("unknown type '{}'", raw.type_name))
    }

    pub fn to_json(&self) -> String {
        match self {
            TypeDescriptor::Scalar(s) => format!(r#"{{"type":"{}"}}"#, s.name()),
            TypeDescriptor::Array {
                element,
                multiplicity: Some(n),
            } => format!(
                r#"{{"type":"array","element":{{"type":"{}"}},"multiplicity":{}}}"#,
                element.name(),
                n
            ),
            TypeDescriptor::Array { element, .. } => {
                format!(r#"{{"type":"array","element":{{"type":"{}"}}}}"#, element.name())
            }
        }
    }

    /// Converts `value` to this type, or `None` when the conversion would lose
    /// information or the shapes differ.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            TypeDescriptor::Scalar(s) => s.coerce(value),
            TypeDescriptor::Array {
                element,
                multiplicity,
            } => {
                let items = match value {
                    Value::Array(items) => items,
                    _ => return None,
                };
                if multiplicity.is_some_and(|n| n != items.len()) {
                    return None;
                }
                items
                    .iter()
                    .map(|item| element.coerce(item))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array)
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(s) => f.write_str(s.name()),
            TypeDescriptor::Array {
                element,
                multiplicity: Some(n),
            } => write!(f, "{}[{}]", element.name(), n),
            TypeDescriptor::Array { element, .. } => write!(f, "{}[]", element.name()),
        }
    }
}

/// Untyped payload of a workspace variable or channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, String> {
        match json {
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(Value::UInt(u))
                } else if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else {
                    n.as_f64()
                        .map(Value::Float)
                        .ok_or_else(|| format!("unsupported number {}", n))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(format!("unsupported literal {}", other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A value together with the type it was declared or read with.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    ty: TypeDescriptor,
    value: Value,
}

impl TypedValue {
    /// Builds a typed value, converting `value` to `ty` first.
    pub fn new(ty: TypeDescriptor, value: impl Into<Value>) -> Option<Self> {
        let value = ty.coerce(&value.into())?;
        Some(Self { ty, value })
    }

    pub fn scalar(ty: ScalarType, value: impl Into<Value>) -> Option<Self> {
        Self::new(TypeDescriptor::Scalar(ty), value)
    }

    /// Parses a literal against `ty`. String literals may be JSON-quoted or
    /// bare text; everything else must be JSON.
    pub fn parse(ty: TypeDescriptor, text: &str) -> Result<Self, String> {
        if ty == TypeDescriptor::Scalar(ScalarType::String) {
            let s = serde_json::from_str::<String>(text.trim()).unwrap_or_else(|_| text.to_string());
            return Ok(Self {
                ty,
                value: Value::String(s),
            });
        }
        let json: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| format!("'{}' is not a valid literal: {}", text, e))?;
        let raw = Value::from_json(&json)?;
        let value = ty
            .coerce(&raw)
            .ok_or_else(|| format!("'{}' does not fit type {}", text, ty))?;
        Ok(Self { ty, value })
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Converts to another type, as channel and variable writes do.
    pub fn convert_to(&self, ty: &TypeDescriptor) -> Option<TypedValue> {
        if &self.ty == ty {
            return Some(self.clone());
        }
        ty.coerce(&self.value).map(|value| TypedValue {
            ty: ty.clone(),
            value,
        })
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.ty)
    }
}
