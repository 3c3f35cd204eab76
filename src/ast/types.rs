use std::fmt;
use std::str::FromStr;

/// Semantic type of an expression, a variable, or a function result.
///
/// `Object` is the untyped fallback used whenever the type cannot be
/// resolved (unknown variables, unregistered functions, property access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    Boolean,
    Number,
    String,
    DateTime,
    Array,
    #[default]
    Object,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::DateTime => "datetime",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTypeName(pub String);

impl fmt::Display for UnknownTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown type name '{}'", self.0)
    }
}

impl std::error::Error for UnknownTypeName {}

impl FromStr for ValueType {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(ValueType::Boolean),
            "number" | "double" | "float" | "int" | "integer" | "decimal" => Ok(ValueType::Number),
            "string" | "text" => Ok(ValueType::String),
            "datetime" | "date" | "datetimeoffset" => Ok(ValueType::DateTime),
            "array" | "list" => Ok(ValueType::Array),
            "object" | "any" => Ok(ValueType::Object),
            _ => Err(UnknownTypeName(s.to_string())),
        }
    }
}
