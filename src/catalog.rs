//! Loads an [`Environment`] from a JSON catalog.
//!
//! ```json
//! {
//!   "variables": { "zone.temperature": "number", "name": "string" },
//!   "functions": [
//!     { "name": "OPTION", "arguments": ["object"], "result": "boolean" }
//!   ]
//! }
//! ```
//!
//! Both keys are optional. `arguments` defaults to no arguments and `result`
//! to `object`.

use std::fmt;

use log::debug;
use serde_json::Value;

use crate::ast::ValueType;
use crate::environment::{Environment, EnvironmentError};

#[derive(Debug)]
pub enum CatalogError {
    /// Not valid JSON
    Json(serde_json::Error),
    /// Valid JSON, wrong layout
    Shape(String),
    /// A type name that is not a [`ValueType`]
    UnknownType(String),
    /// Conflicting registrations
    Environment(EnvironmentError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Json(e) => write!(f, "Invalid catalog JSON: {}", e),
            CatalogError::Shape(msg) => write!(f, "Invalid catalog: {}", msg),
            CatalogError::UnknownType(name) => write!(f, "Unknown type '{}' in catalog", name),
            CatalogError::Environment(e) => write!(f, "Catalog conflict: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Json(e) => Some(e),
            CatalogError::Environment(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

impl From<EnvironmentError> for CatalogError {
    fn from(e: EnvironmentError) -> Self {
        CatalogError::Environment(e)
    }
}

/// Parses a catalog document into a new environment.
pub fn load_environment(json: &str) -> Result<Environment, CatalogError> {
    let mut env = Environment::new();
    extend_environment(&mut env, json)?;
    Ok(env)
}

/// Adds the catalog's registrations to an existing environment.
pub fn extend_environment(env: &mut Environment, json: &str) -> Result<(), CatalogError> {
    let document: Value = serde_json::from_str(json)?;
    let root = document
        .as_object()
        .ok_or_else(|| CatalogError::Shape("the catalog must be a JSON object".to_string()))?;

    if let Some(variables) = root.get("variables") {
        let variables = variables
            .as_object()
            .ok_or_else(|| CatalogError::Shape("'variables' must map names to type names".to_string()))?;
        for (name, ty) in variables {
            env.add_variable(name.clone(), type_of(ty, name)?)?;
        }
        debug!("catalog registered {} variables", variables.len());
    }

    if let Some(functions) = root.get("functions") {
        let functions = functions
            .as_array()
            .ok_or_else(|| CatalogError::Shape("'functions' must be an array".to_string()))?;
        for function in functions {
            let (name, arguments, result) = read_function(function)?;
            env.add_function(name, arguments, result)?;
        }
        debug!("catalog registered {} function overloads", functions.len());
    }

    Ok(())
}

fn type_of(value: &Value, context: &str) -> Result<ValueType, CatalogError> {
    let name = value
        .as_str()
        .ok_or_else(|| CatalogError::Shape(format!("type of '{}' must be a string", context)))?;
    name.parse()
        .map_err(|_| CatalogError::UnknownType(name.to_string()))
}

fn read_function(value: &Value) -> Result<(String, Vec<ValueType>, ValueType), CatalogError> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::Shape("every function needs a string 'name'".to_string()))?;

    let arguments = match value.get("arguments") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| type_of(item, name))
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(CatalogError::Shape(format!(
                "'arguments' of '{}' must be an array of type names",
                name
            )));
        }
    };

    let result = match value.get("result") {
        None => ValueType::Object,
        Some(ty) => type_of(ty, name)?,
    };

    Ok((name.to_string(), arguments, result))
}
