use std::collections::HashMap;
use std::fmt;

use crate::ast::ValueType;

/// A registered function overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub arguments: Vec<ValueType>,
    pub result: ValueType,
}

/// Conflicting registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The variable already exists with another type
    VariableConflict {
        name: String,
        existing: ValueType,
        requested: ValueType,
    },

    /// A function of that name already returns another type
    FunctionResultConflict {
        name: String,
        existing: ValueType,
        requested: ValueType,
    },
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentError::VariableConflict {
                name,
                existing,
                requested,
            } => write!(
                f,
                "Variable '{}' is already defined as {}, cannot redefine it as {}",
                name, existing, requested
            ),
            EnvironmentError::FunctionResultConflict {
                name,
                existing,
                requested,
            } => write!(
                f,
                "Function '{}' already returns {}, cannot add an overload returning {}",
                name, existing, requested
            ),
        }
    }
}

impl std::error::Error for EnvironmentError {}

/// Symbol table giving identifiers their semantic types.
///
/// Built once by the caller, then shared by reference across parses.
/// Variable names are case-sensitive, function names are not.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, ValueType>,
    functions: Vec<FunctionSignature>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable. Registering the same name and type again is a no-op.
    pub fn add_variable(&mut self, name: impl Into<String>, ty: ValueType) -> Result<(), EnvironmentError> {
        let name = name.into();
        match self.variables.get(&name) {
            Some(existing) if *existing == ty => Ok(()),
            Some(existing) => Err(EnvironmentError::VariableConflict {
                name,
                existing: *existing,
                requested: ty,
            }),
            None => {
                self.variables.insert(name, ty);
                Ok(())
            }
        }
    }

    pub fn try_get_variable(&self, name: &str) -> Option<ValueType> {
        self.variables.get(name).copied()
    }

    /// Appends a function overload. All overloads of one name must share a
    /// result type.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        arguments: Vec<ValueType>,
        result: ValueType,
    ) -> Result<(), EnvironmentError> {
        let name = name.into();
        if let Some(existing) = self
            .get_functions(&name)
            .into_iter()
            .find(|f| f.result != result)
        {
            return Err(EnvironmentError::FunctionResultConflict {
                name,
                existing: existing.result,
                requested: result,
            });
        }

        self.functions.push(FunctionSignature {
            name,
            arguments,
            result,
        });
        Ok(())
    }

    /// Result type of the first overload with this name and arity.
    ///
    /// Argument types are not compared, only their count.
    pub fn try_get_function(&self, name: &str, arguments: &[ValueType]) -> Option<ValueType> {
        // TODO: compare argument types once catalogs declare them reliably
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name) && f.arguments.len() == arguments.len())
            .map(|f| f.result)
    }

    /// Every overload registered under `name`, in registration order.
    pub fn get_functions(&self, name: &str) -> Vec<&FunctionSignature> {
        self.functions
            .iter()
            .filter(|f| f.name.eq_ignore_ascii_case(name))
            .collect()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.variables.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty()
    }

    /// Builder form of [`Environment::add_variable`].
    pub fn with_variable(mut self, name: impl Into<String>, ty: ValueType) -> Result<Self, EnvironmentError> {
        self.add_variable(name, ty)?;
        Ok(self)
    }

    /// Builder form of [`Environment::add_function`].
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        arguments: Vec<ValueType>,
        result: ValueType,
    ) -> Result<Self, EnvironmentError> {
        self.add_function(name, arguments, result)?;
        Ok(self)
    }
}
