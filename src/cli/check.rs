//! Parse formula expressions against an optional catalog

use crate::{catalog, deserialize, scan, serialize, Environment, Token, ValueType};
use super::{expr_to_json, CliError};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to parse
    pub expression: String,
    /// Catalog JSON used to type variables and functions
    pub catalog: Option<String>,
    /// Produce the tree as JSON instead of canonical text
    pub json: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The canonical text of the expression and its type
    Canonical { text: String, value_type: ValueType },
    /// The expression tree as JSON
    Tree(serde_json::Value),
}

/// Execute a formula check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let env = match &options.catalog {
        Some(json) => catalog::load_environment(json)?,
        None => Environment::new(),
    };

    let expr = deserialize(&options.expression, Some(&env))?;

    if options.json {
        return Ok(CheckResult::Tree(expr_to_json(&expr)));
    }

    Ok(CheckResult::Canonical {
        text: serialize(&expr),
        value_type: expr.value_type(),
    })
}

/// Scan an expression into its tokens
pub fn execute_tokens(expression: &str) -> Result<Vec<Token>, CliError> {
    let tokens = scan(expression).collect::<Result<Vec<_>, _>>()?;
    Ok(tokens)
}
