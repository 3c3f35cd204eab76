//! Documentation content for the formula CLI

use std::fmt::Write;

use super::CliError;
use crate::ast::Operator;
use crate::builtins::BuiltinRegistry;
use crate::units;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
    Units,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "literals" => Some(Self::Syntax),
            "operators" | "ops" | "precedence" => Some(Self::Operators),
            "functions" | "function" | "builtins" => Some(Self::Functions),
            "units" | "unit" => Some(Self::Units),
            "types" | "type" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"FORMULA DOCUMENTATION

Formulas describe computed metrics and rules over typed entities. An
expression combines variables, literals, operators and function calls, and
may carry units of measure.

DOCUMENTATION CATEGORIES

  syntax            Literals, identifiers, arrays and units
  operators         Operators and their precedence
  functions         Built-in functions and their arguments
  units             Known units of measure and their spellings
  types             Value types used by catalogs

QUICK REFERENCE

  [zone.temperature] > 21°C
  AVERAGE(power, 15min) * 2
  IF(occupied, 21, 18)
  a > 5 AND b OR !c

Run 'formula docs <category>' for detailed documentation.
"#
}

/// Overview followed by the precedence table and the built-in list
pub fn get_docs_reference() -> String {
    format!(
        "{}\n{}\n{}",
        get_docs_overview(),
        operators_doc(),
        functions_doc(BuiltinRegistry::global())
    )
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_str(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::Operators) => Ok(operators_doc()),
        Some(DocCategory::Functions) => Ok(functions_doc(BuiltinRegistry::global())),
        Some(DocCategory::Units) => Ok(units_doc()),
        Some(DocCategory::Types) => Ok(TYPES_DOC.to_string()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn operators_doc() -> String {
    let mut out = String::from("OPERATORS (loosest first)\n\n  PRECEDENCE  OPERATOR\n");
    for op in Operator::ALL.iter() {
        let spelling = match op {
            Operator::And => "& && AND",
            Operator::Or => "| || OR",
            Operator::Equal => "= ==",
            Operator::SemiColon => "; (as AND)",
            Operator::UnaryMinus => "- (prefix)",
            _ => op.symbol(),
        };
        let _ = writeln!(out, "  {:<10}  {}", op.precedence(), spelling);
    }
    out.push_str(
        "\nOperators of equal precedence associate left to right: 1 - 2 - 3 is (1 - 2) - 3.\n\
         Prefix operators associate right to left: --x is -(-x).\n",
    );
    out
}

fn functions_doc(registry: &BuiltinRegistry) -> String {
    let mut out = String::from("BUILT-IN FUNCTIONS\n\n");
    for name in registry.names() {
        let _ = writeln!(out, "  {:<16}{}", name, function_usage(name));
    }
    out.push_str("\nAny other name is a function call typed through the catalog.\n");
    out
}

fn function_usage(name: &str) -> &'static str {
    match name {
        "COUNT" | "SUM" | "AVERAGE" | "MIN" | "MAX" | "ANY" | "ALL" => {
            "(x) or (x, period[, from[, unit]])"
        }
        "COUNTLEADING" | "DELTA" | "STND" | "SLOPE" | "FORECAST" => "(x[, period[, from[, unit]]])",
        "DELTA_TIME" => "(x[, unit])",
        "FAILED" => "(x[, y])",
        "EACH" => "(collection, variable, body)",
        "FIRST" => "(a, b, ...)",
        "IF" => "(condition, then, otherwise)",
        "TUPLE" | "UNION" => "(a, ...)",
        "TIMER" => "(condition[, unit])",
        "DATETIME" | "DATETIMEOFFSET" => "(\"2019-11-14T12:34:56\") or (y, m, d[, h, min[, s]])",
        _ => "",
    }
}

fn units_doc() -> String {
    let mut out = String::from("UNITS OF MEASURE\n\n  UNIT        SPELLINGS\n");
    for unit in units::all() {
        let _ = writeln!(out, "  {:<10}  {}", unit.name, unit.aliases.join(" "));
    }
    out.push_str("\nUnknown words after a value are kept as written: 3 occ\n");
    out
}

const SYNTAX_DOC: &str = r#"SYNTAX

NUMBERS
  42  0.5  3.25
  Decimal numbers with at most one point. Negative numbers use prefix '-'.

STRINGS
  "double quoted"  'single quoted'
  Backslash escapes \" \' and \\. Typographic quotes are rejected.

IDENTIFIERS
  zone_temp  °C  $cost
  Start with a letter or one of % $ _ ° € and continue with letters, digits
  or those characters.

  [zone temperature]  [dtmi:com:example;1]
  Brackets take any text up to the closing ']'.

  true false null pi are literals. 'is' is an operator.

DOTTED NAMES
  this.supplyFan.motorPower
  A dotted name known to the catalog is a single variable, otherwise it is
  property access.

ARRAYS
  {1, 2, 3}  {}

UNITS
  5 m  21°C  10%  (5 + 5)h
  A word directly after a value is its unit of measure.

EMPTY INPUT
  An empty expression is the constant true.
"#;

const TYPES_DOC: &str = r#"TYPES

  boolean    bool, boolean
  number     number, double, float, int, integer, decimal
  string     string, text
  datetime   datetime, date, datetimeoffset
  array      array, list
  object     object, any

Unknown variables, property access and functions missing from the catalog
are typed 'object'.

CATALOG FORMAT
  {
    "variables": { "zone.temperature": "number" },
    "functions": [ { "name": "OPTION", "arguments": ["object"], "result": "boolean" } ]
  }
"#;
