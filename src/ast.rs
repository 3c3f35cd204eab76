//! # Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the typed expression tree of the
//! formula language, a rule language describing computed metrics over
//! typed entities (points, equipment, spaces).
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the scanner
//! - **[operators]** - Operator tokens with their precedence, and node operators
//! - **[types]** - Semantic value types used by the environment and the tree
//! - **[expressions]** - Expression nodes (constants, access, operations, aggregations)
//!
//! ## Quick Start
//!
//! ```text
//! AVERAGE([zone.temperature], 15m) > [zone.setpoint] + 2 degC
//! ```
//!
//! ## Core Concepts
//!
//! ### Precedence
//!
//! Operators bind from loosest to tightest:
//!
//! ```text
//! & |            1
//! ∈ ∩ ∪          2
//! == != < <= > >= is ;   3
//! + -            4
//! * /            5
//! ^              6
//! ! (unary -)    7
//! .              8
//! ```
//!
//! All binary operators associate left to right: `1 - 2 - 3` is `(1 - 2) - 3`.
//!
//! ### Units of measure
//!
//! A bare word after a number or a parenthesized expression is its unit:
//!
//! ```text
//! 5 m
//! 21°C
//! (5 + 5)h
//! ```
//!
//! ### Dotted names
//!
//! `a.b.c` resolves to a single variable when the environment registers
//! `a.b.c`, and to nested property access otherwise.
pub mod expressions;
pub mod operators;
pub mod tokens;
pub mod types;

pub use expressions::{Constant, DateTimeValue, Expr, ExprKind, Reducer, TemporalFunction};
pub use operators::{BinOp, Operator, Precedence, UnaryOp};
pub use tokens::Token;
pub use types::{UnknownTypeName, ValueType};
