pub mod ast;
pub mod builtins;
pub mod catalog;
pub mod cli;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod serializer;
pub mod units;

pub use ast::{BinOp, Constant, Expr, ExprKind, Operator, Token, UnaryOp, ValueType};
pub use builtins::{BuiltinRegistry, FunctionBuilder};
pub use catalog::{load_environment, CatalogError};
pub use environment::{Environment, EnvironmentError, FunctionSignature};
pub use error::{PResult, ParseError};
pub use lexer::{scan, LexError, Lexer, Position};
pub use parser::{deserialize, deserialize_with, Parser};
pub use serializer::serialize;
