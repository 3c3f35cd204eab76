//! Renders expression trees back to source text.
//!
//! The output is canonical rather than a copy of the input: `AND` prints as
//! `&`, units print bracketed (`5[degC]`) and only the parentheses the
//! precedence table requires are kept. Parsing the output again yields the
//! same tree.

use std::fmt::{self, Write};

use crate::ast::{Constant, Expr, ExprKind, Operator, Precedence, UnaryOp};
use crate::lexer::{is_identifier_continue, is_identifier_start};

const PROPERTY: Precedence = 8;
const ATOM: Precedence = 9;

const RESERVED: [&str; 6] = ["true", "false", "null", "pi", "and", "or"];

/// Canonical text for `expr`.
pub fn serialize(expr: &Expr) -> String {
    expr.to_string()
}

fn precedence(expr: &Expr) -> Precedence {
    match &expr.kind {
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::SetUnion(items) if items.len() == 2 => Operator::Union.precedence(),
        ExprKind::Unary { .. } => Operator::UnaryMinus.precedence(),
        ExprKind::Property { .. } => PROPERTY,
        _ => ATOM,
    }
}

/// Whether `name` scans back as a single bare identifier.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars.next().is_some_and(is_identifier_start);
    starts_well
        && chars.all(is_identifier_continue)
        && name != "is"
        && !RESERVED.iter().any(|word| name.eq_ignore_ascii_case(word))
}

fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_plain_identifier(name) {
        f.write_str(name)
    } else {
        write!(f, "[{}]", name)
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_constant(f: &mut fmt::Formatter<'_>, constant: &Constant) -> fmt::Result {
    match constant {
        Constant::Boolean(b) => write!(f, "{}", b),
        Constant::Number(n) => write!(f, "{}", n),
        Constant::String(s) => write_string(f, s),
        Constant::Null => f.write_str("null"),
        Constant::DateTime(dt) => match dt.offset_minutes {
            None => write!(f, "DATETIME(\"{}\")", dt),
            Some(_) => write!(f, "DATETIMEOFFSET(\"{}\")", dt),
        },
    }
}

/// Writes `child`, parenthesized when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, child: &Expr, min: Precedence) -> fmt::Result {
    if precedence(child) < min {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

fn write_call<'e>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    args: impl IntoIterator<Item = &'e Expr>,
) -> fmt::Result {
    write_identifier(f, name)?;
    f.write_char('(')?;
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{}", arg)?;
    }
    f.write_char(')')
}

/// `&` under `|` (or the reverse) is bracketed for readability.
fn mixes_logic(left: &Expr, op: Operator) -> bool {
    match &left.kind {
        ExprKind::Binary { op: inner, .. } => {
            let inner = inner.operator();
            matches!(
                (inner, op),
                (Operator::And, Operator::Or) | (Operator::Or, Operator::And)
            )
        }
        _ => false,
    }
}

fn write_infix(f: &mut fmt::Formatter<'_>, left: &Expr, op: Operator, right: &Expr) -> fmt::Result {
    let prec = op.precedence();
    if mixes_logic(left, op) {
        write!(f, "({})", left)?;
    } else {
        write_operand(f, left, prec)?;
    }
    match op {
        Operator::Power | Operator::Dot => f.write_str(op.symbol())?,
        _ => write!(f, " {} ", op)?,
    }
    // Equal precedence on the right needs brackets to keep left association
    write_operand(f, right, prec + 1)
}

fn write_kind(f: &mut fmt::Formatter<'_>, kind: &ExprKind) -> fmt::Result {
    match kind {
        ExprKind::Constant(c) => write_constant(f, c),
        ExprKind::Variable { name, .. } => write_identifier(f, name),
        ExprKind::Property { base, name, .. } => {
            write_operand(f, base, PROPERTY)?;
            f.write_char('.')?;
            write_identifier(f, name)
        }
        ExprKind::FunctionCall { name, args, .. } => write_call(f, name, args),
        ExprKind::Binary { op, left, right } => write_infix(f, left, op.operator(), right),
        ExprKind::Unary { op, operand } => {
            f.write_str(match op {
                UnaryOp::Not => "!",
                UnaryOp::Minus => "-",
            })?;
            write_operand(f, operand, Operator::UnaryMinus.precedence())
        }
        ExprKind::Ternary {
            condition,
            then,
            otherwise,
        } => write_call(f, "IF", [condition.as_ref(), then.as_ref(), otherwise.as_ref()]),
        ExprKind::SetUnion(items) => match items.as_slice() {
            [left, right] => write_infix(f, left, Operator::Union, right),
            _ => write_call(f, "UNION", items),
        },
        ExprKind::Array(items) => {
            f.write_char('{')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{}", item)?;
            }
            f.write_char('}')
        }
        ExprKind::Tuple(items) => write_call(f, "TUPLE", items),
        ExprKind::Reduce { reducer, child } => write_call(f, reducer.name(), [child.as_ref()]),
        ExprKind::Temporal { function, .. } => {
            let args = kind_children(kind);
            write_call(f, function.name(), args)
        }
        ExprKind::First(child) => match &child.kind {
            ExprKind::Array(items) => write_call(f, "FIRST", items),
            _ => write_call(f, "FIRST", [child.as_ref()]),
        },
        ExprKind::Failed(args) => write_call(f, "FAILED", args),
        ExprKind::Timer { .. } => write_call(f, "TIMER", kind_children(kind)),
        ExprKind::Each {
            collection,
            variable,
            body,
        } => {
            f.write_str("EACH(")?;
            write!(f, "{},", collection)?;
            write_identifier(f, variable)?;
            write!(f, ",{})", body)
        }
    }
}

/// Present arguments of the optional-argument nodes, in call order.
fn kind_children(kind: &ExprKind) -> Vec<&Expr> {
    match kind {
        ExprKind::Temporal {
            child,
            time_period,
            time_from,
            unit_of_measure,
            ..
        } => std::iter::once(child.as_ref())
            .chain(time_period.as_deref())
            .chain(time_from.as_deref())
            .chain(unit_of_measure.as_deref())
            .collect(),
        ExprKind::Timer {
            child,
            unit_of_measure,
        } => std::iter::once(child.as_ref())
            .chain(unit_of_measure.as_deref())
            .collect(),
        _ => Vec::new(),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            None => write_kind(f, &self.kind),
            Some(unit) => {
                if precedence(self) < ATOM {
                    f.write_char('(')?;
                    write_kind(f, &self.kind)?;
                    f.write_char(')')?;
                } else {
                    write_kind(f, &self.kind)?;
                }
                write!(f, "[{}]", unit)
            }
        }
    }
}
