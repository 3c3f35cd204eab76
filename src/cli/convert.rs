//! Expression tree -> JSON conversion

use serde_json::{json, Map, Value};

use crate::ast::{Constant, Expr, ExprKind, UnaryOp};

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn list(items: &[Expr]) -> Value {
    Value::Array(items.iter().map(expr_to_json).collect())
}

fn optional(expr: &Option<Box<Expr>>) -> Value {
    expr.as_deref().map(expr_to_json).unwrap_or(Value::Null)
}

/// Convert an expression tree to a JSON document
///
/// Every node is an object with `kind` and `type`, plus `unit` when the node
/// carries a unit of measure.
pub fn expr_to_json(expr: &Expr) -> Value {
    let mut node = match &expr.kind {
        ExprKind::Constant(c) => match c {
            Constant::Boolean(b) => json!({ "kind": "constant", "value": b }),
            Constant::Number(n) => json!({ "kind": "constant", "value": number(*n) }),
            Constant::String(s) => json!({ "kind": "constant", "value": s }),
            Constant::Null => json!({ "kind": "constant", "value": Value::Null }),
            Constant::DateTime(dt) => json!({ "kind": "constant", "value": dt.to_string() }),
        },
        ExprKind::Variable { name, .. } => json!({ "kind": "variable", "name": name }),
        ExprKind::Property { base, name, .. } => {
            json!({ "kind": "property", "name": name, "base": expr_to_json(base) })
        }
        ExprKind::FunctionCall { name, args, .. } => {
            json!({ "kind": "call", "name": name, "args": list(args) })
        }
        ExprKind::Binary { op, left, right } => json!({
            "kind": "binary",
            "operator": op.operator().symbol(),
            "left": expr_to_json(left),
            "right": expr_to_json(right),
        }),
        ExprKind::Unary { op, operand } => {
            let symbol = match op {
                UnaryOp::Not => "!",
                UnaryOp::Minus => "-",
            };
            json!({ "kind": "unary", "operator": symbol, "operand": expr_to_json(operand) })
        }
        ExprKind::Ternary {
            condition,
            then,
            otherwise,
        } => json!({
            "kind": "if",
            "condition": expr_to_json(condition),
            "then": expr_to_json(then),
            "else": expr_to_json(otherwise),
        }),
        ExprKind::SetUnion(items) => json!({ "kind": "union", "items": list(items) }),
        ExprKind::Array(items) => json!({ "kind": "array", "items": list(items) }),
        ExprKind::Tuple(items) => json!({ "kind": "tuple", "items": list(items) }),
        ExprKind::Reduce { reducer, child } => json!({
            "kind": "reduce",
            "function": reducer.name(),
            "child": expr_to_json(child),
        }),
        ExprKind::Temporal {
            function,
            child,
            time_period,
            time_from,
            unit_of_measure,
        } => json!({
            "kind": "temporal",
            "function": function.name(),
            "child": expr_to_json(child),
            "time_period": optional(time_period),
            "time_from": optional(time_from),
            "unit_of_measure": optional(unit_of_measure),
        }),
        ExprKind::First(child) => json!({ "kind": "first", "child": expr_to_json(child) }),
        ExprKind::Failed(args) => json!({ "kind": "failed", "args": list(args) }),
        ExprKind::Timer {
            child,
            unit_of_measure,
        } => json!({
            "kind": "timer",
            "child": expr_to_json(child),
            "unit_of_measure": optional(unit_of_measure),
        }),
        ExprKind::Each {
            collection,
            variable,
            body,
        } => json!({
            "kind": "each",
            "collection": expr_to_json(collection),
            "variable": variable,
            "body": expr_to_json(body),
        }),
    };

    if let Value::Object(map) = &mut node {
        insert_common(map, expr);
    }
    node
}

fn insert_common(map: &mut Map<String, Value>, expr: &Expr) {
    map.insert("type".to_string(), Value::String(expr.value_type().name().to_string()));
    if let Some(unit) = &expr.unit {
        map.insert("unit".to_string(), Value::String(unit.clone()));
    }
}
