use std::fmt;

use super::operators::{BinOp, UnaryOp};
use super::types::ValueType;

/// Expression tree produced by the parser.
///
/// Every node may carry a unit-of-measure suffix (`5[degC]`, `(5 + 5)[h]`)
/// and reports its semantic type through [`Expr::value_type`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub unit: Option<String>,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Boolean(bool),
    Number(f64),
    String(String),
    DateTime(DateTimeValue),
    Null,
}

/// A calendar date and time of day, with an optional UTC offset in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeValue {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub offset_minutes: Option<i32>,
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        match self.offset_minutes {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(offset) => {
                let sign = if offset < 0 { '-' } else { '+' };
                let offset = offset.abs();
                write!(f, "{}{:02}:{:02}", sign, offset / 60, offset % 60)
            }
        }
    }
}

/// Single-child reducers (`SUM(x)`, `ANY(x)`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reducer {
    Sum,
    Average,
    Min,
    Max,
    Count,
    Any,
    All,
}

impl Reducer {
    pub fn name(self) -> &'static str {
        match self {
            Reducer::Sum => "SUM",
            Reducer::Average => "AVERAGE",
            Reducer::Min => "MIN",
            Reducer::Max => "MAX",
            Reducer::Count => "COUNT",
            Reducer::Any => "ANY",
            Reducer::All => "ALL",
        }
    }

    /// The temporal variant used once a time window is supplied.
    pub fn temporal(self) -> TemporalFunction {
        match self {
            Reducer::Sum => TemporalFunction::Sum,
            Reducer::Average => TemporalFunction::Average,
            Reducer::Min => TemporalFunction::Min,
            Reducer::Max => TemporalFunction::Max,
            Reducer::Count => TemporalFunction::Count,
            Reducer::Any => TemporalFunction::Any,
            Reducer::All => TemporalFunction::All,
        }
    }
}

/// Functions evaluated over a time window of a child series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalFunction {
    Count,
    CountLeading,
    Sum,
    Average,
    Min,
    Max,
    Any,
    All,
    Delta,
    DeltaTime,
    StandardDeviation,
    Slope,
    Forecast,
}

impl TemporalFunction {
    pub fn name(self) -> &'static str {
        match self {
            TemporalFunction::Count => "COUNT",
            TemporalFunction::CountLeading => "COUNTLEADING",
            TemporalFunction::Sum => "SUM",
            TemporalFunction::Average => "AVERAGE",
            TemporalFunction::Min => "MIN",
            TemporalFunction::Max => "MAX",
            TemporalFunction::Any => "ANY",
            TemporalFunction::All => "ALL",
            TemporalFunction::Delta => "DELTA",
            TemporalFunction::DeltaTime => "DELTA_TIME",
            TemporalFunction::StandardDeviation => "STND",
            TemporalFunction::Slope => "SLOPE",
            TemporalFunction::Forecast => "FORECAST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Literals
    Constant(Constant),

    // Access
    /// Bare or environment-resolved dotted variable
    ///
    /// # Examples
    /// ```text
    /// zone_temp
    /// [zone.temperature]
    /// ```
    Variable { name: String, ty: ValueType },

    /// `base.name` when the dotted name is not a registered variable
    Property {
        base: Box<Expr>,
        name: String,
        ty: ValueType,
    },

    /// Call to a function that is not built in
    ///
    /// The result type comes from the environment, or `Object` when no
    /// registration matches.
    FunctionCall {
        name: String,
        ty: ValueType,
        args: Vec<Expr>,
    },

    // Operations
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `IF(condition, then, otherwise)`
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `a ∪ b` or `UNION(a, b, ...)`
    SetUnion(Vec<Expr>),

    // Collections
    /// `{a, b, c}`
    Array(Vec<Expr>),
    /// `TUPLE(a, b)`
    Tuple(Vec<Expr>),

    // Aggregation
    Reduce {
        reducer: Reducer,
        child: Box<Expr>,
    },
    Temporal {
        function: TemporalFunction,
        child: Box<Expr>,
        time_period: Option<Box<Expr>>,
        time_from: Option<Box<Expr>>,
        unit_of_measure: Option<Box<Expr>>,
    },
    /// `FIRST(a, b, ...)`, the arguments wrapped in an array
    First(Box<Expr>),
    /// `FAILED(x)` or `FAILED(x, y)`
    Failed(Vec<Expr>),
    /// `TIMER(condition)` or `TIMER(condition, unit)`
    Timer {
        child: Box<Expr>,
        unit_of_measure: Option<Box<Expr>>,
    },
    /// `EACH(collection, variable, body)`
    Each {
        collection: Box<Expr>,
        variable: String,
        body: Box<Expr>,
    },
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr { kind, unit: None }
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        kind.into()
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    // Constructors

    pub fn boolean(b: bool) -> Self {
        ExprKind::Constant(Constant::Boolean(b)).into()
    }

    pub fn number(n: f64) -> Self {
        ExprKind::Constant(Constant::Number(n)).into()
    }

    pub fn string(s: impl Into<String>) -> Self {
        ExprKind::Constant(Constant::String(s.into())).into()
    }

    pub fn null() -> Self {
        ExprKind::Constant(Constant::Null).into()
    }

    pub fn datetime(value: DateTimeValue) -> Self {
        ExprKind::Constant(Constant::DateTime(value)).into()
    }

    pub fn variable(name: impl Into<String>, ty: ValueType) -> Self {
        ExprKind::Variable {
            name: name.into(),
            ty,
        }
        .into()
    }

    pub fn property(base: Expr, name: impl Into<String>, ty: ValueType) -> Self {
        ExprKind::Property {
            base: Box::new(base),
            name: name.into(),
            ty,
        }
        .into()
    }

    pub fn call(name: impl Into<String>, ty: ValueType, args: Vec<Expr>) -> Self {
        ExprKind::FunctionCall {
            name: name.into(),
            ty,
            args,
        }
        .into()
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
        .into()
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        }
        .into()
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        ExprKind::Array(elements).into()
    }

    pub fn is_true(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(Constant::Boolean(true)))
    }

    /// The dotted text of a variable or of a property chain rooted in a
    /// variable (`a.b.c`), or `None` for any other shape.
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Variable { name, .. } => Some(name.clone()),
            ExprKind::Property { base, name, .. } => {
                base.dotted_name().map(|prefix| format!("{}.{}", prefix, name))
            }
            _ => None,
        }
    }

    /// Semantic type of the value this expression produces.
    pub fn value_type(&self) -> ValueType {
        use ExprKind::*;
        match &self.kind {
            Constant(c) => match c {
                self::Constant::Boolean(_) => ValueType::Boolean,
                self::Constant::Number(_) => ValueType::Number,
                self::Constant::String(_) => ValueType::String,
                self::Constant::DateTime(_) => ValueType::DateTime,
                self::Constant::Null => ValueType::Object,
            },
            Variable { ty, .. } | Property { ty, .. } | FunctionCall { ty, .. } => *ty,
            Binary { op, left, right } => binary_type(*op, left.value_type(), right.value_type()),
            Unary { op: UnaryOp::Not, .. } => ValueType::Boolean,
            Unary {
                op: UnaryOp::Minus,
                operand,
            } => match operand.value_type() {
                ValueType::Number => ValueType::Number,
                _ => ValueType::Object,
            },
            Ternary {
                then, otherwise, ..
            } => {
                let t = then.value_type();
                if t == otherwise.value_type() { t } else { ValueType::Object }
            }
            SetUnion(_) | Array(_) | Tuple(_) | Each { .. } => ValueType::Array,
            Reduce { reducer, .. } => match reducer {
                Reducer::Any | Reducer::All => ValueType::Boolean,
                _ => ValueType::Number,
            },
            Temporal { function, .. } => match function {
                TemporalFunction::Any | TemporalFunction::All => ValueType::Boolean,
                _ => ValueType::Number,
            },
            First(child) => match &child.kind {
                Array(elements) => elements
                    .first()
                    .map(Expr::value_type)
                    .unwrap_or(ValueType::Object),
                _ => ValueType::Object,
            },
            Failed(_) => ValueType::Boolean,
            Timer { .. } => ValueType::Number,
        }
    }

    /// Direct children, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        use ExprKind::*;
        match &self.kind {
            Constant(_) | Variable { .. } => vec![],
            Property { base, .. } => vec![base.as_ref()],
            FunctionCall { args, .. }
            | SetUnion(args)
            | Array(args)
            | Tuple(args)
            | Failed(args) => args.iter().collect(),
            Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Unary { operand, .. } => vec![operand.as_ref()],
            Ternary {
                condition,
                then,
                otherwise,
            } => vec![condition.as_ref(), then.as_ref(), otherwise.as_ref()],
            Reduce { child, .. } | First(child) => vec![child.as_ref()],
            Temporal {
                child,
                time_period,
                time_from,
                unit_of_measure,
                ..
            } => {
                let mut out: Vec<&Expr> = vec![child.as_ref()];
                out.extend(time_period.as_deref());
                out.extend(time_from.as_deref());
                out.extend(unit_of_measure.as_deref());
                out
            }
            Timer {
                child,
                unit_of_measure,
            } => {
                let mut out: Vec<&Expr> = vec![child.as_ref()];
                out.extend(unit_of_measure.as_deref());
                out
            }
            Each {
                collection, body, ..
            } => vec![collection.as_ref(), body.as_ref()],
        }
    }

    /// Distinct variable names referenced by this expression, in first-seen
    /// order. Dotted variables count once under their full name; property
    /// chains count under their root variable.
    pub fn unbound_variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_unbound(&mut Vec::new(), &mut out, false);
        out
    }

    /// Distinct names of non-built-in functions called by this expression.
    pub fn unbound_functions(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_unbound(&mut Vec::new(), &mut out, true);
        out
    }

    fn collect_unbound(&self, bound: &mut Vec<String>, out: &mut Vec<String>, functions: bool) {
        let push = |out: &mut Vec<String>, name: &String| {
            if !out.contains(name) {
                out.push(name.clone());
            }
        };
        match &self.kind {
            ExprKind::Variable { name, .. } => {
                if !functions && !bound.contains(name) {
                    push(out, name);
                }
            }
            ExprKind::FunctionCall { name, args, .. } => {
                if functions {
                    push(out, name);
                }
                for arg in args {
                    arg.collect_unbound(bound, out, functions);
                }
            }
            ExprKind::Each {
                collection,
                variable,
                body,
            } => {
                collection.collect_unbound(bound, out, functions);
                bound.push(variable.clone());
                body.collect_unbound(bound, out, functions);
                bound.pop();
            }
            _ => {
                for child in self.children() {
                    child.collect_unbound(bound, out, functions);
                }
            }
        }
    }
}

fn binary_type(op: BinOp, left: ValueType, right: ValueType) -> ValueType {
    use ValueType::*;
    match op {
        BinOp::And
        | BinOp::Or
        | BinOp::Equals
        | BinOp::NotEquals
        | BinOp::Less
        | BinOp::LessOrEqual
        | BinOp::Greater
        | BinOp::GreaterOrEqual
        | BinOp::Is
        | BinOp::MemberOf => Boolean,
        BinOp::Intersection => Array,
        BinOp::Add if left == String || right == String => String,
        BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Power => {
            if left == Number && right == Number {
                Number
            } else {
                Object
            }
        }
    }
}
