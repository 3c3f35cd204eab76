//! Built-in functions.
//!
//! Each built-in is a [`FunctionBuilder`] registered under its upper-case
//! name. The builder receives the parsed argument list, validates its own
//! arity and shape, and produces the dedicated node.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::ast::{Constant, DateTimeValue, Expr, ExprKind, Reducer, TemporalFunction};
use crate::environment::Environment;
use crate::error::{PResult, ParseError};

/// Turns the arguments of a built-in call into a node.
pub trait FunctionBuilder: Send + Sync {
    fn build(&self, args: Vec<Expr>, env: &Environment) -> PResult<Expr>;
}

impl<F> FunctionBuilder for F
where
    F: Fn(Vec<Expr>, &Environment) -> PResult<Expr> + Send + Sync,
{
    fn build(&self, args: Vec<Expr>, env: &Environment) -> PResult<Expr> {
        self(args, env)
    }
}

/// Case-insensitive map from function name to builder.
pub struct BuiltinRegistry {
    builders: HashMap<String, Box<dyn FunctionBuilder>>,
}

impl BuiltinRegistry {
    /// A registry without any built-ins: every call becomes a generic
    /// function call node.
    pub fn empty() -> Self {
        BuiltinRegistry {
            builders: HashMap::new(),
        }
    }

    /// The standard built-in set.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        for reducer in [
            Reducer::Count,
            Reducer::Sum,
            Reducer::Average,
            Reducer::Min,
            Reducer::Max,
            Reducer::Any,
            Reducer::All,
        ] {
            registry.register(reducer.name(), ReducerBuilder(reducer));
        }

        for function in [
            TemporalFunction::CountLeading,
            TemporalFunction::Delta,
            TemporalFunction::StandardDeviation,
            TemporalFunction::Slope,
            TemporalFunction::Forecast,
        ] {
            registry.register(function.name(), TemporalBuilder(function));
        }

        registry.register("DELTA_TIME", read_delta_time);
        registry.register("FAILED", read_failed);
        registry.register("EACH", read_each);
        registry.register("FIRST", read_first);
        registry.register("IF", read_ternary);
        registry.register("TUPLE", read_tuple);
        registry.register("UNION", read_union);
        registry.register("TIMER", read_timer);
        registry.register("DATETIME", |args: Vec<Expr>, _env: &Environment| {
            read_datetime("DateTime", args, None)
        });
        registry.register("DATETIMEOFFSET", |args: Vec<Expr>, _env: &Environment| {
            read_datetime("DateTimeOffset", args, Some(0))
        });

        registry
    }

    /// The process-wide standard registry.
    pub fn global() -> &'static BuiltinRegistry {
        static GLOBAL: OnceLock<BuiltinRegistry> = OnceLock::new();
        GLOBAL.get_or_init(BuiltinRegistry::standard)
    }

    /// Adds or replaces a built-in.
    pub fn register(&mut self, name: &str, builder: impl FunctionBuilder + 'static) {
        self.builders.insert(name.to_uppercase(), Box::new(builder));
    }

    pub fn get(&self, name: &str) -> Option<&dyn FunctionBuilder> {
        self.builders.get(&name.to_uppercase()).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(&name.to_uppercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// One argument is a plain reducer, more select the temporal window shape.
struct ReducerBuilder(Reducer);

impl FunctionBuilder for ReducerBuilder {
    fn build(&self, mut args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
        if args.len() == 1 {
            let child = Box::new(args.remove(0));
            return Ok(ExprKind::Reduce {
                reducer: self.0,
                child,
            }
            .into());
        }
        temporal(self.0.temporal(), args)
    }
}

struct TemporalBuilder(TemporalFunction);

impl FunctionBuilder for TemporalBuilder {
    fn build(&self, args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
        temporal(self.0, args)
    }
}

fn arity_error(name: &str, count: usize) -> ParseError {
    ParseError::syntax(format!("{}() does not take {} arguments", name, count))
}

/// `(child, time_period, time_from, unit_of_measure)`, trailing ones optional.
fn temporal(function: TemporalFunction, args: Vec<Expr>) -> PResult<Expr> {
    let count = args.len();
    if count == 0 || count > 4 {
        return Err(arity_error(function.name(), count));
    }

    let mut args = args.into_iter().map(Box::new);
    let child = args.next().ok_or_else(|| arity_error(function.name(), count))?;

    Ok(ExprKind::Temporal {
        function,
        child,
        time_period: args.next(),
        time_from: args.next(),
        unit_of_measure: args.next(),
    }
    .into())
}

fn read_delta_time(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    let count = args.len();
    let mut iter = args.into_iter().map(Box::new);
    match (iter.next(), iter.next(), count) {
        (Some(child), unit_of_measure, 1 | 2) => Ok(ExprKind::Temporal {
            function: TemporalFunction::DeltaTime,
            child,
            time_period: None,
            time_from: None,
            unit_of_measure,
        }
        .into()),
        _ => Err(arity_error("DELTA_TIME", count)),
    }
}

fn read_failed(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    match args.len() {
        1 | 2 => Ok(ExprKind::Failed(args).into()),
        n => Err(ParseError::syntax(format!("Failed() does not take {} arguments", n))),
    }
}

fn read_each(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    const USAGE: &str = "Each() takes three arguments: an enumeration, a variable name, and a body expression";

    let [collection, variable, body]: [Expr; 3] = args
        .try_into()
        .map_err(|_| ParseError::syntax(USAGE))?;

    match variable.kind {
        ExprKind::Variable { name, .. } => Ok(ExprKind::Each {
            collection: Box::new(collection),
            variable: name,
            body: Box::new(body),
        }
        .into()),
        _ => Err(ParseError::syntax(format!(
            "{}, The second argument must be a simple identifier.",
            USAGE
        ))),
    }
}

fn read_first(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    if args.is_empty() {
        return Err(ParseError::syntax("First() must have at least one argument"));
    }
    Ok(ExprKind::First(Box::new(Expr::array(args))).into())
}

fn read_ternary(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    let [condition, then, otherwise]: [Expr; 3] = args
        .try_into()
        .map_err(|_| ParseError::syntax("Ternary IF needs three arguments"))?;

    Ok(ExprKind::Ternary {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    }
    .into())
}

fn read_tuple(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    if args.is_empty() {
        return Err(ParseError::syntax("Tuple needs at least one argument"));
    }
    Ok(ExprKind::Tuple(args).into())
}

fn read_union(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    if args.is_empty() {
        return Err(ParseError::syntax("Union needs at least one argument"));
    }
    Ok(ExprKind::SetUnion(args).into())
}

fn read_timer(args: Vec<Expr>, _env: &Environment) -> PResult<Expr> {
    let count = args.len();
    let mut iter = args.into_iter().map(Box::new);
    match (iter.next(), iter.next(), count) {
        (Some(child), unit_of_measure, 1 | 2) => Ok(ExprKind::Timer {
            child,
            unit_of_measure,
        }
        .into()),
        _ => Err(arity_error("TIMER", count)),
    }
}

// DATETIME / DATETIMEOFFSET

fn iso_datetime() -> Option<&'static Regex> {
    static ISO: OnceLock<Option<Regex>> = OnceLock::new();
    ISO.get_or_init(|| {
        Regex::new(
            r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})(?:[T ]([0-9]{1,2}):([0-9]{2})(?::([0-9]{2})(?:\.[0-9]+)?)?)?\s*(Z|[+-][0-9]{2}:?[0-9]{2})?$",
        )
        .ok()
    })
    .as_ref()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

fn checked_datetime(parts: [i64; 6], offset_minutes: Option<i32>) -> Option<DateTimeValue> {
    let [year, month, day, hour, minute, second] = parts;
    let year = i32::try_from(year).ok().filter(|y| (1..=9999).contains(y))?;
    let month = u32::try_from(month).ok().filter(|m| (1..=12).contains(m))?;
    let day = u32::try_from(day)
        .ok()
        .filter(|d| (1..=days_in_month(year, month)).contains(d))?;
    let hour = u32::try_from(hour).ok().filter(|h| *h < 24)?;
    let minute = u32::try_from(minute).ok().filter(|m| *m < 60)?;
    let second = u32::try_from(second).ok().filter(|s| *s < 60)?;

    Some(DateTimeValue {
        year,
        month,
        day,
        hour,
        minute,
        second,
        offset_minutes,
    })
}

/// Parses `2019-11-14`, `2019-11-14T12:34`, `2019-11-14 12:34:56.789+02:00`, ...
pub fn parse_iso_datetime(text: &str) -> Option<DateTimeValue> {
    let caps = iso_datetime()?.captures(text.trim())?;
    // Absent time fields are zero; present ones must parse.
    let field = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let offset_minutes = match caps.get(7).map(|m| m.as_str()) {
        None => None,
        Some("Z") => Some(0),
        Some(offset) => {
            let sign = if offset.starts_with('-') { -1 } else { 1 };
            let digits: String = offset.chars().filter(char::is_ascii_digit).collect();
            let hours: i32 = digits.get(0..2)?.parse().ok()?;
            let minutes: i32 = digits.get(2..4)?.parse().ok()?;
            if hours > 14 || minutes >= 60 {
                return None;
            }
            Some(sign * (hours * 60 + minutes))
        }
    };

    checked_datetime(
        [field(1)?, field(2)?, field(3)?, field(4)?, field(5)?, field(6)?],
        offset_minutes,
    )
}

fn read_datetime(name: &str, args: Vec<Expr>, default_offset: Option<i32>) -> PResult<Expr> {
    let usage = || {
        ParseError::syntax(format!(
            "{}() takes one argument, a string like '{}(\"2019-11-14T12:34:56\")', or three, five or six numbers",
            name, name
        ))
    };

    if let [Expr {
        kind: ExprKind::Constant(Constant::String(text)),
        ..
    }] = args.as_slice()
    {
        let mut value = parse_iso_datetime(text)
            .ok_or_else(|| ParseError::syntax(format!("{}() could not parse '{}'", name, text)))?;
        if value.offset_minutes.is_none() {
            value.offset_minutes = default_offset;
        }
        return Ok(Expr::datetime(value));
    }

    if !matches!(args.len(), 3 | 5 | 6) {
        return Err(usage());
    }

    let mut parts = [0i64; 6];
    for (slot, arg) in parts.iter_mut().zip(&args) {
        match arg.kind {
            ExprKind::Constant(Constant::Number(n)) if n.fract() == 0.0 => *slot = n as i64,
            _ => return Err(usage()),
        }
    }

    checked_datetime(parts, default_offset)
        .map(Expr::datetime)
        .ok_or_else(|| ParseError::syntax(format!("{}() arguments are not a valid date and time", name)))
}
