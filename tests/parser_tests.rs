// tests/parser_tests.rs

use formula_lang::ast::{
    BinOp, Constant, DateTimeValue, Expr, ExprKind, Reducer, TemporalFunction, UnaryOp, ValueType,
};
use formula_lang::builtins::BuiltinRegistry;
use formula_lang::environment::Environment;
use formula_lang::error::ParseError;
use formula_lang::lexer::LexError;
use formula_lang::parser::{deserialize, deserialize_with};

fn parse(input: &str) -> Expr {
    deserialize(input, None).unwrap_or_else(|e| panic!("parsing '{}' failed: {}", input, e))
}

fn parse_in(input: &str, env: &Environment) -> Expr {
    deserialize(input, Some(env)).unwrap_or_else(|e| panic!("parsing '{}' failed: {}", input, e))
}

fn syntax_error(input: &str) -> String {
    match deserialize(input, None) {
        Err(ParseError::Syntax(msg)) => msg,
        other => panic!("Expected a syntax error for '{}', got {:?}", input, other),
    }
}

fn num(n: f64) -> Expr {
    Expr::number(n)
}

fn var(name: &str) -> Expr {
    Expr::variable(name, ValueType::Object)
}

fn bin(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

fn prop(base: Expr, name: &str) -> Expr {
    Expr::property(base, name, ValueType::Object)
}

// ============================================================================
// Empty Input
// ============================================================================

#[test]
fn test_empty_input_is_true() {
    assert_eq!(parse(""), Expr::boolean(true));
    assert_eq!(parse("   \t\n"), Expr::boolean(true));
    assert!(parse("").is_true());
}

// ============================================================================
// Precedence and Associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse("2+3*4"),
        bin(BinOp::Add, num(2.0), bin(BinOp::Multiply, num(3.0), num(4.0)))
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(
        parse("(2+3)*4"),
        bin(BinOp::Multiply, bin(BinOp::Add, num(2.0), num(3.0)), num(4.0))
    );
    assert_eq!(parse("((((7))))"), num(7.0));
}

#[test]
fn test_left_associativity() {
    let test_cases = vec![
        (
            "1-2-3",
            bin(BinOp::Subtract, bin(BinOp::Subtract, num(1.0), num(2.0)), num(3.0)),
        ),
        (
            "a*b*c",
            bin(BinOp::Multiply, bin(BinOp::Multiply, var("a"), var("b")), var("c")),
        ),
        (
            "a+b+c*2",
            bin(
                BinOp::Add,
                bin(BinOp::Add, var("a"), var("b")),
                bin(BinOp::Multiply, var("c"), num(2.0)),
            ),
        ),
        (
            "1 - 2 * 3 - 4",
            bin(
                BinOp::Subtract,
                bin(BinOp::Subtract, num(1.0), bin(BinOp::Multiply, num(2.0), num(3.0))),
                num(4.0),
            ),
        ),
        (
            "8 / 4 / 2",
            bin(BinOp::Divide, bin(BinOp::Divide, num(8.0), num(4.0)), num(2.0)),
        ),
        (
            "2^3^2",
            bin(BinOp::Power, bin(BinOp::Power, num(2.0), num(3.0)), num(2.0)),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_logical_operators() {
    assert_eq!(
        parse("a < 5 AND b >= 6"),
        bin(
            BinOp::And,
            bin(BinOp::Less, var("a"), num(5.0)),
            bin(BinOp::GreaterOrEqual, var("b"), num(6.0)),
        )
    );

    // & and | share a precedence level
    assert_eq!(
        parse("a | b & c"),
        bin(BinOp::And, bin(BinOp::Or, var("a"), var("b")), var("c"))
    );

    let test_cases = vec![
        ("a and b", BinOp::And),
        ("a AND b", BinOp::And),
        ("a && b", BinOp::And),
        ("a & b", BinOp::And),
        ("a or b", BinOp::Or),
        ("a Or b", BinOp::Or),
        ("a || b", BinOp::Or),
        ("a | b", BinOp::Or),
    ];
    for (input, expected) in test_cases {
        assert_eq!(parse(input), bin(expected, var("a"), var("b")), "Failed for input: {}", input);
    }
}

#[test]
fn test_comparisons() {
    let test_cases = vec![
        ("a = b", BinOp::Equals),
        ("a == b", BinOp::Equals),
        ("a != b", BinOp::NotEquals),
        ("a < b", BinOp::Less),
        ("a <= b", BinOp::LessOrEqual),
        ("a > b", BinOp::Greater),
        ("a >= b", BinOp::GreaterOrEqual),
        ("a is b", BinOp::Is),
    ];
    for (input, expected) in test_cases {
        assert_eq!(parse(input), bin(expected, var("a"), var("b")), "Failed for input: {}", input);
    }
}

#[test]
fn test_comparison_below_arithmetic() {
    assert_eq!(
        parse("a + 1 > b * 2"),
        bin(
            BinOp::Greater,
            bin(BinOp::Add, var("a"), num(1.0)),
            bin(BinOp::Multiply, var("b"), num(2.0)),
        )
    );
}

// ============================================================================
// Unary Operators
// ============================================================================

#[test]
fn test_unary() {
    let test_cases = vec![
        ("-5", Expr::unary(UnaryOp::Minus, num(5.0))),
        ("!a", Expr::unary(UnaryOp::Not, var("a"))),
        (
            "--x",
            Expr::unary(UnaryOp::Minus, Expr::unary(UnaryOp::Minus, var("x"))),
        ),
        (
            "!!x",
            Expr::unary(UnaryOp::Not, Expr::unary(UnaryOp::Not, var("x"))),
        ),
        (
            "-a * b",
            bin(BinOp::Multiply, Expr::unary(UnaryOp::Minus, var("a")), var("b")),
        ),
        (
            "a * -b",
            bin(BinOp::Multiply, var("a"), Expr::unary(UnaryOp::Minus, var("b"))),
        ),
        (
            "a - -1",
            bin(BinOp::Subtract, var("a"), Expr::unary(UnaryOp::Minus, num(1.0))),
        ),
        (
            "!a & b",
            bin(BinOp::And, Expr::unary(UnaryOp::Not, var("a")), var("b")),
        ),
        (
            "-2^2",
            bin(BinOp::Power, Expr::unary(UnaryOp::Minus, num(2.0)), num(2.0)),
        ),
        (
            "-(a + b)",
            Expr::unary(UnaryOp::Minus, bin(BinOp::Add, var("a"), var("b"))),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_not_in_binary_position() {
    assert!(syntax_error("a ! b").contains("'!'"));
}

// ============================================================================
// Semicolons and Set Operators
// ============================================================================

#[test]
fn test_semicolon_is_and() {
    assert_eq!(parse("a; b"), bin(BinOp::And, var("a"), var("b")));
    assert_eq!(
        parse("a > 1; b < 2"),
        bin(
            BinOp::And,
            bin(BinOp::Greater, var("a"), num(1.0)),
            bin(BinOp::Less, var("b"), num(2.0)),
        )
    );
}

#[test]
fn test_trailing_semicolon_is_dropped() {
    assert_eq!(parse("a;"), var("a"));
    assert_eq!(parse("a > 1;"), bin(BinOp::Greater, var("a"), num(1.0)));
}

#[test]
fn test_set_operators() {
    assert_eq!(
        parse("a ∪ b"),
        Expr::new(ExprKind::SetUnion(vec![var("a"), var("b")]))
    );
    assert_eq!(parse("a ∩ b"), bin(BinOp::Intersection, var("a"), var("b")));
    assert_eq!(
        parse("a ∈ {1, 2}"),
        bin(BinOp::MemberOf, var("a"), Expr::array(vec![num(1.0), num(2.0)]))
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literals() {
    let test_cases = vec![
        ("42", num(42.0)),
        ("0.5", num(0.5)),
        ("'abc'", Expr::string("abc")),
        ("\"abc\"", Expr::string("abc")),
        ("true", Expr::boolean(true)),
        ("TRUE", Expr::boolean(true)),
        ("False", Expr::boolean(false)),
        ("null", Expr::null()),
        ("NULL", Expr::null()),
        ("pi", num(std::f64::consts::PI)),
        ("PI", num(std::f64::consts::PI)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_arrays() {
    assert_eq!(parse("{1}"), Expr::array(vec![num(1.0)]));
    assert_eq!(parse("{}"), Expr::array(vec![]));
    assert_eq!(
        parse("{1, 2 + 3, {4}}"),
        Expr::array(vec![
            num(1.0),
            bin(BinOp::Add, num(2.0), num(3.0)),
            Expr::array(vec![num(4.0)]),
        ])
    );
}

#[test]
fn test_bracketed_identifier() {
    assert_eq!(
        parse("[foo bar] + 1"),
        bin(BinOp::Add, var("foo bar"), num(1.0))
    );
}

// ============================================================================
// Units of Measure
// ============================================================================

#[test]
fn test_number_units() {
    let test_cases = vec![
        ("5 m", num(5.0).with_unit("m")),
        ("5m", num(5.0).with_unit("m")),
        ("5°C", num(5.0).with_unit("degC")),
        ("10%", num(10.0).with_unit("%")),
        ("2 hr", num(2.0).with_unit("h")),
        ("3 occ", num(3.0).with_unit("occ")),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_and_or_are_never_units() {
    assert_eq!(parse("5 AND x"), bin(BinOp::And, num(5.0), var("x")));
    assert_eq!(parse("5 and x"), bin(BinOp::And, num(5.0), var("x")));
    assert_eq!(parse("5 OR x"), bin(BinOp::Or, num(5.0), var("x")));
}

#[test]
fn test_postfix_units() {
    assert_eq!(
        parse("(5 + 5)h"),
        bin(BinOp::Add, num(5.0), num(5.0)).with_unit("h")
    );
    assert_eq!(parse("power kW"), var("power").with_unit("kW"));
    assert_eq!(
        parse("(1occ) + 1occ + 5"),
        bin(
            BinOp::Add,
            bin(BinOp::Add, num(1.0).with_unit("occ"), num(1.0).with_unit("occ")),
            num(5.0),
        )
    );
    // A postfix unit binds to the nearest operand
    assert_eq!(
        parse("a + b kW"),
        bin(BinOp::Add, var("a"), var("b").with_unit("kW"))
    );
}

// ============================================================================
// Environment Lookups
// ============================================================================

#[test]
fn test_variables_are_typed_from_environment() {
    let env = Environment::new()
        .with_variable("temp", ValueType::Number)
        .and_then(|env| env.with_variable("name", ValueType::String))
        .unwrap();

    assert_eq!(parse_in("temp", &env), Expr::variable("temp", ValueType::Number));
    assert_eq!(parse_in("name", &env).value_type(), ValueType::String);
    assert_eq!(parse_in("other", &env), var("other"));
    // Variable names are case-sensitive
    assert_eq!(parse_in("TEMP", &env), var("TEMP"));
}

#[test]
fn test_dotted_variable_resolves_as_a_whole() {
    let env = Environment::new().with_variable("a.b.c", ValueType::Number).unwrap();
    assert_eq!(parse_in("a.b.c", &env), Expr::variable("a.b.c", ValueType::Number));
    assert_eq!(parse_in("[a.b.c]", &env), Expr::variable("a.b.c", ValueType::Number));
}

#[test]
fn test_dotted_name_without_environment_is_property_access() {
    assert_eq!(
        parse("this.supplyFan.motorPower"),
        prop(prop(var("this"), "supplyFan"), "motorPower")
    );
}

#[test]
fn test_dotted_prefix_resolution() {
    let env = Environment::new().with_variable("a.b", ValueType::Number).unwrap();
    assert_eq!(
        parse_in("a.b.c", &env),
        prop(Expr::variable("a.b", ValueType::Number), "c")
    );
}

#[test]
fn test_dotted_chain_with_unit_is_not_collapsed() {
    let env = Environment::new().with_variable("a.b", ValueType::Number).unwrap();
    let expected = prop(var("a").with_unit("m"), "b");
    assert_eq!(parse_in("a m.b", &env), expected);
    assert_eq!(parse("a m.b"), expected);
}

#[test]
fn test_method_call_on_unit_is_rejected() {
    let env = Environment::new()
        .with_function("a.f", vec![ValueType::Number], ValueType::Number)
        .unwrap();
    assert!(matches!(deserialize("a m.f(1)", Some(&env)), Err(ParseError::Syntax(_))));
}

#[test]
fn test_property_of_expression() {
    assert_eq!(
        parse("(a + b).c"),
        prop(bin(BinOp::Add, var("a"), var("b")), "c")
    );
    assert_eq!(
        parse("f(x).y"),
        prop(Expr::call("f", ValueType::Object, vec![var("x")]), "y")
    );
}

#[test]
fn test_dot_binds_tighter_than_arithmetic() {
    assert_eq!(
        parse("a.b * 2"),
        bin(BinOp::Multiply, prop(var("a"), "b"), num(2.0))
    );
    assert_eq!(
        parse("-a.b"),
        Expr::unary(UnaryOp::Minus, prop(var("a"), "b"))
    );
}

#[test]
fn test_method_call_resolves_compound_function() {
    let env = Environment::new()
        .with_function("this.motor.power", vec![ValueType::Number], ValueType::Number)
        .unwrap();

    assert_eq!(
        parse_in("this.motor.power(1)", &env),
        Expr::call("this.motor.power", ValueType::Number, vec![num(1.0)])
    );
}

#[test]
fn test_unregistered_method_call_fails() {
    assert!(syntax_error("a.foo(1)").contains("dot"));
}

#[test]
fn test_invalid_dot() {
    assert!(syntax_error("a.5").contains("'dot' operator"));
    assert!(syntax_error("a.'text'").contains("'dot' operator"));
}

// ============================================================================
// Generic Function Calls
// ============================================================================

#[test]
fn test_unregistered_function_is_object() {
    let expr = parse("foo(2,3)");
    assert_eq!(
        expr,
        Expr::call("foo", ValueType::Object, vec![num(2.0), num(3.0)])
    );
    assert_eq!(expr.value_type(), ValueType::Object);
    assert_eq!(parse("now()"), Expr::call("now", ValueType::Object, vec![]));
}

#[test]
fn test_registered_function_is_typed() {
    let env = Environment::new()
        .with_function("OPTION", vec![ValueType::Object], ValueType::Boolean)
        .unwrap();

    assert_eq!(
        parse_in("option(x)", &env),
        Expr::call("option", ValueType::Boolean, vec![var("x")])
    );
    // A wrong argument count still takes the registered result type
    assert_eq!(parse_in("OPTION(x, y)", &env).value_type(), ValueType::Boolean);
}

#[test]
fn test_call_paths_agree_on_arity_mismatch() {
    let env = Environment::new()
        .with_function("a.m", vec![ValueType::Number], ValueType::Number)
        .unwrap();

    let method = parse_in("a.m(1, 2)", &env);
    let generic = parse_in("[a.m](1, 2)", &env);
    assert_eq!(method, Expr::call("a.m", ValueType::Number, vec![num(1.0), num(2.0)]));
    assert_eq!(method, generic);
}

#[test]
fn test_function_resolution_ignores_argument_types() {
    let env = Environment::new()
        .with_function("label", vec![ValueType::String], ValueType::String)
        .unwrap();

    // A number where a string was registered still resolves
    assert_eq!(parse_in("label(5)", &env).value_type(), ValueType::String);
}

// ============================================================================
// Built-in Functions
// ============================================================================

#[test]
fn test_ternary_if() {
    assert_eq!(
        parse("IF(true,1,2)"),
        Expr::new(ExprKind::Ternary {
            condition: Box::new(Expr::boolean(true)),
            then: Box::new(num(1.0)),
            otherwise: Box::new(num(2.0)),
        })
    );
    assert!(matches!(parse("if(a, b, c)").kind, ExprKind::Ternary { .. }));
}

#[test]
fn test_ternary_if_arity() {
    assert!(syntax_error("IF(1,2)").contains("Ternary IF needs three arguments"));
    assert!(syntax_error("IF(1,2,3,4)").contains("Ternary IF needs three arguments"));
}

#[test]
fn test_reducers() {
    let test_cases = vec![
        ("SUM(x)", Reducer::Sum),
        ("average(x)", Reducer::Average),
        ("MIN(x)", Reducer::Min),
        ("MAX(x)", Reducer::Max),
        ("COUNT(x)", Reducer::Count),
        ("ANY(x)", Reducer::Any),
        ("ALL(x)", Reducer::All),
    ];

    for (input, reducer) in test_cases {
        assert_eq!(
            parse(input),
            Expr::new(ExprKind::Reduce {
                reducer,
                child: Box::new(var("x")),
            }),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_temporal_window() {
    assert_eq!(
        parse("AVERAGE({1,2,3}, 5h)"),
        Expr::new(ExprKind::Temporal {
            function: TemporalFunction::Average,
            child: Box::new(Expr::array(vec![num(1.0), num(2.0), num(3.0)])),
            time_period: Some(Box::new(num(5.0).with_unit("h"))),
            time_from: None,
            unit_of_measure: None,
        })
    );

    match parse("SUM(x, 1h, 2h, kWh)").kind {
        ExprKind::Temporal {
            function: TemporalFunction::Sum,
            time_from: Some(from),
            unit_of_measure: Some(uom),
            ..
        } => {
            assert_eq!(*from, num(2.0).with_unit("h"));
            assert_eq!(*uom, var("kWh"));
        }
        other => panic!("Expected a temporal SUM, got {:?}", other),
    }
}

#[test]
fn test_temporal_only_functions() {
    let test_cases = vec![
        ("COUNTLEADING(x)", TemporalFunction::CountLeading),
        ("DELTA(x)", TemporalFunction::Delta),
        ("STND(x, 1h)", TemporalFunction::StandardDeviation),
        ("SLOPE(x, 1h)", TemporalFunction::Slope),
        ("FORECAST(x, 1h, 2h)", TemporalFunction::Forecast),
        ("DELTA_TIME(x)", TemporalFunction::DeltaTime),
    ];

    for (input, expected) in test_cases {
        match parse(input).kind {
            ExprKind::Temporal { function, .. } => assert_eq!(function, expected, "Failed for input: {}", input),
            other => panic!("Expected a temporal node for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_temporal_arity() {
    assert_eq!(syntax_error("SUM(1,2,3,4,5)"), "SUM() does not take 5 arguments");
    assert_eq!(syntax_error("DELTA()"), "DELTA() does not take 0 arguments");
    assert_eq!(syntax_error("DELTA_TIME(a, b, c)"), "DELTA_TIME() does not take 3 arguments");
}

#[test]
fn test_delta_time_unit() {
    match parse("DELTA_TIME(x, s)").kind {
        ExprKind::Temporal {
            function: TemporalFunction::DeltaTime,
            time_period: None,
            unit_of_measure: Some(uom),
            ..
        } => assert_eq!(*uom, var("s")),
        other => panic!("Expected DELTA_TIME, got {:?}", other),
    }
}

#[test]
fn test_failed() {
    assert_eq!(
        parse("FAILED(x)"),
        Expr::new(ExprKind::Failed(vec![var("x")]))
    );
    assert_eq!(parse("FAILED(x, y)").value_type(), ValueType::Boolean);
    assert_eq!(syntax_error("FAILED()"), "Failed() does not take 0 arguments");
    assert_eq!(syntax_error("FAILED(a,b,c)"), "Failed() does not take 3 arguments");
}

#[test]
fn test_each() {
    assert_eq!(
        parse("EACH(items, item, item > 1)"),
        Expr::new(ExprKind::Each {
            collection: Box::new(var("items")),
            variable: "item".to_string(),
            body: Box::new(bin(BinOp::Greater, var("item"), num(1.0))),
        })
    );
    assert!(syntax_error("EACH(a, b)").starts_with("Each() takes three arguments"));
    assert!(syntax_error("EACH(a, 5, c)").contains("second argument must be a simple identifier"));
}

#[test]
fn test_first() {
    assert_eq!(
        parse("FIRST(a, b)"),
        Expr::new(ExprKind::First(Box::new(Expr::array(vec![var("a"), var("b")]))))
    );
    assert_eq!(syntax_error("FIRST()"), "First() must have at least one argument");
}

#[test]
fn test_tuple_and_union() {
    assert_eq!(
        parse("TUPLE(1, 2)"),
        Expr::new(ExprKind::Tuple(vec![num(1.0), num(2.0)]))
    );
    assert_eq!(syntax_error("TUPLE()"), "Tuple needs at least one argument");
    assert_eq!(
        parse("UNION(a, b, c)"),
        Expr::new(ExprKind::SetUnion(vec![var("a"), var("b"), var("c")]))
    );
}

#[test]
fn test_timer() {
    assert_eq!(
        parse("TIMER(x > 1)"),
        Expr::new(ExprKind::Timer {
            child: Box::new(bin(BinOp::Greater, var("x"), num(1.0))),
            unit_of_measure: None,
        })
    );
    assert!(matches!(
        parse("TIMER(x, h)").kind,
        ExprKind::Timer { unit_of_measure: Some(_), .. }
    ));
    assert_eq!(syntax_error("TIMER()"), "TIMER() does not take 0 arguments");
}

#[test]
fn test_datetime() {
    let expected = DateTimeValue {
        year: 2019,
        month: 11,
        day: 14,
        hour: 12,
        minute: 34,
        second: 56,
        offset_minutes: None,
    };
    assert_eq!(parse("DATETIME(\"2019-11-14T12:34:56\")"), Expr::datetime(expected));
    assert_eq!(parse("DateTime(2019, 11, 14, 12, 34, 56)"), Expr::datetime(expected));

    match parse("DATETIME(2019, 11, 14)").kind {
        ExprKind::Constant(Constant::DateTime(dt)) => assert_eq!((dt.hour, dt.minute, dt.second), (0, 0, 0)),
        other => panic!("Expected a date-time constant, got {:?}", other),
    }
}

#[test]
fn test_datetimeoffset_defaults_to_utc() {
    match parse("DATETIMEOFFSET('2019-11-14T12:34:56')").kind {
        ExprKind::Constant(Constant::DateTime(dt)) => assert_eq!(dt.offset_minutes, Some(0)),
        other => panic!("Expected a date-time constant, got {:?}", other),
    }
    match parse("DATETIMEOFFSET('2019-11-14T12:34:56-05:00')").kind {
        ExprKind::Constant(Constant::DateTime(dt)) => assert_eq!(dt.offset_minutes, Some(-300)),
        other => panic!("Expected a date-time constant, got {:?}", other),
    }
}

#[test]
fn test_datetime_errors() {
    assert!(syntax_error("DATETIME()").contains("takes one argument"));
    assert!(syntax_error("DATETIME(2019, 11)").contains("takes one argument"));
    assert!(syntax_error("DATETIME(\"yesterday\")").contains("could not parse"));
    assert!(syntax_error("DATETIME(2019, 2, 30)").contains("not a valid date"));
    assert!(syntax_error("DATETIME(x, 1, 1)").contains("takes one argument"));
    assert!(syntax_error("DATETIME(12345, 1, 1)").contains("not a valid date"));
    assert!(syntax_error("DATETIME(0, 1, 1)").contains("not a valid date"));
    assert!(syntax_error("DATETIME(\"12345-01-01\")").contains("could not parse"));
    assert!(syntax_error("DATETIME(\"２０１９-11-14\")").contains("could not parse"));
}

// ============================================================================
// Custom Registries
// ============================================================================

#[test]
fn test_custom_builtin() {
    let mut registry = BuiltinRegistry::standard();
    registry.register("double", |mut args: Vec<Expr>, _env: &Environment| {
        if args.len() != 1 {
            return Err(ParseError::Syntax("DOUBLE() takes one argument".to_string()));
        }
        Ok(Expr::binary(BinOp::Multiply, args.remove(0), Expr::number(2.0)))
    });

    assert_eq!(
        deserialize_with("Double(x)", None, &registry).unwrap(),
        bin(BinOp::Multiply, var("x"), num(2.0))
    );
    assert!(deserialize_with("DOUBLE()", None, &registry).is_err());
}

#[test]
fn test_empty_registry_makes_generic_calls() {
    let registry = BuiltinRegistry::empty();
    assert_eq!(
        deserialize_with("IF(a)", None, &registry).unwrap(),
        Expr::call("IF", ValueType::Object, vec![var("a")])
    );
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test]
fn test_syntax_errors() {
    let test_cases = vec![
        ("((1)", "Parentheses mismatch"),
        ("(1))", "Parentheses mismatch"),
        ("1 +", "Incomplete expression after +"),
        ("a AND", "Incomplete expression after &"),
        ("{1, 2", "Missing closing curly parenthesis on array"),
        ("{1, 2)", "Missing closing curly parenthesis on array"),
        ("f(1, 2", "Missing closing parenthesis on function call"),
        ("1 2", "Unexpected token '2'"),
        (")", "Expected an operand but found ')'"),
        ("a + * b", "Expected an operand but found '*'"),
        ("f(1,)", "Expected an operand but found ')'"),
        ("1, 2", "Unexpected ','"),
    ];

    for (input, expected) in test_cases {
        let msg = syntax_error(input);
        assert!(msg.contains(expected), "For '{}': expected '{}' in '{}'", input, expected, msg);
    }
}

#[test]
fn test_lexical_errors_surface() {
    assert_eq!(
        deserialize("\"abc", None),
        Err(ParseError::Lexical(LexError::UnterminatedString { position: 0 }))
    );
    assert_eq!(
        deserialize("1 # 2", None),
        Err(ParseError::Lexical(LexError::UnexpectedCharacter { ch: '#', position: 2 }))
    );
}

#[test]
fn test_error_display() {
    let err = deserialize("IF(1,2)", None).unwrap_err();
    assert_eq!(err.to_string(), "Syntax error: Ternary IF needs three arguments");

    let err = deserialize("'abc", None).unwrap_err();
    assert!(err.to_string().starts_with("Lexical error: Unterminated string"));
}

// ============================================================================
// Tree Queries
// ============================================================================

#[test]
fn test_value_types() {
    let test_cases = vec![
        ("1 + 2", ValueType::Number),
        ("a > 1", ValueType::Boolean),
        ("'a' + 1", ValueType::String),
        ("!a", ValueType::Boolean),
        ("ANY(x)", ValueType::Boolean),
        ("AVERAGE(x, 1h)", ValueType::Number),
        ("{1, 2}", ValueType::Array),
        ("a + 1", ValueType::Object),
        ("DATETIME('2020-01-01')", ValueType::DateTime),
        ("IF(a, 1, 2)", ValueType::Number),
        ("IF(a, 1, 'x')", ValueType::Object),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse(input).value_type(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_unbound_names() {
    let expr = parse("EACH(items, item, item > limit) & foo(bar(1), SUM(x)) & limit < 3");
    assert_eq!(expr.unbound_variables(), vec!["items", "limit", "x"]);
    assert_eq!(expr.unbound_functions(), vec!["foo", "bar"]);
}

#[test]
fn test_unbound_names_inside_temporal_window() {
    let expr = parse("AVERAGE(x, period, start) > limit");
    assert_eq!(expr.unbound_variables(), vec!["x", "period", "start", "limit"]);
}
