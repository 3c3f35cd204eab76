use log::{debug, trace};

use crate::{
    ast::{BinOp, Expr, ExprKind, Operator, Token, UnaryOp, ValueType},
    builtins::BuiltinRegistry,
    environment::Environment,
    error::{PResult, ParseError},
    lexer::{self, Lexer},
    units,
};

/// Parses `text` with the standard built-ins.
///
/// Empty or whitespace-only input yields the constant `true`.
pub fn deserialize(text: &str, env: Option<&Environment>) -> PResult<Expr> {
    deserialize_with(text, env, BuiltinRegistry::global())
}

/// Parses `text` with a caller-supplied built-in registry.
pub fn deserialize_with(text: &str, env: Option<&Environment>, builtins: &BuiltinRegistry) -> PResult<Expr> {
    debug!("parsing '{}'", text);
    let empty;
    let env = match env {
        Some(env) => env,
        None => {
            empty = Environment::new();
            &empty
        }
    };
    Parser::new(lexer::scan(text), env, builtins)?.parse()
}

/// An operand stack entry.
///
/// `Unary` is the placeholder left of a prefix `-` or `!`, it keeps one
/// operand per operator on the stacks.
#[derive(Debug)]
enum Operand {
    Expr(Expr),
    Unary,
}

pub struct Parser<'a> {
    lexer: Lexer,
    current: Option<Token>,
    env: &'a Environment,
    builtins: &'a BuiltinRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer, env: &'a Environment, builtins: &'a BuiltinRegistry) -> PResult<Self> {
        let current = lexer.next().transpose()?;
        Ok(Parser {
            lexer,
            current,
            env,
            builtins,
        })
    }

    fn advance(&mut self) -> PResult<()> {
        self.current = self.lexer.next().transpose()?;
        Ok(())
    }

    /// Parses the whole input into a single expression.
    pub fn parse(&mut self) -> PResult<Expr> {
        if self.current.is_none() {
            return Ok(Expr::boolean(true));
        }

        let expr = self.parse_level()?;
        match &self.current {
            None => Ok(expr),
            Some(Token::RParen) => Err(ParseError::syntax("Parentheses mismatch, unexpected ')'")),
            Some(Token::RBrace) => Err(ParseError::syntax("Curly parentheses mismatch, unexpected '}'")),
            Some(token) => Err(ParseError::syntax(format!(
                "Unexpected '{}' after the end of the expression",
                token
            ))),
        }
    }

    /// One grouping level: the top level, a parenthesized body, an array
    /// element or a function argument. Stops before `)`, `}`, `,` or the end.
    fn parse_level(&mut self) -> PResult<Expr> {
        let mut operands: Vec<Operand> = Vec::new();
        let mut operators: Vec<Operator> = Vec::new();

        loop {
            let operand = self.parse_operand()?;
            operands.push(operand);

            let Some(op) = self.read_operator(&mut operands)? else {
                break;
            };

            while operators
                .last()
                .is_some_and(|top| top.precedence() > op.precedence())
            {
                self.reduce(&mut operands, &mut operators)?;
            }
            operators.push(op);

            if operators.len() > operands.len() {
                return Err(ParseError::internal(format!(
                    "{} operators for {} operands",
                    operators.len(),
                    operands.len()
                )));
            }
        }

        while !operators.is_empty() {
            self.reduce(&mut operands, &mut operators)?;
        }

        match (operands.pop(), operands.is_empty()) {
            (Some(Operand::Expr(expr)), true) => Ok(expr),
            (None, _) => Err(ParseError::internal("Expression produced no result")),
            _ => Err(ParseError::internal(format!(
                "Expression produced {} results",
                operands.len() + 1
            ))),
        }
    }

    /// Parse operands: brackets, literals, identifiers and calls
    fn parse_operand(&mut self) -> PResult<Operand> {
        // A prefix operator stays current so read_operator can claim it
        if matches!(
            self.current,
            Some(Token::Operator(Operator::Minus | Operator::UnaryNot))
        ) {
            return Ok(Operand::Unary);
        }

        let token = self
            .current
            .take()
            .ok_or_else(|| ParseError::syntax("Unexpected end of expression, expected an operand"))?;

        let expr = match token {
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_level()?;
                if self.current != Some(Token::RParen) {
                    return Err(ParseError::syntax("Parentheses mismatch"));
                }
                self.advance()?;
                inner
            }

            Token::LBrace => {
                self.advance()?;
                let elements = self.parse_list(Token::RBrace, "Missing closing curly parenthesis on array")?;
                Expr::array(elements)
            }

            Token::Number(n) => {
                self.advance()?;
                let mut constant = Expr::number(n);
                if let Some(Token::Identifier(word)) = &self.current {
                    if !is_operator_word(word) && word != "%" {
                        constant.unit = Some(units::canonical(word));
                        self.advance()?;
                    }
                }
                constant
            }

            Token::QuotedString(s) => {
                self.advance()?;
                Expr::string(s)
            }

            Token::Identifier(name) => {
                self.advance()?;
                if self.current == Some(Token::LParen) {
                    self.advance()?;
                    let args = self.parse_list(Token::RParen, "Missing closing parenthesis on function call")?;
                    self.function_call(name, args)?
                } else {
                    self.variable_or_special(name)
                }
            }

            token => {
                return Err(ParseError::syntax(format!(
                    "Expected an operand but found '{}'",
                    token
                )));
            }
        };

        Ok(Operand::Expr(expr))
    }

    /// Comma separated levels up to `close`, the opening bracket already consumed.
    fn parse_list(&mut self, close: Token, missing: &str) -> PResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.current.as_ref() == Some(&close) {
            self.advance()?;
            return Ok(items);
        }

        loop {
            items.push(self.parse_level()?);
            match &self.current {
                Some(Token::Comma) => self.advance()?,
                Some(token) if *token == close => {
                    self.advance()?;
                    return Ok(items);
                }
                _ => return Err(ParseError::syntax(missing)),
            }
        }
    }

    /// Reads the operator after an operand, or `None` when the level ends.
    /// Postfix units are attached to the top operand on the way.
    fn read_operator(&mut self, operands: &mut [Operand]) -> PResult<Option<Operator>> {
        loop {
            let after_prefix = matches!(operands.last(), Some(Operand::Unary));

            let op = match &self.current {
                None | Some(Token::RParen | Token::RBrace | Token::Comma) => return Ok(None),

                Some(Token::Operator(Operator::SemiColon)) => {
                    self.advance()?;
                    // A trailing ';' is dropped
                    if self.current.is_none() {
                        return Ok(None);
                    }
                    return Ok(Some(Operator::And));
                }

                Some(Token::Operator(Operator::Minus)) if after_prefix => Operator::UnaryMinus,
                Some(Token::Operator(Operator::UnaryNot)) if after_prefix => Operator::UnaryNot,
                Some(Token::Operator(Operator::UnaryNot)) => {
                    return Err(ParseError::syntax(
                        "'!' can only be used before an operand, use '!=' to compare values",
                    ));
                }
                Some(Token::Operator(op)) => *op,

                Some(Token::Identifier(word)) if word.eq_ignore_ascii_case("AND") => Operator::And,
                Some(Token::Identifier(word)) if word.eq_ignore_ascii_case("OR") => Operator::Or,
                Some(Token::Identifier(word)) => {
                    let unit = units::canonical(word);
                    match operands.last_mut() {
                        Some(Operand::Expr(expr)) => expr.unit = Some(unit),
                        _ => return Err(ParseError::internal("Unit of measure without an operand")),
                    }
                    self.advance()?;
                    if self.current.is_none() {
                        return Ok(None);
                    }
                    continue;
                }

                Some(token) => {
                    return Err(ParseError::syntax(format!(
                        "Unexpected token '{}', expected an operator, comma, or end of expression",
                        token
                    )));
                }
            };

            self.advance()?;
            if self.current.is_none() {
                return Err(ParseError::syntax(format!("Incomplete expression after {} ...", op)));
            }
            return Ok(Some(op));
        }
    }

    /// Pops the top operator, together with every binary operator of the same
    /// precedence directly below it, and combines them left to right.
    /// Prefix operators are combined one at a time.
    fn reduce(&self, operands: &mut Vec<Operand>, operators: &mut Vec<Operator>) -> PResult<()> {
        let Some(top) = operators.pop() else {
            return Ok(());
        };

        let mut run = vec![top];
        if !top.is_unary() {
            while let Some(&below) = operators.last() {
                if below.is_unary() || below.precedence() != top.precedence() {
                    break;
                }
                run.push(below);
                operators.pop();
            }
        }
        run.reverse();

        if operands.len() < run.len() + 1 {
            return Err(ParseError::internal(format!("Missing argument after {}", top)));
        }
        let rhs = operands.split_off(operands.len() - run.len());
        let mut acc = operands
            .pop()
            .ok_or_else(|| ParseError::internal(format!("Missing argument before {}", top)))?;

        for (op, rhs) in run.into_iter().zip(rhs) {
            trace!("reducing {}", op);
            acc = Operand::Expr(self.create_expression(acc, op, rhs)?);
        }
        operands.push(acc);
        Ok(())
    }

    fn create_expression(&self, lhs: Operand, op: Operator, rhs: Operand) -> PResult<Expr> {
        match (lhs, op, rhs) {
            (Operand::Unary, Operator::UnaryMinus, Operand::Expr(rhs)) => Ok(Expr::unary(UnaryOp::Minus, rhs)),
            (Operand::Unary, Operator::UnaryNot, Operand::Expr(rhs)) => Ok(Expr::unary(UnaryOp::Not, rhs)),
            (Operand::Expr(lhs), Operator::Dot, Operand::Expr(rhs)) => self.dot(lhs, rhs),
            (Operand::Expr(lhs), Operator::Union, Operand::Expr(rhs)) => Ok(ExprKind::SetUnion(vec![lhs, rhs]).into()),
            (Operand::Expr(lhs), op, Operand::Expr(rhs)) => match BinOp::from_operator(op) {
                Some(bin) => Ok(Expr::binary(bin, lhs, rhs)),
                None => Err(ParseError::internal(format!("'{}' is not a binary operator", op))),
            },
            (_, op, _) => Err(ParseError::internal(format!("Cannot apply '{}' to these operands", op))),
        }
    }

    /// `lhs.rhs`: dotted variables, property access and `object.method(...)`.
    fn dot(&self, lhs: Expr, rhs: Expr) -> PResult<Expr> {
        let Expr { kind, unit } = rhs;
        let prefix = lhs.dotted_name().filter(|_| !carries_unit(&lhs));

        let result = match kind {
            ExprKind::Variable { name, .. } => {
                let property = Expr::property(lhs, name, ValueType::Object);
                self.resolve_dotted(property)
            }

            kind @ ExprKind::Property { .. } if prefix.is_some() => {
                let chain = graft(lhs, Expr { kind, unit: None });
                self.resolve_dotted(chain)
            }

            ExprKind::FunctionCall { name, args, .. } if prefix.is_some() => {
                let prefix = prefix.unwrap_or_default();
                let compound = format!("{}.{}", prefix, name);
                let Some(ty) = self.registered_result(&compound, &args) else {
                    return Err(ParseError::syntax(format!(
                        "Invalid expression, cannot use 'dot' operator to call '{}' on '{}'",
                        name, prefix
                    )));
                };
                debug!("resolved method call '{}'", compound);
                Expr::call(compound, ty, args)
            }

            kind => {
                let rhs = Expr { kind, unit: None };
                return Err(ParseError::syntax(format!(
                    "Invalid expression, cannot use 'dot' operator between '{}' and '{}'",
                    lhs, rhs
                )));
            }
        };

        Ok(match unit {
            Some(unit) => result.with_unit(unit),
            None => result,
        })
    }

    /// Result type of a registered function. Every overload of a name shares
    /// one result type, so an arity mismatch still takes it.
    fn registered_result(&self, name: &str, args: &[Expr]) -> Option<ValueType> {
        let arg_types: Vec<ValueType> = args.iter().map(Expr::value_type).collect();
        self.env
            .try_get_function(name, &arg_types)
            .or_else(|| self.env.get_functions(name).first().map(|f| f.result))
    }

    /// Collapses a variable-rooted property chain into a single variable when
    /// the environment knows its full dotted name. A chain with a unit inside
    /// it stays a chain.
    fn resolve_dotted(&self, chain: Expr) -> Expr {
        let resolved = chain
            .dotted_name()
            .filter(|_| !carries_unit(&chain))
            .and_then(|dotted| self.env.try_get_variable(&dotted).map(|ty| (dotted, ty)));
        match resolved {
            Some((dotted, ty)) => {
                debug!("resolved dotted variable '{}' as {}", dotted, ty);
                Expr::variable(dotted, ty)
            }
            None => chain,
        }
    }

    fn function_call(&self, name: String, args: Vec<Expr>) -> PResult<Expr> {
        if let Some(builder) = self.builtins.get(&name) {
            return builder.build(args, self.env);
        }

        let ty = match self.registered_result(&name, &args) {
            Some(ty) => ty,
            None => {
                debug!(
                    "function '{}' with {} arguments is not registered, typing it as {}",
                    name,
                    args.len(),
                    ValueType::Object
                );
                ValueType::Object
            }
        };
        Ok(Expr::call(name, ty, args))
    }

    fn variable_or_special(&self, name: String) -> Expr {
        match name.to_lowercase().as_str() {
            "true" => Expr::boolean(true),
            "false" => Expr::boolean(false),
            "null" => Expr::null(),
            "pi" => Expr::number(std::f64::consts::PI),
            _ => {
                let ty = self.env.try_get_variable(&name).unwrap_or_default();
                Expr::variable(name, ty)
            }
        }
    }
}

fn is_operator_word(word: &str) -> bool {
    word.eq_ignore_ascii_case("AND") || word.eq_ignore_ascii_case("OR")
}

fn carries_unit(chain: &Expr) -> bool {
    chain.unit.is_some()
        || matches!(&chain.kind, ExprKind::Property { base, .. } if carries_unit(base))
}

/// Re-roots a variable-rooted property chain on `root`:
/// `graft(a, b.c)` is `a.b.c`.
fn graft(root: Expr, chain: Expr) -> Expr {
    let Expr { kind, unit } = chain;
    let grafted = match kind {
        ExprKind::Variable { name, .. } => Expr::property(root, name, ValueType::Object),
        ExprKind::Property { base, name, ty } => Expr::property(graft(root, *base), name, ty),
        kind => Expr { kind, unit: None },
    };
    Expr { unit, ..grafted }
}

#[test]
fn test_unary_marker_is_right_associative() {
    let expr = deserialize("--x", None).unwrap();
    assert_eq!(
        expr,
        Expr::unary(
            UnaryOp::Minus,
            Expr::unary(UnaryOp::Minus, Expr::variable("x", ValueType::Object))
        )
    );
}

#[test]
fn test_graft_reroots_chain() {
    let chain = Expr::property(Expr::variable("b", ValueType::Object), "c", ValueType::Object);
    let grafted = graft(Expr::variable("a", ValueType::Object), chain);
    assert_eq!(grafted.dotted_name().as_deref(), Some("a.b.c"));
}
