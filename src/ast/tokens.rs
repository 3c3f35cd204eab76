use std::fmt;

use super::operators::Operator;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace opening an array literal
    ///
    /// # Examples
    /// ```text
    /// {1, 2, 3}
    /// ```
    LBrace,

    /// Right brace
    RBrace,

    /// Comma separating arguments or array elements
    Comma,

    /// Operator carrying a precedence level
    ///
    /// # Examples
    /// ```text
    /// +  -  *  /  ^  .  ==  !=  <  <=  >  >=  is  ∈  ∩  ∪  &  |  !  ;
    /// ```
    Operator(Operator),

    // Literals
    /// Decimal number with at most one fractional point
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0.05
    /// ```
    Number(f64),

    /// Bare or bracketed identifier
    ///
    /// Bare identifiers start with a letter or one of `% $ _ ° €` and continue
    /// with letters, digits or those characters. Bracketed identifiers take
    /// any text up to the closing `]`.
    ///
    /// # Examples
    /// ```text
    /// zone_temp
    /// °C
    /// [dtmi:com:example:Setpoint;1]
    /// ```
    Identifier(String),

    /// String literal enclosed in double or single quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    QuotedString(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Comma => f.write_str(","),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Number(n) => write!(f, "{}", n),
            Token::Identifier(s) => f.write_str(s),
            Token::QuotedString(s) => write!(f, "\"{}\"", s),
        }
    }
}
