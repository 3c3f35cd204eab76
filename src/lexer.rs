use std::fmt;

use log::trace;

use crate::ast::{Operator, Token};

/// Zero-based character offset into the scanned text.
pub type Position = usize;

/// Errors raised while scanning.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character that cannot start any token
    UnexpectedCharacter { ch: char, position: Position },

    /// A quoted string without its closing quote
    UnterminatedString { position: Position },

    /// A `[...]` identifier without its closing bracket
    UnterminatedIdentifier { position: Position },

    /// A typographic quote where an ASCII quote was meant
    SmartQuote { ch: char, position: Position },

    /// A digit run that does not form a number
    InvalidNumber { text: String, position: Position },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter { ch, position } => {
                write!(f, "Unexpected character '{}' at position {}", ch, position)
            }
            LexError::UnterminatedString { position } => {
                write!(f, "Unterminated string starting at position {}: missing closing quote", position)
            }
            LexError::UnterminatedIdentifier { position } => {
                write!(f, "Unterminated identifier starting at position {}: missing closing ']'", position)
            }
            LexError::SmartQuote { ch, position } => write!(
                f,
                "Smart quote '{}' at position {}, use a plain ASCII quote (\" or ') instead",
                ch, position
            ),
            LexError::InvalidNumber { text, position } => {
                write!(f, "Invalid number '{}' at position {}", text, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

const SPECIAL_IDENTIFIER_CHARS: [char; 5] = ['%', '$', '_', '°', '€'];

pub(crate) fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || SPECIAL_IDENTIFIER_CHARS.contains(&ch)
}

pub(crate) fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || SPECIAL_IDENTIFIER_CHARS.contains(&ch)
}

/// Scans `text` into a lazy token sequence.
pub fn scan(text: &str) -> Lexer {
    Lexer::new(text)
}

/// Single pass, forward only scanner.
///
/// Yields `Result<Token, LexError>` items and stops after the first error.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    failed: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            failed: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes one char, and a second one when it equals `doubled`.
    fn single_or_double(&mut self, doubled: char) {
        self.advance();
        if self.current_char() == Some(doubled) {
            self.advance();
        }
    }

    fn operator(&mut self, op: Operator) -> Token {
        self.advance();
        Token::Operator(op)
    }

    /// `<`, `<=` style pairs.
    fn with_equals(&mut self, single: Operator, with_eq: Operator) -> Token {
        if self.peek_char(1) == Some('=') {
            self.advance();
            self.advance();
            Token::Operator(with_eq)
        } else {
            self.operator(single)
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_continue(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_bracketed_identifier(&mut self) -> Result<String, LexError> {
        let start = self.position;
        self.advance(); // Consume '['

        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == ']' {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(LexError::UnterminatedIdentifier { position: start })
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some(escaped @ ('"' | '\'' | '\\')) => {
                            result.push(escaped);
                            self.advance();
                        }
                        // Only quotes and backslashes are escapes, keep anything else verbatim
                        _ => result.push('\\'),
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut seen_point = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !seen_point {
                seen_point = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| LexError::InvalidNumber {
                text: number,
                position: start,
            })
    }

    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        self.skip_whitespace();

        let ch = self.current_char()?;
        let token = match ch {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            '{' => {
                self.advance();
                Token::LBrace
            }
            '}' => {
                self.advance();
                Token::RBrace
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            ';' => self.operator(Operator::SemiColon),
            '&' => {
                self.single_or_double('&');
                Token::Operator(Operator::And)
            }
            '|' => {
                self.single_or_double('|');
                Token::Operator(Operator::Or)
            }
            '"' | '\'' => match self.read_string(ch) {
                Ok(s) => Token::QuotedString(s),
                Err(e) => return Some(Err(e)),
            },
            '[' => match self.read_bracketed_identifier() {
                Ok(s) => Token::Identifier(s),
                Err(e) => return Some(Err(e)),
            },
            '+' => self.operator(Operator::Plus),
            '.' => self.operator(Operator::Dot),
            '-' => self.operator(Operator::Minus),
            '*' => self.operator(Operator::Multiply),
            '/' => self.operator(Operator::Divide),
            '^' => self.operator(Operator::Power),
            '=' => {
                self.single_or_double('=');
                Token::Operator(Operator::Equal)
            }
            '!' => self.with_equals(Operator::UnaryNot, Operator::NotEqual),
            '<' => self.with_equals(Operator::Less, Operator::LessEqual),
            '>' => self.with_equals(Operator::Greater, Operator::GreaterEqual),
            '∈' => self.operator(Operator::MemberOf),
            '∩' => self.operator(Operator::Intersection),
            '∪' => self.operator(Operator::Union),
            '“' | '”' | '‘' | '’' => {
                return Some(Err(LexError::SmartQuote {
                    ch,
                    position: self.position,
                }));
            }
            c if is_identifier_start(c) => {
                let ident = self.read_identifier();
                if ident == "is" {
                    Token::Operator(Operator::Is)
                } else {
                    Token::Identifier(ident)
                }
            }
            c if c.is_ascii_digit() => match self.read_number() {
                Ok(token) => token,
                Err(e) => return Some(Err(e)),
            },
            c => {
                return Some(Err(LexError::UnexpectedCharacter {
                    ch: c,
                    position: self.position,
                }));
            }
        };

        trace!("scanned {:?}", token);
        Some(Ok(token))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

#[test]
fn test_keywords() {
    let tokens: Vec<Token> = Lexer::new("a is AND b").map(Result::unwrap).collect();
    assert_eq!(
        tokens,
        vec![
            Token::Identifier("a".to_string()),
            Token::Operator(Operator::Is),
            Token::Identifier("AND".to_string()),
            Token::Identifier("b".to_string()),
        ]
    );
}

#[test]
fn test_error_fuses_iterator() {
    let mut lexer = Lexer::new("1 # 2");
    assert_eq!(lexer.next(), Some(Ok(Token::Number(1.0))));
    assert!(matches!(lexer.next(), Some(Err(LexError::UnexpectedCharacter { ch: '#', position: 2 }))));
    assert_eq!(lexer.next(), None);
}
