use std::fmt;

/// Precedence level of an operator. Higher binds tighter.
pub type Precedence = u8;

/// Operator tokens produced by the scanner.
///
/// Every operator carries a precedence used by the parser's reducer.
/// `UnaryNot` doubles as the scanned `!` token; `UnaryMinus` is never
/// scanned, the parser selects it when `-` appears where an operand was
/// expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `;` (treated as AND between clauses)
    SemiColon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `^`
    Power,
    /// `=` or `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `is`
    Is,
    /// `∈`
    MemberOf,
    /// `∩`
    Intersection,
    /// `∪`
    Union,
    /// `&`, `&&` or `AND`
    And,
    /// `|`, `||` or `OR`
    Or,
    /// `.`
    Dot,
    /// `!`
    UnaryNot,
    /// Prefix `-`
    UnaryMinus,
}

impl Operator {
    /// Every operator, in ascending precedence order.
    pub const ALL: [Operator; 21] = [
        Operator::And,
        Operator::Or,
        Operator::MemberOf,
        Operator::Intersection,
        Operator::Union,
        Operator::SemiColon,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Less,
        Operator::LessEqual,
        Operator::Greater,
        Operator::GreaterEqual,
        Operator::Is,
        Operator::Plus,
        Operator::Minus,
        Operator::Multiply,
        Operator::Divide,
        Operator::Power,
        Operator::UnaryNot,
        Operator::UnaryMinus,
        Operator::Dot,
    ];

    pub fn precedence(self) -> Precedence {
        match self {
            Self::And | Self::Or => 1,
            Self::MemberOf | Self::Intersection | Self::Union => 2,
            Self::SemiColon
            | Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessEqual
            | Self::Greater
            | Self::GreaterEqual
            | Self::Is => 3,
            Self::Plus | Self::Minus => 4,
            Self::Multiply | Self::Divide => 5,
            Self::Power => 6,
            Self::UnaryNot | Self::UnaryMinus => 7,
            Self::Dot => 8,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Self::UnaryNot | Self::UnaryMinus)
    }

    /// The canonical source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::SemiColon => ";",
            Self::Plus => "+",
            Self::Minus | Self::UnaryMinus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Is => "is",
            Self::MemberOf => "∈",
            Self::Intersection => "∩",
            Self::Union => "∪",
            Self::And => "&",
            Self::Or => "|",
            Self::Dot => ".",
            Self::UnaryNot => "!",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Binary node kinds of the expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Logical
    /// `a & b`
    And,
    /// `a | b`
    Or,

    // Arithmetic
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `a ^ b`
    Power,

    // Comparison
    /// `a == b`
    Equals,
    /// `a != b`
    NotEquals,
    /// `a < b`
    Less,
    /// `a <= b`
    LessOrEqual,
    /// `a > b`
    Greater,
    /// `a >= b`
    GreaterOrEqual,
    /// `a is b`
    Is,

    // Sets
    /// `a ∈ b`
    MemberOf,
    /// `a ∩ b`
    Intersection,
}

impl BinOp {
    /// Maps a scanned operator onto its node kind. Dot, union and the unary
    /// operators build other node shapes and return `None`.
    pub fn from_operator(op: Operator) -> Option<BinOp> {
        let bin = match op {
            Operator::And | Operator::SemiColon => BinOp::And,
            Operator::Or => BinOp::Or,
            Operator::Plus => BinOp::Add,
            Operator::Minus => BinOp::Subtract,
            Operator::Multiply => BinOp::Multiply,
            Operator::Divide => BinOp::Divide,
            Operator::Power => BinOp::Power,
            Operator::Equal => BinOp::Equals,
            Operator::NotEqual => BinOp::NotEquals,
            Operator::Less => BinOp::Less,
            Operator::LessEqual => BinOp::LessOrEqual,
            Operator::Greater => BinOp::Greater,
            Operator::GreaterEqual => BinOp::GreaterOrEqual,
            Operator::Is => BinOp::Is,
            Operator::MemberOf => BinOp::MemberOf,
            Operator::Intersection => BinOp::Intersection,
            Operator::Union | Operator::Dot | Operator::UnaryNot | Operator::UnaryMinus => {
                return None;
            }
        };
        Some(bin)
    }

    /// The operator this node is written with.
    pub fn operator(self) -> Operator {
        match self {
            BinOp::And => Operator::And,
            BinOp::Or => Operator::Or,
            BinOp::Add => Operator::Plus,
            BinOp::Subtract => Operator::Minus,
            BinOp::Multiply => Operator::Multiply,
            BinOp::Divide => Operator::Divide,
            BinOp::Power => Operator::Power,
            BinOp::Equals => Operator::Equal,
            BinOp::NotEquals => Operator::NotEqual,
            BinOp::Less => Operator::Less,
            BinOp::LessOrEqual => Operator::LessEqual,
            BinOp::Greater => Operator::Greater,
            BinOp::GreaterOrEqual => Operator::GreaterEqual,
            BinOp::Is => Operator::Is,
            BinOp::MemberOf => Operator::MemberOf,
            BinOp::Intersection => Operator::Intersection,
        }
    }

    pub fn precedence(self) -> Precedence {
        self.operator().precedence()
    }
}

/// Unary node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `!a`
    Not,
    /// `-a`
    Minus,
}
