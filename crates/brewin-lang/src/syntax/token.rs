#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Bool(bool),
    Ident(String),
    StringLit(String),
    Nil,

    // Keywords
    Func,
    Lambda,
    Ref,
    If,
    Else,
    While,
    Return,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Eq,         // =
    EqEq,       // ==
    BangEq,     // !=
    Bang,       // !
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    AndAnd,     // &&
    OrOr,       // ||
    At,         // @

    // Punctuation
    Comma,      // ,
    Semicolon,  // ;
    Dot,        // .
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }

    Eof,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Bool(_) | Self::StringLit(_) | Self::Nil)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus | Self::Star | Self::Slash)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::EqEq | Self::BangEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::AndAnd | Self::OrOr | Self::Bang)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Func | Self::Lambda | Self::Ref | Self::If | Self::Else | Self::While | Self::Return
        )
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "func"   => TokenKind::Func,
        "lambda" => TokenKind::Lambda,
        "ref"    => TokenKind::Ref,
        "if"     => TokenKind::If,
        "else"   => TokenKind::Else,
        "while"  => TokenKind::While,
        "return" => TokenKind::Return,
        "true"   => TokenKind::Bool(true),
        "false"  => TokenKind::Bool(false),
        "nil"    => TokenKind::Nil,
        _        => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
