use std::fmt;

/// A lexical unit. Literal and identifier tokens carry their payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // reserved words
    Program,
    Var,
    Begin,
    End,
    Integer,
    Real,
    IntegerDiv,

    Assign,
    Plus,
    Minus,
    Multiply,
    FloatDiv,

    Dot,
    Colon,
    Semi,
    Comma,
    LParen,
    RParen,

    Id(String),
    IntegerConst(i64),
    RealConst(f64),
    Eof,
}

/// Payload-free classification of a [`Token`], used by the parser's `eat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Program,
    Var,
    Begin,
    End,
    Integer,
    Real,
    IntegerDiv,
    Assign,
    Plus,
    Minus,
    Multiply,
    FloatDiv,
    Dot,
    Colon,
    Semi,
    Comma,
    LParen,
    RParen,
    Id,
    IntegerConst,
    RealConst,
    Eof,
}

/// Reserved words. Lookup is exact, so `begin` or `div` is an ordinary identifier.
pub const RESERVED_KEYWORDS: [(&str, Token); 7] = [
    ("PROGRAM", Token::Program),
    ("VAR", Token::Var),
    ("BEGIN", Token::Begin),
    ("END", Token::End),
    ("INTEGER", Token::Integer),
    ("REAL", Token::Real),
    ("DIV", Token::IntegerDiv),
];

const TOKEN_KIND_NAMES: [(TokenKind, &str); 22] = [
    (TokenKind::Program, "PROGRAM"),
    (TokenKind::Var, "VAR"),
    (TokenKind::Begin, "BEGIN"),
    (TokenKind::End, "END"),
    (TokenKind::Integer, "INTEGER"),
    (TokenKind::Real, "REAL"),
    (TokenKind::IntegerDiv, "INTEGER_DIV"),
    (TokenKind::Assign, "ASSIGN"),
    (TokenKind::Plus, "PLUS"),
    (TokenKind::Minus, "MINUS"),
    (TokenKind::Multiply, "MUL"),
    (TokenKind::FloatDiv, "FLOAT_DIV"),
    (TokenKind::Dot, "DOT"),
    (TokenKind::Colon, "COLON"),
    (TokenKind::Semi, "SEMI_COLON"),
    (TokenKind::Comma, "COMMA"),
    (TokenKind::LParen, "LPAREN"),
    (TokenKind::RParen, "RPAREN"),
    (TokenKind::Id, "ID"),
    (TokenKind::IntegerConst, "INTEGER_CONST"),
    (TokenKind::RealConst, "REAL_CONST"),
    (TokenKind::Eof, "END_OF_FILE"),
];

/// Looks up the reserved word spelled exactly as `word`.
pub fn keyword(word: &str) -> Option<Token> {
    RESERVED_KEYWORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, token)| token.clone())
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Program => TokenKind::Program,
            Token::Var => TokenKind::Var,
            Token::Begin => TokenKind::Begin,
            Token::End => TokenKind::End,
            Token::Integer => TokenKind::Integer,
            Token::Real => TokenKind::Real,
            Token::IntegerDiv => TokenKind::IntegerDiv,
            Token::Assign => TokenKind::Assign,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Multiply => TokenKind::Multiply,
            Token::FloatDiv => TokenKind::FloatDiv,
            Token::Dot => TokenKind::Dot,
            Token::Colon => TokenKind::Colon,
            Token::Semi => TokenKind::Semi,
            Token::Comma => TokenKind::Comma,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::Id(_) => TokenKind::Id,
            Token::IntegerConst(_) => TokenKind::IntegerConst,
            Token::RealConst(_) => TokenKind::RealConst,
            Token::Eof => TokenKind::Eof,
        }
    }
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        TOKEN_KIND_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Id(name) => write!(f, "{}({})", self.kind(), name),
            Token::IntegerConst(value) => write!(f, "{}({})", self.kind(), value),
            Token::RealConst(value) => write!(f, "{}({})", self.kind(), value),
            _ => write!(f, "{}", self.kind()),
        }
    }
}
