use std::fmt;

use tracing::trace;

use crate::error::LexError;
use crate::token::{self, Token};

/// One-based line and column of a character in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub struct Lexer {
    text: Vec<char>,
    pos: usize,
    current_char: Option<char>,
    position: Position,
    token_start: Position,
}

impl Lexer {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let current_char = chars.first().copied();
        let start = Position { line: 1, column: 1 };
        Lexer {
            text: chars,
            pos: 0,
            current_char,
            position: start,
            token_start: start,
        }
    }

    /// Where the most recently returned token starts.
    pub fn token_position(&self) -> Position {
        self.token_start
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char {
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
        self.pos += 1;
        self.current_char = self.text.get(self.pos).copied();
    }

    fn peek(&self) -> Option<char> {
        self.text.get(self.pos + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // An unterminated comment swallows the rest of the input.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '}' {
                break;
            }
        }
    }

    fn number(&mut self) -> Result<Token, LexError> {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char != Some('.') {
            return result
                .parse()
                .map(Token::IntegerConst)
                .map_err(|_| self.out_of_range(result));
        }

        result.push('.');
        self.advance();
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match result.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Token::RealConst(value)),
            _ => Err(self.out_of_range(result)),
        }
    }

    fn out_of_range(&self, literal: String) -> LexError {
        LexError::LiteralOutOfRange {
            literal,
            position: self.token_start,
        }
    }

    fn id(&mut self) -> Token {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        token::keyword(&result).unwrap_or(Token::Id(result))
    }

    /// Returns the next token. Once the input is exhausted every call yields
    /// [`Token::Eof`].
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.scan()?;
        trace!(token = %token, line = self.token_start.line, column = self.token_start.column, "lexed token");
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        while let Some(ch) = self.current_char {
            self.token_start = self.position;

            if ch.is_whitespace() {
                self.skip_whitespace();
                continue;
            }

            if ch == '{' {
                self.skip_comment();
                continue;
            }

            if ch.is_ascii_alphabetic() {
                return Ok(self.id());
            }

            if ch.is_ascii_digit() {
                return self.number();
            }

            if ch == ':' && self.peek() == Some('=') {
                self.advance();
                self.advance();
                return Ok(Token::Assign);
            }

            let token = match ch {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Multiply,
                '/' => Token::FloatDiv,
                '(' => Token::LParen,
                ')' => Token::RParen,
                ';' => Token::Semi,
                ',' => Token::Comma,
                ':' => Token::Colon,
                '.' => Token::Dot,
                _ => {
                    return Err(LexError::InvalidCharacter {
                        ch,
                        position: self.token_start,
                    });
                }
            };

            self.advance();
            return Ok(token);
        }

        self.token_start = self.position;
        Ok(Token::Eof)
    }
}

/// Lexes the whole of `text`. The returned stream always ends with a single
/// [`Token::Eof`].
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
