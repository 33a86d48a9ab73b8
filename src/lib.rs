mod ast;
pub mod config;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod token;
mod value;

pub use ast::{Ast, AstNode, BinaryOperator, NodeId, TypeSpec, UnaryOperator};
pub use error::{Error, LexError, ParseError, RuntimeError, RuntimeErrorKind};
pub use interpreter::{Environment, Interpreter, interpret};
pub use lexer::{Lexer, Position, tokenize};
pub use parser::{MAX_NESTING_DEPTH, MAX_TREE_HEIGHT, Parser, parse};
pub use token::{RESERVED_KEYWORDS, Token, TokenKind};
pub use value::Value;

use tracing::debug;

/// Lexes, parses and runs `program`, returning the final variable bindings.
pub fn execute(program: &str) -> Result<Environment, Error> {
    let lexer = Lexer::new(program);
    let tree = Parser::new(lexer)?.parse()?;
    let mut interpreter = Interpreter::new();
    interpreter.interpret(&tree)?;
    debug!(program = tree.program_name(), "execution complete");
    Ok(interpreter.into_environment())
}
