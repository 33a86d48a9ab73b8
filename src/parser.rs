use tracing::debug;

use crate::ast::{Ast, AstBuilder, AstNode, BinaryOperator, NodeId, TypeSpec, UnaryOperator};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Predictive recursive-descent parser with one token of lookahead.
///
/// ```text
/// program              : PROGRAM variable SEMI block DOT
/// block                : declarations compound_statement
/// declarations         : (VAR (variable_declaration SEMI)+)?
/// variable_declaration : ID (COMMA ID)* COLON type_spec
/// type_spec            : INTEGER | REAL
/// compound_statement   : BEGIN statement_list END
/// statement_list       : statement (SEMI statement)*
/// statement            : compound_statement | assignment_statement | empty
/// assignment_statement : variable ASSIGN expr
/// expr                 : term ((PLUS | MINUS) term)*
/// term                 : factor ((MUL | INTEGER_DIV | FLOAT_DIV) factor)*
/// factor               : (PLUS | MINUS) factor | INTEGER_CONST | REAL_CONST
///                      | LPAREN expr RPAREN | variable
/// ```
///
/// Nesting is bounded: see [`MAX_NESTING_DEPTH`] and [`MAX_TREE_HEIGHT`].
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    nodes: AstBuilder,
    depth: usize,
}

/// Deepest nesting of parentheses, unary signs and `BEGIN` blocks.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Tallest tree the parser hands out. Bounds evaluation depth, which long
/// operator chains raise without nesting.
pub const MAX_TREE_HEIGHT: usize = 512;

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            nodes: AstBuilder::new(),
            depth: 0,
        })
    }

    /// Parses a whole program. Input after the final `.` is rejected.
    pub fn parse(mut self) -> Result<Ast, ParseError> {
        let root = self.program()?;
        self.eat(TokenKind::Eof)?;
        let ast = self.nodes.finish(root);
        debug!(program = ast.program_name(), nodes = ast.len(), "parsed program");
        Ok(ast)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.current_token.kind() == kind {
            self.current_token = self.lexer.next_token()?;
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: kind,
                found: self.current_token.kind(),
                position: self.lexer.token_position(),
            })
        }
    }

    fn too_deep(&self, limit: usize) -> ParseError {
        ParseError::NestingTooDeep {
            limit,
            position: self.lexer.token_position(),
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn node(&mut self, node: AstNode) -> Result<NodeId, ParseError> {
        let id = self.nodes.push(node);
        if self.nodes.height(id) > MAX_TREE_HEIGHT {
            return Err(self.too_deep(MAX_TREE_HEIGHT));
        }
        Ok(id)
    }

    fn invalid(&self, rule: &'static str) -> ParseError {
        ParseError::InvalidSyntax {
            rule,
            found: self.current_token.kind(),
            position: self.lexer.token_position(),
        }
    }

    fn program(&mut self) -> Result<NodeId, ParseError> {
        self.eat(TokenKind::Program)?;
        let name = self.variable()?;
        self.eat(TokenKind::Semi)?;
        let block = self.block()?;
        self.eat(TokenKind::Dot)?;
        self.node(AstNode::Program { name, block })
    }

    fn block(&mut self) -> Result<NodeId, ParseError> {
        let declarations = self.declarations()?;
        let compound_statement = self.compound_statement()?;
        self.node(AstNode::Block {
            declarations,
            compound_statement,
        })
    }

    fn declarations(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut declarations = Vec::new();
        if self.current_token == Token::Var {
            self.eat(TokenKind::Var)?;
            // at least one declaration must follow VAR
            loop {
                declarations.extend(self.variable_declaration()?);
                self.eat(TokenKind::Semi)?;
                if self.current_token.kind() != TokenKind::Id {
                    break;
                }
            }
        }
        Ok(declarations)
    }

    fn variable_declaration(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut names = vec![self.variable()?];
        while self.current_token == Token::Comma {
            self.eat(TokenKind::Comma)?;
            names.push(self.variable()?);
        }
        self.eat(TokenKind::Colon)?;
        let type_spec = self.type_spec()?;

        let mut declarations = Vec::with_capacity(names.len());
        for var in names {
            let type_spec = self.node(AstNode::Type(type_spec))?;
            declarations.push(self.node(AstNode::VarDecl { var, type_spec })?);
        }
        Ok(declarations)
    }

    fn type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        match self.current_token {
            Token::Integer => {
                self.eat(TokenKind::Integer)?;
                Ok(TypeSpec::Integer)
            }
            Token::Real => {
                self.eat(TokenKind::Real)?;
                Ok(TypeSpec::Real)
            }
            _ => Err(self.invalid("type_spec")),
        }
    }

    fn compound_statement(&mut self) -> Result<NodeId, ParseError> {
        self.descend()?;
        self.eat(TokenKind::Begin)?;
        let children = self.statement_list()?;
        self.eat(TokenKind::End)?;
        self.ascend();
        self.node(AstNode::Compound { children })
    }

    fn statement_list(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut results = vec![self.statement()?];

        while self.current_token == Token::Semi {
            self.eat(TokenKind::Semi)?;
            results.push(self.statement()?);
        }

        // two statements with no separator between them
        if self.current_token.kind() == TokenKind::Id {
            return Err(ParseError::UnexpectedToken {
                expected: TokenKind::Semi,
                found: TokenKind::Id,
                position: self.lexer.token_position(),
            });
        }

        Ok(results)
    }

    fn statement(&mut self) -> Result<NodeId, ParseError> {
        match &self.current_token {
            Token::Begin => self.compound_statement(),
            Token::Id(_) => self.assignment(),
            _ => self.empty(),
        }
    }

    fn assignment(&mut self) -> Result<NodeId, ParseError> {
        let var = self.variable()?;
        self.eat(TokenKind::Assign)?;
        let expr = self.expr()?;
        self.node(AstNode::Assign { var, expr })
    }

    fn variable(&mut self) -> Result<String, ParseError> {
        if let Token::Id(name) = &self.current_token {
            let name = name.clone();
            self.eat(TokenKind::Id)?;
            Ok(name)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: TokenKind::Id,
                found: self.current_token.kind(),
                position: self.lexer.token_position(),
            })
        }
    }

    fn empty(&mut self) -> Result<NodeId, ParseError> {
        self.node(AstNode::NoOp)
    }

    fn expr(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.term()?;

        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOperator::Plus,
                Token::Minus => BinaryOperator::Minus,
                _ => break,
            };
            self.eat(self.current_token.kind())?;
            let right = self.term()?;
            node = self.node(AstNode::BinOp {
                left: node,
                op,
                right,
            })?;
        }

        Ok(node)
    }

    fn term(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.factor()?;

        loop {
            let op = match self.current_token {
                Token::Multiply => BinaryOperator::Multiply,
                Token::IntegerDiv => BinaryOperator::IntegerDiv,
                Token::FloatDiv => BinaryOperator::FloatDiv,
                _ => break,
            };
            self.eat(self.current_token.kind())?;
            let right = self.factor()?;
            node = self.node(AstNode::BinOp {
                left: node,
                op,
                right,
            })?;
        }

        Ok(node)
    }

    fn factor(&mut self) -> Result<NodeId, ParseError> {
        match self.current_token {
            Token::Plus => self.unary(TokenKind::Plus, UnaryOperator::Plus),
            Token::Minus => self.unary(TokenKind::Minus, UnaryOperator::Minus),
            Token::IntegerConst(value) => {
                self.eat(TokenKind::IntegerConst)?;
                self.node(AstNode::Integer(value))
            }
            Token::RealConst(value) => {
                self.eat(TokenKind::RealConst)?;
                self.node(AstNode::Real(value))
            }
            Token::LParen => {
                self.descend()?;
                self.eat(TokenKind::LParen)?;
                let node = self.expr()?;
                self.eat(TokenKind::RParen)?;
                self.ascend();
                Ok(node)
            }
            Token::Id(_) => {
                let var = self.variable()?;
                self.node(AstNode::Var(var))
            }
            _ => Err(self.invalid("factor")),
        }
    }

    fn unary(&mut self, kind: TokenKind, op: UnaryOperator) -> Result<NodeId, ParseError> {
        self.descend()?;
        self.eat(kind)?;
        let expr = self.factor()?;
        self.ascend();
        self.node(AstNode::UnaryOp { op, expr })
    }
}

/// Lexes and parses `text` in one step.
pub fn parse(text: &str) -> Result<Ast, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexError;

    fn wrap(statements: &str) -> String {
        format!("PROGRAM Test; BEGIN {statements} END.")
    }

    fn first_assignment_rhs(ast: &Ast) -> NodeId {
        let AstNode::Program { block, .. } = &ast[ast.root()] else {
            panic!("root is not a program");
        };
        let AstNode::Block {
            compound_statement, ..
        } = &ast[*block]
        else {
            panic!("expected block");
        };
        let AstNode::Compound { children } = &ast[*compound_statement] else {
            panic!("expected compound statement");
        };
        let AstNode::Assign { expr, .. } = &ast[children[0]] else {
            panic!("expected assignment");
        };
        *expr
    }

    #[test]
    fn test_parse_simple_assignment() {
        let ast = parse(&wrap("x := 5")).unwrap();
        assert_eq!(ast.program_name(), "Test");
        assert_eq!(ast[first_assignment_rhs(&ast)], AstNode::Integer(5));
    }

    #[test]
    fn test_parse_precedence() {
        let ast = parse(&wrap("x := 2 + 3 * 4")).unwrap();
        let AstNode::BinOp { left, op, right } = &ast[first_assignment_rhs(&ast)] else {
            panic!("expected binary operator");
        };
        assert_eq!(*op, BinaryOperator::Plus);
        assert_eq!(ast[*left], AstNode::Integer(2));
        assert!(matches!(
            ast[*right],
            AstNode::BinOp {
                op: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_left_associative() {
        let ast = parse(&wrap("x := 8 DIV 4 / 2")).unwrap();
        let AstNode::BinOp { left, op, right } = &ast[first_assignment_rhs(&ast)] else {
            panic!("expected binary operator");
        };
        assert_eq!(*op, BinaryOperator::FloatDiv);
        assert_eq!(ast[*right], AstNode::Integer(2));
        assert!(matches!(
            ast[*left],
            AstNode::BinOp {
                op: BinaryOperator::IntegerDiv,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_parentheses_leave_no_node() {
        let ast = parse(&wrap("x := ((7))")).unwrap();
        assert_eq!(ast[first_assignment_rhs(&ast)], AstNode::Integer(7));
    }

    #[test]
    fn test_parse_stacked_unary_operators() {
        let ast = parse(&wrap("x := - + 2.5")).unwrap();
        let AstNode::UnaryOp { op, expr } = &ast[first_assignment_rhs(&ast)] else {
            panic!("expected unary operator");
        };
        assert_eq!(*op, UnaryOperator::Minus);
        let AstNode::UnaryOp { op, expr } = &ast[*expr] else {
            panic!("expected unary operator");
        };
        assert_eq!(*op, UnaryOperator::Plus);
        assert_eq!(ast[*expr], AstNode::Real(2.5));
    }

    #[test]
    fn test_parse_declarations() {
        let ast = parse("PROGRAM P; VAR a, b : INTEGER; y : REAL; BEGIN END.").unwrap();
        let AstNode::Program { block, .. } = &ast[ast.root()] else {
            panic!("root is not a program");
        };
        let AstNode::Block { declarations, .. } = &ast[*block] else {
            panic!("expected block");
        };
        let declared: Vec<(String, TypeSpec)> = declarations
            .iter()
            .map(|id| match &ast[*id] {
                AstNode::VarDecl { var, type_spec } => match ast[*type_spec] {
                    AstNode::Type(spec) => (var.clone(), spec),
                    _ => panic!("expected type node"),
                },
                _ => panic!("expected declaration"),
            })
            .collect();
        assert_eq!(
            declared,
            vec![
                ("a".to_string(), TypeSpec::Integer),
                ("b".to_string(), TypeSpec::Integer),
                ("y".to_string(), TypeSpec::Real),
            ]
        );
    }

    #[test]
    fn test_parse_empty_var_section_is_rejected() {
        let err = parse("PROGRAM P; VAR BEGIN END.").unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::Id, TokenKind::Begin)));
    }

    #[test]
    fn test_parse_nested_blocks_and_empty_statements() {
        let ast = parse(&wrap("x := 5; ; BEGIN y := 10 END;")).unwrap();
        let kinds: Vec<&str> = ast.iter().map(|(_, node)| node.kind_name()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == "NO_OPERATION").count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == "COMPOUND_STATEMENT").count(), 2);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "PROGRAM P; VAR x : REAL; BEGIN x := 7 + 3 * (10 / (12 / (3 + 1) - 1)) END.";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }

    #[test]
    fn test_parse_missing_semicolon() {
        let err = parse("PROGRAM P VAR").unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::Semi, TokenKind::Var)));
    }

    #[test]
    fn test_parse_missing_separator_between_statements() {
        let err = parse(&wrap("x := 1 y := 2")).unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::Semi, TokenKind::Id)));
    }

    #[test]
    fn test_parse_missing_dot() {
        let err = parse("PROGRAM P; BEGIN x := 5 END").unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::Dot, TokenKind::Eof)));
    }

    #[test]
    fn test_parse_missing_end() {
        let err = parse("PROGRAM P; BEGIN x := 5.").unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::End, TokenKind::Eof)));
    }

    #[test]
    fn test_parse_trailing_tokens() {
        let err = parse("PROGRAM P; BEGIN END. x").unwrap_err();
        assert_eq!(err.mismatch(), Some((TokenKind::Eof, TokenKind::Id)));
    }

    #[test]
    fn test_parse_bad_factor() {
        let err = parse(&wrap("x := * 2")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidSyntax {
                rule: "factor",
                found: TokenKind::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_bad_type() {
        let err = parse("PROGRAM P; VAR x : BOOLEAN; BEGIN END.").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidSyntax {
                rule: "type_spec",
                found: TokenKind::Id,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_deeply_nested_parentheses() {
        let depth = 200_000;
        let source = wrap(&format!("x := {}1{}", "(".repeat(depth), ")".repeat(depth)));
        let err = parse(&source).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_deeply_nested_signs_and_blocks() {
        let signs = wrap(&format!("x := {}1", "- ".repeat(100_000)));
        assert!(matches!(
            parse(&signs),
            Err(ParseError::NestingTooDeep { .. })
        ));

        let blocks = wrap(&format!("{}{}", "BEGIN ".repeat(100_000), "END ".repeat(100_000)));
        assert!(matches!(
            parse(&blocks),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_overlong_operator_chain() {
        let source = wrap(&format!("x := 1{}", " + 1".repeat(200_000)));
        let err = parse(&source).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NestingTooDeep {
                limit: MAX_TREE_HEIGHT,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_accepts_nesting_within_limits() {
        let depth = 100;
        let source = wrap(&format!(
            "x := {}1{} + {}2",
            "(".repeat(depth),
            ")".repeat(depth),
            "-".repeat(depth)
        ));
        let ast = parse(&source).unwrap();
        assert!(matches!(
            ast[first_assignment_rhs(&ast)],
            AstNode::BinOp {
                op: BinaryOperator::Plus,
                ..
            }
        ));

        let chain = wrap(&format!("x := 1{}", " + 1".repeat(300)));
        assert!(parse(&chain).is_ok());
    }

    #[test]
    fn test_parse_propagates_lex_error() {
        let err = parse(&wrap("x := 1 # 2")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Lex(LexError::InvalidCharacter { ch: '#', .. })
        ));
    }
}
