use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ast::{Ast, AstNode, BinaryOperator, NodeId, TypeSpec, UnaryOperator};
use crate::error::RuntimeError;
use crate::value::Value;

/// Variable bindings produced by running a program.
pub type Environment = HashMap<String, Value>;

/// Tree-walking evaluator. One instance runs one program.
///
/// Declared types are recorded but not checked: `x : INTEGER` may later be
/// assigned a real.
pub struct Interpreter {
    variables: Environment,
    declarations: HashMap<String, TypeSpec>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            variables: HashMap::new(),
            declarations: HashMap::new(),
        }
    }

    /// Runs the program rooted at `ast.root()` to completion.
    ///
    /// Assignments made before a failure stay applied.
    pub fn interpret(&mut self, ast: &Ast) -> Result<(), RuntimeError> {
        self.visit(ast, ast.root())?;
        debug!(
            program = ast.program_name(),
            variables = self.variables.len(),
            "program finished"
        );
        Ok(())
    }

    /// Evaluates an expression node.
    pub fn evaluate(&mut self, ast: &Ast, id: NodeId) -> Result<Value, RuntimeError> {
        self.visit(ast, id)?.ok_or(RuntimeError::MissingValue {
            node: ast[id].kind_name(),
        })
    }

    fn visit(&mut self, ast: &Ast, id: NodeId) -> Result<Option<Value>, RuntimeError> {
        let node = &ast[id];
        trace!(node = node.kind_name(), "visit");
        match node {
            AstNode::Program { block, .. } => {
                self.visit(ast, *block)?;
                Ok(None)
            }
            AstNode::Block {
                declarations,
                compound_statement,
            } => {
                for declaration in declarations {
                    self.visit(ast, *declaration)?;
                }
                self.visit(ast, *compound_statement)?;
                Ok(None)
            }
            AstNode::VarDecl { var, type_spec } => {
                if let AstNode::Type(spec) = ast[*type_spec] {
                    self.declarations.insert(var.clone(), spec);
                }
                Ok(None)
            }
            AstNode::Type(_) => Ok(None),
            AstNode::Compound { children } => {
                for child in children {
                    self.visit(ast, *child)?;
                }
                Ok(None)
            }
            AstNode::Assign { var, expr } => {
                let value = self.evaluate(ast, *expr)?;
                debug!(variable = %var, %value, "assign");
                self.variables.insert(var.clone(), value);
                Ok(None)
            }
            AstNode::BinOp { left, op, right } => {
                let left_val = self.evaluate(ast, *left)?;
                let right_val = self.evaluate(ast, *right)?;
                binary(*op, left_val, right_val).map(Some)
            }
            AstNode::UnaryOp { op, expr } => {
                let val = self.evaluate(ast, *expr)?;
                unary(*op, val).map(Some)
            }
            AstNode::Var(name) => self
                .variables
                .get(name)
                .copied()
                .map(Some)
                .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() }),
            AstNode::Integer(val) => Ok(Some(Value::Integer(*val))),
            AstNode::Real(val) => Ok(Some(Value::Real(*val))),
            AstNode::NoOp => Ok(None),
        }
    }

    pub fn get_variables(&self) -> &Environment {
        &self.variables
    }

    /// Types from the `VAR` section, by variable name.
    pub fn declarations(&self) -> &HashMap<String, TypeSpec> {
        &self.declarations
    }

    pub fn into_environment(self) -> Environment {
        self.variables
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn unary(op: UnaryOperator, val: Value) -> Result<Value, RuntimeError> {
    match (op, val) {
        (UnaryOperator::Plus, val) => Ok(val),
        (UnaryOperator::Minus, Value::Integer(v)) => v
            .checked_neg()
            .map(Value::Integer)
            .ok_or(RuntimeError::Overflow {
                operator: op.symbol(),
            }),
        (UnaryOperator::Minus, Value::Real(v)) => Ok(Value::Real(-v)),
    }
}

fn binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::Overflow {
        operator: op.symbol(),
    };

    match op {
        // IEEE semantics: a zero divisor yields an infinity or NaN
        BinaryOperator::FloatDiv => Ok(Value::Real(left.as_f64() / right.as_f64())),
        BinaryOperator::IntegerDiv => match (left, right) {
            (Value::Integer(_), Value::Integer(0)) => Err(RuntimeError::DivisionByZero),
            (Value::Integer(l), Value::Integer(r)) => {
                l.checked_div(r).map(Value::Integer).ok_or_else(overflow)
            }
            _ => Err(RuntimeError::NonIntegerOperand {
                operator: op.symbol(),
            }),
        },
        BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Multiply => {
            match (left, right) {
                (Value::Integer(l), Value::Integer(r)) => {
                    let result = match op {
                        BinaryOperator::Plus => l.checked_add(r),
                        BinaryOperator::Minus => l.checked_sub(r),
                        _ => l.checked_mul(r),
                    };
                    result.map(Value::Integer).ok_or_else(overflow)
                }
                _ => {
                    let (l, r) = (left.as_f64(), right.as_f64());
                    let result = match op {
                        BinaryOperator::Plus => l + r,
                        BinaryOperator::Minus => l - r,
                        _ => l * r,
                    };
                    Ok(Value::Real(result))
                }
            }
        }
    }
}

/// Runs `ast` in a fresh interpreter and returns the final bindings.
pub fn interpret(ast: &Ast) -> Result<Environment, RuntimeError> {
    let mut interpreter = Interpreter::new();
    interpreter.interpret(ast)?;
    Ok(interpreter.into_environment())
}
