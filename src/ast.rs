//! Abstract syntax tree.
//!
//! Nodes live in a single arena owned by [`Ast`] and refer to their children by
//! [`NodeId`]. A tree of any depth is released in one pass when the arena's
//! backing vector is dropped, without recursing through the nodes.

use std::fmt;
use std::ops::Index;

/// Typed index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Integer,
    Real,
}

const TYPE_NAMES: [(TypeSpec, &str); 2] = [(TypeSpec::Integer, "INTEGER"), (TypeSpec::Real, "REAL")];

impl TypeSpec {
    pub fn name(self) -> &'static str {
        TYPE_NAMES
            .iter()
            .find(|(spec, _)| *spec == self)
            .map(|(_, name)| *name)
            .unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    /// `/`, always produces a real.
    FloatDiv,
    /// `DIV`, truncating integer division.
    IntegerDiv,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::FloatDiv => "/",
            BinaryOperator::IntegerDiv => "DIV",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Program {
        name: String,
        block: NodeId,
    },
    Block {
        declarations: Vec<NodeId>,
        compound_statement: NodeId,
    },
    VarDecl {
        var: String,
        type_spec: NodeId,
    },
    Type(TypeSpec),
    Compound {
        children: Vec<NodeId>,
    },
    Assign {
        var: String,
        expr: NodeId,
    },
    BinOp {
        left: NodeId,
        op: BinaryOperator,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: NodeId,
    },
    Var(String),
    Integer(i64),
    Real(f64),
    NoOp,
}

impl AstNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNode::Program { .. } => "PROGRAM",
            AstNode::Block { .. } => "BLOCK",
            AstNode::VarDecl { .. } => "VARIABLE_DECLARATION",
            AstNode::Type(_) => "TYPE",
            AstNode::Compound { .. } => "COMPOUND_STATEMENT",
            AstNode::Assign { .. } => "ASSIGNMENT_STATEMENT",
            AstNode::BinOp { .. } => "BINARY_OPERATOR",
            AstNode::UnaryOp { .. } => "UNARY_OPERATOR",
            AstNode::Var(_) => "VARIABLE",
            AstNode::Integer(_) => "INT_NUM",
            AstNode::Real(_) => "REAL_NUM",
            AstNode::NoOp => "NO_OPERATION",
        }
    }

    /// Child ids in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            AstNode::Program { block, .. } => vec![*block],
            AstNode::Block {
                declarations,
                compound_statement,
            } => declarations
                .iter()
                .copied()
                .chain(std::iter::once(*compound_statement))
                .collect(),
            AstNode::VarDecl { type_spec, .. } => vec![*type_spec],
            AstNode::Compound { children } => children.clone(),
            AstNode::Assign { expr, .. } | AstNode::UnaryOp { expr, .. } => vec![*expr],
            AstNode::BinOp { left, right, .. } => vec![*left, *right],
            AstNode::Type(_)
            | AstNode::Var(_)
            | AstNode::Integer(_)
            | AstNode::Real(_)
            | AstNode::NoOp => Vec::new(),
        }
    }
}

/// Append-only node storage used while a tree is being built.
#[derive(Debug, Default)]
pub(crate) struct AstBuilder {
    nodes: Vec<AstNode>,
    // height of the subtree rooted at each node; leaves are 1
    heights: Vec<usize>,
}

impl AstBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: AstNode) -> NodeId {
        let height = node
            .children()
            .into_iter()
            .map(|child| self.height(child))
            .max()
            .unwrap_or(0)
            + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.heights.push(height);
        id
    }

    pub(crate) fn height(&self, id: NodeId) -> usize {
        self.heights.get(id.as_usize()).copied().unwrap_or(0)
    }

    /// Seals the arena. `root` must be a `Program` node pushed into this builder.
    pub(crate) fn finish(self, root: NodeId) -> Ast {
        debug_assert!(matches!(
            self.nodes.get(root.as_usize()),
            Some(AstNode::Program { .. })
        ));
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}

/// A parsed program. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: NodeId,
}

impl Ast {
    /// The `Program` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn program_name(&self) -> &str {
        match &self[self.root] {
            AstNode::Program { name, .. } => name,
            _ => "",
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.as_usize())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in construction order; children always precede their parent.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AstNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Children of `id` in evaluation order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self[id].children()
    }

    /// Indented outline of the tree, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self[id];
            out.push_str(&"  ".repeat(depth));
            out.push_str(node.kind_name());
            match node {
                AstNode::Program { name, .. } => out.push_str(&format!(" {name}")),
                AstNode::VarDecl { var, .. } | AstNode::Assign { var, .. } => {
                    out.push_str(&format!(" {var}"))
                }
                AstNode::Var(name) => out.push_str(&format!(" {name}")),
                AstNode::Type(spec) => out.push_str(&format!(" {spec}")),
                AstNode::BinOp { op, .. } => out.push_str(&format!(" {}", op.symbol())),
                AstNode::UnaryOp { op, .. } => out.push_str(&format!(" {}", op.symbol())),
                AstNode::Integer(value) => out.push_str(&format!(" {value}")),
                AstNode::Real(value) => out.push_str(&format!(" {value}")),
                AstNode::Block { .. } | AstNode::Compound { .. } | AstNode::NoOp => {}
            }
            out.push('\n');
            for child in self.children(id).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

impl Index<NodeId> for Ast {
    type Output = AstNode;

    #[inline]
    fn index(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.as_usize()]
    }
}
