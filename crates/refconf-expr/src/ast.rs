//! Expression syntax tree

use serde_json::Value;

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number, string, boolean or null literal
    Literal(Value),
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `{"key": value}`
    Map(Vec<(Expr, Expr)>),
    /// A bare identifier. There are no variables, so evaluating one is
    /// always an error; it exists to report *which* name was used.
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `condition ? then : otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `f(a, b)`; method syntax `a.f(b)` parses to the same node.
    Call { function: String, args: Vec<Expr> },
    /// `target[index]`
    Index { target: Box<Expr>, index: Box<Expr> },
    /// `target.name` on a mapping
    Member { target: Box<Expr>, name: String },
}

impl Expr {
    /// Number of nodes on the longest root-to-leaf path. Computed without
    /// recursion.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Expr, usize)> = vec![(self, 1)];
        while let Some((expr, level)) = pending.pop() {
            deepest = deepest.max(level);
            let below = level + 1;
            match expr {
                Expr::Literal(_) | Expr::Name(_) => {}
                Expr::List(items) | Expr::Call { args: items, .. } => {
                    pending.extend(items.iter().map(|item| (item, below)));
                }
                Expr::Map(entries) => {
                    for (key, value) in entries {
                        pending.push((key, below));
                        pending.push((value, below));
                    }
                }
                Expr::Unary { operand, .. } => pending.push((operand, below)),
                Expr::Binary { left, right, .. } => {
                    pending.push((left, below));
                    pending.push((right, below));
                }
                Expr::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    pending.push((condition, below));
                    pending.push((then, below));
                    pending.push((otherwise, below));
                }
                Expr::Index { target, index } => {
                    pending.push((target, below));
                    pending.push((index, below));
                }
                Expr::Member { target, .. } => pending.push((target, below)),
            }
        }
        deepest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}
