//! Abstract syntax tree for the expression language

use ruleflow_domain::Value;

/// Binary operators, in source form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Source text of the operator, for diagnostics
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation `!`
    Not,
    /// Arithmetic negation `-`
    Neg,
}

/// One expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// Variable reference resolved against locals then the context
    Variable(String),
    /// Member access `object.field`
    Member {
        object: Box<Expr>,
        field: String,
    },
    /// Indexed access `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Prefix operator application
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Infix operator application
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `condition ? then : else`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Method call `object.method(args)`; calls on the `util` namespace
    /// take this form with `object = Variable("util")`
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
}

/// One statement of a multi-statement script
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement; the last one evaluated is the script value
    Expr(Expr),
    /// Script-local assignment `name = expr`
    Assign {
        name: String,
        value: Expr,
    },
    /// `for (var : iterable) { body }`
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
}

/// A compiled source: a single expression or a statement script
#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    /// Single-expression form (cacheable)
    Expression(Expr),
    /// Multi-statement form with a final-expression return
    Script(Vec<Stmt>),
}
