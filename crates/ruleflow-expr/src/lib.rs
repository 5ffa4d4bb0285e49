//! Expression subsystem for the ruleflow rule workflow engine
//!
//! A small embedded expression language evaluated against the execution
//! context: literals, variable references, member and indexed access,
//! arithmetic, comparison and logical operators, the ternary operator,
//! an allowlisted set of value methods, and the `util` function
//! namespace. Sources containing `;` or a `for (` loop are treated as
//! multi-statement scripts with assignment, loops, and a
//! final-expression return.
//!
//! The pipeline is a hand-written lexer, a binding-power (Pratt)
//! parser, and a tree-walking interpreter. Expression execution cannot
//! reach host-process mutators: method dispatch goes through a fixed
//! built-in table and `util` is the only provided namespace.
//!
//! Single expressions are compiled once and cached process-wide;
//! scripts are parsed per call.
//!
//! # Example
//!
//! ```ignore
//! use ruleflow_domain::ExecutionContext;
//! use ruleflow_expr::ExpressionEvaluator;
//!
//! let evaluator = ExpressionEvaluator::new();
//! let ctx = ExecutionContext::new().with_variable("amount", 150);
//! let discounted = evaluator.evaluate("amount * 0.9", &ctx)?;
//! let eligible = evaluator.evaluate_boolean("amount > 100", &ctx)?;
//! ```

pub mod ast;
pub mod cache;
pub mod evaluator;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod util_fns;

pub use ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
pub use cache::ExpressionCache;
pub use evaluator::{CompiledExpression, ExpressionEvaluator};
