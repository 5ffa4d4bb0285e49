//! Executor for the ruleflow rule workflow engine
//!
//! Owns the traversal state machine: starting from the entry point it
//! runs each rule's actions against the context, binds their outputs,
//! evaluates transition guards in descending-priority order, and stops
//! on a terminal rule, a rule with no matching transition, or a
//! failure. A wall-clock timeout bounds the whole traversal and a depth
//! limit bounds the number of rule entries.
//!
//! The crate also carries the glue around the executor: the
//! [`ExecutorBuilder`] that assembles it from a parsed configuration
//! (validating on startup by default), the [`ConfigLoader`] for JSON
//! documents, and the [`ExecutionTrace`] aggregation.
//!
//! # Example
//!
//! ```ignore
//! use ruleflow_domain::ExecutionContext;
//! use ruleflow_engine::{ConfigLoader, ExecutorBuilder};
//!
//! let config = ConfigLoader::from_str(json)?;
//! let executor = ExecutorBuilder::new(config).build()?;
//! let mut ctx = ExecutionContext::new().with_variable("age", 25);
//! let result = executor.execute(&mut ctx).await;
//! assert!(result.success);
//! ```

pub mod builder;
pub mod executor;
pub mod loader;
pub mod trace;

pub use builder::ExecutorBuilder;
pub use executor::{ExecutionResult, RuleExecutor};
pub use loader::ConfigLoader;
pub use trace::{ExecutionTrace, VariableSnapshot};
