//! Action providers for the ruleflow rule workflow engine
//!
//! Holds the [`ActionRegistry`] that dispatches action definitions to
//! providers by descending priority, and the built-in providers:
//!
//! - **Script** (`SCRIPT`): evaluates a configured expression against
//!   the context and returns its value.
//! - **Noop** (`NOOP`): succeeds with no payload; useful for wiring
//!   tests and as the minimal provider example.
//!
//! Hosts contribute further action types by implementing
//! [`ruleflow_domain::ActionProvider`] and registering them at build
//! time.

pub mod noop;
pub mod registry;
pub mod script;

pub use noop::NoopActionProvider;
pub use registry::ActionRegistry;
pub use script::ScriptActionProvider;
