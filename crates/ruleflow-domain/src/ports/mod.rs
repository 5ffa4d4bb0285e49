//! Domain ports
//!
//! Contracts implemented outside the domain layer. The action port is
//! the engine's extension seam: hosts contribute new action types by
//! implementing [`ActionProvider`] and registering it at build time.

pub mod action;

pub use action::{Action, ActionProvider, ActionResult, SharedAction, SharedActionProvider};
