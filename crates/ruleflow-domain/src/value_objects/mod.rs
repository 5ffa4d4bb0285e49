//! Value objects for the rule workflow engine

pub mod value;

pub use value::{FromValue, Value};
