//! Runtime module - the per-process runtime context.
//!
//! One `Runtime` instance coordinates the heap, the global table, classes,
//! I/O and capabilities. It is always passed explicitly; nothing here is
//! reachable through static state.

mod config;
mod core;

pub use config::{RuntimeConfig, ShutdownReport};
pub use self::core::Runtime;
