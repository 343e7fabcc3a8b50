//! Nacre language runtime.
//!
//! A single [`Runtime`] instance owns the heap, the global-variable table,
//! the class registry, the I/O stream registry and the capability providers.
//! Everything is passed the runtime context explicitly; there is no static
//! runtime state. The dict type (and the instance-variable, constant and
//! global tables behind the object model) is backed by
//! [`nacre_core::OrderedTable`], the insertion-order-preserving hash engine.

#![allow(clippy::new_without_default)]
#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod errors;
pub mod io;
pub mod numeric;
pub mod object;

mod builtins;
pub mod builtins_registry;
mod methods;
mod runtime;
mod util;

// Re-exports from nacre_core
pub use nacre_core::collections::{OrderedTable, TableError, Visit};
pub use nacre_core::{DictKey, ObjectId, Text, Value};

// Re-exports from core/
pub use crate::core::RtTable;
pub use crate::core::heap::{Heap, ManagedObject};

// Re-exports from other modules
pub use builtins_registry::{BuiltinFn, BuiltinProvider, BuiltinRegistry, StdBuiltinProvider};
pub use io::{FileStream, IoRegistry, MemoryStream, Stream};
pub use object::{ClassDef, Function, MethodFn, ObjectInstance};
pub use util::{Capabilities, Clock, RngAlgorithm};

// Runtime structs and enums
pub use runtime::Runtime;
pub use runtime::RuntimeConfig;
pub use runtime::ShutdownReport;
