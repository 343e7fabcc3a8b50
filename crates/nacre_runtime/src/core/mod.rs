//! Core runtime state: heap and the table alias used across the runtime.

pub mod heap;

use nacre_core::collections::OrderedTable;
use nacre_core::{DictKey, Value};

/// The table type behind dicts, instance-variable tables, constant tables
/// and the global-variable table.
pub type RtTable = OrderedTable<DictKey, Value>;
