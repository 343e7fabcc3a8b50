//! Common error message constants used throughout the runtime.

pub mod messages {
    pub const NOT_A_DICT: &str = "Not a dict";
    pub const NOT_A_LIST: &str = "Not a list";
    pub const NOT_A_STRING: &str = "Not a string";
    pub const NOT_A_NUMBER: &str = "Not a number";
    pub const NOT_A_FUNCTION: &str = "Not a function";
    pub const NOT_A_STREAM: &str = "Not a stream";
    pub const NOT_AN_OBJECT: &str = "Not an object";
    pub const NOT_A_CLASS: &str = "Not a class";
    pub const KEY_NOT_FOUND: &str = "Key not found";
    pub const INDEX_OUT_OF_BOUNDS: &str = "Index out of bounds";
    pub const DIVISION_BY_ZERO: &str = "Division by zero";
    pub const INVALID_ARGUMENT: &str = "Invalid argument";
    pub const TYPE_MISMATCH: &str = "Type mismatch";
    pub const UNHASHABLE_KEY: &str = "Key is not hashable";
    pub const UNKNOWN_METHOD: &str = "Unknown method";
    pub const UNKNOWN_GLOBAL: &str = "Unknown global";
    pub const UNKNOWN_DESCRIPTOR: &str = "Unknown stream descriptor";
    pub const STREAM_CLOSED: &str = "Stream is closed";
    pub const RUNTIME_SHUT_DOWN: &str = "Runtime already shut down";
}
