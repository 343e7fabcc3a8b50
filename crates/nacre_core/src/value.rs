//! Runtime value representation.
//!
//! Defines the runtime value representation using NaN-boxing for efficient
//! memory usage, plus the compact `DictKey` type stored by dict tables.

use crate::collections::TableKey;
use crate::gc::ObjectId;
use crate::text::Text;
use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Compact dict key representation.
/// Str variant uses pre-computed hash + Rc<String> for memory efficiency.
#[derive(Clone, Debug)]
pub enum DictKey {
    Str { hash: u64, data: Rc<String> },
    Int(i64),
}

impl DictKey {
    pub fn is_str(&self) -> bool {
        matches!(self, DictKey::Str { .. })
    }

    /// Create a new string key with pre-computed hash
    pub fn from_str(s: &str) -> Self {
        let hash = Self::hash_str(s);
        DictKey::Str { hash, data: Rc::new(s.to_string()) }
    }

    /// Create a new string key from Rc<String> with pre-computed hash
    pub fn from_rc(data: Rc<String>) -> Self {
        let hash = Self::hash_str(&data);
        DictKey::Str { hash, data }
    }

    /// Create a new string key from Text
    pub fn from_text(t: &Text) -> Self {
        Self::from_str(t.as_str())
    }

    /// Compute the hash for a string key
    #[inline]
    pub fn hash_str(s: &str) -> u64 {
        let mut hasher = ahash::AHasher::default();
        hasher.write(s.as_bytes());
        hasher.finish()
    }

    /// Get the string content (panics if not a string key)
    pub fn as_str(&self) -> &str {
        match self {
            DictKey::Str { data, .. } => data.as_str(),
            DictKey::Int(_) => panic!("DictKey::as_str called on Int"),
        }
    }
}

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DictKey::Str { hash: h1, data: d1 }, DictKey::Str { hash: h2, data: d2 }) => {
                // Fast path: compare hash first
                if h1 != h2 {
                    return false;
                }
                // Fast path: same Rc pointer means same string
                if Rc::ptr_eq(d1, d2) {
                    return true;
                }
                // Slow path: compare string content (hash collision)
                d1.as_str() == d2.as_str()
            }
            (DictKey::Int(a), DictKey::Int(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DictKey::Str { data, .. } => {
                state.write_u8(0);
                data.as_bytes().hash(state);
            }
            DictKey::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
        }
    }
}

impl TableKey for DictKey {
    fn hash_code(&self) -> u64 {
        match self {
            DictKey::Str { hash, .. } => *hash,
            DictKey::Int(i) => {
                let mut hasher = ahash::AHasher::default();
                hasher.write_u64(*i as u64);
                hasher.finish()
            }
        }
    }

    fn eql(&self, other: &Self) -> bool {
        self == other
    }

    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (DictKey::Str { data: d1, .. }, DictKey::Str { data: d2, .. }) => Rc::ptr_eq(d1, d2),
            (DictKey::Int(a), DictKey::Int(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Str { data, .. } => write!(f, "{}", data),
            DictKey::Int(i) => write!(f, "{}", i),
        }
    }
}

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

pub fn fast_map_with_capacity<K: Eq + Hash, V>(cap: usize) -> FastHashMap<K, V> {
    HashMap::with_capacity_and_hasher(cap, fast_hasher())
}

// NaN-Boxing constants
pub const QNAN: u64 = 0x7ff8000000000000;
pub const TAG_BASE: u64 = 0xfff0000000000000;
pub const TAG_MASK: u64 = 0x000f000000000000;
pub const PAYLOAD_MASK: u64 = 0x0000ffffffffffff;

pub const TAG_INT: u64 = 0x0001;
pub const TAG_BOOL: u64 = 0x0002;
pub const TAG_NIL: u64 = 0x0003;

pub const TAG_STR: u64 = 0x0004;
pub const TAG_LIST: u64 = 0x0005;
pub const TAG_DICT: u64 = 0x0006;
pub const TAG_BIGINT: u64 = 0x0007;
pub const TAG_DECIMAL: u64 = 0x0008;
pub const TAG_STREAM: u64 = 0x0009;
pub const TAG_OBJECT: u64 = 0x000a;
pub const TAG_CLASS: u64 = 0x000b;
pub const TAG_FUNC: u64 = 0x000c;

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Value(u64);

impl Default for Value {
    fn default() -> Self {
        Self::NIL
    }
}

impl Value {
    pub const NIL: Value = Value(TAG_BASE | (TAG_NIL << 48));

    pub fn nil() -> Self {
        Self::NIL
    }

    #[inline(always)]
    pub fn from_f64(f: f64) -> Self {
        // If it's a NaN, we normalize it to a specific NaN pattern to avoid conflict with tags
        if f.is_nan() {
            return Self(QNAN);
        }
        Self(f.to_bits())
    }

    #[inline(always)]
    pub fn from_i64(i: i64) -> Self {
        // Truncate to 48 bits; larger magnitudes are boxed as BigInt by the runtime.
        Self(TAG_BASE | (TAG_INT << 48) | (i as u64 & PAYLOAD_MASK))
    }

    /// Does `i` fit in the 48-bit small-int payload?
    #[inline(always)]
    pub fn fits_small_int(i: i64) -> bool {
        (-(1i64 << 47)..(1i64 << 47)).contains(&i)
    }

    #[inline(always)]
    pub fn from_bool(b: bool) -> Self {
        Self(TAG_BASE | (TAG_BOOL << 48) | (if b { 1 } else { 0 }))
    }

    #[inline(always)]
    fn from_obj(tag: u64, id: ObjectId) -> Self {
        Self(TAG_BASE | (tag << 48) | (id.0 as u64 & PAYLOAD_MASK))
    }

    pub fn str(id: ObjectId) -> Self {
        Self::from_obj(TAG_STR, id)
    }
    pub fn list(id: ObjectId) -> Self {
        Self::from_obj(TAG_LIST, id)
    }
    pub fn dict(id: ObjectId) -> Self {
        Self::from_obj(TAG_DICT, id)
    }
    pub fn bigint(id: ObjectId) -> Self {
        Self::from_obj(TAG_BIGINT, id)
    }
    pub fn decimal(id: ObjectId) -> Self {
        Self::from_obj(TAG_DECIMAL, id)
    }
    pub fn object(id: ObjectId) -> Self {
        Self::from_obj(TAG_OBJECT, id)
    }
    pub fn class(id: ObjectId) -> Self {
        Self::from_obj(TAG_CLASS, id)
    }
    pub fn function(id: ObjectId) -> Self {
        Self::from_obj(TAG_FUNC, id)
    }

    /// Streams carry their registry descriptor in the payload, not a heap id.
    pub fn stream(descriptor: i64) -> Self {
        Self(TAG_BASE | (TAG_STREAM << 48) | (descriptor as u64 & PAYLOAD_MASK))
    }

    #[inline(always)]
    pub fn is_f64(&self) -> bool {
        (self.0 & TAG_BASE) != TAG_BASE
    }
    #[inline(always)]
    pub fn is_int(&self) -> bool {
        (self.0 & 0xffff000000000000) == 0xfff1000000000000
    }
    #[inline(always)]
    pub fn is_bool(&self) -> bool {
        !self.is_f64() && self.get_tag() == TAG_BOOL
    }
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        !self.is_f64() && self.get_tag() == TAG_NIL
    }
    #[inline(always)]
    pub fn is_obj(&self) -> bool {
        !self.is_f64() && self.get_tag() > TAG_NIL
    }

    #[inline(always)]
    pub fn as_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    #[inline(always)]
    pub fn as_i64(&self) -> i64 {
        let val = (self.0 & PAYLOAD_MASK) as i64;
        // Sign extend from 48 bits
        if (val & 0x0000800000000000) != 0 {
            val | -0x0001000000000000
        } else {
            val
        }
    }

    #[inline(always)]
    pub fn as_bool(&self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline(always)]
    pub fn as_obj_id(&self) -> ObjectId {
        ObjectId((self.0 & PAYLOAD_MASK) as usize)
    }

    pub fn get_tag(&self) -> u64 {
        if self.is_f64() {
            0
        } else {
            (self.0 & TAG_MASK) >> 48
        }
    }

    pub fn type_name(&self) -> &'static str {
        if self.is_f64() {
            "float"
        } else if self.is_int() {
            "int"
        } else if self.is_bool() {
            "bool"
        } else if self.is_nil() {
            "nil"
        } else {
            match self.get_tag() {
                TAG_STR => "string",
                TAG_LIST => "list",
                TAG_DICT => "dict",
                TAG_BIGINT => "bigint",
                TAG_DECIMAL => "decimal",
                TAG_STREAM => "stream",
                TAG_OBJECT => "object",
                TAG_CLASS => "class",
                TAG_FUNC => "function",
                _ => "unknown",
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_f64() {
            write!(f, "Float({})", self.as_f64())
        } else if self.is_int() {
            write!(f, "Int({})", self.as_i64())
        } else if self.is_bool() {
            write!(f, "Bool({})", self.as_bool())
        } else if self.is_nil() {
            write!(f, "Nil")
        } else {
            let tag = self.get_tag();
            let id = self.as_obj_id();
            match tag {
                TAG_STR => write!(f, "Str(id={:?})", id),
                TAG_LIST => write!(f, "List(id={:?})", id),
                TAG_DICT => write!(f, "Dict(id={:?})", id),
                TAG_BIGINT => write!(f, "BigInt(id={:?})", id),
                TAG_DECIMAL => write!(f, "Decimal(id={:?})", id),
                TAG_STREAM => write!(f, "Stream(fd={})", self.as_i64()),
                TAG_OBJECT => write!(f, "Object(id={:?})", id),
                TAG_CLASS => write!(f, "Class(id={:?})", id),
                TAG_FUNC => write!(f, "Function(id={:?})", id),
                _ => write!(f, "Unknown(tag={}, id={:?})", tag, id),
            }
        }
    }
}
