use nacre_core::Value;
use nacre_core::value::{TAG_BIGINT, TAG_DECIMAL, TAG_DICT, TAG_LIST, TAG_OBJECT, TAG_STR, TAG_STREAM};

use crate::errors::messages::UNKNOWN_METHOD;
use crate::object;
use crate::runtime::Runtime;

pub(crate) mod common;
mod dict;
mod list;
mod num;
mod str;
mod stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodKind {
    DictInsert,
    DictGet,
    DictFetch,
    DictHas,
    DictKeys,
    DictValues,
    DictItems,
    DictEach,
    DictMerge,
    DictDup,
    DictRehash,
    DictCompareByIdentity,
    ListPush,
    ListGet,
    NumAdd,
    NumSub,
    NumMul,
    NumDiv,
    NumCmp,
    StreamRead,
    StreamWrite,
    StreamClose,
    Len,
    Contains,
    Clear,
    Remove,
    ToString,
    Unknown,
}

impl MethodKind {
    pub(crate) fn from_str(s: &str) -> Self {
        match s {
            "insert" => Self::DictInsert,
            "get" => Self::DictGet,
            "fetch" => Self::DictFetch,
            "has" => Self::DictHas,
            "keys" => Self::DictKeys,
            "values" => Self::DictValues,
            "items" => Self::DictItems,
            "each" => Self::DictEach,
            "merge" => Self::DictMerge,
            "dup" => Self::DictDup,
            "rehash" => Self::DictRehash,
            "compare_by_identity" => Self::DictCompareByIdentity,
            "push" => Self::ListPush,
            "add" => Self::NumAdd,
            "sub" => Self::NumSub,
            "mul" => Self::NumMul,
            "div" => Self::NumDiv,
            "cmp" => Self::NumCmp,
            "read" => Self::StreamRead,
            "write" => Self::StreamWrite,
            "close" => Self::StreamClose,
            "length" => Self::Len,
            "contains" => Self::Contains,
            "clear" => Self::Clear,
            "remove" => Self::Remove,
            "to_string" => Self::ToString,
            _ => Self::Unknown,
        }
    }
}

/// Dispatch a method call on any receiver.
pub(crate) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    method: &str,
    args: &[Value],
) -> Result<Value, String> {
    if recv.is_int() || recv.is_f64() {
        return num::dispatch(rt, recv, MethodKind::from_str(method), args, method);
    }
    let kind = MethodKind::from_str(method);
    match recv.get_tag() {
        TAG_DICT => {
            let kind = match kind {
                MethodKind::ListGet => MethodKind::DictGet,
                _ => kind,
            };
            dict::dispatch(rt, recv, kind, args, method)
        }
        TAG_LIST => {
            let kind = match kind {
                MethodKind::DictGet => MethodKind::ListGet,
                _ => kind,
            };
            list::dispatch(rt, recv, kind, args, method)
        }
        TAG_STR => str::dispatch(rt, recv, kind, args, method),
        TAG_BIGINT | TAG_DECIMAL => num::dispatch(rt, recv, kind, args, method),
        TAG_STREAM => stream::dispatch(rt, recv, kind, args, method),
        TAG_OBJECT => object::send_object(rt, recv, method, args),
        _ => Err(format!(
            "{} for receiver type {}: {}",
            UNKNOWN_METHOD,
            recv.type_name(),
            method
        )),
    }
}
