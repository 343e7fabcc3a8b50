//! Shared helpers for the method-binding layer: arity checks and typed
//! access to heap objects.

use std::rc::Rc;

use nacre_core::{DictKey, Text, Value};

use crate::core::RtTable;
use crate::core::heap::ManagedObject;
use crate::errors::messages::{
    NOT_A_CLASS, NOT_A_DICT, NOT_A_FUNCTION, NOT_A_LIST, NOT_A_STRING, NOT_AN_OBJECT,
    UNHASHABLE_KEY,
};
use crate::object::{ClassDef, Function, ObjectInstance};
use crate::runtime::Runtime;

pub(crate) fn validate_arity(
    method: &str,
    args_len: usize,
    min: usize,
    max: usize,
) -> Result<(), String> {
    if args_len < min || args_len > max {
        return Err(format!(
            "{}: expected {}..{} arguments, got {}",
            method, min, max, args_len
        ));
    }
    Ok(())
}

pub(crate) fn expect_dict<'a>(rt: &'a Runtime, value: Value) -> Result<&'a Rc<RtTable>, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::Dict(dict) = obj {
        Ok(dict)
    } else {
        Err(NOT_A_DICT.to_string())
    }
}

/// Clones the dict handle out of the heap so callers can iterate it while
/// re-entering the runtime (the table itself is shared, not copied).
pub(crate) fn expect_dict_rc(rt: &Runtime, value: Value) -> Result<Rc<RtTable>, String> {
    expect_dict(rt, value).cloned()
}

pub(crate) fn expect_list<'a>(rt: &'a Runtime, value: Value) -> Result<&'a Vec<Value>, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::List(list) = obj {
        Ok(list)
    } else {
        Err(NOT_A_LIST.to_string())
    }
}

pub(crate) fn expect_list_mut<'a>(
    rt: &'a mut Runtime,
    value: Value,
) -> Result<&'a mut Vec<Value>, String> {
    let obj = rt.heap.get_mut(value.as_obj_id());
    if let ManagedObject::List(list) = obj {
        Ok(list)
    } else {
        Err(NOT_A_LIST.to_string())
    }
}

pub(crate) fn expect_str<'a>(rt: &'a Runtime, value: Value) -> Result<&'a Text, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::Str(s) = obj {
        Ok(s)
    } else {
        Err(NOT_A_STRING.to_string())
    }
}

pub(crate) fn expect_object<'a>(
    rt: &'a Runtime,
    value: Value,
) -> Result<&'a ObjectInstance, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::Object(inst) = obj {
        Ok(inst)
    } else {
        Err(NOT_AN_OBJECT.to_string())
    }
}

pub(crate) fn expect_class<'a>(rt: &'a Runtime, value: Value) -> Result<&'a ClassDef, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::Class(class) = obj {
        Ok(class)
    } else {
        Err(NOT_A_CLASS.to_string())
    }
}

pub(crate) fn expect_function(rt: &Runtime, value: Value) -> Result<&Function, String> {
    let obj = rt.heap.get(value.as_obj_id());
    if let ManagedObject::Function(f) = obj {
        Ok(f)
    } else {
        Err(NOT_A_FUNCTION.to_string())
    }
}

/// Lift a runtime value into a dict key. String keys go through the intern
/// pool so that equal contents share one `Rc` (which is what identity-mode
/// matching compares).
pub(crate) fn get_dict_key(rt: &mut Runtime, value: &Value) -> Result<DictKey, String> {
    if value.is_int() {
        return Ok(DictKey::Int(value.as_i64()));
    }
    if value.get_tag() == nacre_core::value::TAG_STR {
        let content = expect_str(rt, *value)?.as_str().to_string();
        let rc = rt.intern_rc(&content);
        return Ok(DictKey::from_rc(rc));
    }
    Err(UNHASHABLE_KEY.to_string())
}

/// Project a dict key back into a runtime value.
pub(crate) fn dict_key_to_value(rt: &mut Runtime, key: &DictKey) -> Value {
    match key {
        DictKey::Int(i) => Value::from_i64(*i),
        DictKey::Str { data, .. } => rt.new_str(data.as_str()),
    }
}
