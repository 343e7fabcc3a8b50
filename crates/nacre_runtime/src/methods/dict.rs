//! Dict methods: the language binding over the ordered table engine.

use smallvec::SmallVec;

use nacre_core::{Value, Visit};

use super::common::*;
use super::MethodKind;
use crate::errors::messages::KEY_NOT_FOUND;
use crate::runtime::Runtime;

pub(super) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    kind: MethodKind,
    args: &[Value],
    method: &str,
) -> Result<Value, String> {
    match kind {
        MethodKind::DictInsert => {
            validate_arity(method, args.len(), 2, 2)?;
            let key = get_dict_key(rt, &args[0])?;
            let dict = expect_dict_rc(rt, recv)?;
            dict.insert(key, args[1]);
            Ok(Value::NIL)
        }
        MethodKind::DictGet => {
            validate_arity(method, args.len(), 1, 1)?;
            let key = get_dict_key(rt, &args[0])?;
            let dict = expect_dict(rt, recv)?;
            // lookup miss is not an error on this path
            Ok(dict.get(&key).unwrap_or(Value::NIL))
        }
        MethodKind::DictFetch => {
            // fetch(key), fetch(key, default) or fetch(key, producer)
            validate_arity(method, args.len(), 1, 2)?;
            let key = get_dict_key(rt, &args[0])?;
            let found = expect_dict(rt, recv)?.get(&key);
            if let Some(v) = found {
                return Ok(v);
            }
            // default-value policy layers strictly on the lookup miss
            match args.get(1) {
                Some(default) if default.get_tag() == nacre_core::value::TAG_FUNC => {
                    let mut call_args: SmallVec<[Value; 4]> = SmallVec::new();
                    call_args.push(args[0]);
                    rt.call_function(*default, &call_args)
                }
                Some(default) => Ok(*default),
                None => Err(KEY_NOT_FOUND.to_string()),
            }
        }
        MethodKind::DictHas | MethodKind::Contains => {
            validate_arity(method, args.len(), 1, 1)?;
            let key = get_dict_key(rt, &args[0])?;
            let dict = expect_dict(rt, recv)?;
            Ok(Value::from_bool(dict.contains_key(&key)))
        }
        MethodKind::Remove => {
            validate_arity(method, args.len(), 1, 1)?;
            let key = get_dict_key(rt, &args[0])?;
            let dict = expect_dict(rt, recv)?;
            Ok(dict.remove(&key).unwrap_or(Value::NIL))
        }
        MethodKind::Len => {
            validate_arity(method, args.len(), 0, 0)?;
            let dict = expect_dict(rt, recv)?;
            Ok(Value::from_i64(dict.len() as i64))
        }
        MethodKind::Clear => {
            validate_arity(method, args.len(), 0, 0)?;
            let dict = expect_dict(rt, recv)?;
            dict.clear();
            Ok(Value::NIL)
        }
        MethodKind::DictKeys => {
            validate_arity(method, args.len(), 0, 0)?;
            let keys = expect_dict(rt, recv)?.keys().collect::<Vec<_>>();
            let items = keys
                .iter()
                .map(|k| dict_key_to_value(rt, k))
                .collect::<Vec<_>>();
            Ok(rt.new_list(items))
        }
        MethodKind::DictValues => {
            validate_arity(method, args.len(), 0, 0)?;
            let values = expect_dict(rt, recv)?.values().collect::<Vec<_>>();
            Ok(rt.new_list(values))
        }
        MethodKind::DictItems => {
            validate_arity(method, args.len(), 0, 0)?;
            let entries = expect_dict(rt, recv)?.entries();
            let mut items = Vec::with_capacity(entries.len());
            for (k, v) in &entries {
                let key = dict_key_to_value(rt, k);
                items.push(rt.new_list(vec![key, *v]));
            }
            Ok(rt.new_list(items))
        }
        MethodKind::DictEach => {
            validate_arity(method, args.len(), 1, 1)?;
            let f = args[0];
            expect_function(rt, f)?;
            let dict = expect_dict_rc(rt, recv)?;
            // the callback may re-enter the runtime and mutate this dict;
            // the walk self-heals through the order ring
            dict.try_visit(|k, v| {
                let key = dict_key_to_value(rt, k);
                let mut call_args: SmallVec<[Value; 4]> = SmallVec::new();
                call_args.push(key);
                call_args.push(v);
                rt.call_function(f, &call_args)?;
                Ok::<Visit, String>(Visit::Continue)
            })?;
            Ok(Value::NIL)
        }
        MethodKind::DictMerge => {
            validate_arity(method, args.len(), 1, 1)?;
            let entries = expect_dict_rc(rt, args[0])?.entries();
            let dict = expect_dict_rc(rt, recv)?;
            for (k, v) in entries {
                dict.insert(k, v);
            }
            Ok(Value::NIL)
        }
        MethodKind::DictDup => {
            validate_arity(method, args.len(), 0, 0)?;
            let copy = expect_dict(rt, recv)?.duplicate();
            Ok(rt.new_dict_from(copy))
        }
        MethodKind::DictRehash => {
            validate_arity(method, args.len(), 0, 0)?;
            let dict = expect_dict(rt, recv)?;
            dict.rehash().map_err(|e| e.message().to_string())?;
            Ok(Value::NIL)
        }
        MethodKind::DictCompareByIdentity => {
            validate_arity(method, args.len(), 0, 0)?;
            let dict = expect_dict(rt, recv)?;
            dict.compare_by_identity();
            Ok(recv)
        }
        MethodKind::ToString => {
            validate_arity(method, args.len(), 0, 0)?;
            let rendered = crate::util::helpers::value_to_string(recv, rt);
            Ok(rt.new_str(&rendered))
        }
        _ => Err(format!("dict: unsupported method {}", method)),
    }
}
