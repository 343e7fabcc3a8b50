//! Free functions installed into the global table at bootstrap.

use nacre_core::Value;
use nacre_core::value::{TAG_DICT, TAG_LIST, TAG_STR};

use crate::core::heap::ManagedObject;
use crate::errors::messages::INVALID_ARGUMENT;
use crate::io::{FileStream, MemoryStream};
use crate::runtime::Runtime;
use crate::util::helpers::value_to_string;

pub(crate) fn builtin_print(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&value_to_string(*arg, rt));
    }
    line.push('\n');
    rt.print_str(&line);
    Ok(Value::NIL)
}

pub(crate) fn builtin_len(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(INVALID_ARGUMENT.to_string());
    }
    let v = args[0];
    let len = match v.get_tag() {
        TAG_STR => match rt.heap.get(v.as_obj_id()) {
            ManagedObject::Str(s) => s.char_count(),
            _ => return Err(INVALID_ARGUMENT.to_string()),
        },
        TAG_LIST => match rt.heap.get(v.as_obj_id()) {
            ManagedObject::List(items) => items.len(),
            _ => return Err(INVALID_ARGUMENT.to_string()),
        },
        TAG_DICT => match rt.heap.get(v.as_obj_id()) {
            ManagedObject::Dict(dict) => dict.len(),
            _ => return Err(INVALID_ARGUMENT.to_string()),
        },
        _ => return Err(INVALID_ARGUMENT.to_string()),
    };
    Ok(Value::from_i64(len as i64))
}

pub(crate) fn builtin_type_of(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(INVALID_ARGUMENT.to_string());
    }
    Ok(rt.new_str(args[0].type_name()))
}

pub(crate) fn builtin_to_text(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(INVALID_ARGUMENT.to_string());
    }
    let rendered = value_to_string(args[0], rt);
    Ok(rt.new_str(&rendered))
}

pub(crate) fn builtin_dict_new(rt: &mut Runtime, _args: &[Value]) -> Result<Value, String> {
    Ok(rt.new_dict())
}

pub(crate) fn builtin_list_new(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    Ok(rt.new_list(args.to_vec()))
}

pub(crate) fn builtin_time_unix(rt: &mut Runtime, _args: &[Value]) -> Result<Value, String> {
    Ok(Value::from_i64(rt.now_unix_secs()))
}

pub(crate) fn builtin_time_millis(rt: &mut Runtime, _args: &[Value]) -> Result<Value, String> {
    Ok(Value::from_i64(rt.now_unix_millis()))
}

pub(crate) fn builtin_rand(rt: &mut Runtime, _args: &[Value]) -> Result<Value, String> {
    let bits = rt.rand_u64() >> 11;
    Ok(Value::from_f64(bits as f64 / (1u64 << 53) as f64))
}

pub(crate) fn builtin_gc(rt: &mut Runtime, _args: &[Value]) -> Result<Value, String> {
    rt.run_gc();
    Ok(Value::NIL)
}

pub(crate) fn builtin_open(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(INVALID_ARGUMENT.to_string());
    }
    let path = crate::methods::common::expect_str(rt, args[0])?
        .as_str()
        .to_string();
    let stream = FileStream::open(&path)?;
    let fd = rt.io.register(Box::new(stream));
    Ok(Value::stream(fd))
}

pub(crate) fn builtin_mem_stream(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    let stream = match args.first() {
        Some(v) => {
            let content = crate::methods::common::expect_str(rt, *v)?
                .as_str()
                .to_string();
            MemoryStream::with_content(&content)
        }
        None => MemoryStream::new(),
    };
    let fd = rt.io.register(Box::new(stream));
    Ok(Value::stream(fd))
}
