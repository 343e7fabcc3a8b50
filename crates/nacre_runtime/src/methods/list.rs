use nacre_core::Value;

use super::common::*;
use super::MethodKind;
use crate::errors::messages::INDEX_OUT_OF_BOUNDS;
use crate::runtime::Runtime;
use crate::util::helpers::values_equal;

pub(super) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    kind: MethodKind,
    args: &[Value],
    method: &str,
) -> Result<Value, String> {
    match kind {
        MethodKind::ListPush => {
            validate_arity(method, args.len(), 1, 1)?;
            let list = expect_list_mut(rt, recv)?;
            list.push(args[0]);
            Ok(Value::NIL)
        }
        MethodKind::ListGet => {
            validate_arity(method, args.len(), 1, 1)?;
            if !args[0].is_int() {
                return Err(INDEX_OUT_OF_BOUNDS.to_string());
            }
            let idx = args[0].as_i64();
            let list = expect_list(rt, recv)?;
            usize::try_from(idx)
                .ok()
                .and_then(|i| list.get(i).copied())
                .ok_or_else(|| INDEX_OUT_OF_BOUNDS.to_string())
        }
        MethodKind::Len => {
            validate_arity(method, args.len(), 0, 0)?;
            let list = expect_list(rt, recv)?;
            Ok(Value::from_i64(list.len() as i64))
        }
        MethodKind::Contains => {
            validate_arity(method, args.len(), 1, 1)?;
            let list = expect_list(rt, recv)?.clone();
            let found = list.iter().any(|v| values_equal(rt, *v, args[0]));
            Ok(Value::from_bool(found))
        }
        MethodKind::Clear => {
            validate_arity(method, args.len(), 0, 0)?;
            let list = expect_list_mut(rt, recv)?;
            list.clear();
            Ok(Value::NIL)
        }
        MethodKind::ToString => {
            validate_arity(method, args.len(), 0, 0)?;
            let rendered = crate::util::helpers::value_to_string(recv, rt);
            Ok(rt.new_str(&rendered))
        }
        _ => Err(format!("list: unsupported method {}", method)),
    }
}
