use nacre_core::{Text, Value};

use super::common::*;
use super::MethodKind;
use crate::runtime::Runtime;

pub(super) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    kind: MethodKind,
    args: &[Value],
    method: &str,
) -> Result<Value, String> {
    match kind {
        MethodKind::Len => {
            validate_arity(method, args.len(), 0, 0)?;
            let s = expect_str(rt, recv)?;
            Ok(Value::from_i64(s.char_count() as i64))
        }
        MethodKind::Contains => {
            validate_arity(method, args.len(), 1, 1)?;
            let needle = expect_str(rt, args[0])?.as_str().to_string();
            let s = expect_str(rt, recv)?;
            Ok(Value::from_bool(s.as_str().contains(&needle)))
        }
        MethodKind::NumAdd => {
            // string concatenation
            validate_arity(method, args.len(), 1, 1)?;
            let other = expect_str(rt, args[0])?.clone();
            let s = expect_str(rt, recv)?;
            let joined = Text::concat2(s, &other);
            Ok(rt.new_str_text(joined))
        }
        MethodKind::ToString => {
            validate_arity(method, args.len(), 0, 0)?;
            Ok(recv)
        }
        _ => Err(format!("string: unsupported method {}", method)),
    }
}
