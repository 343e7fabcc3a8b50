use std::cmp::Ordering;

use nacre_core::Value;

use super::common::validate_arity;
use super::MethodKind;
use crate::numeric;
use crate::runtime::Runtime;

pub(super) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    kind: MethodKind,
    args: &[Value],
    method: &str,
) -> Result<Value, String> {
    match kind {
        MethodKind::NumAdd => {
            validate_arity(method, args.len(), 1, 1)?;
            numeric::num_add(rt, recv, args[0])
        }
        MethodKind::NumSub => {
            validate_arity(method, args.len(), 1, 1)?;
            numeric::num_sub(rt, recv, args[0])
        }
        MethodKind::NumMul => {
            validate_arity(method, args.len(), 1, 1)?;
            numeric::num_mul(rt, recv, args[0])
        }
        MethodKind::NumDiv => {
            validate_arity(method, args.len(), 1, 1)?;
            numeric::num_div(rt, recv, args[0])
        }
        MethodKind::NumCmp => {
            validate_arity(method, args.len(), 1, 1)?;
            let ord = numeric::num_cmp(rt, recv, args[0])?;
            Ok(Value::from_i64(match ord {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            }))
        }
        MethodKind::ToString => {
            validate_arity(method, args.len(), 0, 0)?;
            let rendered = crate::util::helpers::value_to_string(recv, rt);
            Ok(rt.new_str(&rendered))
        }
        _ => Err(format!("number: unsupported method {}", method)),
    }
}
