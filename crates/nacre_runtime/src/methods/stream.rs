use nacre_core::Value;

use super::common::{expect_str, validate_arity};
use super::MethodKind;
use crate::runtime::Runtime;

pub(super) fn dispatch(
    rt: &mut Runtime,
    recv: Value,
    kind: MethodKind,
    args: &[Value],
    method: &str,
) -> Result<Value, String> {
    let fd = recv.as_i64();
    match kind {
        MethodKind::StreamRead => {
            validate_arity(method, args.len(), 0, 0)?;
            let content = rt.io.read_to_string(fd)?;
            Ok(rt.new_str(&content))
        }
        MethodKind::StreamWrite => {
            validate_arity(method, args.len(), 1, 1)?;
            let data = expect_str(rt, args[0])?.as_str().to_string();
            let written = rt.io.write(fd, data.as_bytes())?;
            Ok(Value::from_i64(written as i64))
        }
        MethodKind::StreamClose => {
            validate_arity(method, args.len(), 0, 0)?;
            rt.io.close(fd)?;
            Ok(Value::NIL)
        }
        _ => Err(format!("stream: unsupported method {}", method)),
    }
}
