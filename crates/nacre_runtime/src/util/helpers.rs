//! Value rendering and comparison helpers.

use nacre_core::value::{
    TAG_BIGINT, TAG_CLASS, TAG_DECIMAL, TAG_DICT, TAG_FUNC, TAG_LIST, TAG_OBJECT, TAG_STR,
    TAG_STREAM,
};
use nacre_core::Value;

use crate::core::heap::ManagedObject;
use crate::runtime::Runtime;

pub trait Appendable {
    fn append_str(&mut self, s: &str);
    fn append_i64(&mut self, i: i64);
    fn append_f64(&mut self, f: f64);
    fn append_bool(&mut self, b: bool);
    fn append_nil(&mut self);
}

impl Appendable for String {
    fn append_str(&mut self, s: &str) {
        self.push_str(s);
    }
    fn append_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.push_str(buf.format(i));
    }
    fn append_f64(&mut self, f: f64) {
        if f.fract() == 0.0 && f.abs() < 1e15 {
            self.append_i64(f as i64);
        } else {
            let mut buf = ryu::Buffer::new();
            self.push_str(buf.format(f));
        }
    }
    fn append_bool(&mut self, b: bool) {
        self.push_str(if b { "true" } else { "false" });
    }
    fn append_nil(&mut self) {
        self.push_str("nil");
    }
}

pub(crate) fn value_to_string(v: Value, rt: &Runtime) -> String {
    let mut out = String::new();
    append_value(&mut out, v, rt);
    out
}

fn append_value(out: &mut String, v: Value, rt: &Runtime) {
    if v.is_int() {
        out.append_i64(v.as_i64());
    } else if v.is_f64() {
        out.append_f64(v.as_f64());
    } else if v.is_bool() {
        out.append_bool(v.as_bool());
    } else if v.is_nil() {
        out.append_nil();
    } else {
        match v.get_tag() {
            TAG_STR => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::Str(s) => out.append_str(s.as_str()),
                _ => out.append_str("<str?>"),
            },
            TAG_LIST => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::List(items) => {
                    out.append_str("[");
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.append_str(", ");
                        }
                        append_value(out, *item, rt);
                    }
                    out.append_str("]");
                }
                _ => out.append_str("<list?>"),
            },
            TAG_DICT => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::Dict(dict) => {
                    out.append_str("{");
                    let mut first = true;
                    dict.visit(|k, val| {
                        if !first {
                            out.append_str(", ");
                        }
                        first = false;
                        out.append_str(&k.to_string());
                        out.append_str(": ");
                        append_value(out, val, rt);
                        nacre_core::Visit::Continue
                    });
                    out.append_str("}");
                }
                _ => out.append_str("<dict?>"),
            },
            TAG_BIGINT => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::BigInt(b) => out.append_str(&b.to_decimal_string()),
                _ => out.append_str("<bigint?>"),
            },
            TAG_DECIMAL => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::Decimal(d) => out.append_str(&d.to_decimal_string()),
                _ => out.append_str("<decimal?>"),
            },
            TAG_STREAM => {
                out.append_str("<stream fd=");
                out.append_i64(v.as_i64());
                out.append_str(">");
            }
            TAG_OBJECT => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::Object(inst) => {
                    let name = match rt.heap.get(inst.class) {
                        ManagedObject::Class(c) => c.name.clone(),
                        _ => "?".to_string(),
                    };
                    out.append_str("<");
                    out.append_str(&name);
                    out.append_str(">");
                }
                _ => out.append_str("<object?>"),
            },
            TAG_CLASS => match rt.heap.get(v.as_obj_id()) {
                ManagedObject::Class(c) => {
                    out.append_str("<class ");
                    out.append_str(&c.name);
                    out.append_str(">");
                }
                _ => out.append_str("<class?>"),
            },
            TAG_FUNC => out.append_str("<function>"),
            _ => out.append_str("<unknown>"),
        }
    }
}

/// Structural equality for primitives and strings; identity for everything
/// else.
pub(crate) fn values_equal(rt: &Runtime, a: Value, b: Value) -> bool {
    if a == b {
        return true;
    }
    if a.get_tag() == TAG_STR && b.get_tag() == TAG_STR {
        let (sa, sb) = (rt.heap.get(a.as_obj_id()), rt.heap.get(b.as_obj_id()));
        if let (ManagedObject::Str(sa), ManagedObject::Str(sb)) = (sa, sb) {
            return sa.as_str() == sb.as_str();
        }
    }
    if a.is_int() && b.is_f64() {
        return a.as_i64() as f64 == b.as_f64();
    }
    if a.is_f64() && b.is_int() {
        return a.as_f64() == b.as_i64() as f64;
    }
    false
}
