//! Bulk export: the whole-table visit in insertion order feeding a
//! serializer. The engine mandates the ordering, not the wire format.

use nacre_runtime::{DictKey, Runtime, Value};
use serde_json::json;

fn export_json(rt: &Runtime, dict: Value) -> serde_json::Value {
    let table = rt.dict_table(dict).unwrap();
    let pairs: Vec<serde_json::Value> = table
        .entries()
        .into_iter()
        .map(|(k, v)| {
            let key = match &k {
                DictKey::Str { data, .. } => json!(data.as_str()),
                DictKey::Int(i) => json!(i),
            };
            let value = if v.is_int() {
                json!(v.as_i64())
            } else if v.is_f64() {
                json!(v.as_f64())
            } else if v.is_bool() {
                json!(v.as_bool())
            } else if v.is_nil() {
                serde_json::Value::Null
            } else {
                json!(rt.str_content(v).unwrap())
            };
            json!([key, value])
        })
        .collect();
    serde_json::Value::Array(pairs)
}

#[test]
fn export_preserves_insertion_order() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for (name, val) in [("z", 26), ("a", 1), ("m", 13)] {
        let key = rt.new_str(name);
        rt.send(dict, "insert", &[key, Value::from_i64(val)]).unwrap();
    }
    let exported = export_json(&rt, dict);
    assert_eq!(
        serde_json::to_string(&exported).unwrap(),
        r#"[["z",26],["a",1],["m",13]]"#
    );
}

#[test]
fn export_round_trips_through_reimport() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for i in [9i64, 4, 7, 1] {
        rt.send(dict, "insert", &[Value::from_i64(i), Value::from_i64(i * i)])
            .unwrap();
    }
    let exported = export_json(&rt, dict);

    // rebuild a fresh dict from the exported pair sequence
    let rebuilt = rt.new_dict();
    for pair in exported.as_array().unwrap() {
        let k = pair[0].as_i64().unwrap();
        let v = pair[1].as_i64().unwrap();
        rt.send(rebuilt, "insert", &[Value::from_i64(k), Value::from_i64(v)])
            .unwrap();
    }
    assert_eq!(export_json(&rt, rebuilt), exported);
}
