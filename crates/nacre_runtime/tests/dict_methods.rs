use nacre_runtime::{DictKey, Runtime, Value};

fn render(rt: &mut Runtime, v: Value) -> String {
    let s = rt.invoke_global("to_text", &[v]).unwrap();
    rt.str_content(s).unwrap()
}

#[test]
fn insert_get_remove_roundtrip() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    let key = rt.new_str("alpha");
    rt.send(dict, "insert", &[key, Value::from_i64(1)]).unwrap();
    assert_eq!(rt.send(dict, "get", &[key]).unwrap(), Value::from_i64(1));
    assert_eq!(rt.send(dict, "has", &[key]).unwrap(), Value::from_bool(true));
    assert_eq!(rt.send(dict, "length", &[]).unwrap(), Value::from_i64(1));
    assert_eq!(rt.send(dict, "remove", &[key]).unwrap(), Value::from_i64(1));
    assert!(rt.send(dict, "get", &[key]).unwrap().is_nil());
    assert_eq!(rt.send(dict, "length", &[]).unwrap(), Value::from_i64(0));
}

#[test]
fn iteration_order_survives_delete() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for (name, val) in [("a", 1), ("b", 2), ("c", 3)] {
        let key = rt.new_str(name);
        rt.send(dict, "insert", &[key, Value::from_i64(val)]).unwrap();
    }
    let b = rt.new_str("b");
    rt.send(dict, "remove", &[b]).unwrap();

    let table = rt.dict_table(dict).unwrap();
    let entries: Vec<(String, i64)> = table
        .entries()
        .into_iter()
        .map(|(k, v)| (k.as_str().to_string(), v.as_i64()))
        .collect();
    assert_eq!(entries, [("a".to_string(), 1), ("c".to_string(), 3)]);
}

#[test]
fn keys_values_items_project_in_order() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for i in 0..5 {
        rt.send(dict, "insert", &[Value::from_i64(i), Value::from_i64(i * i)])
            .unwrap();
    }
    let keys = rt.send(dict, "keys", &[]).unwrap();
    let keys: Vec<i64> = rt.list_items(keys).unwrap().iter().map(|v| v.as_i64()).collect();
    assert_eq!(keys, [0, 1, 2, 3, 4]);

    let values = rt.send(dict, "values", &[]).unwrap();
    let values: Vec<i64> = rt.list_items(values).unwrap().iter().map(|v| v.as_i64()).collect();
    assert_eq!(values, [0, 1, 4, 9, 16]);

    let items = rt.send(dict, "items", &[]).unwrap();
    let items = rt.list_items(items).unwrap();
    assert_eq!(items.len(), 5);
    let first = rt.list_items(items[0]).unwrap();
    assert_eq!(first[0].as_i64(), 0);
    assert_eq!(first[1].as_i64(), 0);
}

fn record_key(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    let acc = rt.global_get("acc").expect("accumulator list");
    rt.send(acc, "push", &[args[0]])?;
    Ok(Value::NIL)
}

#[test]
fn each_walks_in_insertion_order() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for i in [3, 1, 2] {
        rt.send(dict, "insert", &[Value::from_i64(i), Value::from_i64(i * 10)])
            .unwrap();
    }
    let acc = rt.new_list(Vec::new());
    rt.global_set("acc", acc);
    let f = rt.new_function(record_key);
    rt.send(dict, "each", &[f]).unwrap();
    let seen: Vec<i64> = rt.list_items(acc).unwrap().iter().map(|v| v.as_i64()).collect();
    assert_eq!(seen, [3, 1, 2]);
}

fn remove_next_key(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    let acc = rt.global_get("acc").expect("accumulator list");
    rt.send(acc, "push", &[args[0]])?;
    let dict = rt.global_get("subject").expect("dict under iteration");
    let next = Value::from_i64(args[0].as_i64() + 1);
    rt.send(dict, "remove", &[next])?;
    Ok(Value::NIL)
}

#[test]
fn each_callback_may_mutate_the_dict_mid_walk() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for i in 0..6 {
        rt.send(dict, "insert", &[Value::from_i64(i), Value::NIL]).unwrap();
    }
    let acc = rt.new_list(Vec::new());
    rt.global_set("acc", acc);
    rt.global_set("subject", dict);
    let f = rt.new_function(remove_next_key);
    rt.send(dict, "each", &[f]).unwrap();
    let seen: Vec<i64> = rt.list_items(acc).unwrap().iter().map(|v| v.as_i64()).collect();
    // every odd key was deleted by the callback one step ahead of the walk
    assert_eq!(seen, [0, 2, 4]);
    assert_eq!(rt.send(dict, "length", &[]).unwrap(), Value::from_i64(3));
}

fn produce_default(rt: &mut Runtime, args: &[Value]) -> Result<Value, String> {
    // producer receives the missing key
    let _ = rt;
    Ok(Value::from_i64(args[0].as_i64() * 100))
}

#[test]
fn fetch_layers_default_policies_on_lookup_miss() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    rt.send(dict, "insert", &[Value::from_i64(1), Value::from_i64(11)])
        .unwrap();

    // present: default ignored
    let got = rt
        .send(dict, "fetch", &[Value::from_i64(1), Value::from_i64(99)])
        .unwrap();
    assert_eq!(got, Value::from_i64(11));

    // absent with fixed default
    let got = rt
        .send(dict, "fetch", &[Value::from_i64(2), Value::from_i64(99)])
        .unwrap();
    assert_eq!(got, Value::from_i64(99));

    // absent with producer callback
    let producer = rt.new_function(produce_default);
    let got = rt.send(dict, "fetch", &[Value::from_i64(7), producer]).unwrap();
    assert_eq!(got, Value::from_i64(700));

    // absent with no fallback raises
    assert!(rt.send(dict, "fetch", &[Value::from_i64(3)]).is_err());
}

#[test]
fn merge_and_dup() {
    let mut rt = Runtime::new();
    let a = rt.new_dict();
    let b = rt.new_dict();
    rt.send(a, "insert", &[Value::from_i64(1), Value::from_i64(10)]).unwrap();
    rt.send(b, "insert", &[Value::from_i64(2), Value::from_i64(20)]).unwrap();
    rt.send(b, "insert", &[Value::from_i64(1), Value::from_i64(99)]).unwrap();
    rt.send(a, "merge", &[b]).unwrap();
    let table = rt.dict_table(a).unwrap();
    let entries: Vec<(i64, i64)> = table
        .entries()
        .into_iter()
        .map(|(k, v)| match k {
            DictKey::Int(i) => (i, v.as_i64()),
            _ => unreachable!(),
        })
        .collect();
    // overwrite kept position 1; fresh key 2 appended
    assert_eq!(entries, [(1, 99), (2, 20)]);

    let copy = rt.send(a, "dup", &[]).unwrap();
    rt.send(copy, "insert", &[Value::from_i64(3), Value::from_i64(30)]).unwrap();
    assert_eq!(rt.send(a, "length", &[]).unwrap(), Value::from_i64(2));
    assert_eq!(rt.send(copy, "length", &[]).unwrap(), Value::from_i64(3));
}

#[test]
fn clear_then_reinsert_has_no_ghosts() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    let k = rt.new_str("k");
    rt.send(dict, "insert", &[k, Value::from_i64(1)]).unwrap();
    rt.send(dict, "clear", &[]).unwrap();
    rt.send(dict, "insert", &[k, Value::from_i64(2)]).unwrap();
    let table = rt.dict_table(dict).unwrap();
    let entries = table.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, Value::from_i64(2));
}

#[test]
fn rehash_and_identity_mode_through_methods() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    let k = rt.new_str("key");
    rt.send(dict, "insert", &[k, Value::from_i64(5)]).unwrap();
    rt.send(dict, "rehash", &[]).unwrap();
    assert_eq!(rt.send(dict, "get", &[k]).unwrap(), Value::from_i64(5));

    rt.send(dict, "compare_by_identity", &[]).unwrap();
    // string keys are interned, so an equal string still resolves to the
    // same key object and keeps matching under identity comparison
    let k2 = rt.new_str("key");
    assert_eq!(rt.send(dict, "get", &[k2]).unwrap(), Value::from_i64(5));
}

#[test]
fn dict_renders_in_insertion_order() {
    let mut rt = Runtime::new();
    let dict = rt.new_dict();
    for (name, val) in [("one", 1), ("two", 2)] {
        let key = rt.new_str(name);
        rt.send(dict, "insert", &[key, Value::from_i64(val)]).unwrap();
    }
    assert_eq!(render(&mut rt, dict), "{one: 1, two: 2}");
}
