use nacre_runtime::numeric::Decimal;
use nacre_runtime::{Runtime, Value};

fn render(rt: &mut Runtime, v: Value) -> String {
    let s = rt.invoke_global("to_text", &[v]).unwrap();
    rt.str_content(s).unwrap()
}

#[test]
fn small_int_arithmetic_stays_small() {
    let mut rt = Runtime::new();
    let sum = rt.send(Value::from_i64(20), "add", &[Value::from_i64(22)]).unwrap();
    assert_eq!(sum, Value::from_i64(42));
    let product = rt.send(Value::from_i64(-6), "mul", &[Value::from_i64(7)]).unwrap();
    assert_eq!(product, Value::from_i64(-42));
}

#[test]
fn overflowing_int_promotes_to_bigint() {
    let mut rt = Runtime::new();
    let big = Value::from_i64(1i64 << 46);
    let sum = rt.send(big, "add", &[big]).unwrap();
    assert_eq!(sum.type_name(), "bigint");
    assert_eq!(render(&mut rt, sum), (1i128 << 47).to_string());

    // a bigint result that shrinks back demotes to a small int
    let neg = Value::from_i64(-(1i64 << 46));
    let back = rt.send(sum, "add", &[neg]).unwrap();
    assert!(back.is_int());
    assert_eq!(back.as_i64(), 1i64 << 46);
}

#[test]
fn bigint_multiplication_renders_correctly() {
    let mut rt = Runtime::new();
    let a = Value::from_i64(1_000_000_000_000);
    let sq = rt.send(a, "mul", &[a]).unwrap();
    assert_eq!(sq.type_name(), "bigint");
    assert_eq!(render(&mut rt, sq), "1000000000000000000000000");
}

#[test]
fn mixed_int_float_arithmetic_goes_float() {
    let mut rt = Runtime::new();
    let sum = rt.send(Value::from_i64(1), "add", &[Value::from_f64(0.5)]).unwrap();
    assert!(sum.is_f64());
    assert_eq!(sum.as_f64(), 1.5);
}

#[test]
fn decimal_arithmetic_aligns_scales() {
    let mut rt = Runtime::new();
    let a = rt.new_decimal(Decimal::new(125, 2)); // 1.25
    let b = rt.new_decimal(Decimal::new(5, 1)); // 0.5
    let sum = rt.send(a, "add", &[b]).unwrap();
    assert_eq!(sum.type_name(), "decimal");
    assert_eq!(render(&mut rt, sum), "1.75");

    // int coerces up to decimal
    let bumped = rt.send(a, "add", &[Value::from_i64(1)]).unwrap();
    assert_eq!(render(&mut rt, bumped), "2.25");
}

#[test]
fn division_rules() {
    let mut rt = Runtime::new();
    let q = rt.send(Value::from_i64(7), "div", &[Value::from_i64(2)]).unwrap();
    assert_eq!(q, Value::from_i64(3)); // integer division floors
    let q = rt.send(Value::from_i64(-7), "div", &[Value::from_i64(2)]).unwrap();
    assert_eq!(q, Value::from_i64(-4));
    assert!(rt.send(Value::from_i64(1), "div", &[Value::from_i64(0)]).is_err());

    let q = rt.send(Value::from_f64(1.0), "div", &[Value::from_i64(4)]).unwrap();
    assert_eq!(q.as_f64(), 0.25);
}

#[test]
fn cmp_spans_the_tower() {
    let mut rt = Runtime::new();
    let big = rt.send(Value::from_i64(1i64 << 46), "mul", &[Value::from_i64(4)]).unwrap();
    assert_eq!(big.type_name(), "bigint");
    let ord = rt.send(big, "cmp", &[Value::from_i64(5)]).unwrap();
    assert_eq!(ord, Value::from_i64(1));
    let ord = rt.send(Value::from_i64(5), "cmp", &[big]).unwrap();
    assert_eq!(ord, Value::from_i64(-1));
    let ord = rt.send(Value::from_f64(2.5), "cmp", &[Value::from_f64(2.5)]).unwrap();
    assert_eq!(ord, Value::from_i64(0));
}
