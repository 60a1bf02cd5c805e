use rowbind_core::{Object, Value};
use rowbind_sql::{ExpressionEvaluator, SimpleEvaluator};

fn scope(pairs: &[(&str, Value)]) -> Value {
    let obj = Object::new("map");
    for (name, value) in pairs {
        obj.set(name, value.clone());
    }
    obj.into()
}

fn eval_bool(expr: &str, scope_value: &Value) -> bool {
    SimpleEvaluator.eval_bool(expr, scope_value).unwrap()
}

// ---------------------------------------------------------------------------
// Null checks and truthiness
// ---------------------------------------------------------------------------

#[test]
fn null_comparisons() {
    let s = scope(&[("name", Value::from("kafka"))]);
    assert!(eval_bool("name != null", &s));
    assert!(!eval_bool("name == null", &s));
    assert!(eval_bool("missing == null", &s));
}

#[test]
fn truthiness_of_bare_values() {
    let s = scope(&[
        ("flag", Value::Bool(true)),
        ("zero", Value::I64(0)),
        ("one", Value::I64(1)),
        ("empty", Value::from("")),
    ]);
    assert!(eval_bool("flag", &s));
    assert!(!eval_bool("zero", &s));
    assert!(eval_bool("one", &s));
    // strings are truthy by non-nullness, even empty ones
    assert!(eval_bool("empty", &s));
    assert!(!eval_bool("missing", &s));
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

#[test]
fn numeric_comparisons_cross_types() {
    let s = scope(&[("age", Value::I64(40)), ("score", Value::F64(2.5))]);
    assert!(eval_bool("age >= 18", &s));
    assert!(eval_bool("score > 2", &s));
    assert!(eval_bool("age == 40", &s));
    assert!(!eval_bool("age < 40", &s));
}

#[test]
fn string_comparisons() {
    let s = scope(&[("name", Value::from("kafka"))]);
    assert!(eval_bool("name == 'kafka'", &s));
    assert!(eval_bool("name != 'musil'", &s));
    assert!(eval_bool("name < 'zweig'", &s));
}

#[test]
fn ordering_mixed_types_is_error() {
    let s = scope(&[("name", Value::from("kafka"))]);
    let err = SimpleEvaluator.eval_bool("name > 3", &s).unwrap_err();
    assert!(err.is_template());
}

// ---------------------------------------------------------------------------
// Boolean operators
// ---------------------------------------------------------------------------

#[test]
fn and_or_not_with_precedence() {
    let s = scope(&[("a", Value::I64(1)), ("b", Value::I64(2))]);
    assert!(eval_bool("a == 1 and b == 2", &s));
    assert!(eval_bool("a == 9 or b == 2", &s));
    // `and` binds tighter than `or`
    assert!(eval_bool("a == 9 or a == 1 and b == 2", &s));
    assert!(eval_bool("not (a == 9)", &s));
    assert!(eval_bool("a != null && b != null", &s));
    assert!(eval_bool("a == 9 || b == 2", &s));
}

#[test]
fn short_circuit_skips_rhs() {
    // rhs would error on ordering a string against a number; lhs decides first
    let s = scope(&[("name", Value::from("kafka"))]);
    assert!(!eval_bool("false and name > 3", &s));
    assert!(eval_bool("true or name > 3", &s));
}

// ---------------------------------------------------------------------------
// Paths and iterables
// ---------------------------------------------------------------------------

#[test]
fn dot_paths_navigate_objects() {
    let author = Object::new("map");
    author.set("name", Value::from("kafka"));
    let s = scope(&[("author", author.into())]);
    assert!(eval_bool("author.name == 'kafka'", &s));
    assert!(eval_bool("author.missing == null", &s));
}

#[test]
fn iterable_over_list_and_map() {
    let s = scope(&[(
        "ids",
        Value::List(vec![Value::I64(1), Value::I64(2)]),
    )]);
    let entries = SimpleEvaluator.eval_iterable("ids", &s).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (Value::I64(0), Value::I64(1)));
    assert_eq!(entries[1], (Value::I64(1), Value::I64(2)));

    let map = Object::new("map");
    map.set("x", Value::I64(10));
    let s = scope(&[("m", map.into())]);
    let entries = SimpleEvaluator.eval_iterable("m", &s).unwrap();
    assert_eq!(entries, vec![(Value::from("x"), Value::I64(10))]);
}

#[test]
fn iterable_over_null_or_scalar_is_error() {
    let s = scope(&[("n", Value::I64(3))]);
    assert!(SimpleEvaluator.eval_iterable("missing", &s).unwrap_err().is_template());
    assert!(SimpleEvaluator.eval_iterable("n", &s).unwrap_err().is_template());
}

#[test]
fn trailing_tokens_are_errors() {
    let s = scope(&[]);
    assert!(SimpleEvaluator.eval_bool("1 == 1 2", &s).unwrap_err().is_template());
}
