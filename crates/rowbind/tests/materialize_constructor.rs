use rowbind::driver::{MemoryCursor, MemoryResults, NullExecutor};
use rowbind::ty::{PropertyType, ScalarType, TypeDescriptor};
use rowbind::{Engine, PropertyMapping, ResultMap, SqlNode, Statement, Value};

use std::rc::Rc;

fn run(engine: &Engine, cursor: MemoryCursor) -> Vec<Value> {
    let mut results = MemoryResults::single(cursor);
    match engine
        .materialize("find", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single()
    {
        Value::List(items) => items,
        other => panic!("expected list, got {other:?}"),
    }
}

fn statement() -> Statement {
    Statement::builder("find", SqlNode::text("select * from t"))
        .result_map("m")
        .build()
}

// ---------------------------------------------------------------------------
// Explicit constructor mappings
// ---------------------------------------------------------------------------

fn point_engine() -> Engine {
    Engine::builder()
        .register_type(
            TypeDescriptor::strct("Point")
                .with_constructor(&[("x", ScalarType::I64), ("y", ScalarType::I64)]),
        )
        .result_map(
            ResultMap::builder("m", "Point")
                // declared out of order on purpose; the builder sorts them
                .mapping(PropertyMapping::new("y", "col_y").constructor())
                .mapping(PropertyMapping::new("x", "col_x").constructor()),
        )
        .statement(statement())
        .build()
        .unwrap()
}

#[test]
fn constructor_args_resolve_in_declaration_order() {
    let rows = run(
        &point_engine(),
        MemoryCursor::new(&["col_x", "col_y"], vec![vec![Value::I64(3), Value::I64(4)]]),
    );
    let point = rows[0].expect_object();
    assert_eq!(point.peek("x"), Value::I64(3));
    assert_eq!(point.peek("y"), Value::I64(4));
}

#[test]
fn all_null_arguments_yield_no_object() {
    let rows = run(
        &point_engine(),
        MemoryCursor::new(&["col_x", "col_y"], vec![vec![Value::Null, Value::Null]]),
    );
    assert_eq!(rows, vec![Value::Null]);
}

#[test]
fn one_non_null_argument_is_enough_to_instantiate() {
    let rows = run(
        &point_engine(),
        MemoryCursor::new(&["col_x", "col_y"], vec![vec![Value::I64(3), Value::Null]]),
    );
    let point = rows[0].expect_object();
    assert_eq!(point.peek("x"), Value::I64(3));
    assert_eq!(point.peek("y"), Value::Null);
}

// ---------------------------------------------------------------------------
// Constructor signature search (no explicit mappings)
// ---------------------------------------------------------------------------

#[test]
fn single_declared_constructor_reads_columns_positionally() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Pair")
                .with_constructor(&[("a", ScalarType::I64), ("b", ScalarType::String)]),
        )
        .result_map(ResultMap::builder("m", "Pair"))
        .statement(statement())
        .build()
        .unwrap();

    let rows = run(
        &engine,
        MemoryCursor::with_types(
            &["left", "right"],
            vec![ScalarType::I64, ScalarType::String],
            vec![vec![Value::I64(1), Value::from("one")]],
        ),
    );
    let pair = rows[0].expect_object();
    assert_eq!(pair.peek("a"), Value::I64(1));
    assert_eq!(pair.peek("b"), Value::from("one"));
}

#[test]
fn default_mapping_constructor_is_preferred() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Pair")
                .with_constructor(&[("a", ScalarType::I64)])
                .with_default_constructor(&[("a", ScalarType::I64), ("b", ScalarType::String)]),
        )
        .result_map(ResultMap::builder("m", "Pair"))
        .statement(statement())
        .build()
        .unwrap();

    let rows = run(
        &engine,
        MemoryCursor::with_types(
            &["left", "right"],
            vec![ScalarType::I64, ScalarType::String],
            vec![vec![Value::I64(1), Value::from("one")]],
        ),
    );
    assert_eq!(rows[0].expect_object().peek("b"), Value::from("one"));
}

#[test]
fn signature_search_matches_convertible_columns() {
    // neither constructor is marked; the two-arg one fits the two columns
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Pair")
                .with_constructor(&[("a", ScalarType::I64), ("b", ScalarType::String), ("c", ScalarType::I64)])
                .with_constructor(&[("a", ScalarType::I64), ("b", ScalarType::String)]),
        )
        .result_map(ResultMap::builder("m", "Pair"))
        .statement(statement())
        .build()
        .unwrap();

    let rows = run(
        &engine,
        MemoryCursor::with_types(
            &["left", "right"],
            vec![ScalarType::I64, ScalarType::String],
            vec![vec![Value::I64(1), Value::from("one")]],
        ),
    );
    assert_eq!(rows[0].expect_object().peek("a"), Value::I64(1));
}

#[test]
fn no_usable_constructor_is_fatal() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Pair")
                .with_constructor(&[("a", ScalarType::Bytes), ("b", ScalarType::Bytes)])
                .with_constructor(&[("a", ScalarType::I64)]),
        )
        .result_map(ResultMap::builder("m", "Pair"))
        .statement(statement())
        .build()
        .unwrap();

    let mut results = MemoryResults::single(MemoryCursor::with_types(
        &["left", "right"],
        vec![ScalarType::I64, ScalarType::String],
        vec![vec![Value::I64(1), Value::from("one")]],
    ));
    let err = engine
        .materialize("find", &mut results, Rc::new(NullExecutor))
        .unwrap_err();
    assert!(err.is_mapping());
}

// ---------------------------------------------------------------------------
// Nested result map as a constructor argument
// ---------------------------------------------------------------------------

#[test]
fn nested_map_feeds_a_constructor_argument() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Wrapper")
                .with_constructor(&[("inner", ScalarType::Unknown)]),
        )
        .register_type(
            TypeDescriptor::strct("Inner")
                .with_property("id", PropertyType::Scalar(ScalarType::I64)),
        )
        .result_map(
            ResultMap::builder("m", "Wrapper").mapping(
                PropertyMapping::new("inner", "")
                    .constructor()
                    .nested_map("innerMap"),
            ),
        )
        .result_map(
            ResultMap::builder("innerMap", "Inner")
                .mapping(PropertyMapping::new("id", "inner_id").id()),
        )
        .statement(statement())
        .build()
        .unwrap();

    let rows = run(
        &engine,
        MemoryCursor::new(&["inner_id"], vec![vec![Value::I64(42)]]),
    );
    let wrapper = rows[0].expect_object();
    assert_eq!(
        wrapper.peek("inner").expect_object().peek("id"),
        Value::I64(42)
    );
}
