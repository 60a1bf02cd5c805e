use rowbind::driver::{MemoryCursor, MemoryResults, NullExecutor};
use rowbind::ty::{PropertyType, ScalarType, TypeDescriptor};
use rowbind::{
    AutoMapping, Engine, PropertyMapping, ResultMap, Settings, SqlNode, Statement, Value,
};

use std::rc::Rc;

fn user_type() -> TypeDescriptor {
    TypeDescriptor::strct("User")
        .with_property("id", PropertyType::Scalar(ScalarType::I64))
        .with_property("userName", PropertyType::Scalar(ScalarType::String))
}

fn engine_with(settings: Settings, map: rowbind::schema::ResultMapBuilder) -> Engine {
    Engine::builder()
        .settings(settings)
        .register_type(user_type())
        .result_map(map)
        .statement(
            Statement::builder("findUsers", SqlNode::text("select * from user"))
                .result_map("userMap")
                .build(),
        )
        .build()
        .unwrap()
}

fn run(engine: &Engine, cursor: MemoryCursor) -> Vec<Value> {
    let mut results = MemoryResults::single(cursor);
    let value = engine
        .materialize("findUsers", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single();
    match value {
        Value::List(items) => items,
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn explicit_property_mappings_populate_objects() {
    let engine = engine_with(
        Settings::default(),
        ResultMap::builder("userMap", "User")
            .mapping(PropertyMapping::new("id", "id").id())
            .mapping(PropertyMapping::new("userName", "user_name")),
    );
    let cursor = MemoryCursor::new(
        &["id", "user_name"],
        vec![
            vec![Value::I64(1), Value::from("kafka")],
            vec![Value::I64(2), Value::from("musil")],
        ],
    );

    let rows = run(&engine, cursor);
    assert_eq!(rows.len(), 2);
    let first = rows[0].expect_object();
    assert_eq!(first.type_name(), "User");
    assert_eq!(first.peek("id"), Value::I64(1));
    assert_eq!(first.peek("userName"), Value::from("kafka"));
}

#[test]
fn auto_mapping_covers_unmapped_columns() {
    let engine = engine_with(
        Settings::default(),
        ResultMap::builder("userMap", "User").mapping(PropertyMapping::new("id", "id").id()),
    );
    // userName is unmapped; partial auto-mapping matches it case-insensitively
    let cursor = MemoryCursor::new(
        &["id", "USERNAME"],
        vec![vec![Value::I64(1), Value::from("kafka")]],
    );

    let rows = run(&engine, cursor);
    assert_eq!(rows[0].expect_object().peek("userName"), Value::from("kafka"));
}

#[test]
fn underscore_columns_map_to_camel_case_properties() {
    let engine = engine_with(
        Settings::default().map_underscore_to_camel_case(true),
        ResultMap::builder("userMap", "User"),
    );
    let cursor = MemoryCursor::new(
        &["id", "user_name"],
        vec![vec![Value::I64(1), Value::from("kafka")]],
    );

    let rows = run(&engine, cursor);
    assert_eq!(rows[0].expect_object().peek("userName"), Value::from("kafka"));
}

#[test]
fn auto_mapping_none_leaves_unmapped_columns_alone() {
    let engine = engine_with(
        Settings::default().auto_mapping(AutoMapping::None),
        ResultMap::builder("userMap", "User").mapping(PropertyMapping::new("id", "id").id()),
    );
    let cursor = MemoryCursor::new(
        &["id", "USERNAME"],
        vec![vec![Value::I64(1), Value::from("kafka")]],
    );

    let rows = run(&engine, cursor);
    assert_eq!(rows[0].expect_object().peek("userName"), Value::Null);
}

#[test]
fn auto_mapping_skips_unsettable_properties() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Audit")
                .with_property("id", PropertyType::Scalar(ScalarType::I64))
                .with_readonly_property("checksum", PropertyType::Scalar(ScalarType::String)),
        )
        .result_map(ResultMap::builder("auditMap", "Audit"))
        .statement(
            Statement::builder("findUsers", SqlNode::text("select * from audit"))
                .result_map("auditMap")
                .build(),
        )
        .build()
        .unwrap();
    let cursor = MemoryCursor::new(
        &["id", "checksum"],
        vec![vec![Value::I64(1), Value::from("abc")]],
    );

    let rows = run(&engine, cursor);
    let audit = rows[0].expect_object();
    assert_eq!(audit.peek("id"), Value::I64(1));
    assert_eq!(audit.peek("checksum"), Value::Null);
}

#[test]
fn map_target_receives_every_column() {
    let engine = Engine::builder()
        .result_map(ResultMap::builder("rowMap", "map"))
        .statement(
            Statement::builder("findRows", SqlNode::text("select 1"))
                .result_map("rowMap")
                .build(),
        )
        .build()
        .unwrap();
    let cursor = MemoryCursor::new(
        &["a", "b"],
        vec![vec![Value::I64(1), Value::from("two")]],
    );
    let mut results = MemoryResults::single(cursor);
    let rows = engine
        .materialize("findRows", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single();

    let row = rows.expect_list()[0].expect_object();
    assert_eq!(row.peek("a"), Value::I64(1));
    assert_eq!(row.peek("b"), Value::from("two"));
}

#[test]
fn scalar_target_skips_object_mapping() {
    let engine = Engine::builder()
        .result_map(ResultMap::builder("nameMap", "string"))
        .statement(
            Statement::builder("findNames", SqlNode::text("select name from user"))
                .result_map("nameMap")
                .build(),
        )
        .build()
        .unwrap();
    let cursor = MemoryCursor::new(
        &["name"],
        vec![vec![Value::from("kafka")], vec![Value::from("musil")]],
    );
    let mut results = MemoryResults::single(cursor);
    let rows = engine
        .materialize("findNames", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single();

    assert_eq!(
        rows.expect_list(),
        &[Value::from("kafka"), Value::from("musil")]
    );
}

#[test]
fn all_null_row_yields_no_object() {
    let engine = engine_with(
        Settings::default(),
        ResultMap::builder("userMap", "User")
            .mapping(PropertyMapping::new("id", "id").id())
            .mapping(PropertyMapping::new("userName", "user_name")),
    );
    let cursor = MemoryCursor::new(&["id", "user_name"], vec![vec![Value::Null, Value::Null]]);

    let rows = run(&engine, cursor);
    assert_eq!(rows, vec![Value::Null]);
}

#[test]
fn empty_row_keeps_instance_when_configured() {
    let engine = engine_with(
        Settings::default().return_instance_for_empty_row(true),
        ResultMap::builder("userMap", "User")
            .mapping(PropertyMapping::new("id", "id").id())
            .mapping(PropertyMapping::new("userName", "user_name")),
    );
    let cursor = MemoryCursor::new(&["id", "user_name"], vec![vec![Value::Null, Value::Null]]);

    let rows = run(&engine, cursor);
    assert!(rows[0].is_object());
}

#[test]
fn conversion_failure_aborts_the_statement() {
    let engine = engine_with(
        Settings::default(),
        ResultMap::builder("userMap", "User").mapping(PropertyMapping::new("id", "id").id()),
    );
    let cursor = MemoryCursor::new(&["id"], vec![vec![Value::from("not-a-number")]]);
    let mut results = MemoryResults::single(cursor);

    let err = engine
        .materialize("findUsers", &mut results, Rc::new(NullExecutor))
        .unwrap_err();
    assert!(err.is_type_conversion());
}
