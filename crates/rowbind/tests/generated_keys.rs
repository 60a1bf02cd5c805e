use rowbind::driver::MemoryCursor;
use rowbind::ty::ScalarType;
use rowbind::{Engine, Object, SqlNode, Statement, Value};

fn engine(key_properties: &[&str]) -> Engine {
    Engine::builder()
        .statement(
            Statement::builder(
                "insertUser",
                SqlNode::text("insert into user (name) values (#{name})"),
            )
            .key_properties(key_properties)
            .build(),
        )
        .build()
        .unwrap()
}

fn key_cursor(ids: &[i64]) -> MemoryCursor {
    MemoryCursor::with_types(
        &["id"],
        vec![ScalarType::I64],
        ids.iter().map(|id| vec![Value::I64(*id)]).collect(),
    )
}

fn user(name: &str) -> Value {
    let obj = Object::new("User");
    obj.set("name", Value::from(name));
    obj.into()
}

#[test]
fn keys_assign_one_row_per_target() {
    let engine = engine(&["id"]);
    let mut targets = vec![user("kafka"), user("musil")];
    engine
        .assign_generated_keys("insertUser", &mut key_cursor(&[7, 8]), &mut targets)
        .unwrap();

    assert_eq!(targets[0].expect_object().peek("id"), Value::I64(7));
    assert_eq!(targets[1].expect_object().peek("id"), Value::I64(8));
}

#[test]
fn too_many_generated_rows_is_fatal() {
    let engine = engine(&["id"]);
    let mut targets = vec![user("kafka")];
    let err = engine
        .assign_generated_keys("insertUser", &mut key_cursor(&[7, 8]), &mut targets)
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn too_few_generated_rows_is_fatal() {
    let engine = engine(&["id"]);
    let mut targets = vec![user("kafka"), user("musil")];
    let err = engine
        .assign_generated_keys("insertUser", &mut key_cursor(&[7]), &mut targets)
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn fewer_columns_than_key_properties_is_fatal() {
    let engine = engine(&["id", "version"]);
    let mut targets = vec![user("kafka")];
    let err = engine
        .assign_generated_keys("insertUser", &mut key_cursor(&[7]), &mut targets)
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn statement_without_key_properties_is_a_no_op() {
    let engine = engine(&[]);
    let mut targets = vec![user("kafka")];
    engine
        .assign_generated_keys("insertUser", &mut key_cursor(&[7]), &mut targets)
        .unwrap();
    assert!(targets[0].expect_object().peek("id").is_null());
}
