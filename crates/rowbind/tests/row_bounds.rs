use rowbind::driver::{MemoryCursor, MemoryResults, NullExecutor};
use rowbind::ty::{PropertyType, ScalarType, TypeDescriptor};
use rowbind::{
    Engine, PropertyMapping, ResultMap, RowBounds, Settings, SqlNode, Statement, Value,
};

use std::rc::Rc;

fn flat_engine(settings: Settings) -> Engine {
    Engine::builder()
        .settings(settings)
        .register_type(
            TypeDescriptor::strct("User").with_property("id", PropertyType::Scalar(ScalarType::I64)),
        )
        .result_map(
            ResultMap::builder("userMap", "User").mapping(PropertyMapping::new("id", "id").id()),
        )
        .statement(
            Statement::builder("findUsers", SqlNode::text("select * from user"))
                .result_map("userMap")
                .build(),
        )
        .build()
        .unwrap()
}

fn nested_engine(settings: Settings) -> Engine {
    Engine::builder()
        .settings(settings)
        .register_type(
            TypeDescriptor::strct("Blog")
                .with_property("id", PropertyType::Scalar(ScalarType::I64))
                .with_property("posts", PropertyType::List),
        )
        .register_type(
            TypeDescriptor::strct("Post").with_property("id", PropertyType::Scalar(ScalarType::I64)),
        )
        .result_map(
            ResultMap::builder("blogMap", "Blog")
                .mapping(PropertyMapping::new("id", "id").id())
                .mapping(
                    PropertyMapping::new("posts", "")
                        .nested_map("postMap")
                        .column_prefix("post_"),
                ),
        )
        .result_map(
            ResultMap::builder("postMap", "Post").mapping(PropertyMapping::new("id", "id").id()),
        )
        .statement(
            Statement::builder("findBlogs", SqlNode::text("select * from blog"))
                .result_map("blogMap")
                .build(),
        )
        .build()
        .unwrap()
}

fn user_rows(count: i64) -> Vec<Vec<Value>> {
    (1..=count).map(|id| vec![Value::I64(id)]).collect()
}

#[test]
fn offset_and_limit_window_flat_results() {
    let engine = flat_engine(Settings::default());
    let mut results = MemoryResults::single(MemoryCursor::new(&["id"], user_rows(5)));
    let rows = engine
        .materialize_bounded(
            "findUsers",
            &mut results,
            Rc::new(NullExecutor),
            RowBounds::new(1, 2),
        )
        .unwrap()
        .into_single();

    let ids: Vec<Value> = rows
        .expect_list()
        .iter()
        .map(|row| row.expect_object().peek("id"))
        .collect();
    assert_eq!(ids, vec![Value::I64(2), Value::I64(3)]);
}

#[test]
fn offset_past_the_end_yields_nothing() {
    let engine = flat_engine(Settings::default());
    let mut results = MemoryResults::single(MemoryCursor::new(&["id"], user_rows(2)));
    let rows = engine
        .materialize_bounded(
            "findUsers",
            &mut results,
            Rc::new(NullExecutor),
            RowBounds::new(10, 5),
        )
        .unwrap()
        .into_single();
    assert!(rows.expect_list().is_empty());
}

#[test]
fn bounds_over_nested_maps_are_rejected() {
    let engine = nested_engine(Settings::default());
    let mut results = MemoryResults::single(MemoryCursor::new(
        &["id", "post_id"],
        vec![vec![Value::I64(1), Value::I64(100)]],
    ));
    let err = engine
        .materialize_bounded(
            "findBlogs",
            &mut results,
            Rc::new(NullExecutor),
            RowBounds::new(0, 10),
        )
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn default_bounds_over_nested_maps_are_fine() {
    let engine = nested_engine(Settings::default());
    let mut results = MemoryResults::single(MemoryCursor::new(
        &["id", "post_id"],
        vec![vec![Value::I64(1), Value::I64(100)]],
    ));
    assert!(engine
        .materialize_bounded(
            "findBlogs",
            &mut results,
            Rc::new(NullExecutor),
            RowBounds::DEFAULT,
        )
        .is_ok());
}

#[test]
fn disabling_the_guard_allows_nested_bounds() {
    let engine = nested_engine(Settings::default().safe_row_bounds(false));
    let mut results = MemoryResults::single(MemoryCursor::new(
        &["id", "post_id"],
        vec![
            vec![Value::I64(1), Value::I64(100)],
            vec![Value::I64(2), Value::I64(200)],
        ],
    ));
    let rows = engine
        .materialize_bounded(
            "findBlogs",
            &mut results,
            Rc::new(NullExecutor),
            RowBounds::new(1, 10),
        )
        .unwrap()
        .into_single();
    assert_eq!(rows.expect_list().len(), 1);
}
