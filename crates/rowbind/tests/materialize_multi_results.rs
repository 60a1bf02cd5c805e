use rowbind::driver::{MemoryCursor, MemoryResults, NullExecutor};
use rowbind::ty::{PropertyType, ScalarType, TypeDescriptor};
use rowbind::{Engine, PropertyMapping, ResultMap, SqlNode, Statement, Value};

use std::rc::Rc;

// A stored-procedure-style statement: the first result set carries blogs,
// the second carries the posts of every blog, correlated by blog id.
fn engine() -> Engine {
    Engine::builder()
        .register_type(
            TypeDescriptor::strct("Blog")
                .with_property("id", PropertyType::Scalar(ScalarType::I64))
                .with_property("title", PropertyType::Scalar(ScalarType::String))
                .with_property("posts", PropertyType::List),
        )
        .register_type(
            TypeDescriptor::strct("Post")
                .with_property("id", PropertyType::Scalar(ScalarType::I64))
                .with_property("subject", PropertyType::Scalar(ScalarType::String)),
        )
        .result_map(
            ResultMap::builder("blogMap", "Blog")
                .mapping(PropertyMapping::new("id", "id").id())
                .mapping(PropertyMapping::new("title", "title"))
                .mapping(
                    PropertyMapping::new("posts", "")
                        .nested_map("postMap")
                        .collection()
                        .result_set("posts", &[("id", "blog_id")]),
                ),
        )
        .result_map(
            ResultMap::builder("postMap", "Post")
                .mapping(PropertyMapping::new("id", "id").id())
                .mapping(PropertyMapping::new("subject", "subject")),
        )
        .statement(
            Statement::builder("findBlogsAndPosts", SqlNode::text("call blog_bundle()"))
                .result_map("blogMap")
                .result_sets(&["blogs", "posts"])
                .build(),
        )
        .build()
        .unwrap()
}

fn blog_cursor() -> MemoryCursor {
    MemoryCursor::new(
        &["id", "title"],
        vec![
            vec![Value::I64(1), Value::from("rust")],
            vec![Value::I64(2), Value::from("sql")],
        ],
    )
}

fn post_cursor() -> MemoryCursor {
    MemoryCursor::new(
        &["id", "subject", "blog_id"],
        vec![
            vec![Value::I64(100), Value::from("ownership"), Value::I64(1)],
            vec![Value::I64(200), Value::from("joins"), Value::I64(2)],
            vec![Value::I64(101), Value::from("borrowing"), Value::I64(1)],
        ],
    )
}

#[test]
fn later_result_set_links_into_pending_parents() {
    let engine = engine();
    let mut results = MemoryResults::new(vec![blog_cursor(), post_cursor()]);
    let lists = engine
        .materialize("findBlogsAndPosts", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single();

    let blogs = lists.expect_list();
    assert_eq!(blogs.len(), 2);

    let first = blogs[0].expect_object();
    let posts = first.peek("posts");
    let posts = posts.expect_list();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].expect_object().peek("subject"), Value::from("ownership"));
    assert_eq!(posts[1].expect_object().peek("subject"), Value::from("borrowing"));

    let second = blogs[1].expect_object();
    assert_eq!(second.peek("posts").expect_list().len(), 1);
}

#[test]
fn parent_without_foreign_rows_keeps_no_posts() {
    let engine = engine();
    let posts = MemoryCursor::new(
        &["id", "subject", "blog_id"],
        vec![vec![Value::I64(100), Value::from("ownership"), Value::I64(1)]],
    );
    let mut results = MemoryResults::new(vec![blog_cursor(), posts]);
    let lists = engine
        .materialize("findBlogsAndPosts", &mut results, Rc::new(NullExecutor))
        .unwrap()
        .into_single();

    let blogs = lists.expect_list();
    assert_eq!(blogs[0].expect_object().peek("posts").expect_list().len(), 1);
    // no correlated rows arrived for blog 2
    assert!(blogs[1].expect_object().peek("posts").is_null());
}

#[test]
fn conflicting_claims_on_one_result_set_are_rejected() {
    let engine = Engine::builder()
        .register_type(
            TypeDescriptor::strct("Blog")
                .with_property("id", PropertyType::Scalar(ScalarType::I64))
                .with_property("posts", PropertyType::List)
                .with_property("drafts", PropertyType::List),
        )
        .register_type(TypeDescriptor::strct("Post"))
        .result_map(
            ResultMap::builder("blogMap", "Blog")
                .mapping(PropertyMapping::new("id", "id").id())
                .mapping(
                    PropertyMapping::new("posts", "")
                        .nested_map("postMap")
                        .collection()
                        .result_set("posts", &[("id", "blog_id")]),
                )
                .mapping(
                    PropertyMapping::new("drafts", "")
                        .nested_map("postMap")
                        .collection()
                        .result_set("posts", &[("id", "blog_id")]),
                ),
        )
        .result_map(ResultMap::builder("postMap", "Post"))
        .statement(
            Statement::builder("find", SqlNode::text("call bundle()"))
                .result_map("blogMap")
                .result_sets(&["blogs", "posts"])
                .build(),
        )
        .build()
        .unwrap();

    let mut results = MemoryResults::new(vec![MemoryCursor::new(
        &["id"],
        vec![vec![Value::I64(1)]],
    )]);
    let err = engine
        .materialize("find", &mut results, Rc::new(NullExecutor))
        .unwrap_err();
    assert!(err.is_schema_build());
}
