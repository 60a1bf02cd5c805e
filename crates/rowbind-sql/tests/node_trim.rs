use rowbind_core::{Object, Value};
use rowbind_sql::node::TrimNode;
use rowbind_sql::{render, Flavor, RenderedSql, SimpleEvaluator, SqlNode};

fn render_sql(node: &SqlNode, param: Value) -> RenderedSql {
    render(node, param, &SimpleEvaluator, Flavor::Mysql).unwrap()
}

fn param(pairs: &[(&str, Value)]) -> Value {
    let obj = Object::new("map");
    for (name, value) in pairs {
        obj.set(name, value.clone());
    }
    obj.into()
}

fn where_over_conditions() -> SqlNode {
    SqlNode::where_clause(SqlNode::mixed(vec![
        SqlNode::when("a != null", SqlNode::text("AND a = #{a}")),
        SqlNode::when("b != null", SqlNode::text("AND b = #{b}")),
    ]))
}

#[test]
fn where_strips_one_leading_and() {
    let rendered = render_sql(
        &where_over_conditions(),
        param(&[("a", Value::I64(1)), ("b", Value::I64(2))]),
    );
    assert_eq!(rendered.text, "WHERE a = ? AND b = ?");
}

#[test]
fn where_strips_leading_or() {
    let node = SqlNode::where_clause(SqlNode::text("OR a = #{a}"));
    let rendered = render_sql(&node, param(&[("a", Value::I64(1))]));
    assert_eq!(rendered.text, "WHERE a = ?");
}

#[test]
fn where_over_nothing_emits_nothing() {
    let rendered = render_sql(&where_over_conditions(), param(&[]));
    assert_eq!(rendered.text, "");
}

#[test]
fn where_over_whitespace_emits_nothing() {
    let node = SqlNode::where_clause(SqlNode::text("   "));
    let rendered = render_sql(&node, param(&[]));
    assert_eq!(rendered.text, "");
}

#[test]
fn where_applies_once_across_many_fragments() {
    // three contributing fragments, still a single strip + single prefix
    let node = SqlNode::where_clause(SqlNode::mixed(vec![
        SqlNode::text("AND a = 1"),
        SqlNode::text("AND b = 2"),
        SqlNode::text("AND c = 3"),
    ]));
    let rendered = render_sql(&node, param(&[]));
    assert_eq!(rendered.text, "WHERE a = 1 AND b = 2 AND c = 3");
}

#[test]
fn set_strips_trailing_comma() {
    let node = SqlNode::set_clause(SqlNode::mixed(vec![
        SqlNode::when("name != null", SqlNode::text("name = #{name},")),
        SqlNode::when("age != null", SqlNode::text("age = #{age},")),
    ]));
    let rendered = render_sql(
        &node,
        param(&[("name", Value::from("kafka")), ("age", Value::I64(40))]),
    );
    assert_eq!(rendered.text, "SET name = ?, age = ?");
}

#[test]
fn custom_trim_prefix_and_suffix() {
    let node = SqlNode::Trim(
        TrimNode::new(SqlNode::text("a = 1 and"))
            .prefix("(")
            .suffix(")")
            .suffix_overrides("AND|OR"),
    );
    let rendered = render_sql(&node, param(&[]));
    assert_eq!(rendered.text, "( a = 1 )");
}

#[test]
fn override_with_trailing_space_needs_following_text() {
    // "AND " (with space) must not strip a bare "AND" with nothing after it
    let node = SqlNode::Trim(TrimNode::new(SqlNode::text("AND")).prefix_overrides("AND "));
    let rendered = render_sql(&node, param(&[]));
    assert_eq!(rendered.text, "AND");
}
