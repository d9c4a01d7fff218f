use pretty_assertions::assert_eq;
use rowql_engine::Store;
use serde_json::{Value, json};

fn values_of(rows: &[Value], field: &str) -> Vec<Value> {
    rows.iter().map(|r| r[field].clone()).collect()
}

fn sorted(dataset: Vec<Value>, spec: Value) -> Vec<Value> {
    Store::new(dataset)
        .unwrap()
        .query()
        .order(&spec)
        .unwrap()
        .values()
}

// ── Single-type columns ──────────────────────────────────────────

#[test]
fn numbers_sort_numerically() {
    let rows = sorted(
        vec![
            json!({"n": 10}),
            json!({"n": 2.5}),
            json!({"n": -3}),
            json!({"n": 2}),
        ],
        json!([{"field": "n"}]),
    );
    assert_eq!(values_of(&rows, "n"), [json!(-3), json!(2), json!(2.5), json!(10)]);
}

#[test]
fn strings_sort_lexicographically() {
    let rows = sorted(
        vec![json!({"s": "pear"}), json!({"s": "apple"}), json!({"s": "fig"})],
        json!([{"field": "s"}]),
    );
    assert_eq!(
        values_of(&rows, "s"),
        [json!("apple"), json!("fig"), json!("pear")]
    );
}

#[test]
fn booleans_sort_false_before_true() {
    let rows = sorted(
        vec![json!({"b": true}), json!({"b": false}), json!({"b": true})],
        json!([{"field": "b"}]),
    );
    assert_eq!(
        values_of(&rows, "b"),
        [json!(false), json!(true), json!(true)]
    );
}

// ── Mixed-type columns ───────────────────────────────────────────

#[test]
fn mixed_types_follow_the_rank_order() {
    let rows = sorted(
        vec![
            json!({"v": 7}),
            json!({"v": null}),
            json!({"v": "text"}),
            json!({"v": {"nested": 1}}),
            json!({"v": true}),
            json!({"v": [1, 2]}),
        ],
        json!([{"field": "v"}]),
    );
    // Containers, strings, booleans, numbers, null.
    assert_eq!(
        values_of(&rows, "v"),
        [
            json!({"nested": 1}),
            json!([1, 2]),
            json!("text"),
            json!(true),
            json!(7),
            json!(null),
        ]
    );
}

#[test]
fn missing_fields_sort_after_null() {
    let rows = sorted(
        vec![
            json!({"v": null, "tag": "null"}),
            json!({"tag": "missing"}),
            json!({"v": 1, "tag": "number"}),
        ],
        json!([{"field": "v"}]),
    );
    assert_eq!(
        values_of(&rows, "tag"),
        [json!("number"), json!("null"), json!("missing")]
    );
}

#[test]
fn same_rank_containers_keep_id_order() {
    let rows = sorted(
        vec![
            json!({"v": {"b": 2}, "i": 0}),
            json!({"v": [9], "i": 1}),
            json!({"v": {"a": 1}, "i": 2}),
        ],
        json!([{"field": "v"}]),
    );
    assert_eq!(values_of(&rows, "i"), [json!(0), json!(1), json!(2)]);
}

#[test]
fn descending_reverses_ranks_and_ties() {
    let rows = sorted(
        vec![
            json!({"v": 1, "i": 0}),
            json!({"v": null, "i": 1}),
            json!({"v": "s", "i": 2}),
            json!({"v": "s", "i": 3}),
        ],
        json!([{"field": "v", "sort": "DESC"}]),
    );
    // null first, then numbers, then the equal strings by descending id.
    assert_eq!(
        values_of(&rows, "i"),
        [json!(1), json!(0), json!(3), json!(2)]
    );
}

#[test]
fn equal_numbers_across_representations_tie_by_id() {
    let rows = sorted(
        vec![
            json!({"v": 2.0, "i": 0}),
            json!({"v": 2, "i": 1}),
            json!({"v": 1, "i": 2}),
        ],
        json!([{"field": "v"}]),
    );
    assert_eq!(values_of(&rows, "i"), [json!(2), json!(0), json!(1)]);
}

// ── Multi-term ordering ──────────────────────────────────────────

fn crew() -> Vec<Value> {
    vec![
        json!({"last_name": "Stark", "age": 40}),
        json!({"last_name": "Snow", "age": 30}),
        json!({"last_name": "Stark", "age": 10}),
        json!({"last_name": "Snow", "age": 50}),
    ]
}

#[test]
fn first_declared_term_is_most_significant() {
    let rows = sorted(crew(), json!([{"field": "last_name"}, {"field": "age"}]));
    assert_eq!(
        values_of(&rows, "age"),
        [json!(30), json!(50), json!(10), json!(40)]
    );
}

#[test]
fn swapping_term_order_changes_the_grouping() {
    let rows = sorted(crew(), json!([{"field": "age"}, {"field": "last_name"}]));
    assert_eq!(
        values_of(&rows, "age"),
        [json!(10), json!(30), json!(40), json!(50)]
    );
}

#[test]
fn secondary_term_orders_within_primary_ties() {
    let rows = sorted(
        crew(),
        json!([{"field": "last_name"}, {"field": "age", "sort": "DESC"}]),
    );
    assert_eq!(
        values_of(&rows, "age"),
        [json!(50), json!(30), json!(40), json!(10)]
    );
}

#[test]
fn full_ties_break_by_id_in_the_last_terms_direction() {
    let rows = sorted(
        vec![
            json!({"a": 1, "b": "x", "i": 0}),
            json!({"a": 1, "b": "x", "i": 1}),
            json!({"a": 1, "b": "x", "i": 2}),
        ],
        json!([{"field": "a"}, {"field": "b", "sort": "DESC"}]),
    );
    assert_eq!(values_of(&rows, "i"), [json!(2), json!(1), json!(0)]);
}

// ── Determinism ──────────────────────────────────────────────────

#[test]
fn repeated_sorts_are_identical() {
    let dataset = vec![
        json!({"v": 3, "w": "a"}),
        json!({"v": null, "w": "b"}),
        json!({"v": 3, "w": "a"}),
        json!({"v": [1], "w": null}),
        json!({"w": "c"}),
        json!({"v": true, "w": "a"}),
    ];
    let spec = json!([{"field": "v", "sort": "DESC"}, {"field": "w"}]);
    let first = sorted(dataset.clone(), spec.clone());
    let second = sorted(dataset, spec);
    assert_eq!(first, second);
}
