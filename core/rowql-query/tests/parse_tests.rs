use pretty_assertions::assert_eq;
use rowql_query::{
    Limit, Operator, OrderTerm, QueryError, SortDirection, validate_fields, validate_limit,
    validate_order, validate_query, validate_query_object,
};
use serde_json::json;

// ── Query shape ──────────────────────────────────────────────────

#[test]
fn query_must_be_an_array() {
    assert_eq!(
        validate_query(&json!({}), None),
        Err(QueryError::InvalidQuery)
    );
    assert_eq!(
        validate_query(&json!("nope"), None),
        Err(QueryError::InvalidQuery)
    );
    assert!(validate_query(&json!([]), None).is_ok());
}

#[test]
fn clause_must_be_an_object() {
    assert_eq!(
        validate_query(&json!([null]), None),
        Err(QueryError::InvalidClause)
    );
    assert_eq!(
        validate_query(&json!([[1, 2]]), None),
        Err(QueryError::InvalidClause)
    );
}

#[test]
fn empty_query_has_no_clauses() {
    let query = validate_query(&json!([]), None).unwrap();
    assert!(query.clauses.is_empty());
}

#[test]
fn empty_clause_has_no_statements() {
    let query = validate_query(&json!([{}]), None).unwrap();
    assert_eq!(query.clauses.len(), 1);
    assert!(query.clauses[0].statements.is_empty());
}

// ── Key splitting ────────────────────────────────────────────────

#[test]
fn bare_key_defaults_to_is() {
    let clause = validate_query_object(&json!({"last_name": "Snow"}), None).unwrap();
    assert_eq!(clause.statements.len(), 1);
    assert_eq!(clause.statements[0].field, "last_name");
    assert_eq!(clause.statements[0].operator, Operator::Is);
    assert_eq!(clause.statements[0].value, json!("Snow"));
}

#[test]
fn suffixed_key_selects_operator() {
    let clause = validate_query_object(&json!({"age__gte": 33}), None).unwrap();
    assert_eq!(clause.statements[0].field, "age");
    assert_eq!(clause.statements[0].operator, Operator::Gte);
}

#[test]
fn field_names_may_contain_the_delimiter() {
    let clause = validate_query_object(&json!({"meta__data__is": 1}), None).unwrap();
    assert_eq!(clause.statements[0].field, "meta__data");
    assert_eq!(clause.statements[0].operator, Operator::Is);
}

#[test]
fn field_named_like_an_operator_stays_a_field() {
    let clause = validate_query_object(&json!({"is": 1}), None).unwrap();
    assert_eq!(clause.statements[0].field, "is");
    assert_eq!(clause.statements[0].operator, Operator::Is);
}

#[test]
fn multiple_operators_on_one_field_all_parse() {
    let clause =
        validate_query_object(&json!({"age__gte": 30, "age__lt": 40}), None).unwrap();
    assert_eq!(clause.statements.len(), 2);
    assert!(clause.statements.iter().all(|s| s.field == "age"));
}

#[test]
fn unknown_operator_is_rejected_by_name() {
    assert_eq!(
        validate_query(&json!([{"key__NO_OP": true}]), None),
        Err(QueryError::UnknownOperator("NO_OP".to_string()))
    );
    assert_eq!(
        validate_query(&json!([{"field__foo": 1}]), None),
        Err(QueryError::UnknownOperator("foo".to_string()))
    );
}

// ── Field allowlist ──────────────────────────────────────────────

#[test]
fn allowlist_restricts_fields() {
    let fields = vec!["age".to_string(), "last_name".to_string()];
    assert!(validate_query(&json!([{"age__gt": 1}]), Some(&fields)).is_ok());
    assert_eq!(
        validate_query(&json!([{"height__gt": 1}]), Some(&fields)),
        Err(QueryError::InvalidField("height".to_string()))
    );
}

#[test]
fn empty_allowlist_allows_everything() {
    assert!(validate_query(&json!([{"anything": 1}]), Some(&[])).is_ok());
}

// ── Limit ────────────────────────────────────────────────────────

#[test]
fn limit_defaults_to_zero_zero() {
    assert_eq!(
        validate_limit(&json!({})).unwrap(),
        Limit { offset: 0, count: 0 }
    );
    assert_eq!(
        validate_limit(&json!({"offset": 10})).unwrap(),
        Limit { offset: 10, count: 0 }
    );
    assert_eq!(
        validate_limit(&json!({"count": 5})).unwrap(),
        Limit { offset: 0, count: 5 }
    );
}

#[test]
fn limit_rejects_non_objects() {
    assert!(validate_limit(&json!(true)).is_err());
    assert!(validate_limit(&json!([])).is_err());
    assert!(validate_limit(&json!(null)).is_err());
}

#[test]
fn limit_rejects_unknown_keys() {
    assert!(matches!(
        validate_limit(&json!({"INVALID": 10})),
        Err(QueryError::InvalidLimit(msg)) if msg.contains("INVALID")
    ));
}

#[test]
fn limit_rejects_non_integers_and_negatives() {
    assert!(validate_limit(&json!({"offset": -1})).is_err());
    assert!(validate_limit(&json!({"count": 1.5})).is_err());
    assert!(validate_limit(&json!({"offset": "3"})).is_err());
}

// ── Order ────────────────────────────────────────────────────────

#[test]
fn order_parses_terms_with_default_direction() {
    let order = validate_order(&json!([{"field": "age"}]), None).unwrap();
    assert_eq!(
        order,
        vec![OrderTerm {
            field: "age".to_string(),
            sort: SortDirection::Asc,
        }]
    );
}

#[test]
fn order_parses_explicit_directions() {
    let order = validate_order(
        &json!([{"field": "age", "sort": "DESC"}, {"field": "name", "sort": "ASC"}]),
        None,
    )
    .unwrap();
    assert_eq!(order[0].sort, SortDirection::Desc);
    assert_eq!(order[1].sort, SortDirection::Asc);
}

#[test]
fn order_requires_a_string_field() {
    assert!(validate_order(&json!([{"sort": "ASC"}]), None).is_err());
    assert!(validate_order(&json!([{"field": 3}]), None).is_err());
}

#[test]
fn order_rejects_bad_shapes() {
    assert!(validate_order(&json!({}), None).is_err());
    assert!(validate_order(&json!([null]), None).is_err());
    assert!(validate_order(&json!([{"field": "a", "sort": "desc"}]), None).is_err());
    assert!(validate_order(&json!([{"field": "a", "extra": 1}]), None).is_err());
}

#[test]
fn order_honors_the_allowlist() {
    let fields = vec!["age".to_string()];
    assert!(validate_order(&json!([{"field": "age"}]), Some(&fields)).is_ok());
    assert_eq!(
        validate_order(&json!([{"field": "height"}]), Some(&fields)),
        Err(QueryError::InvalidField("height".to_string()))
    );
}

// ── Update fields ────────────────────────────────────────────────

#[test]
fn fields_must_be_a_plain_object() {
    let fields = validate_fields(&json!({"lives_remaining": 9})).unwrap();
    assert_eq!(fields.get("lives_remaining"), Some(&json!(9)));
    assert_eq!(validate_fields(&json!([])), Err(QueryError::InvalidFields));
    assert_eq!(validate_fields(&json!(null)), Err(QueryError::InvalidFields));
    assert_eq!(validate_fields(&json!("x")), Err(QueryError::InvalidFields));
}
