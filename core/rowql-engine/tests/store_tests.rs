use pretty_assertions::assert_eq;
use rowql_engine::{EngineError, Store};
use serde_json::{Value, json};

fn got_dataset() -> Vec<Value> {
    vec![
        json!({"first_name": "Eddard", "last_name": "Stark", "age": 35, "location": "Winterfell"}),
        json!({"first_name": "Jon", "last_name": "Snow", "age": 14, "location": "Winterfell"}),
        json!({"first_name": "Arya", "last_name": "Stark", "age": 9, "location": "Winterfell"}),
    ]
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn empty_dataset_builds_with_no_fields() {
    let store = Store::new(vec![]).unwrap();
    assert!(store.is_empty());
    assert!(store.fields().is_empty());
    assert!(store.rows().is_empty());
}

#[test]
fn from_json_requires_an_array() {
    assert!(matches!(
        Store::from_json(json!({})),
        Err(EngineError::InvalidDataset)
    ));
    assert!(matches!(
        Store::from_json(json!("nope")),
        Err(EngineError::InvalidDataset)
    ));
    assert!(Store::from_json(json!([])).is_ok());
}

#[test]
fn canonical_fields_come_from_the_first_record() {
    let store = Store::new(got_dataset()).unwrap();
    let mut fields = store.fields();
    fields.sort();
    assert_eq!(fields, ["age", "first_name", "last_name", "location"]);
}

#[test]
fn projection_must_return_an_object() {
    let result = Store::with_projection(got_dataset(), |record: &Value| {
        record.get("age").cloned().unwrap_or(Value::Null)
    });
    assert!(matches!(result, Err(EngineError::InvalidProjection)));
}

// ── Row view ─────────────────────────────────────────────────────

#[test]
fn row_ids_are_original_indices() {
    let store = Store::new(got_dataset()).unwrap();
    let rows = store.rows();
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.id, i);
    }
    assert_eq!(rows[1].fields.get("first_name"), Some(&json!("Jon")));
}

#[test]
fn rows_are_restricted_to_canonical_fields() {
    let store = Store::new(vec![
        json!({"a": 1, "b": 2}),
        json!({"a": 3, "b": 4, "c": 5}),
    ])
    .unwrap();
    let rows = store.rows();
    assert_eq!(rows[1].fields.get("a"), Some(&json!(3)));
    // "c" is not in the schema derived from the first record.
    assert_eq!(rows[1].fields.get("c"), None);
}

#[test]
fn records_missing_canonical_fields_leave_them_absent() {
    let store = Store::new(vec![json!({"a": 1, "b": 2}), json!({"a": 3})]).unwrap();
    let rows = store.rows();
    assert_eq!(rows[1].fields.get("b"), None);
}

#[test]
fn custom_projection_shapes_the_row_view() {
    let store = Store::with_projection(got_dataset(), |record: &Value| {
        json!({
            "name": format!(
                "{} {}",
                record["first_name"].as_str().unwrap_or(""),
                record["last_name"].as_str().unwrap_or("")
            )
        })
    })
    .unwrap();
    assert_eq!(store.fields(), ["name"]);
    assert_eq!(store.rows()[1].fields.get("name"), Some(&json!("Jon Snow")));
}

// ── Changeset and commit ─────────────────────────────────────────

#[test]
fn changeset_starts_empty() {
    let store = Store::new(got_dataset()).unwrap();
    assert!(store.changeset().is_empty());
}

#[test]
fn apply_field_update_marks_the_changeset() {
    let store = Store::new(got_dataset()).unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert("age".to_string(), json!(15));
    let updated = store.apply_field_update(1, &fields).unwrap();
    assert_eq!(updated["age"], json!(15));
    assert_eq!(updated["first_name"], json!("Jon"));

    let changed = store.changeset();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0]["first_name"], json!("Jon"));
}

#[test]
fn apply_field_update_does_not_rebuild_the_row_view() {
    let store = Store::new(got_dataset()).unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert("age".to_string(), json!(15));
    store.apply_field_update(1, &fields).unwrap();
    // Stale until reinitialize.
    assert_eq!(store.rows()[1].fields.get("age"), Some(&json!(14)));
    store.reinitialize().unwrap();
    assert_eq!(store.rows()[1].fields.get("age"), Some(&json!(15)));
}

#[test]
fn update_out_of_range_is_row_not_found() {
    let store = Store::new(got_dataset()).unwrap();
    let fields = serde_json::Map::new();
    assert!(matches!(
        store.apply_field_update(99, &fields),
        Err(EngineError::RowNotFound(99))
    ));
}

#[test]
fn scalar_records_reject_updates() {
    let store = Store::with_projection(vec![json!(1), json!(2)], |record: &Value| {
        json!({"value": record})
    })
    .unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert("value".to_string(), json!(9));
    assert!(matches!(
        store.apply_field_update(0, &fields),
        Err(EngineError::ReadOnlyProjection(_))
    ));
}

#[test]
fn commit_keeps_values_and_forgets_the_changeset() {
    let store = Store::new(got_dataset()).unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert("age".to_string(), json!(15));
    store.apply_field_update(1, &fields).unwrap();
    assert_eq!(store.changeset().len(), 1);

    let snapshot = store.commit().unwrap();
    assert!(snapshot.changeset().is_empty());
    assert_eq!(snapshot.rows()[1].fields.get("age"), Some(&json!(15)));
}

#[test]
fn commit_is_independent_of_the_original() {
    let store = Store::new(got_dataset()).unwrap();
    let snapshot = store.commit().unwrap();

    let mut fields = serde_json::Map::new();
    fields.insert("age".to_string(), json!(99));
    store.apply_field_update(0, &fields).unwrap();
    store.reinitialize().unwrap();

    assert_eq!(store.rows()[0].fields.get("age"), Some(&json!(99)));
    assert_eq!(snapshot.rows()[0].fields.get("age"), Some(&json!(35)));
}
