use rstest::rstest;
use serde_json::{Value, json};
use thenable::context::{Collection, ContextError, Optional, StepResult};

// =============================================================================
// Collection
// =============================================================================

#[rstest]
fn json_array_becomes_collection() {
    let collection = Collection::<Value>::try_from(json!([1, 2, 3])).unwrap();
    let doubled = collection.bind(|value| StepResult::Value(value.as_i64().unwrap_or(0) * 2));
    assert_eq!(doubled.into_vec(), vec![2, 4, 6]);
}

#[rstest]
fn json_null_becomes_empty_collection() {
    let collection = Collection::<Value>::try_from(Value::Null).unwrap();
    assert!(collection.is_empty());
}

#[rstest]
fn nested_json_arrays_stay_single_elements() {
    let collection = Collection::<Value>::try_from(json!([[1, 2], [3]])).unwrap();
    assert_eq!(collection.len(), 2);
}

#[rstest]
#[case(json!(42))]
#[case(json!("text"))]
#[case(json!({"key": "value"}))]
#[case(json!(true))]
fn non_array_json_is_rejected_eagerly(#[case] input: Value) {
    let error = Collection::<Value>::try_from(input).unwrap_err();
    assert!(matches!(
        error,
        ContextError::InvalidRepresentation {
            context: "Collection",
            ..
        }
    ));
}

// =============================================================================
// Optional
// =============================================================================

#[rstest]
fn json_null_is_absent() {
    let optional = Optional::<Value>::from(Value::Null);
    assert!(optional.is_absent());
}

#[rstest]
fn json_lookup_chain() {
    let document = json!({"author": {"name": "ada", "email": null}});
    let field = |name: &'static str| {
        move |value: Value| StepResult::Wrapped(Optional::<Value>::from(value[name].clone()))
    };

    let name = Optional::<Value>::from(document.clone())
        .bind(field("author"))
        .bind(field("name"));
    let email = Optional::<Value>::from(document)
        .bind(field("author"))
        .bind(field("email"));

    assert_eq!(name, Optional::present(json!("ada")));
    assert!(email.is_absent());
}
