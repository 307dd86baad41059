use docsync::{
    bson::{Bson, doc},
    memory::InMemoryStore,
    prelude::*,
};

const TABLE: &str = "odm-users";

async fn seeded() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_documents(
            TABLE,
            [
                Bson::Document(doc! { "id": 1_i64, "name": "Alice", "hometown": "NY", "age": 12_i64, "wage": 2000.5 }),
                Bson::Document(doc! { "id": 2_i64, "name": "Bob", "hometown": "NY", "age": 30_i64, "wage": 3500.0 }),
                Bson::Document(doc! { "id": 3_i64, "name": "Carol", "hometown": "LA", "age": 45_i64, "wage": 4200.0 }),
            ],
        )
        .await;
    store
}

fn types() -> AttributeTypes {
    AttributeTypes::new()
        .with("id", AttributeType::Number)
        .with("age", AttributeType::Number)
        .with("wage", AttributeType::Number)
        .with("hometown", AttributeType::String)
}

fn names(documents: &[Bson]) -> Vec<&str> {
    documents
        .iter()
        .filter_map(|document| document.as_document()?.get_str("name").ok())
        .collect()
}

#[tokio::test]
async fn key_conditions_select_matching_documents() {
    let store = seeded().await;

    let found = ConditionQuery::key_conditions("#hometown = :town AND #age >= :age")
        .field("#hometown", "hometown")
        .field("#age", "age")
        .param(":town", "NY")
        .param(":age", "18")
        .attribute_types(types())
        .find(&store, TABLE)
        .await
        .unwrap();

    assert_eq!(names(&found), vec!["Bob"]);
}

#[tokio::test]
async fn between_bounds_are_inclusive() {
    let store = seeded().await;

    let count = ConditionQuery::filter_expression("#age BETWEEN :lo AND :hi")
        .field("#age", "age")
        .param(":lo", "12")
        .param(":hi", "30")
        .attribute_types(types())
        .count(&store, TABLE)
        .await
        .unwrap();

    assert_eq!(count, 2);
}

#[tokio::test]
async fn decimal_values_compare_as_doubles() {
    let store = seeded().await;

    let found = ConditionQuery::filter_expression("#wage > :wage")
        .field("#wage", "wage")
        .param(":wage", "3500.0")
        .attribute_types(types())
        .find(&store, TABLE)
        .await
        .unwrap();

    assert_eq!(names(&found), vec!["Carol"]);
}

#[tokio::test]
async fn empty_scan_returns_everything() {
    let store = seeded().await;

    let found = ConditionQuery::filter_expression("")
        .find(&store, TABLE)
        .await
        .unwrap();

    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn empty_key_condition_is_rejected() {
    let store = seeded().await;

    let err = ConditionQuery::key_conditions("  ")
        .find(&store, TABLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DocSyncError::Validation(message) if message == "Query condition is empty"));
}

#[tokio::test]
async fn unknown_placeholders_fail_before_reaching_the_store() {
    let store = seeded().await;

    let err = ConditionQuery::key_conditions("#id = :id")
        .param(":id", "1")
        .attribute_types(types())
        .count(&store, TABLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DocSyncError::Validation(_)));
}

#[tokio::test]
async fn missing_table_matches_nothing() {
    let store = seeded().await;

    let count = ConditionQuery::key_conditions("#id = :id")
        .field("#id", "id")
        .param(":id", "1")
        .attribute_types(types())
        .count(&store, "odm-ghosts")
        .await
        .unwrap();

    assert_eq!(count, 0);
}
