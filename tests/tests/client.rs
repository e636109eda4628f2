use pretty_assertions::assert_eq;
use tests::prelude::*;

fn events() -> tabula::schema::Table {
    table(
        "events",
        [
            Column::new("kind", ColumnType::String),
            Column::new("payload", ColumnType::Json).nullable(),
        ],
    )
}

async fn tables_registered_at_runtime(test: &mut DbTest) {
    let client = test.setup_db([]).await;
    assert!(client.tables().is_empty());

    client.add_table(events()).unwrap();
    assert_eq!(client.tables(), ["events"]);
    client.schema().create_all([]).await.unwrap();

    let events = client.table("events").unwrap();
    let created = events
        .create()
        .set_value("kind", "signup")
        .set_value("payload", serde_json::json!({"plan": "free"}))
        .save()
        .await
        .unwrap();

    let loaded = events.get(created.id).await.unwrap();
    assert_eq!(loaded.get("kind"), Some(&Value::from("signup")));
    assert_eq!(
        loaded.get("payload").and_then(Value::as_json),
        Some(&serde_json::json!({"plan": "free"}))
    );

    // Handles keep the descriptor they were built with
    assert!(client.delete_table("events").is_some());
    assert!(client.table("events").unwrap_err().is_validation());
    assert_eq!(events.query().count().await.unwrap(), 1);
}

async fn debug_client_runs_the_same_statements(test: &mut DbTest) {
    let client = test.setup_db([events()]).await;
    let debug = client.debug();
    assert!(debug.is_debug());

    debug
        .table("events")
        .unwrap()
        .create()
        .set_value("kind", "login")
        .save()
        .await
        .unwrap();

    let found = client
        .table("events")
        .unwrap()
        .query()
        .filter(string_eq("kind", "login"))
        .exist()
        .await
        .unwrap();
    assert!(found);

    let log = test.log();
    assert_eq!(log.inserts(), 1);
    assert_eq!(log.selects(Some("events")), 1);
}

async fn dialect_matches_backend(test: &mut DbTest) {
    let client = test.setup_db([]).await;
    assert_eq!(client.capability(), test.capability());
    assert_eq!(client.dialect(), test.capability().dialect);
}

async fn closed_client(test: &mut DbTest) {
    let client = test.setup_db([events()]).await;
    let events = client.table("events").unwrap();

    client.close();
    assert!(client.is_closed());

    let err = events.query().all().await.unwrap_err();
    assert!(err.is_connection_pool(), "{err}");
}

tests!(
    tables_registered_at_runtime,
    debug_client_runs_the_same_statements,
    dialect_matches_backend,
    closed_client,
);
