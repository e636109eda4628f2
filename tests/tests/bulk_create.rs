use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tests::prelude::*;

fn items() -> tabula::schema::Table {
    table(
        "items",
        [
            Column::new("name", ColumnType::String).unique(),
            Column::new("qty", ColumnType::Int32).default_value(1),
            Column::new("note", ColumnType::String).nullable(),
        ],
    )
}

async fn bulk_create_assigns_ids(test: &mut DbTest) {
    let client = test.setup_db([items()]).await;
    let items = client.table("items").unwrap();

    let mut log = test.log();
    log.clear();

    let created = items
        .create_bulk([
            items.create().set_value("name", "a"),
            items.create().set_value("name", "b").set_value("qty", 5),
            items.create().set_value("name", "c").set_value("note", "x"),
        ])
        .save()
        .await
        .unwrap();

    // A single statement
    assert_eq!(log.inserts(), 1);

    let ids: Vec<i64> = created.iter().map(|entity| entity.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    assert_eq!(created[0].get("qty"), Some(&Value::I64(1)));
    assert_eq!(created[1].get("qty"), Some(&Value::I64(5)));
    assert_eq!(created[2].get("note"), Some(&Value::from("x")));

    for entity in &created {
        let loaded = items.get(entity.id).await.unwrap();
        assert_eq!(loaded.get("name"), entity.get("name"));
        assert_eq!(loaded.get("qty"), entity.get("qty"));
    }
}

async fn bulk_create_is_atomic(test: &mut DbTest) {
    let client = test.setup_db([items()]).await;
    let items = client.table("items").unwrap();

    let err = items
        .create_bulk([
            items.create().set_value("name", "dup"),
            items.create().set_value("name", "dup"),
        ])
        .save()
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "{err}");

    assert_eq!(items.query().count().await.unwrap(), 0);
}

async fn bulk_create_validates_every_row(test: &mut DbTest) {
    let client = test.setup_db([items()]).await;
    let items = client.table("items").unwrap();

    let err = items
        .create_bulk([
            items.create().set_value("name", "a"),
            items.create().set_value("qty", 2),
        ])
        .save()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(test.log().is_empty());
}

async fn bulk_create_hooks(test: &mut DbTest) {
    let client = test.setup_db([items()]).await;
    let items = client.table("items").unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();

    let created = items
        .create_bulk([
            items.create().set_value("name", "a"),
            items.create().set_value("name", "b"),
        ])
        .before_each(|mutation| {
            mutation.set_value("note", "hooked");
            Ok(())
        })
        .after_each(move |entity| {
            assert!(entity.id > 0);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .save()
        .await
        .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert!(created
        .iter()
        .all(|entity| entity.get("note") == Some(&Value::from("hooked"))));
}

async fn bulk_create_hook_aborts(test: &mut DbTest) {
    let client = test.setup_db([items()]).await;
    let items = client.table("items").unwrap();

    let err = items
        .create_bulk([items.create().set_value("name", "a")])
        .before_each(|_| {
            Err(tabula::Error::validation(
                None::<String>,
                "rejected by hook",
            ))
        })
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_validation(), "{err}");
    assert_eq!(items.query().count().await.unwrap(), 0);
}

tests!(
    bulk_create_assigns_ids,
    bulk_create_is_atomic,
    bulk_create_validates_every_row,
    bulk_create_hooks,
    bulk_create_hook_aborts,
);
