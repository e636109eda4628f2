use tests::prelude::*;

fn test_aaa() -> tabula::schema::Table {
    table(
        "test_aaa",
        [
            Column::new("field1", ColumnType::Int64),
            Column::new("field2", ColumnType::Int64).nullable(),
        ],
    )
}

async fn crud_on_runtime_table(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa
        .create()
        .set_value("field1", 1)
        .set_value("field2", 2)
        .save()
        .await
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.get("field1"), Some(&Value::I64(1)));
    assert_eq!(created.get("field2"), Some(&Value::I64(2)));

    let updated = created
        .update()
        .unwrap()
        .set_value("field1", 4)
        .save()
        .await
        .unwrap();

    assert_eq!(updated.id, 1);
    assert_eq!(updated.get("field1"), Some(&Value::I64(4)));
    assert_eq!(updated.get("field2"), Some(&Value::I64(2)));

    updated.delete().unwrap().exec().await.unwrap();

    let err = aaa.get(1).await.unwrap_err();
    assert!(err.is_record_not_found(), "{err}");
}

async fn create_then_get(test: &mut DbTest) {
    let client = test.setup_db([table(
        "people",
        [
            Column::new("name", ColumnType::String),
            Column::new("age", ColumnType::Int32).nullable(),
            Column::new("active", ColumnType::Bool).default_value(true),
            Column::new("score", ColumnType::Float64).nullable(),
        ],
    )])
    .await;
    let people = client.table("people").unwrap();

    let created = people
        .create()
        .set_value("name", "Ada")
        .set_value("age", 36)
        .set_value("score", 9.5)
        .save()
        .await
        .unwrap();

    // Default filled in on the client
    assert_eq!(created.get("active"), Some(&Value::Bool(true)));

    let loaded = people.get(created.id).await.unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.row, created.row);
    assert_eq!(loaded.table(), "people");
}

async fn create_with_explicit_id(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa
        .create()
        .set_id(42)
        .set_value("field1", 1)
        .save()
        .await
        .unwrap();

    assert_eq!(created.id, 42);
    assert_eq!(aaa.get(42).await.unwrap().get("field2"), Some(&Value::Null));
}

async fn update_one_is_idempotent(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa.create().set_value("field1", 1).save().await.unwrap();

    let once = aaa
        .update_one(&created)
        .set_value("field2", 9)
        .save()
        .await
        .unwrap();
    let twice = aaa
        .update_one(&created)
        .set_value("field2", 9)
        .save()
        .await
        .unwrap();

    assert_eq!(once.row, twice.row);
    assert_eq!(aaa.get(created.id).await.unwrap().row, once.row);
}

async fn update_one_missing_row(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let err = aaa
        .update_one_id(99)
        .set_value("field1", 1)
        .save()
        .await
        .unwrap_err();

    assert!(err.is_record_not_found(), "{err}");
}

async fn update_one_select_limits_columns(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa
        .create()
        .set_value("field1", 1)
        .set_value("field2", 2)
        .save()
        .await
        .unwrap();

    let updated = aaa
        .update_one_id(created.id)
        .set_value("field1", 3)
        .select(["field1"])
        .save()
        .await
        .unwrap();

    assert_eq!(updated.get("field1"), Some(&Value::I64(3)));
    assert_eq!(updated.get("field2"), None);
}

async fn update_many_with_predicates(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    for field1 in [1, 1, 2] {
        aaa.create().set_value("field1", field1).save().await.unwrap();
    }

    let count = aaa
        .update()
        .filter(int_eq("field1", 1))
        .set_value("field2", 5)
        .exec()
        .await
        .unwrap();
    assert_eq!(count, 2);

    let updated = aaa.query().filter(int_eq("field2", 5)).count().await.unwrap();
    assert_eq!(updated, 2);
}

async fn add_and_clear_values(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa
        .create()
        .set_value("field1", 10)
        .clear_value("field2")
        .save()
        .await
        .unwrap();
    assert_eq!(created.get("field2"), Some(&Value::Null));

    // The NULL column is treated as 0
    let updated = aaa
        .update_one_id(created.id)
        .add_value("field1", 5)
        .add_value("field2", 3)
        .save()
        .await
        .unwrap();

    assert_eq!(updated.get("field1"), Some(&Value::I64(15)));
    assert_eq!(updated.get("field2"), Some(&Value::I64(3)));

    let cleared = updated
        .update()
        .unwrap()
        .clear_value("field2")
        .save()
        .await
        .unwrap();
    assert_eq!(cleared.get("field2"), Some(&Value::Null));
}

async fn old_value_of_update_one(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa.create().set_value("field1", 1).save().await.unwrap();

    let update = aaa.update_one_id(created.id).set_value("field1", 2);
    assert_eq!(update.mutation().old_value("field1").await.unwrap(), Value::I64(1));
    assert_eq!(update.mutation().value("field1"), Some(&Value::I64(2)));

    let update = aaa.update().set_value("field1", 3);
    assert!(update
        .mutation()
        .old_value("field1")
        .await
        .unwrap_err()
        .is_validation());
}

async fn delete_many_and_one(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let mut ids = vec![];
    for field1 in [1, 2, 3] {
        ids.push(aaa.create().set_value("field1", field1).save().await.unwrap().id);
    }

    let deleted = aaa.delete().filter(int_gt("field1", 1)).exec().await.unwrap();
    assert_eq!(deleted, 2);

    aaa.delete_one_id(ids[0]).exec().await.unwrap();

    let err = aaa.delete_one_id(ids[0]).exec().await.unwrap_err();
    assert!(err.is_record_not_found(), "{err}");

    let err = aaa.get(ids[0]).await.unwrap_err();
    assert!(err.is_record_not_found(), "{err}");
    assert_eq!(aaa.query().count().await.unwrap(), 0);
}

async fn entities_do_not_keep_the_client_alive(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let created = aaa.create().set_value("field1", 1).save().await.unwrap();

    drop(aaa);
    drop(client);

    let err = created.update().unwrap_err();
    assert!(err.is_connection_pool(), "{err}");
}

tests!(
    crud_on_runtime_table,
    create_then_get,
    create_with_explicit_id,
    update_one_is_idempotent,
    update_one_missing_row,
    update_one_select_limits_columns,
    update_many_with_predicates,
    add_and_clear_values,
    old_value_of_update_one,
    delete_many_and_one,
    entities_do_not_keep_the_client_alive,
);
