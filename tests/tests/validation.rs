use tests::prelude::*;

fn test_aaa() -> tabula::schema::Table {
    table(
        "test_aaa",
        [
            Column::new("field1", ColumnType::Int64),
            Column::new("label", ColumnType::String).size(8).nullable(),
        ],
    )
}

async fn unknown_column_in_predicate(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let err = aaa
        .query()
        .filter(int_eq("nonexistent", 1))
        .all()
        .await
        .unwrap_err();

    assert!(err.is_validation(), "{err}");
    assert!(err.to_string().contains("nonexistent"), "{err}");

    // Rejected before any SQL is dispatched
    assert!(test.log().is_empty());
}

async fn unknown_table(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;

    let err = client.table("test_bbb").unwrap_err();
    assert!(err.is_validation(), "{err}");
}

async fn mismatched_value_types(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let err = aaa
        .query()
        .filter(string_eq("field1", "one"))
        .count()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .create()
        .set_value("field1", "one")
        .save()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .create()
        .set_value("field1", 1)
        .set_value("label", "longer than eight")
        .save()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(test.log().is_empty());
}

async fn invalid_mutations(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    // Typo in the column name
    let err = aaa
        .create()
        .set_value("feild1", 1)
        .save()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .create()
        .set_value("field1", 1)
        .add_value("label", 1)
        .save()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .update()
        .clear_value("field1")
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa.create().save().await.unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .update()
        .set_value("id", 3)
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(test.log().is_empty());
}

async fn unknown_order_and_selection(test: &mut DbTest) {
    let client = test.setup_db([test_aaa()]).await;
    let aaa = client.table("test_aaa").unwrap();

    let err = aaa
        .query()
        .order(Order::asc("nope"))
        .all()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa.query().select(["nope"]).scan().await.unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = aaa
        .query()
        .filter(string_contains("field1", "1"))
        .exist()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(test.log().is_empty());
}

tests!(
    unknown_column_in_predicate,
    unknown_table,
    mismatched_value_types,
    invalid_mutations,
    unknown_order_and_selection,
);
