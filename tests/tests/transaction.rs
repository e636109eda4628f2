use tabula::{driver::IsolationLevel, TxOptions};
use tests::prelude::*;

fn accounts() -> tabula::schema::Table {
    table(
        "accounts",
        [
            Column::new("owner", ColumnType::String),
            Column::new("balance", ColumnType::Int64).default_value(0),
        ],
    )
}

async fn commit_makes_changes_visible(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let tx = client.tx().await.unwrap();
    assert!(tx.is_transactional());

    let accounts = tx.table("accounts").unwrap();
    accounts.create().set_value("owner", "a").save().await.unwrap();
    accounts.create().set_value("owner", "b").save().await.unwrap();
    drop(accounts);

    tx.commit().await.unwrap();

    let accounts = client.table("accounts").unwrap();
    assert_eq!(accounts.query().count().await.unwrap(), 2);
    assert!(test.log().has_commit());
}

async fn rollback_discards_changes(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let tx = client.tx().await.unwrap();
    tx.table("accounts")
        .unwrap()
        .create()
        .set_value("owner", "a")
        .save()
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let accounts = client.table("accounts").unwrap();
    assert_eq!(accounts.query().count().await.unwrap(), 0);
}

async fn dropped_transaction_rolls_back(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    {
        let tx = client.tx().await.unwrap();
        tx.table("accounts")
            .unwrap()
            .create()
            .set_value("owner", "a")
            .save()
            .await
            .unwrap();
    }

    let accounts = client.table("accounts").unwrap();
    assert_eq!(accounts.query().count().await.unwrap(), 0);
    assert!(test.log().has_rollback());
}

async fn nested_transactions_fail(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let tx = client.tx().await.unwrap();
    let err = tx.tx().await.unwrap_err();
    assert!(err.is_transaction(), "{err}");

    tx.rollback().await.unwrap();
}

async fn begin_tx_with_options(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let tx = client
        .begin_tx(TxOptions::default().isolation(IsolationLevel::Serializable))
        .await
        .unwrap();

    let account = tx
        .table("accounts")
        .unwrap()
        .create()
        .set_value("owner", "a")
        .save()
        .await
        .unwrap();
    assert!(account.is_transactional());

    tx.commit().await.unwrap();

    let loaded = client.table("accounts").unwrap().get(account.id).await.unwrap();
    assert!(!loaded.is_transactional());
}

async fn unwrap_tx_after_commit(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let tx = client.tx().await.unwrap();
    let account = tx
        .table("accounts")
        .unwrap()
        .create()
        .set_value("owner", "a")
        .save()
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Still bound to the finished transaction
    let err = account
        .update()
        .unwrap()
        .set_value("balance", 10)
        .save()
        .await
        .unwrap_err();
    assert!(err.is_transaction(), "{err}");

    let account = account.unwrap_tx().unwrap();
    assert!(!account.is_transactional());

    let updated = account
        .update()
        .unwrap()
        .set_value("balance", 10)
        .save()
        .await
        .unwrap();
    assert_eq!(updated.get("balance"), Some(&Value::I64(10)));

    let err = updated.unwrap_tx().unwrap_err();
    assert!(err.is_transaction(), "{err}");
}

async fn mutation_reports_its_transaction(test: &mut DbTest) {
    let client = test.setup_db([accounts()]).await;

    let create = client.table("accounts").unwrap().create();
    assert!(create.mutation().tx().unwrap_err().is_transaction());

    let tx = client.tx().await.unwrap();
    let create = tx.table("accounts").unwrap().create();
    assert!(create.mutation().tx().unwrap().is_transactional());
    drop(create);

    tx.rollback().await.unwrap();
}

tests!(
    commit_makes_changes_visible,
    rollback_discards_changes,
    dropped_transaction_rolls_back,
    nested_transactions_fail,
    begin_tx_with_options,
    unwrap_tx_after_commit,
    mutation_reports_its_transaction,
);
