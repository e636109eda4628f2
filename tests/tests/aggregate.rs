use tests::prelude::*;
use tabula::query::Record;

async fn setup(test: &mut DbTest) -> Client {
    let client = test
        .setup_db([table(
            "orders",
            [
                Column::new("customer", ColumnType::String),
                Column::new("amount", ColumnType::Int64),
                Column::new("weight", ColumnType::Float64).nullable(),
            ],
        )])
        .await;

    let orders = client.table("orders").unwrap();

    for (customer, amount, weight) in [
        ("ann", 10, Some(1.5)),
        ("ann", 30, None),
        ("ben", 5, Some(2.0)),
    ] {
        let mut create = orders
            .create()
            .set_value("customer", customer)
            .set_value("amount", amount);

        if let Some(weight) = weight {
            create = create.set_value("weight", weight);
        }

        create.save().await.unwrap();
    }

    client
}

fn by_customer(records: Vec<Record>) -> Vec<Record> {
    let mut records = records;
    records.sort_by(|a, b| a["customer"].as_str().cmp(&b["customer"].as_str()));
    records
}

async fn group_by_aggregates(test: &mut DbTest) {
    let client = setup(test).await;
    let orders = client.table("orders").unwrap();

    let records = orders
        .query()
        .group_by(["customer"])
        .aggregate([count(), sum("amount"), max("amount").label("largest")])
        .scan()
        .await
        .unwrap();

    let records = by_customer(records);
    assert_eq!(records.len(), 2);

    assert_eq!(
        records[0].keys().map(String::as_str).collect::<Vec<_>>(),
        ["customer", "count", "sum", "largest"]
    );
    assert_eq!(records[0]["customer"], Value::from("ann"));
    assert_eq!(records[0]["count"], Value::I64(2));
    assert_eq!(records[0]["sum"], Value::I64(40));
    assert_eq!(records[0]["largest"], Value::I64(30));
    assert_eq!(records[1]["count"], Value::I64(1));
    assert_eq!(records[1]["sum"], Value::I64(5));
}

async fn aggregates_without_groups(test: &mut DbTest) {
    let client = setup(test).await;
    let orders = client.table("orders").unwrap();

    let records = orders
        .query()
        .filter(string_eq("customer", "ann"))
        .group_by(Vec::<String>::new())
        .aggregate([count_of("weight"), mean("amount"), min("amount")])
        .scan()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["count"], Value::I64(1));
    assert_eq!(records[0]["mean"], Value::F64(20.0));
    assert_eq!(records[0]["min"], Value::I64(10));
}

async fn group_by_into_structs(test: &mut DbTest) {
    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Total {
        customer: String,
        total: i64,
    }

    let client = setup(test).await;
    let orders = client.table("orders").unwrap();

    let mut totals: Vec<Total> = orders
        .query()
        .group_by(["customer"])
        .aggregate([sum("amount").label("total")])
        .scan_into()
        .await
        .unwrap();
    totals.sort_by(|a, b| a.customer.cmp(&b.customer));

    assert_eq!(
        totals,
        [
            Total {
                customer: "ann".to_string(),
                total: 40
            },
            Total {
                customer: "ben".to_string(),
                total: 5
            },
        ]
    );
}

async fn invalid_aggregates(test: &mut DbTest) {
    let client = setup(test).await;
    let orders = client.table("orders").unwrap();

    let mut log = test.log();
    log.clear();

    let err = orders
        .query()
        .group_by(["customer"])
        .aggregate([sum("customer")])
        .scan()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = orders
        .query()
        .group_by(["nope"])
        .aggregate([count()])
        .scan()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    // Rejected before dispatch
    assert!(log.is_empty());
}

tests!(
    group_by_aggregates,
    aggregates_without_groups,
    group_by_into_structs,
    invalid_aggregates,
);
