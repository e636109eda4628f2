use tests::prelude::*;

async fn setup(test: &mut DbTest) -> Client {
    let client = test
        .setup_db([table(
            "users",
            [
                Column::new("name", ColumnType::String),
                Column::new("age", ColumnType::Int32),
                Column::new("nickname", ColumnType::String).nullable(),
            ],
        )])
        .await;

    let users = client.table("users").unwrap();

    for (name, age, nickname) in [
        ("alice", 30, Some("al")),
        ("bob", 25, None),
        ("carol", 35, Some("caz")),
        ("dave", 25, None),
    ] {
        let mut create = users.create().set_value("name", name).set_value("age", age);

        if let Some(nickname) = nickname {
            create = create.set_value("nickname", nickname);
        }

        create.save().await.unwrap();
    }

    client
}

fn names(entities: &[Entity]) -> Vec<&str> {
    entities
        .iter()
        .map(|entity| entity.get("name").and_then(Value::as_str).unwrap())
        .collect()
}

async fn count_with_predicate(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    assert_eq!(users.query().count().await.unwrap(), 4);
    assert_eq!(
        users
            .query()
            .filter(and([int_eq("age", 25)]))
            .count()
            .await
            .unwrap(),
        2
    );
    assert!(users.query().filter(int_gt("age", 30)).exist().await.unwrap());
    assert!(!users.query().filter(int_gt("age", 35)).exist().await.unwrap());
}

async fn order_limit_offset(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let all = users
        .query()
        .order(Order::desc("age"))
        .order(Order::asc("name"))
        .all()
        .await
        .unwrap();
    assert_eq!(names(&all), ["carol", "alice", "bob", "dave"]);

    let page = users
        .query()
        .order(Order::asc("name"))
        .limit(2)
        .offset(1)
        .all()
        .await
        .unwrap();
    assert_eq!(names(&page), ["bob", "carol"]);

    let tail = users
        .query()
        .order(Order::asc("name"))
        .offset(3)
        .all()
        .await
        .unwrap();
    assert_eq!(names(&tail), ["dave"]);

    // Pagination does not affect the count
    assert_eq!(users.query().limit(1).offset(1).count().await.unwrap(), 4);
}

async fn only_semantics(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let carol = users
        .query()
        .filter(string_eq("name", "carol"))
        .only()
        .await
        .unwrap();
    assert_eq!(carol.get("age"), Some(&Value::I64(35)));

    let err = users
        .query()
        .filter(string_eq("name", "erin"))
        .only()
        .await
        .unwrap_err();
    assert!(err.is_record_not_found(), "{err}");

    let mut log = test.log();
    log.clear();

    let err = users.query().filter(int_eq("age", 25)).only().await.unwrap_err();
    assert!(err.is_too_many_records(), "{err}");

    // At most two rows are fetched
    let (operation, _) = log.pop().unwrap();
    let query = operation.as_query_sql().unwrap();
    match &query.stmt {
        tabula::stmt::Statement::Query(select) => assert_eq!(select.limit, Some(2)),
        stmt => panic!("expected a select, got {stmt:?}"),
    }
}

async fn first_and_ids(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let first = users.query().order(Order::asc("age")).first().await.unwrap();
    assert_eq!(first.get("age"), Some(&Value::I64(25)));

    let err = users.query().filter(int_gt("age", 99)).first().await.unwrap_err();
    assert!(err.is_record_not_found(), "{err}");

    let ids = users
        .query()
        .filter(int_eq("age", 25))
        .order(Order::asc("id"))
        .ids()
        .await
        .unwrap();
    assert_eq!(ids, [2, 4]);

    assert_eq!(
        users
            .query()
            .filter(string_eq("name", "alice"))
            .only_id()
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        users.query().order(Order::desc("id")).first_id().await.unwrap(),
        4
    );
}

async fn predicate_algebra(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let p = || int_eq("age", 25);
    let q = || string_has_prefix("name", "d");

    let count = |predicate: Predicate| {
        let users = users.clone();
        async move { users.query().filter(predicate).count().await.unwrap() }
    };

    assert_eq!(count(and([p()])).await, count(p()).await);
    assert_eq!(count(and([p(), q()])).await, count(and([q(), p()])).await);
    assert_eq!(count(or([p(), not(p())])).await, 4);
    assert_eq!(count(not(not(p()))).await, count(p()).await);
    assert_eq!(count(and([p(), q()])).await, 1);
}

async fn string_and_null_predicates(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let query = |predicate: Predicate| {
        let users = users.clone();
        async move {
            let entities = users
                .query()
                .filter(predicate)
                .order(Order::asc("name"))
                .all()
                .await
                .unwrap();
            let names: Vec<String> = names(&entities).into_iter().map(str::to_string).collect();
            names
        }
    };

    assert_eq!(query(string_contains("name", "ar")).await, ["carol"]);
    assert_eq!(query(string_has_suffix("name", "e")).await, ["alice", "dave"]);
    assert_eq!(query(string_equal_fold("name", "BOB")).await, ["bob"]);
    assert_eq!(query(string_contains_fold("name", "AR")).await, ["carol"]);
    assert_eq!(query(is_null("nickname")).await, ["bob", "dave"]);
    assert_eq!(query(not_null("nickname")).await, ["alice", "carol"]);
    assert_eq!(
        query(string_in("name", ["alice".to_string(), "dave".to_string()])).await,
        ["alice", "dave"]
    );
    assert_eq!(query(id_in([1, 3])).await, ["alice", "carol"]);
    assert_eq!(query(int_not_in("age", [25, 30])).await, ["carol"]);
}

async fn select_columns(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let names = users
        .query()
        .filter(int_eq("age", 25))
        .order(Order::asc("name"))
        .select(["name"])
        .strings()
        .await
        .unwrap();
    assert_eq!(names, ["bob", "dave"]);

    let oldest = users
        .query()
        .order(Order::desc("age"))
        .limit(1)
        .select(["age"])
        .int()
        .await
        .unwrap();
    assert_eq!(oldest, 35);

    let err = users.query().select(["name", "age"]).ints().await.unwrap_err();
    assert!(err.is_validation(), "{err}");

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Person {
        name: String,
        nickname: Option<String>,
    }

    let people: Vec<Person> = users
        .query()
        .filter(int_eq("age", 30))
        .select(["name", "nickname"])
        .scan_into()
        .await
        .unwrap();

    assert_eq!(
        people,
        [Person {
            name: "alice".to_string(),
            nickname: Some("al".to_string()),
        }]
    );
}

async fn unique_rows(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let mut ages = users
        .query()
        .unique(true)
        .select(["age"])
        .ints()
        .await
        .unwrap();
    ages.sort();

    assert_eq!(ages, [25, 30, 35]);
}

async fn cloned_queries_are_independent(test: &mut DbTest) {
    let client = setup(test).await;
    let users = client.table("users").unwrap();

    let base = users.query().filter(int_eq("age", 25));
    let narrowed = base.clone().filter(string_eq("name", "bob"));

    assert_eq!(base.count().await.unwrap(), 2);
    assert_eq!(narrowed.count().await.unwrap(), 1);
}

tests!(
    count_with_predicate,
    order_limit_offset,
    only_semantics,
    first_and_ids,
    predicate_algebra,
    string_and_null_predicates,
    select_columns,
    unique_rows,
    cloned_queries_are_independent,
);
