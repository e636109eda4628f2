use tests::prelude::*;

fn tables() -> Vec<tabula::schema::Table> {
    vec![
        table(
            "user",
            [
                Column::new("username", ColumnType::String),
                Column::new("creator_id", ColumnType::Int64).nullable(),
            ],
        ),
        table("test_aaa", [Column::new("field1", ColumnType::Int64).nullable()]),
    ]
}

async fn eager_list(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let user = client.table("user").unwrap();
    let aaa = client.table("test_aaa").unwrap();

    let created = user.create().set_value("username", "a").save().await.unwrap();
    assert_eq!(created.id, 1);

    for field1 in [1, 1, 7] {
        aaa.create().set_value("field1", field1).save().await.unwrap();
    }

    let mut log = test.log();
    log.clear();

    let loaded = user
        .query()
        .filter(and([int_eq("id", 1)]))
        .with_list_data("test_aaa", "test_list", "field1")
        .first()
        .await
        .unwrap();

    let list = loaded.list("test_list");
    assert_eq_unordered!(list.iter().map(|entity| entity.id), [1, 2]);
    assert!(list
        .iter()
        .all(|entity| entity.get("field1") == Some(&Value::I64(1))));

    // One primary query and one follow-up
    assert_eq!(log.selects(Some("user")), 1);
    assert_eq!(log.selects(Some("test_aaa")), 1);
    assert_eq!(log.len(), 2);

    // More than one row matches
    let err = aaa.query().filter(int_eq("field1", 1)).only().await.unwrap_err();
    assert!(err.is_too_many_records(), "{err}");
}

async fn eager_list_without_children(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let user = client.table("user").unwrap();

    user.create().set_value("username", "a").save().await.unwrap();

    let users = user
        .query()
        .with_list_data("test_aaa", "test_list", "field1")
        .all()
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert!(users[0].list("test_list").is_empty());
    assert!(users[0].edges.list.contains_key("test_list"));
}

async fn eager_single(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let user = client.table("user").unwrap();
    let aaa = client.table("test_aaa").unwrap();

    let alice = user.create().set_value("username", "alice").save().await.unwrap();
    let bob = user.create().set_value("username", "bob").save().await.unwrap();

    aaa.create().set_value("field1", alice.id).save().await.unwrap();
    aaa.create().set_value("field1", bob.id).save().await.unwrap();
    aaa.create().set_value("field1", alice.id).save().await.unwrap();
    aaa.create().clear_value("field1").save().await.unwrap();

    let mut log = test.log();
    log.clear();

    let rows = aaa
        .query()
        .order(Order::asc("id"))
        .with_data("user", "owner", "field1")
        .all()
        .await
        .unwrap();

    assert_eq!(rows.len(), 4);

    for row in &rows[..3] {
        let owner = row.single("owner").unwrap();
        assert_eq!(Some(&Value::I64(owner.id)), row.get("field1"));
    }

    assert_eq!(rows[0].single("owner").unwrap().id, alice.id);
    assert_eq!(rows[1].single("owner").unwrap().id, bob.id);

    // NULL foreign keys leave the edge absent
    assert!(rows[3].single("owner").is_none());

    assert_eq!(log.selects(Some("user")), 1);
}

async fn eager_single_all_null_keys(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let aaa = client.table("test_aaa").unwrap();

    aaa.create().clear_value("field1").save().await.unwrap();

    let mut log = test.log();
    log.clear();

    let rows = aaa
        .query()
        .with_data("user", "owner", "field1")
        .all()
        .await
        .unwrap();

    assert!(rows[0].single("owner").is_none());

    // Nothing to load, nothing sent
    assert_eq!(log.selects(Some("user")), 0);
}

async fn eager_configured_sub_query(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let user = client.table("user").unwrap();
    let aaa = client.table("test_aaa").unwrap();

    let parent = user.create().set_value("username", "p").save().await.unwrap();

    for _ in 0..3 {
        aaa.create().set_value("field1", parent.id).save().await.unwrap();
    }

    let loaded = user
        .query()
        .with_list_data_by("test_aaa", "latest", "field1", |query| {
            query.order(Order::desc("id")).limit(2)
        })
        .only()
        .await
        .unwrap();

    let ids: Vec<i64> = loaded.list("latest").iter().map(|e| e.id).collect();
    assert_eq!(ids, [3, 2]);
}

async fn eager_multi_level(test: &mut DbTest) {
    let client = test
        .setup_db([
            table("authors", [Column::new("name", ColumnType::String)]),
            table(
                "posts",
                [
                    Column::new("title", ColumnType::String),
                    Column::new("author_id", ColumnType::Int64),
                ],
            ),
            table(
                "comments",
                [
                    Column::new("body", ColumnType::String),
                    Column::new("post_id", ColumnType::Int64),
                    Column::new("author_id", ColumnType::Int64),
                ],
            ),
        ])
        .await;

    let authors = client.table("authors").unwrap();
    let posts = client.table("posts").unwrap();
    let comments = client.table("comments").unwrap();

    let ann = authors.create().set_value("name", "ann").save().await.unwrap();
    let ben = authors.create().set_value("name", "ben").save().await.unwrap();

    let post = posts
        .create()
        .set_value("title", "hello")
        .set_value("author_id", ann.id)
        .save()
        .await
        .unwrap();

    for (body, author) in [("first", &ben), ("second", &ann)] {
        comments
            .create()
            .set_value("body", body)
            .set_value("post_id", post.id)
            .set_value("author_id", author.id)
            .save()
            .await
            .unwrap();
    }

    let mut log = test.log();
    log.clear();

    let loaded = posts
        .query()
        .with_data("authors", "author", "author_id")
        .with_list_data_by("comments", "comments", "post_id", |query| {
            query
                .order(Order::asc("id"))
                .with_data("authors", "author", "author_id")
        })
        .only()
        .await
        .unwrap();

    assert_eq!(
        loaded.single("author").unwrap().get("name"),
        Some(&Value::from("ann"))
    );

    let commenters: Vec<&Value> = loaded
        .list("comments")
        .iter()
        .map(|comment| comment.single("author").unwrap().get("name").unwrap())
        .collect();
    assert_eq!(commenters, [&Value::from("ben"), &Value::from("ann")]);

    // posts, authors, comments, comment authors
    assert_eq!(log.selects(None), 4);
}

async fn eager_load_unknown_key(test: &mut DbTest) {
    let client = test.setup_db(tables()).await;
    let user = client.table("user").unwrap();

    let err = user
        .query()
        .with_list_data("test_aaa", "test_list", "missing")
        .all()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = user
        .query()
        .with_data("nope", "x", "creator_id")
        .all()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = user
        .query()
        .with_data("test_aaa", "x", "username")
        .all()
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    assert!(test.log().is_empty());
}

tests!(
    eager_list,
    eager_list_without_children,
    eager_single,
    eager_single_all_null_keys,
    eager_configured_sub_query,
    eager_multi_level,
    eager_load_unknown_key,
);
