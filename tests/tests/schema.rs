use tabula::{
    driver::operation::{CreateTable, SetIdOffset},
    driver::Operation,
    migrate::{with_foreign_keys, with_global_unique_id},
    schema::ReferenceOption,
};
use tests::prelude::*;

fn users() -> tabula::schema::Table {
    let mut users = table(
        "users",
        [
            Column::new("email", ColumnType::String).size(100),
            Column::new("name", ColumnType::String),
        ],
    );
    users
        .add_index(Index::new("users_email", ["email"]).unique())
        .unwrap();
    users
}

fn posts() -> tabula::schema::Table {
    let mut posts = table(
        "posts",
        [
            Column::new("title", ColumnType::String),
            Column::new("user_id", ColumnType::Int64).nullable(),
        ],
    );
    posts
        .add_foreign_key(ForeignKey::new("user_id", "users").on_delete(ReferenceOption::SetNull))
        .unwrap();
    posts
}

async fn create_is_idempotent(test: &mut DbTest) {
    // Tables were created during setup
    let client = test.setup_db([users()]).await;
    let schema = client.schema();

    assert!(!schema.create("users", []).await.unwrap());
    schema.create_all([]).await.unwrap();

    let log = test.log();
    assert_eq!(log.count(|op| matches!(op, Operation::CreateTable(_))), 0);
}

async fn create_registered_table(test: &mut DbTest) {
    let client = test.setup_db([]).await;

    client.add_table(users()).unwrap();
    assert!(client.schema().create("users", []).await.unwrap());

    let users = client.table("users").unwrap();
    users
        .create()
        .set_value("email", "a@example.com")
        .set_value("name", "a")
        .save()
        .await
        .unwrap();

    // Unique index
    let err = users
        .create()
        .set_value("email", "a@example.com")
        .set_value("name", "b")
        .save()
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "{err}");

    let err = client.schema().create("nope", []).await.unwrap_err();
    assert!(err.is_validation(), "{err}");
}

async fn foreign_keys(test: &mut DbTest) {
    let client = test.setup_db([users(), posts()]).await;
    let users = client.table("users").unwrap();
    let posts = client.table("posts").unwrap();

    let err = posts
        .create()
        .set_value("title", "orphan")
        .set_value("user_id", 99)
        .save()
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "{err}");

    let user = users
        .create()
        .set_value("email", "a@example.com")
        .set_value("name", "a")
        .save()
        .await
        .unwrap();
    let post = posts
        .create()
        .set_value("title", "hello")
        .set_value("user_id", user.id)
        .save()
        .await
        .unwrap();

    users.delete_one_id(user.id).exec().await.unwrap();
    let post = posts.get(post.id).await.unwrap();
    assert_eq!(post.get("user_id"), Some(&Value::Null));
}

async fn foreign_keys_disabled(test: &mut DbTest) {
    let client = test.setup_db([]).await;

    client.add_table(users()).unwrap();
    client.add_table(posts()).unwrap();
    client
        .schema()
        .create_all([with_foreign_keys(false)])
        .await
        .unwrap();

    let created = client
        .table("posts")
        .unwrap()
        .create()
        .set_value("title", "orphan")
        .set_value("user_id", 99)
        .save()
        .await
        .unwrap();
    assert_eq!(created.get("user_id"), Some(&Value::I64(99)));

    let log = test.log();
    assert!(log.with_ops(|ops| ops.iter().all(|op| match &op.operation {
        Operation::CreateTable(CreateTable { foreign_keys, .. }) => !foreign_keys,
        _ => true,
    })));
}

async fn global_unique_ids(test: &mut DbTest) {
    let client = test.setup_db([]).await;

    client.add_table(users()).unwrap();
    client.add_table(posts()).unwrap();
    client
        .schema()
        .create_all([with_global_unique_id(true)])
        .await
        .unwrap();

    // The first table keeps the default range
    let log = test.log();
    let offsets: Vec<(String, u64)> = log.with_ops(|ops| {
        ops.iter()
            .filter_map(|op| match &op.operation {
                Operation::SetIdOffset(SetIdOffset { table, offset }) => {
                    Some((table.clone(), *offset))
                }
                _ => None,
            })
            .collect()
    });
    assert_eq!(offsets, [("posts".to_string(), 1 << 32)]);

    let user = client
        .table("users")
        .unwrap()
        .create()
        .set_value("email", "a@example.com")
        .set_value("name", "a")
        .save()
        .await
        .unwrap();
    let post = client
        .table("posts")
        .unwrap()
        .create()
        .set_value("title", "hello")
        .save()
        .await
        .unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(post.id, 1 << 32);
}

tests!(
    create_is_idempotent,
    create_registered_table,
    foreign_keys,
    foreign_keys_disabled,
    global_unique_ids,
);
