use tabula::{
    predicate::{int_eq, string_eq},
    query::{count, sum, Order},
    schema::{Column, ColumnType, ForeignKey, Index, Table},
    Client,
};
use tracing_subscriber::EnvFilter;

fn users() -> tabula::Result<Table> {
    let mut users = Table::with_columns(
        "users",
        [
            Column::new("name", ColumnType::String),
            Column::new("email", ColumnType::String).size(255),
            Column::new("moto", ColumnType::String).nullable(),
        ],
    )?;
    users.add_index(Index::new("users_email", ["email"]).unique())?;
    Ok(users)
}

fn todos() -> tabula::Result<Table> {
    let mut todos = Table::with_columns(
        "todos",
        [
            Column::new("user_id", ColumnType::Int64),
            Column::new("title", ColumnType::String),
            Column::new("points", ColumnType::Int32).default_value(1),
        ],
    )?;
    todos.add_foreign_key(ForeignKey::new("user_id", "users"))?;
    Ok(todos)
}

#[tokio::main]
async fn main() -> tabula::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db = Client::builder()
        .register(users()?)
        .register(todos()?)
        .connect("sqlite::memory:")
        .await?;

    db.schema().create_all([]).await?;

    let users = db.table("users")?;
    let todos = db.table("todos")?;

    println!("==> create users");
    let u1 = users
        .create()
        .set_value("name", "John Doe")
        .set_value("email", "john@example.com")
        .save()
        .await?;
    let u2 = users
        .create()
        .set_value("name", "Nancy Huerta")
        .set_value("email", "nancy@example.com")
        .save()
        .await?;
    println!("{u1:#?}");

    // Unique email
    assert!(users
        .create()
        .set_value("name", "John Dos")
        .set_value("email", "john@example.com")
        .save()
        .await
        .is_err());

    println!("==> find by email");
    let user = users
        .query()
        .filter(string_eq("email", "john@example.com"))
        .only()
        .await?;
    println!("{user}");

    let user = user.update()?.set_value("name", "Foo bar").save().await?;
    println!("==> renamed: {user}");

    println!("==> create todos in a transaction");
    let tx = db.tx().await?;
    let tx_todos = tx.table("todos")?;
    tx_todos
        .create_bulk([
            tx_todos
                .create()
                .set_value("user_id", u2.id)
                .set_value("title", "finish tabula"),
            tx_todos
                .create()
                .set_value("user_id", u2.id)
                .set_value("title", "write docs")
                .set_value("points", 3),
        ])
        .save()
        .await?;
    drop(tx_todos);
    tx.commit().await?;

    println!("==> eager load");
    let nancy = users
        .query()
        .filter(int_eq("id", u2.id))
        .with_list_data_by("todos", "todos", "user_id", |query| {
            query.order(Order::asc("title"))
        })
        .only()
        .await?;
    for todo in nancy.list("todos") {
        println!("TODO = {todo}");
    }

    let todo = todos
        .query()
        .with_data("users", "owner", "user_id")
        .first()
        .await?;
    println!("-> owner {:?}", todo.single("owner").map(|owner| owner.get("name")));

    println!("==> points per user");
    let totals = todos
        .query()
        .group_by(["user_id"])
        .aggregate([count(), sum("points")])
        .scan()
        .await?;
    println!("{totals:#?}");

    println!("==> delete");
    let deleted = todos.delete().filter(int_eq("user_id", u2.id)).exec().await?;
    println!("deleted {deleted} todos");

    Ok(())
}
