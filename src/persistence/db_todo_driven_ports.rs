use crate::domain;
use crate::domain::todo::{NewTodo, SortTerm, TodoItem, TodoUpdate};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::FromRow;

#[derive(FromRow)]
struct TodoRow {
    id: i32,
    text: String,
    done: bool,
}

impl From<TodoRow> for TodoItem {
    fn from(value: TodoRow) -> Self {
        TodoItem {
            id: value.id,
            text: value.text,
            done: value.done,
        }
    }
}

/// Assembles the list query. Order-by fragments come exclusively from
/// [SortTerm::as_sql], so no request-controlled text is ever spliced in.
fn list_query(order_by: &[SortTerm]) -> String {
    let mut sql = String::from("SELECT id, text, done FROM todos");
    if !order_by.is_empty() {
        let fragments: Vec<&str> = order_by.iter().map(SortTerm::as_sql).collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&fragments.join(", "));
    }
    sql.push_str(" LIMIT $1");

    sql
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn list(
        &self,
        limit: i64,
        order_by: &[SortTerm],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoItem>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<TodoItem> = sqlx::query_as::<_, TodoRow>(&list_query(order_by))
            .bind(limit)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch a page of todos")?
            .into_iter()
            .map(TodoItem::from)
            .collect();

        Ok(todos)
    }

    async fn by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = sqlx::query_as::<_, TodoRow>("SELECT id, text, done FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch a todo by ID")?;

        Ok(todo.map(TodoItem::from))
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn insert(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id: i32 =
            sqlx::query_scalar("INSERT INTO todos(text, done) VALUES ($1, $2) RETURNING id")
                .bind(&new_todo.text)
                .bind(new_todo.done)
                .fetch_one(cxn.borrow_connection())
                .await
                .context("trying to insert a new todo into the database")?;

        Ok(new_id)
    }

    async fn update(
        &self,
        id: i32,
        update: &TodoUpdate,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // COALESCE keeps the stored value for any field the caller left unset
        let updated = sqlx::query_as::<_, TodoRow>(
            "UPDATE todos SET text = COALESCE($1, text), done = COALESCE($2, done) \
             WHERE id = $3 RETURNING id, text, done",
        )
        .bind(update.text.as_deref())
        .bind(update.done)
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?;

        Ok(updated.map(TodoItem::from))
    }

    async fn delete(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let removed = sqlx::query_as::<_, TodoRow>(
            "DELETE FROM todos WHERE id = $1 RETURNING id, text, done",
        )
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to remove a todo from the database")?;

        Ok(removed.map(TodoItem::from))
    }
}
