use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};

/// Number of todos returned when a list request doesn't ask for a limit
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest number of todos a single list request may return
pub const MAX_LIMIT: i64 = 100;
/// Smallest accepted list limit
pub const MIN_LIMIT: i64 = 1;

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoItem {
    pub id: i32,
    pub text: String,
    pub done: bool,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTodo {
    pub text: String,
    pub done: bool,
}

/// A partial update. Fields left as [None] keep their stored value.
#[cfg_attr(test, derive(Clone, Debug))]
pub struct TodoUpdate {
    pub text: Option<String>,
    pub done: Option<bool>,
}

/// One page of todos plus the effective query values that produced it, so the
/// API can echo back what was actually applied after clamping and filtering.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoPage {
    pub limit: i64,
    pub order_by: Vec<SortTerm>,
    pub items: Vec<TodoItem>,
}

/// The fixed allow-list of column/direction pairs accepted for ordering.
/// Requested tokens that don't parse to one of these never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTerm {
    Id,
    IdDesc,
    Text,
    TextDesc,
    Done,
    DoneDesc,
}

impl SortTerm {
    /// Parses a single requested order-by token, ignoring case
    pub fn parse(token: &str) -> Option<SortTerm> {
        match token.to_lowercase().as_str() {
            "id" => Some(Self::Id),
            "id desc" => Some(Self::IdDesc),
            "text" => Some(Self::Text),
            "text desc" => Some(Self::TextDesc),
            "done" => Some(Self::Done),
            "done desc" => Some(Self::DoneDesc),
            _ => None,
        }
    }

    /// The token as it appears in query parameters and response payloads
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::IdDesc => "id desc",
            Self::Text => "text",
            Self::TextDesc => "text desc",
            Self::Done => "done",
            Self::DoneDesc => "done desc",
        }
    }

    /// The ORDER BY fragment for this term. These fixed strings are the only
    /// order-by text that may ever be spliced into a query.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::IdDesc => "id DESC",
            Self::Text => "text",
            Self::TextDesc => "text DESC",
            Self::Done => "done",
            Self::DoneDesc => "done DESC",
        }
    }
}

/// Filters requested order-by tokens against the allow-list. Unknown tokens
/// drop out silently; an entirely-unknown list produces an empty result, not
/// an error.
pub fn sanitize_order_by(requested: &[String]) -> Vec<SortTerm> {
    requested
        .iter()
        .filter_map(|token| SortTerm::parse(token))
        .collect()
}

/// Clamps a requested list limit into `[MIN_LIMIT, MAX_LIMIT]`. An unspecified
/// limit becomes [DEFAULT_LIMIT].
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    match requested {
        None => DEFAULT_LIMIT,
        Some(value) => value.clamp(MIN_LIMIT, MAX_LIMIT),
    }
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait TodoReader {
        async fn list(
            &self,
            limit: i64,
            order_by: &[SortTerm],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;

        async fn by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }

    pub trait TodoWriter {
        async fn insert(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        /// Applies the supplied fields to an existing row, returning the row
        /// as stored afterwards, or [None] when the id names nothing
        async fn update(
            &self,
            id: i32,
            update: &TodoUpdate,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;

        /// Removes a row, returning its state just before deletion, or [None]
        /// when the id names nothing
        async fn delete(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait TodoPort {
        async fn list_all(
            &self,
            limit: Option<i64>,
            order_by: Option<&[String]>,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<TodoPage, anyhow::Error>;

        async fn get_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Option<TodoItem>, anyhow::Error>;

        async fn add(
            &self,
            new_todo: NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<TodoItem, anyhow::Error>;

        async fn update_by_id(
            &self,
            id: i32,
            update: TodoUpdate,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Option<TodoItem>, anyhow::Error>;

        async fn delete_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn list_all(
        &self,
        limit: Option<i64>,
        order_by: Option<&[String]>,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<TodoPage, anyhow::Error> {
        let effective_limit = clamp_limit(limit);
        // An absent parameter falls back to newest-first; a present one keeps
        // whatever survives the allow-list, even if that's nothing.
        let effective_order = match order_by {
            None => vec![SortTerm::IdDesc],
            Some(requested) => sanitize_order_by(requested),
        };

        let items = todo_read
            .list(effective_limit, &effective_order, &mut *ext_cxn)
            .await
            .context("listing todos")?;

        Ok(TodoPage {
            limit: effective_limit,
            order_by: effective_order,
            items,
        })
    }

    async fn get_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        todo_read
            .by_id(id, &mut *ext_cxn)
            .await
            .context("fetching a todo by id")
    }

    async fn add(
        &self,
        new_todo: NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<TodoItem, anyhow::Error> {
        let sanitized = NewTodo {
            text: new_todo.text.trim().to_owned(),
            done: new_todo.done,
        };
        let new_id = todo_write
            .insert(&sanitized, &mut *ext_cxn)
            .await
            .context("inserting a todo")?;

        // Read the row back so derived fields come from the store, not from
        // what the caller happened to send.
        let stored = todo_read
            .by_id(new_id, &mut *ext_cxn)
            .await
            .context("reading back an inserted todo")?;

        stored.ok_or_else(|| anyhow!("todo {new_id} vanished between insert and read-back"))
    }

    async fn update_by_id(
        &self,
        id: i32,
        update: TodoUpdate,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let sanitized = TodoUpdate {
            text: update.text.map(|text| text.trim().to_owned()),
            done: update.done,
        };
        todo_write
            .update(id, &sanitized, &mut *ext_cxn)
            .await
            .context("updating a todo")
    }

    async fn delete_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        todo_write
            .delete(id, &mut *ext_cxn)
            .await
            .context("deleting a todo")
    }
}
