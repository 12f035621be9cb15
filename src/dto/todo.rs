use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain;

/// A todo as returned on the API, with its derived resource URL
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct TodoDto {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Something to do")]
    pub text: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
    #[schema(example = "http://localhost:3000/todos/10")]
    pub url: String,
}

impl TodoDto {
    /// Shapes a domain todo for the wire. `url` is derived here from the
    /// configured base address; it is never stored.
    pub fn from_domain(todo: domain::todo::TodoItem, base_url: &str) -> TodoDto {
        TodoDto {
            id: todo.id,
            url: format!("{base_url}/todos/{}", todo.id),
            text: todo.text,
            is_done: todo.done,
        }
    }
}

/// DTO for creating a todo via the API. `text` is optional at the serde level
/// so its absence surfaces as a 400 instead of a parse failure.
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct CreateTodo {
    #[validate(length(max = 255))]
    #[schema(example = "Something to do")]
    pub text: Option<String>,
    #[serde(rename = "isDone")]
    pub is_done: Option<bool>,
}

/// DTO for partially updating a todo via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[validate(length(max = 255))]
    pub text: Option<String>,
    #[serde(rename = "isDone")]
    pub is_done: Option<bool>,
}

/// Query parameters accepted by the list endpoint. Both arrive as raw text;
/// the handler decides what unparsable values mean.
#[derive(Deserialize)]
pub struct ListTodosParams {
    pub limit: Option<String>,
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
}

/// Payload of the list endpoint: the page plus the effective query values
/// that produced it
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TodoListPayload {
    #[schema(example = 2)]
    pub count: usize,
    #[schema(example = 20)]
    pub limit: i64,
    #[serde(rename = "orderBy")]
    pub order_by: Vec<String>,
    pub todos: Vec<TodoDto>,
}

impl TodoListPayload {
    pub fn from_domain(page: domain::todo::TodoPage, base_url: &str) -> TodoListPayload {
        TodoListPayload {
            count: page.items.len(),
            limit: page.limit,
            order_by: page
                .order_by
                .iter()
                .map(|term| term.as_token().to_owned())
                .collect(),
            todos: page
                .items
                .into_iter()
                .map(|todo| TodoDto::from_domain(todo, base_url))
                .collect(),
        }
    }
}
