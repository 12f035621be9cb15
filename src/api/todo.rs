use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::external_connections::ExternalConnectivity;
use crate::domain::todo::driving_ports::TodoPort;
use crate::domain::todo::{NewTodo, TodoUpdate};
use crate::routing_utils::{ApiError, Envelope};
use crate::{AppState, SharedData, domain, dto, persistence};

#[derive(OpenApi)]
#[openapi(paths(list_todos, get_todo, create_todo, update_todo, delete_todo))]
/// OpenAPI documentation for the todo endpoints
pub struct TodosApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Builds the router for all routes under "/todos". Callers are expected to
/// guard the returned router with [crate::api::auth::require_auth].
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Query(params): Query<dto::todo::ListTodosParams>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

                    list_todos(
                        params,
                        &mut ext_cxn,
                        &todo_service,
                        &todo_reader,
                        &app_state.base_url,
                    )
                    .await
                },
            ),
        )
        .route(
            "/",
            post(
                |State(app_state): AppState, body: Option<axum::Json<dto::todo::CreateTodo>>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;
                    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

                    create_todo(
                        body.map(|axum::Json(new_todo)| new_todo),
                        &mut ext_cxn,
                        &todo_service,
                        &todo_reader,
                        &todo_writer,
                        &app_state.base_url,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:id",
            get(
                |State(app_state): AppState, Path(raw_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

                    get_todo(
                        &raw_id,
                        &mut ext_cxn,
                        &todo_service,
                        &todo_reader,
                        &app_state.base_url,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:id",
            put(
                |State(app_state): AppState,
                 Path(raw_id): Path<String>,
                 body: Option<axum::Json<dto::todo::UpdateTodo>>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

                    update_todo(
                        &raw_id,
                        body.map(|axum::Json(update)| update),
                        &mut ext_cxn,
                        &todo_service,
                        &todo_writer,
                        &app_state.base_url,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:id",
            delete(
                |State(app_state): AppState, Path(raw_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};
                    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

                    delete_todo(
                        &raw_id,
                        &mut ext_cxn,
                        &todo_service,
                        &todo_writer,
                        &app_state.base_url,
                    )
                    .await
                },
            ),
        )
}

/// Only positive integers can name a todo; anything else is rejected before
/// the store is ever consulted.
fn parse_todo_id(raw_id: &str) -> Option<i32> {
    raw_id.parse::<i32>().ok().filter(|id| *id > 0)
}

#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_API_GROUP,
    params(
        ("limit" = Option<String>, Query, description = "Page size, clamped into [1, 100], 20 when unspecified"),
        ("orderBy" = Option<String>, Query, description = "Comma-separated sort tokens, filtered against the fixed allow-list"),
    ),
    responses(
        (status = 200, description = "One page of todos with the effective query values", body = dto::todo::TodoListPayload),
        (status = 401, description = "No bearer token"),
        (status = 403, description = "Invalid bearer token"),
        (status = 500, description = "The store could not be reached"),
    ),
)]
/// Lists a page of todos
async fn list_todos(
    params: dto::todo::ListTodosParams,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    base_url: &str,
) -> Result<Envelope<dto::todo::TodoListPayload>, ApiError> {
    info!("Listing todos");
    // Numeric garbage in the limit means the same as not sending one
    let limit = params
        .limit
        .as_deref()
        .and_then(|raw_limit| raw_limit.parse::<i64>().ok());
    let order_by: Option<Vec<String>> = params.order_by.map(|raw_order| {
        raw_order
            .split(',')
            .map(|token| token.trim().to_owned())
            .collect()
    });

    let page_result = todo_service
        .list_all(limit, order_by.as_deref(), ext_cxn, todo_read)
        .await;
    if let Err(ref list_err) = page_result {
        error!("Failed to list todos: {list_err}");
    }
    let page = page_result?;

    Ok(Envelope::new(
        StatusCode::OK,
        "ok",
        dto::todo::TodoListPayload::from_domain(page, base_url),
    ))
}

#[utoipa::path(
    get,
    path = "/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = String, Path, description = "ID of the requested todo")),
    responses(
        (status = 200, description = "The requested todo", body = dto::todo::TodoDto),
        (status = 401, description = "No bearer token"),
        (status = 403, description = "Invalid bearer token"),
        (status = 404, description = "No such todo, or the id isn't a positive integer"),
        (status = 500, description = "The store could not be reached"),
    ),
)]
/// Fetches a single todo by its id
async fn get_todo(
    raw_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    base_url: &str,
) -> Result<Envelope<dto::todo::TodoDto>, ApiError> {
    let Some(id) = parse_todo_id(raw_id) else {
        return Err(ApiError::NotFound("not found: invalid id"));
    };

    info!("Fetching todo {id}");
    let fetch_result = todo_service.get_by_id(id, ext_cxn, todo_read).await;
    if let Err(ref fetch_err) = fetch_result {
        error!("Failed to fetch todo {id}: {fetch_err}");
    }
    let Some(todo) = fetch_result? else {
        return Err(ApiError::NotFound("not found"));
    };

    Ok(Envelope::new(
        StatusCode::OK,
        "ok",
        dto::todo::TodoDto::from_domain(todo, base_url),
    ))
}

#[utoipa::path(
    post,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::todo::CreateTodo,
    responses(
        (status = 201, description = "The stored todo, read back from the store", body = dto::todo::TodoDto),
        (status = 400, description = "Body missing, text missing/blank, or text too long"),
        (status = 401, description = "No bearer token"),
        (status = 403, description = "Invalid bearer token"),
        (status = 500, description = "The store could not be reached"),
    ),
)]
/// Creates a todo
async fn create_todo(
    body: Option<dto::todo::CreateTodo>,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
    base_url: &str,
) -> Result<Envelope<dto::todo::TodoDto>, ApiError> {
    let Some(body) = body else {
        return Err(ApiError::MissingContent("no content provided"));
    };
    body.validate().map_err(|_| ApiError::InvalidContent)?;
    let Some(text) = body.text else {
        return Err(ApiError::MissingContent("no content provided"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::MissingContent("no content provided"));
    }
    // Only a literal true marks a fresh todo as done
    let done = body.is_done.unwrap_or(false);

    info!("Adding a todo");
    let create_result = todo_service
        .add(NewTodo { text, done }, ext_cxn, todo_read, todo_write)
        .await;
    if let Err(ref create_err) = create_result {
        error!("Failed to add a todo: {create_err}");
    }

    Ok(Envelope::new(
        StatusCode::CREATED,
        "ok",
        dto::todo::TodoDto::from_domain(create_result?, base_url),
    ))
}

#[utoipa::path(
    put,
    path = "/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = String, Path, description = "ID of the todo to update")),
    request_body = dto::todo::UpdateTodo,
    responses(
        (status = 201, description = "The updated todo", body = dto::todo::TodoDto),
        (status = 400, description = "Body missing or neither field supplied"),
        (status = 401, description = "No bearer token"),
        (status = 403, description = "Invalid bearer token"),
        (status = 404, description = "No such todo, or the id isn't a positive integer"),
        (status = 500, description = "The store could not be reached"),
    ),
)]
/// Updates the text and/or done state of a todo
async fn update_todo(
    raw_id: &str,
    body: Option<dto::todo::UpdateTodo>,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
    base_url: &str,
) -> Result<Envelope<dto::todo::TodoDto>, ApiError> {
    let Some(id) = parse_todo_id(raw_id) else {
        return Err(ApiError::NotFound("not found: invalid id"));
    };
    let Some(body) = body else {
        return Err(ApiError::MissingContent("no content provided"));
    };
    // Rejected only when neither field is present
    if body.text.is_none() && body.is_done.is_none() {
        return Err(ApiError::MissingContent("no content provided"));
    }
    body.validate().map_err(|_| ApiError::InvalidContent)?;
    if let Some(ref text) = body.text {
        if text.trim().is_empty() {
            return Err(ApiError::MissingContent("no content provided"));
        }
    }

    info!("Updating todo {id}");
    let update_result = todo_service
        .update_by_id(
            id,
            TodoUpdate {
                text: body.text,
                done: body.is_done,
            },
            ext_cxn,
            todo_write,
        )
        .await;
    if let Err(ref update_err) = update_result {
        error!("Failed to update todo {id}: {update_err}");
    }
    let Some(todo) = update_result? else {
        return Err(ApiError::NotFound("not found"));
    };

    Ok(Envelope::new(
        StatusCode::CREATED,
        "ok",
        dto::todo::TodoDto::from_domain(todo, base_url),
    ))
}

#[utoipa::path(
    delete,
    path = "/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = String, Path, description = "ID of the todo to remove")),
    responses(
        (status = 201, description = "The removed todo as it was just before deletion", body = dto::todo::TodoDto),
        (status = 401, description = "No bearer token"),
        (status = 403, description = "Invalid bearer token"),
        (status = 404, description = "No such todo, or the id isn't a positive integer"),
        (status = 500, description = "The store could not be reached"),
    ),
)]
/// Permanently removes a todo
async fn delete_todo(
    raw_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
    base_url: &str,
) -> Result<Envelope<dto::todo::TodoDto>, ApiError> {
    let Some(id) = parse_todo_id(raw_id) else {
        return Err(ApiError::NotFound("not found: invalid id"));
    };

    info!("Deleting todo {id}");
    let delete_result = todo_service.delete_by_id(id, ext_cxn, todo_write).await;
    if let Err(ref delete_err) = delete_result {
        error!("Failed to delete todo {id}: {delete_err}");
    }
    let Some(todo) = delete_result? else {
        return Err(ApiError::NotFound("not found"));
    };

    Ok(Envelope::new(
        StatusCode::CREATED,
        "ok",
        dto::todo::TodoDto::from_domain(todo, base_url),
    ))
}
