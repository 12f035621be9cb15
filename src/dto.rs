use utoipa::OpenApi;

pub mod auth;
pub mod todo;

/// OpenAPI schema collection for the DTOs this API sends and receives
#[derive(OpenApi)]
#[openapi(components(schemas(
    todo::TodoDto,
    todo::CreateTodo,
    todo::UpdateTodo,
    todo::TodoListPayload,
    auth::LoginRequest,
    auth::TokenPayload,
)))]
pub struct OpenApiSchemas;
