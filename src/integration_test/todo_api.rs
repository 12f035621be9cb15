use super::test_util::{prepare_db_and_test, test_router};
use crate::api::test_util::deserialize_body;
use crate::routing_utils::Envelope;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

async fn response_for(app: &Router, request: Request<Body>) -> (StatusCode, Envelope<Value>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should complete");
    let status = response.status();
    let envelope = deserialize_body(response.into_body()).await;

    (status, envelope)
}

async fn login(app: &Router) -> String {
    let (status, envelope) = response_for(
        app,
        json_request(
            "POST",
            "/login",
            None,
            Some(json!({
                "email": "test@example.com",
                "password": "myTestPassword",
            })),
        ),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("login success", envelope.message);

    envelope.payload.expect("login should carry a payload")["token"]
        .as_str()
        .expect("token should be a string")
        .to_owned()
}

async fn create_todo(app: &Router, token: &str, body: Value) -> Value {
    let (status, envelope) = response_for(
        app,
        json_request("POST", "/todos", Some(token), Some(body)),
    )
    .await;
    assert_eq!(StatusCode::CREATED, status);

    envelope.payload.expect("creation should return the todo")
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn rejects_unauthenticated_todo_access() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);

        let (status, envelope) =
            response_for(&app, json_request("GET", "/todos", None, None)).await;

        assert_eq!(StatusCode::UNAUTHORIZED, status);
        assert_eq!("authentication required", envelope.message);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn answers_on_the_root_and_404s_elsewhere() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);

        let (status, envelope) = response_for(&app, json_request("GET", "/", None, None)).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("OK", envelope.message);

        let (status, envelope) =
            response_for(&app, json_request("GET", "/invalidRoute", None, None)).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("not found", envelope.message);

        let (status, _) =
            response_for(&app, json_request("POST", "/invalidRoute", None, None)).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn stores_a_trimmed_todo_and_reads_it_back() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;

        let created = create_todo(&app, &token, json!({ "text": " foo " })).await;
        assert_eq!("foo", created["text"]);
        assert_eq!(false, created["isDone"]);
        let id = created["id"].as_i64().expect("id should be a number");
        assert_eq!(
            format!("http://localhost:3000/todos/{id}"),
            created["url"].as_str().expect("url should be a string")
        );

        let (status, envelope) = response_for(
            &app,
            json_request("GET", &format!("/todos/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        let fetched = envelope.payload.expect("fetch should return the todo");
        assert_eq!("foo", fetched["text"]);

        let (status, envelope) =
            response_for(&app, json_request("GET", "/todos", Some(&token), None)).await;
        assert_eq!(StatusCode::OK, status);
        let page = envelope.payload.expect("list should return a page");
        assert_eq!(1, page["count"]);
        assert_eq!("foo", page["todos"][0]["text"]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn put_changes_only_the_supplied_fields() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;
        let created = create_todo(&app, &token, json!({ "text": "alpha" })).await;
        let id = created["id"].as_i64().expect("id should be a number");

        let (status, envelope) = response_for(
            &app,
            json_request(
                "PUT",
                &format!("/todos/{id}"),
                Some(&token),
                Some(json!({ "isDone": true })),
            ),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        let updated = envelope.payload.expect("update should return the todo");
        assert_eq!("alpha", updated["text"]);
        assert_eq!(true, updated["isDone"]);

        let (status, envelope) = response_for(
            &app,
            json_request(
                "PUT",
                &format!("/todos/{id}"),
                Some(&token),
                Some(json!({ "text": "beta" })),
            ),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        let updated = envelope.payload.expect("update should return the todo");
        assert_eq!("beta", updated["text"]);
        assert_eq!(true, updated["isDone"]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleted_todos_stay_gone() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;
        let created = create_todo(&app, &token, json!({ "text": "ephemeral" })).await;
        let id = created["id"].as_i64().expect("id should be a number");

        let (status, envelope) = response_for(
            &app,
            json_request("DELETE", &format!("/todos/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        let snapshot = envelope.payload.expect("deletion should return a snapshot");
        assert_eq!("ephemeral", snapshot["text"]);

        let (status, _) = response_for(
            &app,
            json_request("GET", &format!("/todos/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, status);

        // Deleting again reports the same absence
        let (status, _) = response_for(
            &app,
            json_request("DELETE", &format!("/todos/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn echoes_effective_limit_and_order() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;
        create_todo(&app, &token, json!({ "text": "one" })).await;

        let (status, envelope) = response_for(
            &app,
            json_request(
                "GET",
                "/todos?limit=500&orderBy=nonsense",
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        let page = envelope.payload.expect("list should return a page");
        assert_eq!(100, page["limit"]);
        assert_eq!(json!([]), page["orderBy"]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn invalid_ids_404_without_touching_the_store() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;

        let (status, envelope) = response_for(
            &app,
            json_request("GET", "/todos/abc", Some(&token), None),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("not found: invalid id", envelope.message);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn post_without_a_body_is_a_400() {
    prepare_db_and_test(|db| async move {
        let app = test_router(db);
        let token = login(&app).await;

        let (status, envelope) =
            response_for(&app, json_request("POST", "/todos", Some(&token), None)).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("no content provided", envelope.message);
    });
}
