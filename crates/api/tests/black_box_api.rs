use std::sync::Arc;

use async_trait::async_trait;
use axum::{http::StatusCode as AxumStatus, routing::get, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

use userbase_api::app::{build_app, with_middleware, AppServices};
use userbase_core::{NewUser, User, UserId};
use userbase_infra::config::DatabaseConfig;
use userbase_infra::store::{StoreError, StoreResult, UserStore};

/// Store whose writes always fail; lookups either succeed with a fixed user
/// or fail as unavailable.
struct FailingStore {
    lookup_ok: bool,
    write_error: StoreError,
}

#[async_trait]
impl UserStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        if self.lookup_ok {
            Ok(User::from_parts(id, "Ada", "1815-12-10"))
        } else {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    async fn insert(&self, _user: NewUser) -> StoreResult<User> {
        Err(StoreError::Constraint("users_name_check".into()))
    }

    async fn save(&self, _user: &User) -> StoreResult<User> {
        Err(self.write_error.clone())
    }

    async fn delete(&self, _id: UserId) -> StoreResult<()> {
        Err(self.write_error.clone())
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn failing(lookup_ok: bool, write_error: StoreError) -> Self {
        let store = FailingStore { lookup_ok, write_error };
        Self::spawn(build_app(AppServices::new(Arc::new(store)))).await
    }

    async fn in_memory() -> Self {
        Self::spawn(build_app(AppServices::in_memory())).await
    }

    async fn sqlite(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("userbase-{}-{}.db", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        let services = AppServices::connect(&DatabaseConfig::Sqlite {
            path,
            max_connections: 1,
        })
        .await
        .expect("failed to open sqlite store");
        Self::spawn(build_app(services)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> reqwest::Response {
    client.post(srv.url("/users")).json(&body).send().await.unwrap()
}

async fn list_len(client: &reqwest::Client, srv: &TestServer) -> usize {
    let res = client.get(srv.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body.as_array().expect("list must be a JSON array").len()
}

async fn create_then_get_round_trips(srv: TestServer) {
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["ID"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["Name"], "Ada");
    assert_eq!(created["Birthday"], "1815-12-10");

    let res = client.get(srv.url(&format!("/users/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, json!({ "ID": id, "Name": "Ada", "Birthday": "1815-12-10" }));
}

#[tokio::test]
async fn create_then_get_in_memory() {
    create_then_get_round_trips(TestServer::in_memory().await).await;
}

#[tokio::test]
async fn create_then_get_sqlite() {
    create_then_get_round_trips(TestServer::sqlite("create-get").await).await;
}

#[tokio::test]
async fn list_is_an_empty_array_when_no_users_exist() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_with_empty_name_is_rejected_and_stores_nothing() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({ "Name": "", "Birthday": "1815-12-10" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Name and Birthday are required" }));

    let res = create(&client, &srv, json!({ "Name": "Ada" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(list_len(&client, &srv).await, 0);
}

#[tokio::test]
async fn create_with_malformed_body_is_rejected() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid request" }));

    let res = create(&client, &srv, json!({ "Name": 5, "Birthday": "1815-12-10" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(list_len(&client, &srv).await, 0);
}

#[tokio::test]
async fn create_accepts_lowercase_fields_and_ignores_client_id() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({ "ID": 500, "name": "Grace", "birthday": "1906-12-09" })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["ID"], 1);
    assert_eq!(created["Name"], "Grace");
}

#[tokio::test]
async fn get_unknown_id_is_404() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" })).await;

    let res = client.get(srv.url("/users/9999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "User not found" }));
}

#[tokio::test]
async fn non_numeric_or_negative_ids_are_400() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    for id in ["abc", "-1", "1.5"] {
        let res = client.get(srv.url(&format!("/users/{id}"))).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "GET id {id}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid user ID" }));

        let res = client
            .put(srv.url(&format!("/users/{id}")))
            .json(&json!({ "Name": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "PUT id {id}");

        let res = client.delete(srv.url(&format!("/users/{id}"))).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "DELETE id {id}");
    }
}

async fn partial_update_keeps_other_fields(srv: TestServer) {
    let client = reqwest::Client::new();

    let created: Value = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["ID"].as_i64().unwrap();
    let url = srv.url(&format!("/users/{id}"));

    // Same partial update twice: same final state.
    for _ in 0..2 {
        let res = client
            .put(&url)
            .json(&json!({ "Birthday": "1816-01-01" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "ID": id, "Name": "Ada", "Birthday": "1816-01-01" }));
    }

    // Empty strings mean "no change".
    let res = client
        .put(&url)
        .json(&json!({ "Name": "", "Birthday": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, json!({ "ID": id, "Name": "Ada", "Birthday": "1816-01-01" }));
}

#[tokio::test]
async fn partial_update_in_memory() {
    partial_update_keeps_other_fields(TestServer::in_memory().await).await;
}

#[tokio::test]
async fn partial_update_sqlite() {
    partial_update_keeps_other_fields(TestServer::sqlite("partial-update").await).await;
}

#[tokio::test]
async fn update_unknown_id_is_404_and_bad_body_is_400() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/users/42"))
        .json(&json!({ "Name": "Nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let created: Value = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["ID"].as_i64().unwrap();

    let res = client
        .put(srv.url(&format!("/users/{id}")))
        .header("content-type", "application/json")
        .body("[1, 2")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid request" }));
}

async fn delete_then_get_is_404(srv: TestServer) {
    let client = reqwest::Client::new();

    let created: Value = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" }))
        .await
        .json()
        .await
        .unwrap();
    let url = srv.url(&format!("/users/{}", created["ID"]));

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "User deleted successfully" }));

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert_eq!(list_len(&client, &srv).await, 0);
}

#[tokio::test]
async fn delete_in_memory() {
    delete_then_get_is_404(TestServer::in_memory().await).await;
}

#[tokio::test]
async fn delete_sqlite() {
    delete_then_get_is_404(TestServer::sqlite("delete").await).await;
}

#[tokio::test]
async fn list_returns_every_user_in_id_order() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    for (name, birthday) in [("Ada", "1815-12-10"), ("Alan", "1912-06-23")] {
        let res = create(&client, &srv, json!({ "Name": name, "Birthday": birthday })).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = client.get(srv.url("/users")).send().await.unwrap().json().await.unwrap();
    assert_eq!(
        body,
        json!([
            { "ID": 1, "Name": "Ada", "Birthday": "1815-12-10" },
            { "ID": 2, "Name": "Alan", "Birthday": "1912-06-23" },
        ])
    );
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not Found");
}

async fn boom() -> AxumStatus {
    panic!("handler exploded")
}

#[tokio::test]
async fn handler_panic_becomes_500_and_server_keeps_serving() {
    let app = with_middleware(Router::new().route("/boom", get(boom)));
    let srv = TestServer::spawn(app).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client.get(srv.url("/boom")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}

#[tokio::test]
async fn empty_bodies_carry_no_fields() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client.post(srv.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Name and Birthday are required" }));

    let created: Value = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" }))
        .await
        .json()
        .await
        .unwrap();
    let url = srv.url(&format!("/users/{}", created["ID"]));

    let res = client.put(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, created);
}

async fn assert_error(res: reqwest::Response, status: StatusCode, message: &str) {
    assert_eq!(res.status(), status);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": message }));
}

#[tokio::test]
async fn store_failures_are_500_with_per_route_messages() {
    let srv = TestServer::failing(true, StoreError::Unknown("disk I/O error".into())).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users")).send().await.unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch users").await;

    let res = create(&client, &srv, json!({ "Name": "Ada", "Birthday": "1815-12-10" })).await;
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user").await;

    let res = client
        .put(srv.url("/users/1"))
        .json(&json!({ "Name": "Grace" }))
        .send()
        .await
        .unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to update user").await;

    let res = client.delete(srv.url("/users/1")).send().await.unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete user").await;
}

#[tokio::test]
async fn lookup_failures_are_500_failed_to_fetch_user() {
    let srv = TestServer::failing(false, StoreError::Unknown("unused".into())).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users/1")).send().await.unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user").await;

    let res = client
        .put(srv.url("/users/1"))
        .json(&json!({ "Name": "Grace" }))
        .send()
        .await
        .unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user").await;

    let res = client.delete(srv.url("/users/1")).send().await.unwrap();
    assert_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user").await;
}

#[tokio::test]
async fn row_vanishing_before_write_is_404() {
    let srv = TestServer::failing(true, StoreError::NotFound).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/users/7"))
        .json(&json!({ "Birthday": "1816-01-01" }))
        .send()
        .await
        .unwrap();
    assert_error(res, StatusCode::NOT_FOUND, "User not found").await;

    let res = client.delete(srv.url("/users/7")).send().await.unwrap();
    assert_error(res, StatusCode::NOT_FOUND, "User not found").await;
}

#[tokio::test]
async fn undecodable_path_id_is_json_400() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users/%FF")).send().await.unwrap();
    assert_error(res, StatusCode::BAD_REQUEST, "Invalid user ID").await;

    let res = client
        .put(srv.url("/users/%FF"))
        .json(&json!({ "Name": "x" }))
        .send()
        .await
        .unwrap();
    assert_error(res, StatusCode::BAD_REQUEST, "Invalid user ID").await;

    let res = client.delete(srv.url("/users/%FF")).send().await.unwrap();
    assert_error(res, StatusCode::BAD_REQUEST, "Invalid user ID").await;
}

#[tokio::test]
async fn null_body_and_duplicate_fields_bind_like_the_json_binder() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users"))
        .header("content-type", "application/json")
        .body("null")
        .send()
        .await
        .unwrap();
    assert_error(res, StatusCode::BAD_REQUEST, "Name and Birthday are required").await;

    let res = client
        .post(srv.url("/users"))
        .header("content-type", "application/json")
        .body(r#"{"Name":"Ada","name":"Bob","Birthday":"1815-12-10"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["Name"], "Bob");

    let url = srv.url(&format!("/users/{}", created["ID"]));
    let res = client
        .put(&url)
        .header("content-type", "application/json")
        .body("null")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, created);
}
