//! API integration tests

use bookloan_server::{config::ReturnPolicy, models::Role};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::{admin_token, member_token, token, TestServer};

fn book_body(inventory: i64) -> Value {
    json!({
        "title": "Test Book",
        "author": "Test Author",
        "cover": "HR",
        "inventory": inventory,
        "daily_fee": "1.99"
    })
}

fn return_date() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(3)).to_string()
}

async fn create_book(client: &Client, server: &TestServer, inventory: i64) -> i64 {
    let response = client
        .post(server.url("/books"))
        .bearer_auth(admin_token())
        .json(&book_body(inventory))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn get_inventory(client: &Client, server: &TestServer, book_id: i64) -> i64 {
    let body: Value = client
        .get(server.url(&format!("/books/{}", book_id)))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["inventory"].as_i64().expect("No inventory")
}

async fn borrow(client: &Client, server: &TestServer, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(server.url("/borrowings"))
        .bearer_auth(token)
        .json(&json!({
            "book": book_id,
            "expected_return_date": return_date()
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn list_borrowings(client: &Client, server: &TestServer, token: &str, query: &str) -> Vec<Value> {
    let response = client
        .get(server.url(&format!("/borrowings{}", query)))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    body.as_array().expect("Expected an array").clone()
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = client
        .get(server.url("/ready"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let server = TestServer::start().await;
    let root = server.base_url.trim_end_matches("/api/v1");

    let response = Client::new()
        .get(format!("{}/api-docs/openapi.json", root))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["paths"]["/borrowings"].is_object());
}

#[tokio::test]
async fn test_book_crud_as_admin() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 5).await;

    let response = client
        .get(server.url(&format!("/books/{}", book_id)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Test Book");
    assert_eq!(body["cover"], "HR");
    assert_eq!(body["daily_fee"], "1.99");

    let response = client
        .patch(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(admin_token())
        .json(&json!({"cover": "ST"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["cover"], "ST");
    assert_eq!(body["inventory"], 5);

    let mut replacement = book_body(2);
    replacement["title"] = json!("Second Edition");
    let response = client
        .put(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(admin_token())
        .json(&replacement)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Second Edition");
    assert_eq!(body["inventory"], 2);

    let response = client
        .delete(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(server.url(&format!("/books/{}", book_id)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_book_rejected_with_field_detail() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/books"))
        .bearer_auth(admin_token())
        .json(&book_body(-1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["inventory"].is_array());

    let mut unknown_cover = book_body(1);
    unknown_cover["cover"] = json!("PAPERBACK");
    let response = client
        .post(server.url("/books"))
        .bearer_auth(admin_token())
        .json(&unknown_cover)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_cannot_modify_book() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 4).await;

    let response = client
        .put(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(member_token(7))
        .json(&book_body(99))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(member_token(7))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(server.url("/books"))
        .json(&book_body(1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(get_inventory(&client, &server, book_id).await, 4);
}

#[tokio::test]
async fn test_member_write_forbidden_before_body_is_read() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 4).await;

    let response = client
        .put(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(member_token(7))
        .json(&json!({"title": "x"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(server.url("/books"))
        .bearer_auth(member_token(7))
        .body("not json")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .patch(server.url("/payments/1"))
        .bearer_auth(member_token(7))
        .json(&json!({"status": "ZZ"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_path_id_uses_error_body() {
    let server = TestServer::start().await;
    let client = Client::new();

    for path in ["/books/abc", "/payments/abc"] {
        let response = client
            .get(server.url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["error"], "BadValue");
        assert!(body["message"].is_string());
    }

    let response = client
        .delete(server.url("/borrowings/abc"))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_anonymous_reads_follow_configuration() {
    let server = TestServer::start_with(|config| config.auth.anonymous_read = false).await;
    let client = Client::new();

    let response = client
        .get(server.url("/books"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(server.url("/payments"))
        .bearer_auth(member_token(3))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_token_rejected_on_public_route() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(server.url("/books"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(server.url("/borrowings"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_last_copy_borrow_and_return() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 1).await;
    let member = member_token(7);

    let response = borrow(&client, &server, &member, book_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let borrowing: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(borrowing["user"], 7);
    assert_eq!(borrowing["book"], book_id);
    assert!(borrowing["actual_return_date"].is_null());
    assert_eq!(get_inventory(&client, &server, book_id).await, 0);
    assert_eq!(list_borrowings(&client, &server, &admin_token(), "").await.len(), 1);

    let response = borrow(&client, &server, &member_token(8), book_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BookNotAvailable");
    assert!(body["fields"]["book"].is_array());
    assert_eq!(get_inventory(&client, &server, book_id).await, 0);
    assert_eq!(list_borrowings(&client, &server, &admin_token(), "").await.len(), 1);

    let response = client
        .delete(server.url(&format!("/borrowings/{}", borrowing["id"])))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_inventory(&client, &server, book_id).await, 1);
    assert!(list_borrowings(&client, &server, &admin_token(), "").await.is_empty());
}

#[tokio::test]
async fn test_concurrent_borrows_of_last_copy() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 1).await;
    let (first_token, second_token) = (member_token(7), member_token(8));

    let (first, second) = tokio::join!(
        borrow(&client, &server, &first_token, book_id),
        borrow(&client, &server, &second_token, book_id)
    );
    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    assert_eq!(get_inventory(&client, &server, book_id).await, 0);
    assert_eq!(list_borrowings(&client, &server, &admin_token(), "").await.len(), 1);
}

#[tokio::test]
async fn test_past_expected_return_date_accepted() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 2).await;

    let response = client
        .post(server.url("/borrowings"))
        .bearer_auth(member_token(7))
        .json(&json!({"book": book_id, "expected_return_date": "2020-01-01"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let borrowing: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(borrowing["expected_return_date"], "2020-01-01");
    assert_eq!(get_inventory(&client, &server, book_id).await, 1);
}

#[tokio::test]
async fn test_return_at_max_inventory_is_rejected() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 1).await;

    let response = borrow(&client, &server, &member_token(7), book_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let borrowing: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .patch(server.url(&format!("/books/{}", book_id)))
        .bearer_auth(admin_token())
        .json(&json!({"inventory": i32::MAX}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(server.url(&format!("/borrowings/{}", borrowing["id"])))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["inventory"].is_array());

    // the server keeps answering and nothing changed
    assert_eq!(get_inventory(&client, &server, book_id).await, i64::from(i32::MAX));
    assert_eq!(list_borrowings(&client, &server, &admin_token(), "").await.len(), 1);
}

#[tokio::test]
async fn test_borrow_with_invalid_book() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = borrow(&client, &server, &member_token(7), 123).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(server.url("/borrowings"))
        .bearer_auth(member_token(7))
        .json(&json!({"book": 123}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(list_borrowings(&client, &server, &admin_token(), "").await.is_empty());
}

#[tokio::test]
async fn test_borrowing_list_is_scoped() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 10).await;

    borrow(&client, &server, &member_token(7), book_id).await;
    borrow(&client, &server, &member_token(8), book_id).await;
    borrow(&client, &server, &member_token(8), book_id).await;

    let own = list_borrowings(&client, &server, &member_token(7), "").await;
    assert_eq!(own.len(), 1);
    assert!(own.iter().all(|b| b["user"] == 7));

    let snooping = list_borrowings(&client, &server, &member_token(7), "?user_id=8").await;
    assert!(snooping.is_empty());

    assert_eq!(list_borrowings(&client, &server, &admin_token(), "").await.len(), 3);
    let filtered = list_borrowings(&client, &server, &admin_token(), "?user_id=8").await;
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|b| b["user"] == 8));
}

#[tokio::test]
async fn test_borrowing_detail_and_return_permissions() {
    let server = TestServer::start().await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 2).await;

    let borrowing: Value = borrow(&client, &server, &member_token(7), book_id)
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let path = format!("/borrowings/{}", borrowing["id"]);

    let response = client
        .get(server.url(&path))
        .bearer_auth(member_token(7))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(server.url(&path))
        .bearer_auth(member_token(8))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Default policy: only admins return
    let response = client
        .delete(server.url(&path))
        .bearer_auth(member_token(7))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(get_inventory(&client, &server, book_id).await, 1);

    let response = client
        .delete(server.url("/borrowings/999"))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_return_policy() {
    let server = TestServer::with_return_policy(ReturnPolicy::OwnerOrAdmin).await;
    let client = Client::new();
    let book_id = create_book(&client, &server, 1).await;

    let borrowing: Value = borrow(&client, &server, &member_token(7), book_id)
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let path = format!("/borrowings/{}", borrowing["id"]);

    let response = client
        .delete(server.url(&path))
        .bearer_auth(member_token(8))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(server.url(&path))
        .bearer_auth(member_token(7))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_inventory(&client, &server, book_id).await, 1);
}

#[tokio::test]
async fn test_payment_round_trip() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/payments"))
        .bearer_auth(admin_token())
        .json(&json!({"status": "PN", "type": "PN"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.expect("Failed to parse response");

    let fetched: Value = client
        .get(server.url(&format!("/payments/{}", created["id"])))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(fetched, created);
    assert_eq!(fetched["status"], "PN");
    assert_eq!(fetched["type"], "PN");

    let response = client
        .patch(server.url(&format!("/payments/{}", created["id"])))
        .bearer_auth(admin_token())
        .json(&json!({"status": "PD"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "PD");
    assert_eq!(body["type"], "PN");
}

#[tokio::test]
async fn test_member_cannot_modify_payment() {
    let server = TestServer::start().await;
    let client = Client::new();

    let created: Value = client
        .post(server.url("/payments"))
        .bearer_auth(admin_token())
        .json(&json!({"status": "PN", "type": "FN"}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let path = format!("/payments/{}", created["id"]);

    let response = client
        .put(server.url(&path))
        .bearer_auth(token(5, Role::Member))
        .json(&json!({"status": "PD", "type": "FN"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(server.url(&path))
        .bearer_auth(token(5, Role::Member))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let fetched: Value = client
        .get(server.url(&path))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(fetched, created);
}
