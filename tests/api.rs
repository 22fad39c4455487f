//! HTTP-level tests against an in-memory database

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::path::Path;

use quire::api::{build_router, AppState};
use quire::config::Config;
use quire::db::{create_test_pool, migrations};

async fn test_server_with_static(static_dir: &Path) -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let config = Config::default();
    let cors_origin = config.server.cors_origin.clone();
    let state = AppState::new(pool, config).expect("Templates should compile");
    let app = build_router(state, &cors_origin, static_dir);
    TestServer::new(app).expect("Failed to start test server")
}

async fn test_server() -> TestServer {
    test_server_with_static(Path::new("static")).await
}

async fn create_post(server: &TestServer, title: &str, published: bool) -> Value {
    let response = server
        .post("/api/v1/admin/posts")
        .json(&json!({ "title": title, "content": "Body", "is_published": published }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_site_pages_render() {
    let server = test_server().await;

    let home = server.get("/").await;
    home.assert_status_ok();
    let html = home.text();
    assert!(html.contains("Home Page"));
    assert!(html.contains("Welcome to our website!"));

    let about = server.get("/about").await;
    about.assert_status_ok();
    assert!(about.text().contains("About Us"));

    let contact = server.get("/contact").await;
    contact.assert_status_ok();
    assert!(contact.text().contains("Contact Us"));
}

#[tokio::test]
async fn test_home_lists_only_published_posts() {
    let server = test_server().await;
    create_post(&server, "Visible post", true).await;
    create_post(&server, "Hidden draft", false).await;

    let html = server.get("/").await.text();
    assert!(html.contains("Visible post"));
    assert!(!html.contains("Hidden draft"));
}

#[tokio::test]
async fn test_api_data() {
    let server = test_server().await;
    let body = server.get("/api/data").await.json::<Value>();

    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "This is API data");
    assert!(body["timestamp"].is_string());
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], json!({ "id": 1, "name": "Item 1" }));
    assert_eq!(items[2]["name"], "Item 3");
}

#[tokio::test]
async fn test_public_post_view_counts() {
    let server = test_server().await;
    let post = create_post(&server, "Counted", true).await;
    let id = post["id"].as_i64().unwrap();
    assert_eq!(post["view_count"], 0);
    assert_eq!(post["created_at"], post["updated_at"]);

    for expected in 1..=3 {
        let viewed = server.get(&format!("/api/v1/posts/{}", id)).await;
        viewed.assert_status_ok();
        assert_eq!(viewed.json::<Value>()["view_count"], expected);
    }

    let admin_view = server.get(&format!("/api/v1/admin/posts/{}", id)).await;
    assert_eq!(admin_view.json::<Value>()["view_count"], 3);
}

#[tokio::test]
async fn test_unpublished_post_is_hidden_publicly() {
    let server = test_server().await;
    let post = create_post(&server, "Draft", false).await;
    let id = post["id"].as_i64().unwrap();

    let response = server.get(&format!("/api/v1/posts/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");

    let listed = server.get("/api/v1/posts").await.json::<Vec<Value>>();
    assert!(listed.is_empty());

    // The admin view does not count
    let admin = server.get(&format!("/api/v1/admin/posts/{}", id)).await;
    assert_eq!(admin.json::<Value>()["view_count"], 0);
}

#[tokio::test]
async fn test_create_post_validation() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/admin/posts")
        .json(&json!({ "title": "", "content": "Body" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    let posts = server.get("/api/v1/admin/posts").await.json::<Vec<Value>>();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_readonly_fields_are_rejected() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/admin/posts")
        .json(&json!({ "title": "T", "content": "C", "view_count": 99 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let post = create_post(&server, "T", true).await;
    let id = post["id"].as_i64().unwrap();
    let response = server
        .put(&format!("/api/v1/admin/posts/{}", id))
        .json(&json!({ "created_at": "2020-01-01T00:00:00Z" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let unchanged = server.get(&format!("/api/v1/admin/posts/{}", id)).await;
    assert_eq!(unchanged.json::<Value>()["created_at"], post["created_at"]);
}

#[tokio::test]
async fn test_update_and_delete_post() {
    let server = test_server().await;
    let post = create_post(&server, "Old title", false).await;
    let id = post["id"].as_i64().unwrap();

    let updated = server
        .put(&format!("/api/v1/admin/posts/{}", id))
        .json(&json!({ "title": "New title", "is_published": true }))
        .await;
    updated.assert_status_ok();
    let body = updated.json::<Value>();
    assert_eq!(body["title"], "New title");
    assert_eq!(body["is_published"], true);
    assert_eq!(body["content"], "Body");

    server
        .delete(&format!("/api/v1/admin/posts/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&format!("/api/v1/admin/posts/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_post_search_and_filters() {
    let server = test_server().await;
    create_post(&server, "Rust tips", true).await;
    create_post(&server, "Cooking", false).await;

    let found = server
        .get("/api/v1/admin/posts")
        .add_query_param("q", "rust")
        .await
        .json::<Vec<Value>>();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Rust tips");

    let drafts = server
        .get("/api/v1/admin/posts")
        .add_query_param("is_published", "false")
        .await
        .json::<Vec<Value>>();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0]["title"], "Cooking");

    let by_author = server
        .get("/api/v1/admin/posts")
        .add_query_param("author", "Anonymous")
        .await
        .json::<Vec<Value>>();
    assert_eq!(by_author.len(), 2);

    server
        .get("/api/v1/admin/posts")
        .add_query_param("sort", "title")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_moderation_flow() {
    let server = test_server().await;
    let post = create_post(&server, "Intro", true).await;
    let id = post["id"].as_i64().unwrap();

    let submitted = server
        .post(&format!("/api/v1/posts/{}/comments", id))
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "text": "Nice!" }))
        .await;
    submitted.assert_status(StatusCode::CREATED);
    let comment = submitted.json::<Value>();
    assert_eq!(comment["is_approved"], false);
    let comment_id = comment["id"].as_i64().unwrap();

    let public = server
        .get(&format!("/api/v1/posts/{}/comments", id))
        .await
        .json::<Vec<Value>>();
    assert!(public.is_empty());

    let pending = server
        .get("/api/v1/admin/comments")
        .add_query_param("is_approved", "false")
        .await
        .json::<Vec<Value>>();
    assert_eq!(pending.len(), 1);

    let approved = server
        .put(&format!("/api/v1/admin/comments/{}/approval", comment_id))
        .json(&json!({ "approved": true }))
        .await;
    approved.assert_status_ok();
    assert_eq!(approved.json::<Value>()["is_approved"], true);

    let public = server
        .get(&format!("/api/v1/posts/{}/comments", id))
        .await
        .json::<Vec<Value>>();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["name"], "Ann");
}

#[tokio::test]
async fn test_comment_errors() {
    let server = test_server().await;

    let missing_post = server
        .post("/api/v1/posts/999/comments")
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "text": "Nice!" }))
        .await;
    missing_post.assert_status(StatusCode::NOT_FOUND);

    server
        .get("/api/v1/posts/999/comments")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let post = create_post(&server, "Intro", true).await;
    let id = post["id"].as_i64().unwrap();

    let bad_email = server
        .post(&format!("/api/v1/posts/{}/comments", id))
        .json(&json!({ "name": "Ann", "email": "nope", "text": "Nice!" }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);

    let self_approved = server
        .post(&format!("/api/v1/posts/{}/comments", id))
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "text": "Hi", "is_approved": true }))
        .await;
    self_approved.assert_status(StatusCode::BAD_REQUEST);

    server
        .put("/api/v1/admin/comments/777/approval")
        .json(&json!({ "approved": true }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_post_removes_comments() {
    let server = test_server().await;
    let post = create_post(&server, "Doomed", true).await;
    let id = post["id"].as_i64().unwrap();

    let mut comment_ids = Vec::new();
    for i in 0..3 {
        let comment = server
            .post(&format!("/api/v1/posts/{}/comments", id))
            .json(&json!({ "name": format!("R{}", i), "email": "r@x.com", "text": "hey" }))
            .await
            .json::<Value>();
        comment_ids.push(comment["id"].as_i64().unwrap());
    }

    server
        .delete(&format!("/api/v1/admin/posts/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    for comment_id in comment_ids {
        server
            .get(&format!("/api/v1/admin/comments/{}", comment_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
    let remaining = server.get("/api/v1/admin/comments").await.json::<Vec<Value>>();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_category_crud_and_conflicts() {
    let server = test_server().await;

    let created = server
        .post("/api/v1/admin/categories")
        .json(&json!({ "name": "Hello, World!" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let category = created.json::<Value>();
    assert_eq!(category["slug"], "hello-world");
    assert_eq!(category["description"], "");
    let id = category["id"].as_i64().unwrap();

    let same_name = server
        .post("/api/v1/admin/categories")
        .json(&json!({ "name": "Hello, World!", "slug": "other" }))
        .await;
    same_name.assert_status(StatusCode::CONFLICT);
    assert_eq!(same_name.json::<Value>()["error"]["code"], "CONFLICT");

    server
        .post("/api/v1/admin/categories")
        .json(&json!({ "name": "Different", "slug": "hello-world" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/api/v1/admin/categories")
        .json(&json!({ "name": "Art" }))
        .await
        .assert_status(StatusCode::CREATED);

    let public = server.get("/api/v1/categories").await.json::<Vec<Value>>();
    let names: Vec<&str> = public.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Art", "Hello, World!"]);

    let searched = server
        .get("/api/v1/admin/categories")
        .add_query_param("q", "hello")
        .await
        .json::<Vec<Value>>();
    assert_eq!(searched.len(), 1);

    let renamed = server
        .put(&format!("/api/v1/admin/categories/{}", id))
        .json(&json!({ "name": "Greetings" }))
        .await;
    renamed.assert_status_ok();
    let body = renamed.json::<Value>();
    assert_eq!(body["name"], "Greetings");
    assert_eq!(body["slug"], "hello-world");

    server
        .delete(&format!("/api/v1/admin/categories/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/v1/admin/categories/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_models_registry() {
    let server = test_server().await;
    let body = server.get("/api/v1/admin/models").await.json::<Value>();
    let entities = body["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 3);
    assert_eq!(entities[0]["name"], "posts");
    assert_eq!(entities[0]["ordering"], json!(["-created_at"]));
    assert_eq!(entities[1]["editable_in_list"], json!(["is_approved"]));
}

#[tokio::test]
async fn test_bad_path_and_unknown_route() {
    let server = test_server().await;

    let bad_id = server.get("/api/v1/posts/not-a-number").await;
    bad_id.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    let unknown = server.get("/nowhere").await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<Value>()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "static content").unwrap();

    let server = test_server_with_static(dir.path()).await;
    let response = server.get("/static/hello.txt").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "static content");

    server
        .get("/static/missing.txt")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
