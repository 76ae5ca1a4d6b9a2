mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{spawn, EMAIL, PASSWORD};

#[tokio::test]
async fn login_issues_a_bearer_token() {
    let app = spawn().await;

    let response = app.login(EMAIL, PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "bearer");
    assert_eq!(response.body["expires_in"], 3600);
    assert!(!response.body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = spawn().await;

    for (email, password) in [(EMAIL, "wrong"), ("nobody@test.com", PASSWORD)] {
        let response = app.login(email, password).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", email);
        assert_eq!(response.body, json!({ "error": "Unauthorized" }));
    }

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": EMAIL })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn login_without_a_usable_body_is_unauthorized() {
    let app = spawn().await;

    let bodyless = app
        .request(Method::POST, "/api/v1/auth/login", None, None)
        .await;
    assert_eq!(bodyless.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bodyless.body, json!({ "error": "Unauthorized" }));

    let malformed = app
        .request(Method::POST, "/api/v1/auth/login", None, Some(json!("not an object")))
        .await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed.body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn logout_revokes_only_the_presented_token() {
    let app = spawn().await;
    let first = app.token().await;
    let second = app.token().await;

    let response = app
        .request(Method::POST, "/api/v1/auth/logout", Some(&first), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "message": "Successfully logged out" }));

    let reused = app
        .request(Method::GET, "/api/v1/books", Some(&first), None)
        .await;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reused.body, json!({ "message": "Unauthenticated." }));

    let again = app
        .request(Method::POST, "/api/v1/auth/logout", Some(&first), None)
        .await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);

    let other = app
        .request(Method::GET, "/api/v1/books", Some(&second), None)
        .await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_requires_a_token() {
    let app = spawn().await;

    let response = app
        .request(Method::POST, "/api/v1/auth/logout", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "message": "Unauthenticated." }));
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = spawn().await;
    let forged = bookshelf_authz::TokenGuard::new(b"some-other-secret", 3600)
        .issue(1)
        .unwrap();

    let response = app
        .request(
            Method::GET,
            "/api/v1/books",
            Some(&forged.access_token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seed_user_is_created_once() {
    let mut settings = common::settings();
    settings.auth.seed_user = Some(bookshelf_kernel::settings::SeedUser {
        name: "Seed".to_string(),
        email: "seed@test.com".to_string(),
        password: "secret".to_string(),
    });

    let app = bookshelf_app::App::bootstrap(settings.clone()).await.unwrap();
    let users = bookshelf_app::UserStore::new(app.db.clone());
    let seeded = users.find_by_email("seed@test.com").await.unwrap().unwrap();
    assert_eq!(seeded.name, "Seed");

    let err = app
        .create_user("Seed again", "seed@test.com", "secret")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn health_and_docs_are_public() {
    let app = spawn().await;

    let health = app.request(Method::GET, "/healthz", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!("ok"));

    let docs = app.request(Method::GET, "/docs/openapi.json", None, None).await;
    assert_eq!(docs.status, StatusCode::OK);
    let paths = docs.body["paths"].as_object().unwrap();
    for path in [
        "/api/v1/auth/login",
        "/api/v1/auth/logout",
        "/api/v1/books",
        "/api/v1/books/{id}",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(docs.body["components"]["securitySchemes"]["jwt"].is_object());
}

#[tokio::test]
async fn unknown_routes_answer_in_json() {
    let app = spawn().await;

    let response = app.request(Method::GET, "/api/v1/nothing", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "message": "Not Found" }));
}
