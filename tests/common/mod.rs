#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::App;
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const EMAIL: &str = "user.api@test.com";
pub const PASSWORD: &str = "password";

pub struct TestApp {
    pub app: App,
    pub router: Router,
}

pub fn settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            ..DatabaseSettings::default()
        },
        ..Settings::default()
    }
}

/// A migrated in-memory application with one registered user.
pub async fn spawn() -> TestApp {
    let app = App::bootstrap(settings()).await.unwrap();
    app.create_user("User Api", EMAIL, PASSWORD).await.unwrap();
    let router = app.router();
    TestApp { app, router }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Log in as the default user and return the bearer token.
    pub async fn token(&self) -> String {
        let response = self.login(EMAIL, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }
}

pub fn gatsby() -> Value {
    json!({
        "title": "The Great Gatsby",
        "description": "A story of the fabulously wealthy Jay Gatsby",
        "author": "F. Scott Fitzgerald",
        "genre": "Novel",
        "publication_year": 1925,
        "pages": 180,
        "publisher": "Scribner"
    })
}
