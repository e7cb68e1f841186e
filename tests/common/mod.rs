use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use versi::{app::build_app, email::MemoryEmailQueue, state::AppState};

pub const BOUNDARY: &str = "versi-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub queue: Arc<MemoryEmailQueue>,
}

#[allow(dead_code)]
pub fn test_app() -> TestApp {
    let (state, queue) = AppState::fake_with_queue();
    TestApp {
        router: build_app(state.clone()),
        state,
        queue,
    }
}

#[allow(dead_code)]
pub fn test_app_with_state(state: AppState) -> TestApp {
    TestApp {
        router: build_app(state.clone()),
        queue: Arc::new(MemoryEmailQueue::default()),
        state,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router never fails");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    #[allow(dead_code)]
    pub async fn register(&self, username: &str) -> Value {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@x.com"),
                    "password": "pw123",
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
        body
    }

    #[allow(dead_code)]
    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/login",
                None,
                json!({"email": format!("{username}@x.com"), "password": "pw123"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login {username}: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Registers and logs in; returns `(user_id, token)`.
    #[allow(dead_code)]
    pub async fn signed_in(&self, username: &str) -> (String, String) {
        let user = self.register(username).await;
        let token = self.login(username).await;
        (user["id"].as_str().expect("id").to_string(), token)
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[allow(dead_code)]
pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

/// One part of a multipart body: text when `file_name` is `None`.
#[allow(dead_code)]
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

#[allow(dead_code)]
pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request")
}
