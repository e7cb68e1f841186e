//! Posts, comments, likes and friendships over HTTP.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

mod common;

use common::{empty_request, json_request, multipart_request, test_app, Part, TestApp};

async fn create_post(app: &TestApp, token: &str, title: &str) -> Value {
    let (status, body) = app
        .send(multipart_request(
            "/posts/create",
            Some(token),
            &[
                Part { name: "title", file_name: None, data: title.as_bytes() },
                Part { name: "content", file_name: None, data: b"hello world" },
                Part { name: "topic", file_name: None, data: b"rust" },
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn post_lifecycle_is_author_only() {
    let app = test_app();
    let (alice_id, alice) = app.signed_in("alice").await;
    let (_, bob) = app.signed_in("bob").await;

    let post = create_post(&app, &alice, "First").await;
    let post_id = post["id"].as_str().unwrap();
    assert_eq!(post["author_id"], alice_id.as_str());

    let (status, body) = app
        .send(empty_request(Method::GET, &format!("/posts/{post_id}"), Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "First");

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &format!("/posts/{post_id}"),
            Some(&bob),
            json!({"title": "hijacked"}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &format!("/posts/{post_id}"),
            Some(&alice),
            json!({"title": "Edited"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Edited");

    let (status, body) = app
        .send(empty_request(
            Method::GET,
            &format!("/posts/user/{alice_id}"),
            Some(&bob),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(empty_request(Method::DELETE, &format!("/posts/{post_id}"), Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(empty_request(Method::DELETE, &format!("/posts/{post_id}"), Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .send(empty_request(Method::GET, &format!("/posts/{post_id}"), Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_requires_fields_and_valid_media() {
    let app = test_app();
    let (_, alice) = app.signed_in("alice").await;

    let (status, _) = app
        .send(multipart_request(
            "/posts/create",
            Some(&alice),
            &[Part { name: "title", file_name: None, data: b"only a title" }],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart_request(
            "/posts/create",
            Some(&alice),
            &[
                Part { name: "title", file_name: None, data: b"t" },
                Part { name: "content", file_name: None, data: b"c" },
                Part { name: "topic", file_name: None, data: b"x" },
                Part { name: "image", file_name: Some("virus.exe"), data: b"MZ" },
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(multipart_request(
            "/posts/create",
            Some(&alice),
            &[
                Part { name: "title", file_name: None, data: b"t" },
                Part { name: "content", file_name: None, data: b"c" },
                Part { name: "topic", file_name: None, data: b"x" },
                Part { name: "video", file_name: Some("clip.webm"), data: b"webm" },
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["video_url"].as_str().unwrap().starts_with("/uploads/videos/"));
    assert!(body["image_url"].is_null());
}

#[tokio::test]
async fn comments_and_likes() {
    let app = test_app();
    let (_, alice) = app.signed_in("alice").await;
    let (_, bob) = app.signed_in("bob").await;
    let post = create_post(&app, &alice, "Likeable").await;
    let post_id = post["id"].as_str().unwrap();

    let (status, comment) = app
        .send(multipart_request(
            &format!("/posts/{post_id}/comments"),
            Some(&bob),
            &[Part { name: "content", file_name: None, data: b"great post" }],
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{comment}");
    let comment_id = comment["id"].as_str().unwrap();

    let (status, listed) = app
        .send(empty_request(
            Method::GET,
            &format!("/posts/{post_id}/comments"),
            Some(&alice),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["content"], "great post");

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &format!("/posts/comments/{comment_id}"),
            Some(&alice),
            json!({"content": "not yours"}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let like_uri = format!("/posts/likes/{post_id}");
    let (status, _) = app
        .send(empty_request(Method::POST, &like_uri, Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .send(empty_request(Method::POST, &like_uri, Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let comment_like = format!("/comments/likes/{comment_id}");
    let (status, _) = app
        .send(empty_request(Method::POST, &comment_like, Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, count) = app
        .send(empty_request(Method::GET, &format!("{like_uri}/count"), Some(&alice)))
        .await;
    assert_eq!(count["count"], 1);

    let (status, _) = app
        .send(empty_request(Method::DELETE, &like_uri, Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .send(empty_request(Method::DELETE, &like_uri, Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, count) = app
        .send(empty_request(Method::GET, &format!("{comment_like}/count"), Some(&bob)))
        .await;
    assert_eq!(count["count"], 1);

    let (status, _) = app
        .send(empty_request(
            Method::DELETE,
            &format!("/posts/comments/{comment_id}"),
            Some(&bob),
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn friendship_request_accept_and_listing() {
    let app = test_app();
    let (alice_id, alice) = app.signed_in("alice").await;
    let (bob_id, bob) = app.signed_in("bob").await;

    let (status, req) = app
        .send(json_request(
            Method::POST,
            "/friendship/send",
            Some(&alice),
            json!({"addressee_id": bob_id}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(req["status"], "pending");
    let id = req["id"].as_str().unwrap();

    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/friendship/send",
            Some(&bob),
            json!({"addressee_id": alice_id}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, pending) = app
        .send(empty_request(Method::GET, "/friendship/pending", Some(&bob)))
        .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(empty_request(
            Method::POST,
            &format!("/friendship/accept/{id}"),
            Some(&alice),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = app
        .send(empty_request(
            Method::POST,
            &format!("/friendship/accept/{id}"),
            Some(&bob),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, _) = app
        .send(empty_request(
            Method::POST,
            &format!("/friendship/decline/{id}"),
            Some(&bob),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, friends) = app
        .send(empty_request(Method::GET, "/friendship/friends", Some(&alice)))
        .await;
    assert_eq!(friends.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn friend_request_to_self_is_bad_request() {
    let app = test_app();
    let (alice_id, alice) = app.signed_in("alice").await;
    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/friendship/send",
            Some(&alice),
            json!({"addressee_id": alice_id}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
