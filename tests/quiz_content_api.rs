mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{app, login, send, send_raw};
use serde_json::{json, Value};

fn question_payload(chapter: &str, kind: &str, correct: Value) -> Value {
    json!({
        "category": "Rust",
        "chapter": chapter,
        "type": kind,
        "text": "Which types are Copy?",
        "options": [
            {"id": "o1", "text": "i32"},
            {"id": "o2", "text": "String"},
            {"id": "o3", "text": "bool"}
        ],
        "correct_option_ids": correct,
        "explanation": "Heap-owning types are not Copy"
    })
}

async fn list(app: &Router, uri: &str) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, uri, None, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn category_create_list_delete() {
    let (app, _) = app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/shuashua/categories",
        Some(&token),
        Some(json!({"name": "Rust", "icon": "Code", "color": "bg-purple-100"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["data"]["id"].as_str().unwrap().to_owned();
    assert_eq!(body["data"]["icon"], "Code");

    let categories = list(&app, "/api/shuashua/categories").await;
    assert!(categories.iter().any(|c| c["id"] == id.as_str()));

    let uri = format!("/api/shuashua/categories/{id}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let categories = list(&app, "/api/shuashua/categories").await;
    assert!(categories.iter().all(|c| c["id"] != id.as_str()));

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn category_writes_need_a_token_and_a_name() {
    let (app, _) = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/shuashua/categories",
        None,
        Some(json!({"name": "Rust"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/shuashua/categories",
        Some(&token),
        Some(json!({"name": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(list(&app, "/api/shuashua/categories").await.is_empty());
}

#[tokio::test]
async fn chapters_filter_and_reject_duplicates() {
    let (app, _) = app().await;
    let token = login(&app).await;

    for (category, name) in [("Rust", "Ownership"), ("Rust", "Traits"), ("Go", "Channels")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/shuashua/chapters",
            Some(&token),
            Some(json!({"category": category, "name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/shuashua/chapters",
        Some(&token),
        Some(json!({"category": "Rust", "name": "Traits"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    assert_eq!(list(&app, "/api/shuashua/chapters").await.len(), 3);
    assert_eq!(list(&app, "/api/shuashua/chapters?category=").await.len(), 3);
    let rust = list(&app, "/api/shuashua/chapters?category=Rust").await;
    assert_eq!(rust.len(), 2);

    let id = rust[0]["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/shuashua/chapters/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list(&app, "/api/shuashua/chapters?category=Rust").await.len(), 1);
}

#[tokio::test]
async fn questions_create_filter_delete() {
    let (app, _) = app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/shuashua/questions",
        Some(&token),
        Some(question_payload("Ownership", "multiple_choice", json!(["o1", "o3"]))),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["data"]["id"].as_str().unwrap().to_owned();
    assert_eq!(body["data"]["type"], "multiple_choice");
    assert_eq!(body["data"]["correct_option_ids"], json!(["o1", "o3"]));

    let mut traits = question_payload("Traits", "SINGLE_CHOICE", json!([]));
    traits["correctOptionIds"] = json!(["o2"]);
    traits.as_object_mut().unwrap().remove("correct_option_ids");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/shuashua/questions",
        Some(&token),
        Some(traits),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["type"], "single_choice");

    assert_eq!(list(&app, "/api/shuashua/questions").await.len(), 2);
    assert_eq!(list(&app, "/api/shuashua/questions?category=Rust").await.len(), 2);
    assert!(list(&app, "/api/shuashua/questions?category=Go").await.is_empty());
    let ownership = list(&app, "/api/shuashua/questions?category=Rust&chapter=Ownership").await;
    assert_eq!(ownership.len(), 1);
    assert_eq!(ownership[0]["id"], id.as_str());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/shuashua/questions/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let remaining = list(&app, "/api/shuashua/questions").await;
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0]["id"], id.as_str());
}

#[tokio::test]
async fn invalid_questions_are_rejected() {
    let (app, _) = app().await;
    let token = login(&app).await;

    let invalid = [
        question_payload("Ownership", "single_choice", json!(["o1", "o3"])),
        question_payload("Ownership", "multiple_choice", json!([])),
        question_payload("Ownership", "multiple_choice", json!(["o9"])),
        question_payload("", "single_choice", json!(["o1"])),
    ];
    for payload in invalid {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/shuashua/questions",
            Some(&token),
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["success"], false);
    }
    assert!(list(&app, "/api/shuashua/questions").await.is_empty());
}

#[tokio::test]
async fn quiz_home_lists_categories() {
    let (app, _) = app().await;
    let token = login(&app).await;
    send(
        &app,
        Method::POST,
        "/api/shuashua/categories",
        Some(&token),
        Some(json!({"name": "Physics", "icon": "Rocket"})),
    )
    .await;

    let (status, bytes) = send_raw(&app, Method::GET, "/shua", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(bytes).unwrap();
    assert!(page.contains("Physics"));
    assert!(page.contains("🚀"));
    assert!(page.contains("Start practising"));
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let (app, _) = app().await;
    let token = login(&app).await;

    let mut missing_options = question_payload("Ownership", "single_choice", json!(["o1"]));
    missing_options.as_object_mut().unwrap().remove("options");
    let bad_bodies = [
        (
            "/api/shuashua/questions",
            question_payload("Ownership", "true_false", json!(["o1"])),
        ),
        ("/api/shuashua/questions", missing_options),
        ("/api/shuashua/categories", json!({})),
        ("/api/shuashua/chapters", json!({"category": "Rust"})),
    ];
    for (uri, payload) in bad_bodies {
        let (status, body) = send(&app, Method::POST, uri, Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 400);
        assert!(body["message"].is_string());
    }
    assert!(list(&app, "/api/shuashua/questions").await.is_empty());
    assert!(list(&app, "/api/shuashua/categories").await.is_empty());
}
