use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use fintrack_server::{api::app_router, build_state, config::Config};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        db_path: tmp.path().join("test.db").to_string_lossy().into_owned(),
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn days_from_today(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn healthz_responds_ok() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn goal_completes_when_contributions_reach_target() {
    let (app, _tmp) = build_test_router().await;

    let (status, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({
            "title": "Emergency fund",
            "targetAmount": 100.0,
            "deadline": days_from_today(30),
            "createdBy": "alice"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["status"], "Active");
    assert_eq!(goal["currentAmount"], 0.0);
    let id = goal["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/goals/{}/contributions", id);
    let (status, goal) = send(&app, Method::POST, &uri, Some(json!({ "amount": 60.0 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["currentAmount"], 60.0);
    assert_eq!(goal["status"], "Active");

    let (_, goal) = send(&app, Method::POST, &uri, Some(json!({ "amount": 40.0 }))).await;
    assert_eq!(goal["currentAmount"], 100.0);
    assert_eq!(goal["status"], "Completed");
    assert_eq!(goal["contributions"].as_array().unwrap().len(), 2);

    let (status, contributions) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let amounts: Vec<f64> = contributions
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts, vec![60.0, 40.0]);

    let (status, summary) = send(&app, Method::GET, "/api/v1/goals/summary?createdBy=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["completedCount"], 1);
    assert_eq!(summary["totalSaved"], 100.0);
}

#[tokio::test]
async fn past_deadline_goal_is_created_expired() {
    let (app, _tmp) = build_test_router().await;
    let (status, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({
            "title": "Late",
            "targetAmount": 50.0,
            "deadline": days_from_today(-1)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["status"], "Expired");
}

#[tokio::test]
async fn invalid_goal_input_is_rejected() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({
            "title": "Nothing",
            "targetAmount": 0.0,
            "deadline": days_from_today(10)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({ "title": "No deadline", "targetAmount": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, goals) = send(&app, Method::GET, "/api/v1/goals", None).await;
    assert!(goals.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_goal_returns_not_found() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/goals/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/goals/missing/contributions",
        Some(json!({ "amount": 5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_goal_removes_it() {
    let (app, _tmp) = build_test_router().await;
    let (_, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({
            "title": "Bike",
            "targetAmount": 300.0,
            "deadline": days_from_today(60)
        })),
    )
    .await;
    let uri = format!("/api/v1/goals/{}", goal["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_fields_get_the_error_envelope() {
    let (app, _tmp) = build_test_router().await;

    for body in [
        json!({ "targetAmount": 10.0, "deadline": days_from_today(10) }),
        json!({ "title": "No target", "deadline": days_from_today(10) }),
    ] {
        let (status, error) = send(&app, Method::POST, "/api/v1/goals", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], 400);
        assert!(error["message"].is_string());
    }

    let (_, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(json!({
            "title": "Laptop",
            "targetAmount": 900.0,
            "deadline": days_from_today(10)
        })),
    )
    .await;
    let goal_uri = format!("/api/v1/goals/{}", goal["id"].as_str().unwrap());
    let uri = format!("{}/contributions", goal_uri);
    let (status, error) = send(&app, Method::POST, &uri, Some(json!({ "note": "no amount" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], 400);

    let (_, stored) = send(&app, Method::GET, &goal_uri, None).await;
    assert_eq!(stored["currentAmount"], 0.0);
}
