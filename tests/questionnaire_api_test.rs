use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use questionnaire_backend::{
    config::init_config, middleware::auth::Claims, routes, store::InMemoryQuestionnaireStore,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

const SECRET: &str = "test_secret_key";

fn app() -> Router {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", SECRET);
    env::set_var("STORE_BACKEND", "memory");
    let _ = init_config();

    routes::router(AppState::new(Arc::new(InMemoryQuestionnaireStore::new())))
}

fn token(sub: &str, role: Option<&str>) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let claims = Claims {
        sub: sub.to_string(),
        exp,
        role: role.map(str::to_string),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign token")
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn capitals_payload(pass_score: i64) -> JsonValue {
    json!({
        "title": "Geography",
        "description": "Capitals of Europe",
        "questions": [
            {
                "questionText": "Which is the capital of France?",
                "answerOptions": [
                    { "label": "Paris", "isCorrect": true },
                    { "label": "London", "isCorrect": false }
                ]
            },
            {
                "questionText": "Which are Baltic capitals?",
                "answerOptions": [
                    { "label": "Riga", "isCorrect": true },
                    { "label": "Tallinn", "isCorrect": true },
                    { "label": "Oslo", "isCorrect": false }
                ]
            }
        ],
        "passScore": pass_score
    })
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app();
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_fill_and_submit_flow() {
    let app = app();
    let admin = token("hr-1", Some("hr"));
    let user = token("user-1", None);

    let (status, created) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(capitals_payload(10)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["passScore"], 3);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = call(&app, "GET", "/api/questionnaires", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["passed"], false);

    let (status, view) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}/fill", id),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["alreadyPassed"], false);
    assert_eq!(view["questions"][0]["control"]["type"], "exclusiveChoice");
    assert_eq!(view["questions"][1]["control"]["cap"], 2);
    assert!(!view.to_string().contains("isCorrect"));

    let first = view["questions"][0]["questionId"].clone();
    let second = view["questions"][1]["questionId"].clone();
    let (status, result) = call(
        &app,
        "POST",
        &format!("/api/questionnaires/{}/submit", id),
        Some(&user),
        Some(json!({
            "answers": [
                { "questionId": first, "selected": ["Paris"] },
                { "questionId": second, "selected": ["Tallinn", "Riga"] }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{result}");
    assert_eq!(result["correctCount"], 2);
    assert_eq!(result["passed"], true);
    assert_eq!(result["persisted"], true);

    let (_, record) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(record["passedUsers"], json!(["user-1"]));

    let (_, list) = call(&app, "GET", "/api/questionnaires", Some(&user), None).await;
    assert_eq!(list[0]["passed"], true);
}

#[tokio::test]
async fn failed_submission_does_not_record_user() {
    let app = app();
    let admin = token("admin-1", Some("admin"));
    let user = token("user-2", None);

    let (_, created) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(capitals_payload(2)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let first = created["questions"][0]["id"].clone();

    let (status, result) = call(
        &app,
        "POST",
        &format!("/api/questionnaires/{}/submit", id),
        Some(&user),
        Some(json!({ "answers": [{ "questionId": first, "selected": ["London"] }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["correctCount"], 0);
    assert_eq!(result["passed"], false);

    let (_, record) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(record["passedUsers"], json!([]));
}

#[tokio::test]
async fn authoring_requires_admin_role() {
    let app = app();
    let user = token("user-3", Some("candidate"));

    let (status, _) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&user),
        Some(capitals_payload(1)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "GET", "/api/questionnaires/records", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "GET", "/api/questionnaires", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_payloads_and_missing_records() {
    let app = app();
    let admin = token("admin-2", Some("admin"));

    let mut blank_title = capitals_payload(1);
    blank_title["title"] = json!("   ");
    let (status, body) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(blank_title),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        "PUT",
        "/api/questionnaires/does-not-exist",
        Some(&admin),
        Some(capitals_payload(1)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(capitals_payload(1)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        Some(capitals_payload(7)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let user = token("user-4", None);
    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}/fill", id),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pass_after_admin_edit_keeps_the_edit() {
    let app = app();
    let admin = token("admin-3", Some("admin"));
    let user = token("user-5", None);

    let (_, created) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(capitals_payload(1)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let first = created["questions"][0]["id"].clone();

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}/fill", id),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut edited = capitals_payload(1);
    edited["title"] = json!("Geography (revised)");
    edited["questions"][0]["id"] = first.clone();
    edited["questions"][1]["id"] = created["questions"][1]["id"].clone();
    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        Some(edited),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, result) = call(
        &app,
        "POST",
        &format!("/api/questionnaires/{}/submit", id),
        Some(&user),
        Some(json!({ "answers": [{ "questionId": first, "selected": ["Paris"] }] })),
    )
    .await;
    assert_eq!(result["passed"], true);

    let (_, record) = call(
        &app,
        "GET",
        &format!("/api/questionnaires/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(record["title"], "Geography (revised)");
    assert_eq!(record["passedUsers"], json!(["user-5"]));
}

#[tokio::test]
async fn duplicate_labels_and_question_ids_are_rejected() {
    let app = app();
    let admin = token("admin-4", Some("admin"));

    let mut repeated_label = capitals_payload(1);
    repeated_label["questions"][0]["answerOptions"][1]["label"] = json!("Paris");
    let (status, _) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(repeated_label),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let shared = uuid::Uuid::new_v4();
    let mut repeated_id = capitals_payload(1);
    repeated_id["questions"][0]["id"] = json!(shared);
    repeated_id["questions"][1]["id"] = json!(shared);
    let (status, _) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(repeated_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn passes_endpoint_requires_admin_and_appends_user() {
    let app = app();
    let admin = token("admin-5", Some("hr"));
    let user = token("user-6", None);

    let (_, created) = call(
        &app,
        "POST",
        "/api/questionnaires",
        Some(&admin),
        Some(capitals_payload(1)),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/questionnaires/{}/passes", id);

    let (status, _) = call(&app, "POST", &uri, Some(&user), Some(json!({ "userId": "x" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "POST", &uri, Some(&admin), Some(json!({ "userId": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, record) =
        call(&app, "POST", &uri, Some(&admin), Some(json!({ "userId": "emp-1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["passedUsers"], json!(["emp-1"]));
    assert_eq!(record["title"], "Geography");
}
