#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, Error};
use serde_json::{json, Value};
use std::sync::Arc;

use todolist::auth::TokenCodec;
use todolist::state::AppState;
use todolist::store::MemoryStore;

pub const TEST_SECRET: &[u8] = b"integration_test_secret";

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub token: String,
}

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenCodec::new(TEST_SECRET, chrono::Duration::hours(1)),
    ))
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Sends `req` and returns the status with the decoded JSON body.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "response was not JSON. Status: {}. Body: {:?}",
            status,
            String::from_utf8_lossy(&body)
        )
    });
    (status, json)
}

pub async fn signup_and_login<S, B>(app: &S, username: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let email = format!("{}@example.com", username);
    let req = test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "username": username, "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    TestUser {
        id: body["response"]["user_id"].as_i64().expect("user_id") as i32,
        token: body["response"]["token"].as_str().expect("token").to_string(),
    }
}
