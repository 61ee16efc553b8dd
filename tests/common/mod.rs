#![allow(dead_code)]

use axum_test::TestServer;
use estate_server::config::{AppConfig, BootstrapAdminConfig};
use estate_server::startup::{build_router, build_state};
use http::StatusCode;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@estate.test";
pub const ADMIN_PASSWORD: &str = "admin-secret-pw";

/// Development defaults with a fixed signing key and a bootstrap admin
pub fn create_test_app_config() -> AppConfig {
    let mut config = AppConfig::default_config();
    config.auth.jwt_secret = "integration-test-signing-secret".to_string();
    config.bootstrap_admin = Some(BootstrapAdminConfig {
        name: "Test Admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        phone: "+15550009999".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    });
    config
}

/// Full application on a fresh in-memory SQLite database
pub async fn setup_test_server() -> TestServer {
    setup_test_server_with(create_test_app_config()).await
}

pub async fn setup_test_server_with(config: AppConfig) -> TestServer {
    let state = build_state(config).await.unwrap();
    TestServer::new(build_router(state)).unwrap()
}

pub fn registration_json(name: &str, email: &str, phone: &str, role: Option<&str>) -> Value {
    let mut body = json!({
        "name": name,
        "email": email,
        "phone": phone,
        "password": "password123",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    body
}

/// Register an account and return `(token, user)`
pub async fn register(
    server: &TestServer,
    name: &str,
    email: &str,
    phone: &str,
    role: Option<&str>,
) -> (String, Value) {
    let response = server
        .post("/api/auth/register")
        .json(&registration_json(name, email, phone, role))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());

    let body: Value = response.json();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"].clone(),
    )
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    response.json::<Value>()["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(server: &TestServer) -> String {
    login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn property_json(title: &str, property_type: &str, city: &str, price: f64) -> Value {
    json!({
        "title": title,
        "description": "Spacious home close to the market",
        "propertyType": property_type,
        "listingType": "sale",
        "price": price,
        "address": "12 Main Street",
        "city": city,
        "state": "Maharashtra",
        "zipcode": "411001",
        "bedrooms": 3,
        "bathrooms": 2,
        "area": 1450.0,
        "yearBuilt": 2012,
        "condition": "good",
        "features": ["parking", "lift"],
        "images": []
    })
}

pub async fn create_property(server: &TestServer, token: &str, body: &Value) -> Value {
    let response = server
        .post("/api/properties")
        .add_header("Authorization", bearer(token))
        .json(body)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    response.json()
}

/// Register a broker, submit a profile and have the admin verify it.
/// Returns `(token, user, profile)`.
pub async fn verified_broker(
    server: &TestServer,
    email: &str,
    phone: &str,
    license: &str,
) -> (String, Value, Value) {
    let (token, user) = register(server, "Broker", email, phone, Some("broker")).await;

    let response = server
        .post("/api/brokers/profile")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "company": "Skyline Realty",
            "licenseNumber": license,
            "experienceYears": 8,
            "servingAreas": ["Pune", "Mumbai"],
            "specializations": ["residential"]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    let profile: Value = response.json();

    let admin = admin_token(server).await;
    let response = server
        .patch(&format!(
            "/api/admin/brokers/{}/verification",
            profile["id"].as_str().unwrap()
        ))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "status": "verified" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());

    (token, user, response.json())
}
