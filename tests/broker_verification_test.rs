use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{bearer, register, verified_broker};

fn profile_json(license: &str) -> Value {
    json!({
        "company": "Harbour Homes",
        "licenseNumber": license,
        "experienceYears": 3,
        "servingAreas": ["Kochi"],
        "specializations": ["rentals", "commercial"]
    })
}

async fn submit_profile(server: &TestServer, token: &str, license: &str) -> Value {
    let response = server
        .post("/api/brokers/profile")
        .add_header("Authorization", bearer(token))
        .json(&profile_json(license))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    response.json()
}

async fn review(server: &TestServer, admin: &str, profile_id: &str, body: Value) -> axum_test::TestResponse {
    server
        .patch(&format!("/api/admin/brokers/{}/verification", profile_id))
        .add_header("Authorization", bearer(admin))
        .json(&body)
        .await
}

#[tokio::test]
async fn test_profile_starts_pending_and_only_brokers_submit() {
    let server = common::setup_test_server().await;

    let (customer, _) = register(&server, "Cust", "cust@example.com", "+919800000301", None).await;
    let response = server
        .post("/api/brokers/profile")
        .add_header("Authorization", bearer(&customer))
        .json(&profile_json("KL-0001"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (broker, user) = register(&server, "Brk", "brk@example.com", "+919800000302", Some("broker")).await;
    assert_eq!(user["role"], "broker");

    let profile = submit_profile(&server, &broker, "KL-0002").await;
    assert_eq!(profile["verificationStatus"], "pending");
    assert_eq!(profile["userId"], user["id"]);

    // One profile per broker
    let response = server
        .post("/api/brokers/profile")
        .add_header("Authorization", bearer(&broker))
        .json(&profile_json("KL-0003"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // Pending profiles stay out of the public directory
    let directory: Value = server.get("/api/brokers").await.json();
    assert_eq!(directory["total"], 0);
    let response = server
        .get(&format!("/api/brokers/{}", profile["id"].as_str().unwrap()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let mine: Value = server
        .get("/api/brokers/profile/me")
        .add_header("Authorization", bearer(&broker))
        .await
        .json();
    assert_eq!(mine["id"], profile["id"]);
}

#[tokio::test]
async fn test_license_numbers_are_unique() {
    let server = common::setup_test_server().await;
    let (first, _) = register(&server, "One", "one@example.com", "+919800000303", Some("broker")).await;
    let (second, _) = register(&server, "Two", "two@example.com", "+919800000304", Some("broker")).await;

    submit_profile(&server, &first, "KL-0100").await;
    let response = server
        .post("/api/brokers/profile")
        .add_header("Authorization", bearer(&second))
        .json(&profile_json("KL-0100"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["kind"], "conflict");
}

#[tokio::test]
async fn test_verification_transitions() {
    let server = common::setup_test_server().await;
    let admin = common::admin_token(&server).await;

    let (broker, _) = register(&server, "Brk", "brk2@example.com", "+919800000305", Some("broker")).await;
    let profile = submit_profile(&server, &broker, "KL-0200").await;
    let id = profile["id"].as_str().unwrap();

    let response = review(&server, &admin, id, json!({ "status": "pending" })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = review(&server, &admin, id, json!({ "status": "rejected" })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = review(&server, &admin, id, json!({ "status": "verified" })).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let verified: Value = response.json();
    assert_eq!(verified["verificationStatus"], "verified");
    assert!(verified["reviewedAt"].is_string());
    assert_eq!(verified["user"]["isVerified"], true);

    // verified -> rejected is not a legal transition
    let response = review(
        &server,
        &admin,
        id,
        json!({ "status": "rejected", "reason": "license expired" }),
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = review(&server, &admin, "missing-id", json!({ "status": "verified" })).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let directory: Value = server.get("/api/brokers").await.json();
    assert_eq!(directory["total"], 1);
    assert_eq!(directory["items"][0]["company"], "Harbour Homes");
    assert!(directory["items"][0]["user"].get("passwordHash").is_none());

    let response = server.get(&format!("/api/brokers/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejection_records_reason() {
    let server = common::setup_test_server().await;
    let admin = common::admin_token(&server).await;

    let (broker, _) = register(&server, "Brk", "brk3@example.com", "+919800000306", Some("broker")).await;
    let profile = submit_profile(&server, &broker, "KL-0300").await;
    let id = profile["id"].as_str().unwrap();

    let response = review(
        &server,
        &admin,
        id,
        json!({ "status": "rejected", "reason": "License number not found in registry" }),
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let rejected: Value = response.json();
    assert_eq!(rejected["verificationStatus"], "rejected");
    assert_eq!(rejected["rejectionReason"], "License number not found in registry");

    let response = review(&server, &admin, id, json!({ "status": "verified" })).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let pending: Value = server
        .get("/api/admin/brokers")
        .add_query_param("status", "rejected")
        .add_header("Authorization", bearer(&admin))
        .await
        .json();
    assert_eq!(pending["total"], 1);

    // Broker edits keep the verification state
    let response = server
        .put("/api/brokers/profile")
        .add_header("Authorization", bearer(&broker))
        .json(&json!({
            "company": "Harbour Homes Ltd",
            "licenseNumber": "KL-0300",
            "experienceYears": 4
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let edited: Value = response.json();
    assert_eq!(edited["company"], "Harbour Homes Ltd");
    assert_eq!(edited["verificationStatus"], "rejected");
}

#[tokio::test]
async fn test_admin_broker_list_filters() {
    let server = common::setup_test_server().await;
    let admin = common::admin_token(&server).await;

    verified_broker(&server, "v1@example.com", "+919800000307", "KL-0400").await;
    let (pending, _) = register(&server, "P", "p1@example.com", "+919800000308", Some("broker")).await;
    submit_profile(&server, &pending, "KL-0401").await;

    let all: Value = server
        .get("/api/admin/brokers")
        .add_header("Authorization", bearer(&admin))
        .await
        .json();
    assert_eq!(all["total"], 2);

    let waiting: Value = server
        .get("/api/admin/brokers")
        .add_query_param("status", "pending")
        .add_header("Authorization", bearer(&admin))
        .await
        .json();
    assert_eq!(waiting["total"], 1);

    let response = server
        .get("/api/admin/brokers")
        .add_query_param("status", "approved")
        .add_header("Authorization", bearer(&admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
