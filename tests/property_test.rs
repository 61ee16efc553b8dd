use http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{bearer, create_property, property_json, register, verified_broker};

#[tokio::test]
async fn test_create_and_fetch_property() {
    let server = common::setup_test_server().await;
    let (token, user) = register(&server, "Seller", "seller@example.com", "+919800000201", None).await;

    let created = create_property(
        &server,
        &token,
        &property_json("Garden house", "house", "Nashik", 4_500_000.0),
    )
    .await;
    assert_eq!(created["status"], "available");
    assert_eq!(created["views"], 0);
    assert_eq!(created["ownerId"], user["id"]);
    assert_eq!(created["features"], json!(["parking", "lift"]));

    let id = created["id"].as_str().unwrap();
    for expected in 1..=3 {
        let response = server.get(&format!("/api/properties/{}", id)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["views"], expected);
    }

    let response = server.get("/api/properties/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "not_found");
}

#[tokio::test]
async fn test_create_requires_authentication_and_valid_body() {
    let server = common::setup_test_server().await;

    let response = server
        .post("/api/properties")
        .json(&property_json("Anon", "flat", "Pune", 100.0))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (token, _) = register(&server, "Seller", "seller2@example.com", "+919800000202", None).await;

    let mut negative = property_json("Cheap", "flat", "Pune", -1.0);
    negative["price"] = json!(-1.0);
    let mut no_title = property_json("", "flat", "Pune", 100.0);
    no_title["title"] = json!("   ");
    let mut with_status = property_json("Sneaky", "flat", "Pune", 100.0);
    with_status["status"] = json!("sold");
    let mut bad_year = property_json("Future", "flat", "Pune", 100.0);
    bad_year["yearBuilt"] = json!(3000);
    let mut bad_type = property_json("Castle", "flat", "Pune", 100.0);
    bad_type["propertyType"] = json!("castle");

    for body in [negative, no_title, with_status, bad_year, bad_type] {
        let response = server
            .post("/api/properties")
            .add_header("Authorization", bearer(&token))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response.json::<Value>()["kind"], "validation_error");
    }
}

#[tokio::test]
async fn test_only_verified_brokers_can_list() {
    let server = common::setup_test_server().await;

    let (pending_token, _) = register(
        &server,
        "New Broker",
        "newbroker@example.com",
        "+919800000203",
        Some("broker"),
    )
    .await;
    let response = server
        .post("/api/properties")
        .add_header("Authorization", bearer(&pending_token))
        .json(&property_json("Office floor", "office", "Pune", 9_000_000.0))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (token, _, _) = verified_broker(
        &server,
        "okbroker@example.com",
        "+919800000204",
        "MH-RERA-0001",
    )
    .await;
    create_property(
        &server,
        &token,
        &property_json("Office floor", "office", "Pune", 9_000_000.0),
    )
    .await;
}

#[tokio::test]
async fn test_owner_updates_and_deletes() {
    let server = common::setup_test_server().await;
    let (owner, _) = register(&server, "Owner", "owner3@example.com", "+919800000205", None).await;
    let (stranger, _) = register(&server, "Other", "other3@example.com", "+919800000206", None).await;

    let created = create_property(
        &server,
        &owner,
        &property_json("Lake flat", "flat", "Pune", 3_000_000.0),
    )
    .await;
    let path = format!("/api/properties/{}", created["id"].as_str().unwrap());

    let response = server
        .put(&path)
        .add_header("Authorization", bearer(&stranger))
        .json(&json!({ "price": 1.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .put(&path)
        .add_header("Authorization", bearer(&owner))
        .json(&json!({ "price": 2_750_000.0, "bedrooms": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["price"], 2_750_000.0);
    assert_eq!(updated["bedrooms"], 4);
    assert_eq!(updated["title"], "Lake flat");
    assert_eq!(updated["status"], "available");

    let response = server
        .put(&path)
        .add_header("Authorization", bearer(&owner))
        .json(&json!({ "price": -10.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .patch(&format!("{}/status", path))
        .add_header("Authorization", bearer(&owner))
        .json(&json!({ "status": "rented" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "rented");

    let response = server
        .patch(&format!("{}/status", path))
        .add_header("Authorization", bearer(&owner))
        .json(&json!({ "status": "demolished" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let mine: Value = server
        .get("/api/properties/mine")
        .add_header("Authorization", bearer(&owner))
        .await
        .json();
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["items"][0]["status"], "rented");

    let response = server
        .delete(&path)
        .add_header("Authorization", bearer(&stranger))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .delete(&path)
        .add_header("Authorization", bearer(&owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&path).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let response = server
        .delete(&path)
        .add_header("Authorization", bearer(&owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_can_moderate_any_listing() {
    let server = common::setup_test_server().await;
    let (owner, _) = register(&server, "Owner", "owner4@example.com", "+919800000207", None).await;
    let admin = common::admin_token(&server).await;

    let created = create_property(
        &server,
        &owner,
        &property_json("Corner plot", "plot", "Satara", 800_000.0),
    )
    .await;
    let path = format!("/api/properties/{}", created["id"].as_str().unwrap());

    let response = server
        .put(&path)
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "title": "Corner plot (verified)" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["title"], "Corner plot (verified)");

    let response = server
        .delete(&path)
        .add_header("Authorization", bearer(&admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}
