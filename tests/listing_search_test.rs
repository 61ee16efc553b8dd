use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashSet;

mod common;

use common::{bearer, create_property, property_json, register};

/// 15 villas in Goa priced 1.0M..=2.4M plus three apartments in Pune
async fn seed_listings(server: &TestServer) -> String {
    let (token, _) = register(server, "Owner", "owner@example.com", "+919800000101", None).await;

    for i in 0..15 {
        let mut body = property_json(
            &format!("Villa {}", i),
            "villa",
            "Goa",
            1_000_000.0 + i as f64 * 100_000.0,
        );
        body["bedrooms"] = json!(2 + i % 4);
        create_property(server, &token, &body).await;
    }
    for i in 0..3 {
        let mut body = property_json(
            &format!("Apartment {}", i),
            "apartment",
            "Pune",
            500_000.0 + i as f64 * 50_000.0,
        );
        body["listingType"] = json!("rent");
        create_property(server, &token, &body).await;
    }

    token
}

async fn search(server: &TestServer, params: &[(&str, &str)]) -> axum_test::TestResponse {
    let mut request = server.get("/api/properties");
    for (key, value) in params {
        request = request.add_query_param(key, value);
    }
    request.await
}

fn ids(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_fifteen_villas_paginate_into_two_pages() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let response = search(&server, &[("propertyType", "villa")]).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();

    assert_eq!(body["items"].as_array().unwrap().len(), 12);
    assert_eq!(body["total"], 15);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["pageSize"], 12);
    assert_eq!(body["totalPages"], 2);
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["propertyType"] == "villa" && p["status"] == "available"));

    let second: Value = search(&server, &[("propertyType", "villa"), ("page", "2")])
        .await
        .json();
    assert_eq!(second["items"].as_array().unwrap().len(), 3);
    assert_eq!(second["currentPage"], 2);
}

#[tokio::test]
async fn test_pages_are_disjoint_and_newest_first() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let mut seen = HashSet::new();
    let mut created = Vec::new();
    for page in 1..=4 {
        let body: Value = search(&server, &[("limit", "5"), ("page", &page.to_string())])
            .await
            .json();
        assert_eq!(body["total"], 18);
        assert_eq!(body["totalPages"], 4);
        for item in body["items"].as_array().unwrap() {
            assert!(seen.insert(item["id"].as_str().unwrap().to_string()));
            created.push(item["createdAt"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(seen.len(), 18);

    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        created.iter().map(|c| c.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_same_filter_twice_gives_same_page() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let params = [("city", "go"), ("minPrice", "1200000"), ("limit", "4")];
    let first: Value = search(&server, &params).await.json();
    let second: Value = search(&server, &params).await.json();

    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first["total"], second["total"]);
    assert_eq!(first["total"], 13);
}

#[tokio::test]
async fn test_combined_filters() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    // Inclusive price bounds: 1.2M, 1.3M, 1.4M
    let body: Value = search(
        &server,
        &[
            ("propertyType", "villa"),
            ("minPrice", "1200000"),
            ("maxPrice", "1400000"),
        ],
    )
    .await
    .json();
    assert_eq!(body["total"], 3);

    let body: Value = search(&server, &[("listingType", "rent"), ("city", "PUNE")])
        .await
        .json();
    assert_eq!(body["total"], 3);

    // bedrooms cycle 2,3,4,5 across the villas: 5 appears for i = 3, 7, 11
    let body: Value = search(&server, &[("bedrooms", "5")]).await.json();
    assert_eq!(body["total"], 3);

    let body: Value = search(&server, &[("condition", "good"), ("minArea", "1000"), ("maxArea", "1450")])
        .await
        .json();
    assert_eq!(body["total"], 18);

    let body: Value = search(&server, &[("propertyType", "plot")]).await.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn test_sold_listings_are_hidden() {
    let server = common::setup_test_server().await;
    let token = seed_listings(&server).await;

    let first: Value = search(&server, &[("city", "Pune")]).await.json();
    let id = first["items"][0]["id"].as_str().unwrap().to_string();

    let response = server
        .patch(&format!("/api/properties/{}/status", id))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "status": "sold" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let after: Value = search(&server, &[("city", "Pune")]).await.json();
    assert_eq!(after["total"], 2);
    assert!(!ids(&after).contains(&id));

    // `status` is not a filter and cannot widen the predicate
    let response = search(&server, &[("status", "sold")]).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_injection_attempt_is_just_a_string() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let response = search(&server, &[("city", "O'Brien'; DROP TABLE properties;--")]).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());

    let response = search(&server, &[("city", "' OR '1'='1")]).await;
    assert_eq!(response.json::<Value>()["total"], 0);

    // LIKE wildcards match literally
    let response = search(&server, &[("city", "%")]).await;
    assert_eq!(response.json::<Value>()["total"], 0);
    let response = search(&server, &[("city", "G_a")]).await;
    assert_eq!(response.json::<Value>()["total"], 0);

    let body: Value = search(&server, &[]).await.json();
    assert_eq!(body["total"], 18);
}

#[tokio::test]
async fn test_page_past_the_end() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let response = search(&server, &[("propertyType", "villa"), ("page", "5")]).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 15);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 5);
}

#[tokio::test]
async fn test_empty_values_are_ignored() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let body: Value = search(
        &server,
        &[("city", ""), ("propertyType", ""), ("minPrice", ""), ("page", "")],
    )
    .await
    .json();
    assert_eq!(body["total"], 18);
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
async fn test_malformed_parameters_are_rejected() {
    let server = common::setup_test_server().await;
    seed_listings(&server).await;

    let cases: &[&[(&str, &str)]] = &[
        &[("sort", "price")],
        &[("minPrice", "abc")],
        &[("minPrice", "-5")],
        &[("maxArea", "NaN")],
        &[("propertyType", "castle")],
        &[("listingType", "lease")],
        &[("bedrooms", "2.5")],
        &[("minPrice", "500000"), ("maxPrice", "100000")],
        &[("page", "0")],
        &[("limit", "0")],
        &[("limit", "101")],
    ];

    for params in cases {
        let response = search(&server, params).await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "{:?}",
            params
        );
        assert_eq!(response.json::<Value>()["kind"], "validation_error");
    }
}

#[tokio::test]
async fn test_quoted_city_is_matched_literally() {
    let server = common::setup_test_server().await;
    let token = seed_listings(&server).await;

    let hostile = "O'Brien'; DROP TABLE properties;--";
    let listed = create_property(
        &server,
        &token,
        &property_json("Odd town house", "house", hostile, 750_000.0),
    )
    .await;
    assert_eq!(listed["city"], hostile);

    for needle in [hostile, "o'brien'; drop", "'; DROP TABLE"] {
        let body: Value = search(&server, &[("city", needle)]).await.json();
        assert_eq!(body["total"], 1, "{}", needle);
        assert_eq!(body["items"][0]["id"], listed["id"]);
    }

    let body: Value = search(&server, &[]).await.json();
    assert_eq!(body["total"], 19);
}

#[tokio::test]
async fn test_city_match_ignores_non_ascii_case() {
    let server = common::setup_test_server().await;
    let token = seed_listings(&server).await;

    let listed = create_property(
        &server,
        &token,
        &property_json("Lakeside flat", "apartment", "Zürich", 1_900_000.0),
    )
    .await;

    for needle in ["zürich", "ZÜRICH", "üri"] {
        let body: Value = search(&server, &[("city", needle)]).await.json();
        assert_eq!(body["total"], 1, "{}", needle);
        assert_eq!(body["items"][0]["id"], listed["id"]);
    }
}
