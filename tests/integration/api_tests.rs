//! API integration tests
//!
//! Expect a running server with a seeded database: title id 1 active,
//! patron id 1 active with no live loans.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Copy numbers unique per test run so reruns do not collide
fn fresh_copy_number() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    (secs % 1_000_000) as i64 + 100
}

async fn stock_copy(client: &Client, title_id: i64, copy_number: i64) {
    let response = client
        .post(format!("{}/titles/{}/copies", BASE_URL, title_id))
        .json(&json!({ "copy_number": copy_number }))
        .send()
        .await
        .expect("Failed to send stock request");
    assert_eq!(response.status(), 201);
}

async fn checkout(client: &Client, copy_number: i64, patron_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "title_id": 1,
            "copy_number": copy_number,
            "patron_id": patron_id,
            "loan_type": "standard"
        }))
        .send()
        .await
        .expect("Failed to send checkout request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_checks_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    // Ready only when the database answers the probe
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_checkout_return_round_trip() {
    let client = Client::new();
    let copy_number = fresh_copy_number();
    stock_copy(&client, 1, copy_number).await;

    let response = checkout(&client, copy_number, 1).await;
    assert_eq!(response.status(), 201);

    let copy: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(copy["state"], "Borrowed");
    assert_eq!(copy["borrower_id"], 1);
    assert_eq!(copy["renewal_count"], 0);
    assert!(copy["due_at"].is_string());
    let copy_id = copy["id"].as_i64().expect("No copy ID");

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, copy_id))
        .json(&json!({ "returned_by": "desk" }))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["state"], "Returned");
    assert_eq!(returned["borrower_id"], 1);
    assert!(returned["returned_at"].is_string());

    // The slot is available again for a fresh checkout
    let response = checkout(&client, copy_number, 1).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_second_checkout_of_live_copy_conflicts() {
    let client = Client::new();
    let copy_number = fresh_copy_number() + 1;
    stock_copy(&client, 1, copy_number).await;

    let response = checkout(&client, copy_number, 1).await;
    assert_eq!(response.status(), 201);

    let response = checkout(&client, copy_number, 2).await;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "CopyUnavailable");
}

#[tokio::test]
#[ignore]
async fn test_renewal_ceiling() {
    let client = Client::new();
    let copy_number = fresh_copy_number() + 2;
    stock_copy(&client, 1, copy_number).await;

    let response = checkout(&client, copy_number, 1).await;
    assert_eq!(response.status(), 201);
    let copy: Value = response.json().await.expect("Failed to parse response");
    let copy_id = copy["id"].as_i64().expect("No copy ID");

    // Server default ceiling is 2
    for expected_count in 1..=2 {
        let response = client
            .post(format!("{}/loans/{}/renew", BASE_URL, copy_id))
            .json(&json!({}))
            .send()
            .await
            .expect("Failed to send renew request");
        assert!(response.status().is_success());
        let renewed: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(renewed["renewal_count"], expected_count);
    }

    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, copy_id))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send renew request");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MaxRenewalsReached");
}

#[tokio::test]
#[ignore]
async fn test_availability_counts() {
    let client = Client::new();
    let copy_number = fresh_copy_number() + 3;
    stock_copy(&client, 1, copy_number).await;

    let response = client
        .get(format!("{}/titles/1/availability", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let before: Value = response.json().await.expect("Failed to parse response");
    let available_before = before["available_copies"].as_i64().unwrap();
    let borrowed_before = before["borrowed_copies"].as_i64().unwrap();

    let response = checkout(&client, copy_number, 1).await;
    assert_eq!(response.status(), 201);

    let after: Value = client
        .get(format!("{}/titles/1/availability", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(after["available_copies"].as_i64().unwrap(), available_before - 1);
    assert_eq!(after["borrowed_copies"].as_i64().unwrap(), borrowed_before + 1);
    assert_eq!(before["total_copies"], after["total_copies"]);
}

#[tokio::test]
#[ignore]
async fn test_patron_loans_listing() {
    let client = Client::new();

    let response = client
        .get(format!("{}/patrons/1/loans", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_sweep_endpoint() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans/sweep", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["transitioned"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_checkout_unknown_title_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "title_id": 999_999,
            "copy_number": 1,
            "patron_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "TitleInactive");
}
