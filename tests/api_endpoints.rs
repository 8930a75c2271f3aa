//! Integration tests for VoteChain API endpoints
//!
//! These tests walk the registration -> validation -> voting flow over the
//! HTTP surface and verify status codes and JSON shapes.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use votechain::api::{build_router, AppState};
use votechain::store::{CredentialStore, VoterRegistry};
use votechain::voting::VotingService;

/// Helper to build a test server over an in-memory registry.
async fn spawn_server(candidates: &[&str]) -> TestServer {
    let registry = Arc::new(VoterRegistry::open_in_memory().expect("Failed to open registry"));
    for candidate in candidates {
        registry
            .add_candidate(candidate)
            .expect("Failed to seed candidate");
    }

    let service = Arc::new(VotingService::new(
        registry.clone() as Arc<dyn CredentialStore>
    ));
    service.initialize_ledger().await;

    let app = build_router(AppState { service, registry });
    TestServer::new(app).expect("Failed to create test server")
}

#[tokio::test]
async fn test_voting_endpoints() {
    let server = spawn_server(&["Alice", "Bob"]).await;

    // Test /health
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    // Test /candidates
    let response = server.get("/candidates").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["candidates"], json!(["Alice", "Bob"]));

    // Test /blockchain before any vote: just the genesis block
    let response = server.get("/blockchain").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["length"], 1);
    assert_eq!(body["blockchain"][0]["payload"], json!(["Genesis block"]));

    // Register a voter and capture the issued token
    let response = server
        .post("/register")
        .json(&json!({
            "name": "Ada Lovelace",
            "date_of_birth": "1815-12-10",
            "address": "12 St James Square"
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().expect("token missing").to_string();
    assert_eq!(token.len(), 6);

    // Token validates before use
    let response = server
        .post("/validate-token")
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Token is valid. Proceed to vote.");

    // Cast the vote
    let response = server
        .post("/vote")
        .json(&json!({ "token": token, "selected_candidate": "Alice" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Vote successfully added to the blockchain!");

    // The chain grew by one and the new block links to the genesis block
    let response = server.get("/blockchain").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["length"], 2);
    let chain = body["blockchain"].as_array().expect("blockchain missing");
    assert_eq!(chain[1]["previous_hash"], chain[0]["content_hash"]);
    let payload = chain[1]["payload"][0].as_str().unwrap();
    assert_eq!(
        payload,
        format!("User token {} voted for Alice", token)
    );

    // Re-voting with the same token is rejected and the chain is unchanged
    let response = server
        .post("/vote")
        .json(&json!({ "token": token, "selected_candidate": "Bob" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or already used token.");

    let response = server.get("/blockchain").await;
    let body: Value = response.json();
    assert_eq!(body["length"], 2);

    // The consumed token no longer validates
    let response = server
        .post("/validate-token")
        .json(&json!({ "token": token }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or already used token.");
}

#[tokio::test]
async fn test_register_input_validation() {
    let server = spawn_server(&["Alice"]).await;

    // Missing fields
    let response = server
        .post("/register")
        .json(&json!({ "name": "Ada Lovelace" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "All fields are required.");

    // Duplicate registration
    let voter = json!({
        "name": "Ada Lovelace",
        "date_of_birth": "1815-12-10",
        "address": "12 St James Square"
    });
    let response = server.post("/register").json(&voter).await;
    assert_eq!(response.status_code(), 201);

    let response = server.post("/register").json(&voter).await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Voter already registered.");
}

#[tokio::test]
async fn test_vote_input_validation() {
    let server = spawn_server(&["Alice"]).await;

    // Candidate selection is mandatory
    let response = server
        .post("/vote")
        .json(&json!({ "token": "ABC123" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Candidate selection is required.");

    // Unknown tokens are indistinguishable from consumed ones
    let response = server
        .post("/vote")
        .json(&json!({ "token": "ABC123", "selected_candidate": "Alice" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid or already used token.");
}

#[tokio::test]
async fn test_validate_token_requires_token() {
    let server = spawn_server(&[]).await;

    let response = server.post("/validate-token").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Token is required.");
}
