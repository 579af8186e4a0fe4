//! HTTP integration tests for the LinkHub REST API.
//!
//! These run the full axum dispatch path — auth middleware included — via
//! `tower::ServiceExt::oneshot` against the in-memory store, so no live
//! database is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use linkhub_server::auth::{StaticTokenVerifier, TokenVerifier};
use linkhub_server::http::{build_router, HttpState};
use linkhub_server::store::{LinkStore, MemoryLinkStore};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const ALICE_TOKEN: &str = "alice-token";
const BOB_TOKEN: &str = "bob-token";

struct TestApp {
    app: Router,
    alice: Uuid,
    bob: Uuid,
}

fn make_app() -> TestApp {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let store: Arc<dyn LinkStore> = Arc::new(MemoryLinkStore::new());
    let verifier: Arc<dyn TokenVerifier> = Arc::new(
        StaticTokenVerifier::new()
            .with_token(ALICE_TOKEN, alice)
            .with_token(BOB_TOKEN, bob),
    );
    let state = Arc::new(HttpState {
        store,
        verifier,
        pool: None,
    });
    TestApp {
        app: build_router(state),
        alice,
        bob,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn delete_req(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

// ===========================================================================
// TEST 1: link routes without a token are rejected before any handler
// ===========================================================================
#[tokio::test]
async fn test_missing_token_rejected() {
    let t = make_app();
    let (status, body) = send(&t.app, get("/api/links", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

// ===========================================================================
// TEST 2: an unknown token is rejected with 401
// ===========================================================================
#[tokio::test]
async fn test_invalid_token_rejected() {
    let t = make_app();
    let (status, _) = send(&t.app, get("/api/links", Some("forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ===========================================================================
// TEST 3: health and version stay open without a token
// ===========================================================================
#[tokio::test]
async fn test_health_and_version_open() {
    let t = make_app();
    let (status, body) = send(&t.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&t.app, get("/version", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["protocol"], "linkhub/1");
}

// ===========================================================================
// TEST 4: created owner is the authenticated caller, smuggled owner ignored
// ===========================================================================
#[tokio::test]
async fn test_owner_stamped_from_token() {
    let t = make_app();
    let smuggled = Uuid::new_v4();
    let body = json!({
        "url": "https://x.io",
        "title": "Setup Guide",
        "owner": smuggled,
    });

    let (status, created) = send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["owner"], json!(t.alice));
    assert_ne!(created["owner"], json!(smuggled));
}

// ===========================================================================
// TEST 5: end-to-end scenario — blank project, then case-mismatched search
// ===========================================================================
#[tokio::test]
async fn test_create_then_search_scenario() {
    let t = make_app();
    let body = json!({"url": "https://x.io", "title": "Setup Guide", "project": ""});
    let (status, created) = send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["project"], "General");

    let (status, links) =
        send(&t.app, get("/api/links?search=setup", Some(ALICE_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    let links = links.as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["title"], "Setup Guide");
}

// ===========================================================================
// TEST 6: missing title returns 400 with a JSON error body
// ===========================================================================
#[tokio::test]
async fn test_create_missing_title_http() {
    let t = make_app();
    let body = json!({"url": "https://x.io"});
    let (status, resp) = send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["status"], "error");
    assert!(resp["error"].is_string());
}

// ===========================================================================
// TEST 7: listing is owner-scoped
// ===========================================================================
#[tokio::test]
async fn test_listing_owner_scoped() {
    let t = make_app();
    let alice_link = json!({"url": "https://a.io", "title": "hers"});
    let bob_link = json!({"url": "https://b.io", "title": "his"});
    send(&t.app, post_json("/api/links", ALICE_TOKEN, &alice_link)).await;
    send(&t.app, post_json("/api/links", BOB_TOKEN, &bob_link)).await;

    let (_, links) = send(&t.app, get("/api/links", Some(ALICE_TOKEN))).await;
    let links = links.as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["title"], "hers");
    assert_eq!(links[0]["owner"], json!(t.alice));

    let (_, bob_links) = send(&t.app, get("/api/links", Some(BOB_TOKEN))).await;
    let bob_links = bob_links.as_array().unwrap();
    assert_eq!(bob_links.len(), 1);
    assert_eq!(bob_links[0]["owner"], json!(t.bob));
}

// ===========================================================================
// TEST 8: sentinel project parameter ≡ no project parameter
// ===========================================================================
#[tokio::test]
async fn test_sentinel_project_param() {
    let t = make_app();
    for (title, project) in [("a", "Rust"), ("b", "Articles")] {
        let body = json!({"url": "https://x.io", "title": title, "project": project});
        send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    }

    let (_, unfiltered) = send(&t.app, get("/api/links", Some(ALICE_TOKEN))).await;
    let (_, sentinel) = send(
        &t.app,
        get("/api/links?project=All%20Projects", Some(ALICE_TOKEN)),
    )
    .await;
    assert_eq!(unfiltered, sentinel);

    let (_, only_rust) = send(&t.app, get("/api/links?project=Rust", Some(ALICE_TOKEN))).await;
    assert_eq!(only_rust.as_array().unwrap().len(), 1);
}

// ===========================================================================
// TEST 9: projects endpoint returns the owner's distinct labels
// ===========================================================================
#[tokio::test]
async fn test_projects_endpoint() {
    let t = make_app();
    for project in ["Rust", "Articles", "Rust"] {
        let body = json!({"url": "https://x.io", "title": "x", "project": project});
        send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    }
    let bob_body = json!({"url": "https://x.io", "title": "x", "project": "Hidden"});
    send(&t.app, post_json("/api/links", BOB_TOKEN, &bob_body)).await;

    let (status, projects) = send(&t.app, get("/api/links/projects", Some(ALICE_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects, json!(["Articles", "Rust"]));
}

// ===========================================================================
// TEST 10: cross-owner delete is 401 and the record survives re-listing
// ===========================================================================
#[tokio::test]
async fn test_cross_owner_delete() {
    let t = make_app();
    let body = json!({"url": "https://x.io", "title": "hers"});
    let (_, created) = send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&t.app, delete_req(&format!("/api/links/{}", id), BOB_TOKEN)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, links) = send(&t.app, get("/api/links", Some(ALICE_TOKEN))).await;
    assert_eq!(links.as_array().unwrap().len(), 1, "record must survive");
}

// ===========================================================================
// TEST 11: delete of an unknown id is 404 (existence asymmetry preserved)
// ===========================================================================
#[tokio::test]
async fn test_delete_unknown_id_http() {
    let t = make_app();
    let (status, body) = send(
        &t.app,
        delete_req(&format!("/api/links/{}", Uuid::new_v4()), ALICE_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

// ===========================================================================
// TEST 12: successful delete confirms with id and message
// ===========================================================================
#[tokio::test]
async fn test_delete_success_http() {
    let t = make_app();
    let body = json!({"url": "https://x.io", "title": "gone"});
    let (_, created) = send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, resp) = send(
        &t.app,
        delete_req(&format!("/api/links/{}", id), ALICE_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["id"].as_str().unwrap(), id);
    assert_eq!(resp["message"], "Link removed");

    let (_, links) = send(&t.app, get("/api/links", Some(ALICE_TOKEN))).await;
    assert!(links.as_array().unwrap().is_empty());
}

// ===========================================================================
// TEST 13: listing is newest-first
// ===========================================================================
#[tokio::test]
async fn test_listing_newest_first() {
    let t = make_app();
    for title in ["first", "second", "third"] {
        let body = json!({"url": "https://x.io", "title": title});
        send(&t.app, post_json("/api/links", ALICE_TOKEN, &body)).await;
    }

    let (_, links) = send(&t.app, get("/api/links", Some(ALICE_TOKEN))).await;
    let titles: Vec<&str> = links
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}
