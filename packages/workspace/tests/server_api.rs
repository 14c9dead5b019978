//! End-to-end API tests over the axum router with an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vitrine_workspace::{router, AppState, MemoryStore, PreviewMessage};

fn app() -> (AppState, axum::Router) {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    let router = router(state.clone());
    (state, router)
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn draft_body(sections: Value) -> Value {
    json!({ "sections": sections })
}

#[tokio::test]
async fn test_draft_publish_live_cycle() {
    let (_state, app) = app();

    // Save a draft
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-1", "type": "hero", "settings": { "title": "Hi" } }])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Live view 404s before the first publish
    let response = app.clone().oneshot(get("/api/pages/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Publish
    let response = app
        .clone()
        .oneshot(post_empty("/api/pages/home/publish"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let version = body_json(response).await;
    assert_eq!(version["versionIndex"], json!(1));

    // Live view now serves the published sections
    let response = app.clone().oneshot(get("/api/pages/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let live = body_json(response).await;
    assert_eq!(live["versionIndex"], json!(1));
    assert_eq!(live["sections"][0]["type"], json!("hero"));
}

#[tokio::test]
async fn test_draft_view_serves_working_copy() {
    let (_state, app) = app();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-1", "type": "hero" }])),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/pages/home?view=draft"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let draft = body_json(response).await;
    assert_eq!(draft["status"], json!("draft"));
    assert_eq!(draft["sections"][0]["id"], json!("s-1"));
}

#[tokio::test]
async fn test_missing_page_is_404_never_an_empty_document() {
    let (_state, app) = app();

    let response = app.clone().oneshot(get("/api/pages/nope?view=draft")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], json!("notFound"));
}

#[tokio::test]
async fn test_rollback_endpoint_appends_new_version() {
    let (_state, app) = app();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-1", "type": "hero" }])),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_empty("/api/pages/home/publish"))
        .await
        .unwrap();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-2", "type": "footer" }])),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_empty("/api/pages/home/publish"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pages/home/rollback",
            json!({ "versionIndex": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let version = body_json(response).await;
    assert_eq!(version["versionIndex"], json!(3));
    assert_eq!(version["sections"][0]["type"], json!("hero"));
}

#[tokio::test]
async fn test_render_isolates_corrupt_section() {
    let (_state, app) = app();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([
                { "id": "s-1", "type": "hero" },
                { "id": "s-2", "type": "gallery", "settings": { "images": "oops" } },
                { "id": "s-3", "type": "footer" },
            ])),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/pages/home/render?mode=draft"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_json(response).await;
    let nodes = page["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0]["type"], json!("Element"));
    assert_eq!(nodes[1]["type"], json!("Error"));
    assert_eq!(nodes[1]["section_type"], json!("gallery"));
    assert_eq!(nodes[2]["type"], json!("Element"));
}

#[tokio::test]
async fn test_render_skips_hidden_and_placeholders_unknown() {
    let (_state, app) = app();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([
                { "id": "s-1", "type": "hero", "settings": { "hidden": true } },
                { "id": "s-2", "type": "not-a-real-type" },
            ])),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/pages/home/render?mode=draft"))
        .await
        .unwrap();
    let page = body_json(response).await;
    let nodes = page["nodes"].as_array().unwrap();

    // Hidden hero skipped entirely; unknown type is a neutral placeholder
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["type"], json!("Placeholder"));
    assert_eq!(nodes[0]["section_type"], json!("not-a-real-type"));
}

#[tokio::test]
async fn test_export_import_conflict() {
    let (_state, app) = app();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-1", "type": "hero" }])),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/pages/home/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let blob = response.into_body().collect().await.unwrap().to_bytes();

    // Import into a fresh slug works
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pages/landing/import")
                .body(Body::from(blob.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Importing over an existing page without the flag conflicts
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pages/home/import")
                .body(Body::from(blob))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_save_draft_pushes_preview_and_publish_notifies() {
    let (state, app) = app();

    let mut preview_rx = state.channels.subscribe_preview();
    let mut publish_rx = state.channels.subscribe_publish();

    app.clone()
        .oneshot(put_json(
            "/api/pages/home/draft",
            draft_body(json!([{ "id": "s-1", "type": "hero" }])),
        ))
        .await
        .unwrap();

    match preview_rx.recv().await.unwrap() {
        PreviewMessage::Draft { slug, document } => {
            assert_eq!(slug, "home");
            assert_eq!(document.sections.len(), 1);
        }
        other => panic!("expected draft push, got {:?}", other),
    }

    app.clone()
        .oneshot(post_empty("/api/pages/home/publish"))
        .await
        .unwrap();

    // Publish notification names the page; content comes from a refetch
    let event = publish_rx.recv().await.unwrap();
    assert_eq!(event.slug, "home");

    // And the preview surface is told to return to the live document
    let message = preview_rx.recv().await.unwrap();
    assert_eq!(
        message,
        PreviewMessage::Live {
            slug: "home".to_string()
        }
    );
}
