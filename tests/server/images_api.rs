use image::GenericImageView;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{
    PHOTO_PATH, SEARCH_PATH, mount_count, mount_happy_path, mount_page, post_random_image,
    spawn_app, spawn_app_with_provider_url,
};

#[tokio::test]
async fn random_image_returns_a_200_and_caches_the_thumbnail() {
    let app = spawn_app().await;
    mount_happy_path(&app, 50).await;

    let response = post_random_image(
        &app,
        &json!({ "search_term": "cats", "orientation": "portrait", "color": "blue" }),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["search_term"], "cats");
    assert_eq!(body["orientation"], "portrait");
    assert_eq!(body["color"], "blue");
    assert_eq!(body["image_original_url"], app.photo_url());

    let link = body["unique_link"].as_str().unwrap();
    assert!(link.starts_with("cats_"));
    assert!(link.ends_with(".jpg"));
    assert!(body.get("id").is_none());

    assert!(app.thumbnail_path(link).exists());
    assert_eq!(app.record_count().await, 1);
}

#[tokio::test]
async fn random_image_sends_filters_and_a_page_within_the_total() {
    let app = spawn_app().await;
    mount_happy_path(&app, 50).await;

    let response = post_random_image(
        &app,
        &json!({ "search_term": "cats", "orientation": "portrait", "color": "blue" }),
    )
    .await;
    assert_eq!(response.status(), 200);

    let requests = app.mock_server.received_requests().await.unwrap();
    let searches: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == SEARCH_PATH)
        .collect();
    assert_eq!(searches.len(), 2);

    for request in &searches {
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("query".to_string(), "cats".to_string())));
        assert!(pairs.contains(&("orientation".to_string(), "portrait".to_string())));
        assert!(pairs.contains(&("color".to_string(), "blue".to_string())));
    }

    let page: u64 = searches[1]
        .url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.parse().unwrap())
        .unwrap();
    assert!((1..=50).contains(&page));
}

#[tokio::test]
async fn random_image_without_filters_omits_them_upstream() {
    let app = spawn_app().await;
    mount_happy_path(&app, 3).await;

    let response = post_random_image(&app, &json!({ "search_term": "dogs" })).await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["color"].is_null());
    assert!(body["orientation"].is_null());

    let requests = app.mock_server.received_requests().await.unwrap();
    for request in requests.iter().filter(|r| r.url.path() == SEARCH_PATH) {
        assert!(!request.url.query_pairs().any(|(k, _)| k == "color"));
        assert!(!request.url.query_pairs().any(|(k, _)| k == "orientation"));
    }
}

#[tokio::test]
async fn repeated_searches_get_distinct_links() {
    let app = spawn_app().await;
    mount_happy_path(&app, 10).await;

    let first: serde_json::Value = post_random_image(&app, &json!({ "search_term": "cats" }))
        .await
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = post_random_image(&app, &json!({ "search_term": "cats" }))
        .await
        .json()
        .await
        .unwrap();

    assert_ne!(first["unique_link"], second["unique_link"]);
    assert_eq!(app.record_count().await, 2);
    assert_eq!(app.thumbnail_count(), 2);
}

#[tokio::test]
async fn random_image_route_accepts_missing_trailing_slash() {
    let app = spawn_app().await;
    mount_happy_path(&app, 1).await;

    let response = reqwest::Client::new()
        .post(app.url("/image/random"))
        .json(&json!({ "search_term": "cats" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn zero_results_returns_a_404_and_creates_nothing() {
    let app = spawn_app().await;
    mount_count(&app.mock_server, 0).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.mock_server)
        .await;

    let response = post_random_image(&app, &json!({ "search_term": "zzzxqqq" })).await;

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "detail": "No image found" }));

    let requests = app.mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn empty_page_returns_a_404() {
    let app = spawn_app().await;
    mount_count(&app.mock_server, 5).await;
    mount_page(&app.mock_server, 5, &[]).await;

    let response = post_random_image(&app, &json!({ "search_term": "cats" })).await;

    assert_eq!(response.status(), 404);
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn provider_error_status_returns_a_502_and_creates_nothing() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&app.mock_server)
        .await;

    let response = post_random_image(&app, &json!({ "search_term": "cats" })).await;

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Image provider unavailable");
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn unreachable_provider_returns_a_502_and_creates_nothing() {
    let app = spawn_app_with_provider_url("http://127.0.0.1:9/search/photos").await;

    let response = post_random_image(&app, &json!({ "search_term": "cats" })).await;

    assert_eq!(response.status(), 502);
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn failed_image_download_returns_a_404_and_creates_nothing() {
    let app = spawn_app().await;
    mount_count(&app.mock_server, 4).await;
    mount_page(&app.mock_server, 4, &[app.photo_url()]).await;
    Mock::given(method("GET"))
        .and(path(PHOTO_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.mock_server)
        .await;

    let response = post_random_image(&app, &json!({ "search_term": "cats" })).await;

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "No image found");
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn undecodable_image_returns_a_404_and_creates_nothing() {
    let app = spawn_app().await;
    mount_count(&app.mock_server, 4).await;
    mount_page(&app.mock_server, 4, &[app.photo_url()]).await;
    Mock::given(method("GET"))
        .and(path(PHOTO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a photo</html>"))
        .mount(&app.mock_server)
        .await;

    let response = post_random_image(&app, &json!({ "search_term": "cats" })).await;

    assert_eq!(response.status(), 404);
    assert_eq!(app.thumbnail_count(), 0);
    assert_eq!(app.record_count().await, 0);
}

#[tokio::test]
async fn invalid_color_returns_a_422() {
    let app = spawn_app().await;

    let response = post_random_image(&app, &json!({ "search_term": "cats", "color": "plaid" })).await;

    assert_eq!(response.status(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
    assert!(app.mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_search_term_returns_a_422() {
    let app = spawn_app().await;

    let response = post_random_image(&app, &json!({ "color": "blue" })).await;

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn blank_search_term_returns_a_422() {
    let app = spawn_app().await;

    let response = post_random_image(&app, &json!({ "search_term": "   " })).await;

    assert_eq!(response.status(), 422);
    assert!(app.mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn overlong_search_term_returns_a_422_before_any_provider_call() {
    let app = spawn_app().await;
    mount_happy_path(&app, 5).await;

    let response = post_random_image(&app, &json!({ "search_term": "a".repeat(300) })).await;

    assert_eq!(response.status(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("at most"));
    assert!(app.mock_server.received_requests().await.unwrap().is_empty());
    assert_eq!(app.thumbnail_count(), 0);
}

#[tokio::test]
async fn search_term_at_the_limit_is_accepted() {
    let app = spawn_app().await;
    mount_happy_path(&app, 5).await;

    let response = post_random_image(&app, &json!({ "search_term": "a".repeat(200) })).await;

    assert_eq!(response.status(), 200);
    assert_eq!(app.record_count().await, 1);
}

#[tokio::test]
async fn thumbnail_is_served_as_a_small_jpeg() {
    let app = spawn_app().await;
    mount_happy_path(&app, 50).await;
    let body: serde_json::Value = post_random_image(&app, &json!({ "search_term": "cats" }))
        .await
        .json()
        .await
        .unwrap();
    let link = body["unique_link"].as_str().unwrap();

    let response = reqwest::get(app.url(&format!("/image/thumbnail/{link}")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    let bytes = response.bytes().await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    let (width, height) = decoded.dimensions();
    assert!(width <= 100 && height <= 100);
    // 640x480 source keeps its aspect ratio
    assert_eq!((width, height), (100, 75));
}

#[tokio::test]
async fn unknown_thumbnail_returns_a_404() {
    let app = spawn_app().await;

    let response = reqwest::get(app.url("/image/thumbnail/nonexistent_image.jpg"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "detail": "Thumbnail not found" }));
}

#[tokio::test]
async fn thumbnail_lookup_cannot_escape_the_directory() {
    let app = spawn_app().await;
    let outside = app.thumbnail_dir().parent().unwrap().join("secret.jpg");
    std::fs::write(&outside, b"secret").unwrap();

    let response = reqwest::get(app.url("/image/thumbnail/..%2Fsecret.jpg"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    let _ = std::fs::remove_file(outside);
}

#[tokio::test]
async fn metadata_is_returned_for_a_stored_link() {
    let app = spawn_app().await;
    mount_happy_path(&app, 2).await;
    let created: serde_json::Value =
        post_random_image(&app, &json!({ "search_term": "cats", "color": "green" }))
            .await
            .json()
            .await
            .unwrap();
    let link = created["unique_link"].as_str().unwrap();

    let response = reqwest::get(app.url(&format!("/image/metadata/{link}")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, created);
}

#[tokio::test]
async fn unknown_metadata_returns_a_404() {
    let app = spawn_app().await;

    let response = reqwest::get(app.url("/image/metadata/ghost_0000.jpg"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Image not found");
}
