use thumbfetch::domain::images::{ImageQuery, UniqueLink};
use thumbfetch::infrastructure::client::ThumbfetchClient;

use crate::helpers::{mount_happy_path, spawn_app};

#[tokio::test]
async fn client_round_trips_a_search_with_plain_term() {
    let app = spawn_app().await;
    mount_happy_path(&app, 5).await;
    let client = ThumbfetchClient::from_base_url(&app.address).unwrap();

    let image = client.random_image(&ImageQuery::new("cats")).await.unwrap();
    let link = UniqueLink::parse(&image.unique_link).unwrap();

    let bytes = client.thumbnail(&link).await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert!(decoded.width() <= 100 && decoded.height() <= 100);

    let metadata = client.metadata(&link).await.unwrap();
    assert_eq!(metadata.unique_link, image.unique_link);
    assert_eq!(client.health().await.unwrap().status, "ok");
}

#[tokio::test]
async fn client_fetches_links_with_url_reserved_characters() {
    let app = spawn_app().await;
    mount_happy_path(&app, 5).await;
    let client = ThumbfetchClient::from_base_url(&app.address).unwrap();

    for term in ["c#at", "what?", "100%"] {
        let image = client.random_image(&ImageQuery::new(term)).await.unwrap();
        assert!(image.unique_link.starts_with(&format!("{term}_")));
        let link = UniqueLink::parse(&image.unique_link).unwrap();

        let bytes = client.thumbnail(&link).await.unwrap();
        assert!(!bytes.is_empty());

        let metadata = client.metadata(&link).await.unwrap();
        assert_eq!(metadata.search_term, term);
    }
}

#[tokio::test]
async fn client_surfaces_error_detail() {
    let app = spawn_app().await;
    let client = ThumbfetchClient::from_base_url(&app.address).unwrap();
    let link = UniqueLink::parse("nonexistent_image.jpg").unwrap();

    let err = client.thumbnail(&link).await.unwrap_err();

    assert!(err.to_string().contains("Thumbnail not found"));
}
