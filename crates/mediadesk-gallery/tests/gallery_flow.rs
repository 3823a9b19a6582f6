//! Listing against a live HTTP backend, then selecting an item.

use std::sync::Arc;

use mediadesk_api_client::{ApiClient, MediaEndpoint, MessageSurface};
use mediadesk_core::PageContext;
use mediadesk_gallery::{Gallery, GalleryEvent, GalleryOptions, ItemVariant};
use reqwest::Url;

#[tokio::test]
async fn list_renders_most_recent_first_and_click_selects() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/assets/")
        .match_header("cache-control", "no-cache")
        .with_body(
            r#"{"results": [
                {"location": "/media/first.jpg", "tags": ["a"]},
                {"location": "/media/second.mp4", "tags": []}
            ]}"#,
        )
        .create_async()
        .await;

    let document = Url::parse(&format!("{}/pages/", server.url())).unwrap();
    let page = PageContext::new(document.clone()).with_meta("csrf-token", "tok");
    let client = ApiClient::new(page, MessageSurface::new()).unwrap();
    let backend = Arc::new(MediaEndpoint::new(client.clone(), "/assets/"));
    let mut gallery = Gallery::new(
        backend,
        document,
        client.messages().clone(),
        GalleryOptions::default(),
    );
    let mut events = gallery.subscribe();

    assert_eq!(gallery.list().await.unwrap(), Some(2));
    list.assert_async().await;

    let items = gallery.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].location, "/media/second.mp4");
    assert_eq!(items[0].variant, ItemVariant::Video);
    assert_eq!(items[1].location, "/media/first.jpg");
    assert!(items.iter().all(|item| !item.selected));

    let location = gallery.select_at(1).unwrap();
    assert_eq!(location, "/media/first.jpg");

    assert_eq!(events.recv().await.unwrap(), GalleryEvent::Loaded { count: 2 });
    assert_eq!(
        events.recv().await.unwrap(),
        GalleryEvent::Selected {
            location: "/media/first.jpg".to_string()
        }
    );
    assert_eq!(gallery.panel().unwrap().tags, "a");
}

#[tokio::test]
async fn list_failure_is_surfaced_and_items_kept() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/assets/")
        .with_status(500)
        .create_async()
        .await;

    let document = Url::parse(&server.url()).unwrap();
    let messages = MessageSurface::new().with_provider_notified("We have been notified.");
    let client = ApiClient::new(PageContext::new(document.clone()), messages.clone()).unwrap();
    let mut gallery = Gallery::new(
        Arc::new(MediaEndpoint::new(client, "/assets/")),
        document,
        messages.clone(),
        GalleryOptions::default(),
    );

    assert!(gallery.list().await.is_err());
    assert!(gallery.items().is_empty());
    assert_eq!(
        messages.messages(mediadesk_api_client::MessageStyle::Error),
        vec!["Err 500: Internal Server Error\nWe have been notified."]
    );
}

#[tokio::test]
async fn absolute_tag_response_updates_root_relative_item() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/assets/")
        .with_body(r#"{"results": [{"location": "/media/a.jpg", "tags": []}]}"#)
        .create_async()
        .await;
    let tag = server
        .mock("PUT", "/api/assets/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "items": [{"location": "/media/a.jpg"}],
            "tags": ["x"]
        })))
        .with_body(
            serde_json::json!({
                "results": [{
                    "location": format!("{}/media/a.jpg", server.url()),
                    "tags": ["x", "landing"]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let document = Url::parse(&format!("{}/pages/", server.url())).unwrap();
    let client = ApiClient::new(PageContext::new(document.clone()), MessageSurface::new()).unwrap();
    let mut gallery = Gallery::new(
        Arc::new(MediaEndpoint::new(client.clone(), "/assets/")),
        document,
        client.messages().clone(),
        GalleryOptions::default(),
    );

    gallery.list().await.unwrap();
    gallery.select_at(0).unwrap();
    let tags = gallery.tag_media("x").await.unwrap();
    tag.assert_async().await;

    assert_eq!(tags, vec!["x", "landing"]);
    assert_eq!(gallery.items()[0].location, "/media/a.jpg");
    assert_eq!(gallery.items()[0].tags, vec!["x", "landing"]);
    assert_eq!(gallery.panel().unwrap().tags, "x,landing");
}
