//! Integration tests for file downloads
//!
//! Verifies the download path through the provider, including the error
//! mapping of transport failures to per-file source-read errors.

use chrono::Utc;
use spbsync_core::domain::{RemoteFile, SyncError};
use spbsync_core::ports::SourceStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_download_returns_content() {
    let (server, provider) = common::setup_provider().await;

    let content = b"%PDF-1.7 invoice body";
    common::mount_download(&server, "item-1", content).await;

    let file = RemoteFile::sharepoint("item-1", "Invoice.pdf", Utc::now(), Some(21));
    let bytes = provider.download(&file).await.unwrap();

    assert_eq!(bytes.as_ref(), content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, provider) = common::setup_provider().await;

    common::mount_download(&server, "item-empty", b"").await;

    let file = RemoteFile::sharepoint("item-empty", "empty.csv", Utc::now(), Some(0));
    let bytes = provider.download(&file).await.unwrap();

    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_download_failure_names_the_file() {
    let (server, provider) = common::setup_provider().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/items/item-gone/content",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let file = RemoteFile::sharepoint("item-gone", "ghost.pdf", Utc::now(), None);
    let err = provider.download(&file).await.unwrap_err();

    match err {
        SyncError::SourceRead { name, .. } => assert_eq!(name, "ghost.pdf"),
        other => panic!("expected SourceRead, got {other:?}"),
    }
}
