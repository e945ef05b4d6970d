//! Integration tests for site resolution and folder listing
//!
//! Verifies end-to-end behavior of the provider against a wiremock-based
//! Graph API mock server:
//! - Site and drive resolution at connect time
//! - Non-recursive folder listing with folder filtering
//! - Pagination across multiple pages
//! - Files without a last-modified timestamp
//! - Auth and not-found error classification

use spbsync_core::domain::{FileSource, StoreSide, SyncError};
use spbsync_core::ports::SourceStore;
use spbsync_graph::client::GraphClient;
use spbsync_graph::provider::SharePointProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_connect_resolves_site_and_drive() {
    let (server, provider) = common::setup_provider().await;

    // Connect succeeded; a listing against the resolved drive works.
    common::mount_children_single_page(&server, "Incoming", serde_json::json!([])).await;
    let files = provider.list_files("Incoming").await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_listing_returns_files_and_skips_folders() {
    let (server, provider) = common::setup_provider().await;

    let items = serde_json::json!([
        common::file_item("item-1", "Invoice_AB12CD34EF56.pdf", "2024-03-01T10:00:00Z", 2048),
        common::file_item("item-2", "Report_Q1.xlsx", "2024-02-15T08:30:00Z", 4096),
        {
            "id": "folder-1",
            "name": "Archive",
            "folder": { "childCount": 12 }
        }
    ]);
    common::mount_children_single_page(&server, "Incoming", items).await;

    let files = provider.list_files("Incoming").await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].id, "item-1");
    assert_eq!(files[0].name, "Invoice_AB12CD34EF56.pdf");
    assert_eq!(files[0].source, FileSource::SharePoint);
    assert_eq!(files[0].size, Some(2048));
    assert_eq!(
        files[0].last_modified.to_rfc3339(),
        "2024-03-01T10:00:00+00:00"
    );
    assert_eq!(files[1].name, "Report_Q1.xlsx");
}

#[tokio::test]
async fn test_listing_follows_pagination() {
    let (server, provider) = common::setup_provider().await;

    // Page 1 returns a nextLink pointing back at the mock server.
    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/Incoming:/children",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_item("item-1", "a.pdf", "2024-01-01T00:00:00Z", 10)],
            "@odata.nextLink": format!("{}/page-two", server.uri())
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page-two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_item("item-2", "b.pdf", "2024-01-02T00:00:00Z", 20)]
        })))
        .mount(&server)
        .await;

    let files = provider.list_files("Incoming").await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "a.pdf");
    assert_eq!(files[1].name, "b.pdf");
}

#[tokio::test]
async fn test_listing_excludes_files_without_timestamp() {
    let (server, provider) = common::setup_provider().await;

    let items = serde_json::json!([
        common::file_item("item-1", "dated.pdf", "2024-01-01T00:00:00Z", 10),
        {
            "id": "item-2",
            "name": "undated.pdf",
            "size": 20,
            "file": {}
        }
    ]);
    common::mount_children_single_page(&server, "Incoming", items).await;

    let files = provider.list_files("Incoming").await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "dated.pdf");
}

#[tokio::test]
async fn test_missing_folder_is_not_found() {
    let (server, provider) = common::setup_provider().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/Missing:/children",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "itemNotFound", "message": "The resource could not be found." }
        })))
        .mount(&server)
        .await;

    let err = provider.list_files("Missing").await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::NotFound {
            side: StoreSide::Source,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rejected_token_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/contoso.sharepoint.com:/sites/Finance"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": "InvalidAuthenticationToken", "message": "Access token has expired." }
        })))
        .mount(&server)
        .await;

    let client = GraphClient::with_base_url("stale-token", server.uri());
    let err = SharePointProvider::connect(client, common::SITE_URL)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Auth {
            side: StoreSide::Source,
            ..
        }
    ));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, provider) = common::setup_provider().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/Incoming:/children",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider.list_files("Incoming").await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transient {
            side: StoreSide::Source,
            ..
        }
    ));
}

#[tokio::test]
async fn test_root_folder_listing_uses_root_children() {
    let (server, provider) = common::setup_provider().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{}/root/children", common::DRIVE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_item("item-1", "root.pdf", "2024-01-01T00:00:00Z", 10)]
        })))
        .mount(&server)
        .await;

    let files = provider.list_files("/").await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "root.pdf");
}
