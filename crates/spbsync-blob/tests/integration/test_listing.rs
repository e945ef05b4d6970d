//! Integration tests for destination prefix listing
//!
//! Verifies the List Blobs path against a wiremock-based Azure mock:
//! - Prefix filtering and timestamp normalization
//! - Continuation marker pagination
//! - Error classification for auth, missing container, and outages

use spbsync_core::domain::{FileSource, StoreSide, SyncError};
use spbsync_core::ports::DestinationStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_listing_maps_blobs_with_utc_timestamps() {
    let server = MockServer::start().await;

    let blobs = format!(
        "{}{}",
        common::blob_fragment(
            "Invoices/Invoice_AB12CD34EF56.pdf",
            "Fri, 01 Mar 2024 10:00:00 GMT",
            2048
        ),
        common::blob_fragment("Invoices/Invoice_Old.pdf", "Mon, 01 Jan 2024 00:00:00 GMT", 512)
    );

    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .and(query_param("comp", "list"))
        .and(query_param("prefix", "Invoices/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(common::listing_body(&blobs, None)),
        )
        .mount(&server)
        .await;

    let client = common::shared_key_client(&server);
    let blobs = client.list_blobs("Invoices/").await.unwrap();

    assert_eq!(blobs.len(), 2);
    assert_eq!(blobs[0].name, "Invoices/Invoice_AB12CD34EF56.pdf");
    assert_eq!(blobs[0].source, FileSource::Blob);
    assert_eq!(blobs[0].size, Some(2048));
    assert_eq!(
        blobs[0].last_modified.to_rfc3339(),
        "2024-03-01T10:00:00+00:00"
    );
}

#[tokio::test]
async fn test_listing_follows_continuation_marker() {
    let server = MockServer::start().await;

    // Page 2: request carries the marker from page 1.
    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .and(query_param("comp", "list"))
        .and(query_param("marker", "marker-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::listing_body(
            &common::blob_fragment("Reports/b.xlsx", "Tue, 02 Jan 2024 00:00:00 GMT", 20),
            None,
        )))
        .mount(&server)
        .await;

    // Page 1: no marker, returns one blob and a NextMarker.
    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .and(query_param("comp", "list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::listing_body(
            &common::blob_fragment("Reports/a.xlsx", "Mon, 01 Jan 2024 00:00:00 GMT", 10),
            Some("marker-1"),
        )))
        .mount(&server)
        .await;

    let client = common::shared_key_client(&server);
    let blobs = client.list_blobs("Reports/").await.unwrap();

    assert_eq!(blobs.len(), 2);
    assert_eq!(blobs[0].name, "Reports/a.xlsx");
    assert_eq!(blobs[1].name, "Reports/b.xlsx");
}

#[tokio::test]
async fn test_sas_auth_sends_token_on_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .and(query_param("comp", "list"))
        .and(query_param("sig", "test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(common::listing_body("", None)),
        )
        .mount(&server)
        .await;

    let client = common::sas_client(&server);
    let blobs = client.list_blobs("Invoices/").await.unwrap();
    assert!(blobs.is_empty());
}

#[tokio::test]
async fn test_missing_container_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            "<Error><Code>ContainerNotFound</Code></Error>",
        ))
        .mount(&server)
        .await;

    let client = common::shared_key_client(&server);
    let err = client.list_blobs("Invoices/").await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::NotFound {
            side: StoreSide::Destination,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rejected_signature_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            "<Error><Code>AuthenticationFailed</Code></Error>",
        ))
        .mount(&server)
        .await;

    let client = common::shared_key_client(&server);
    let err = client.list_blobs("Invoices/").await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Auth {
            side: StoreSide::Destination,
            ..
        }
    ));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", common::CONTAINER)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = common::shared_key_client(&server);
    let err = client.list_blobs("Invoices/").await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Transient {
            side: StoreSide::Destination,
            ..
        }
    ));
}
