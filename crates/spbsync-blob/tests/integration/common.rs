//! Shared test helpers for Azure Blob integration tests

use wiremock::MockServer;

use spbsync_blob::auth::AzureAuth;
use spbsync_blob::client::BlobClient;

pub const ACCOUNT: &str = "contosostore";
pub const CONTAINER: &str = "landing";

/// Builds a Shared Key client pointed at the mock server.
pub fn shared_key_client(server: &MockServer) -> BlobClient {
    BlobClient::with_base_url(
        ACCOUNT,
        CONTAINER,
        server.uri(),
        AzureAuth::shared_key("a2V5LWJ5dGVz").expect("static key is valid base64"),
    )
}

/// Builds a SAS token client pointed at the mock server.
pub fn sas_client(server: &MockServer) -> BlobClient {
    BlobClient::with_base_url(
        ACCOUNT,
        CONTAINER,
        server.uri(),
        AzureAuth::sas_token("sv=2023-11-03&sig=test"),
    )
}

/// List Blobs XML body with the given blob fragments.
pub fn listing_body(blobs: &str, next_marker: Option<&str>) -> String {
    let marker = match next_marker {
        Some(m) => format!("<NextMarker>{m}</NextMarker>"),
        None => "<NextMarker />".to_string(),
    };
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="https://{ACCOUNT}.blob.core.windows.net/{CONTAINER}">
  <Blobs>{blobs}</Blobs>
  {marker}
</EnumerationResults>"#
    )
}

/// One `<Blob>` fragment for a listing body.
pub fn blob_fragment(name: &str, last_modified: &str, size: u64) -> String {
    format!(
        "<Blob><Name>{name}</Name><Properties>\
         <Last-Modified>{last_modified}</Last-Modified>\
         <Content-Length>{size}</Content-Length>\
         <BlobType>BlockBlob</BlobType>\
         </Properties></Blob>"
    )
}
