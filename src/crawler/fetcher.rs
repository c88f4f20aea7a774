//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the grabber:
//! - Building the shared HTTP client
//! - GET requests for pages to be queried
//! - Streaming downloads to disk
//!
//! There are no retries and no request timeouts; a failed request is reported
//! to the caller once.

use crate::config::GrabberConfig;
use crate::GrabError;
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The run options (user agent, certificate checking)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use grabber::config::GrabberConfig;
/// use grabber::crawler::build_http_client;
///
/// let client = build_http_client(&GrabberConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &GrabberConfig) -> Result<Client, reqwest::Error> {
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled");
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// Anything other than `200 OK` is an error.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The raw response body
/// * `Err(GrabError::Fetch)` - Transport failure
/// * `Err(GrabError::HttpStatus)` - Non-200 response
pub async fn fetch_page(client: &Client, url: &str) -> Result<Vec<u8>, GrabError> {
    let response = client.get(url).send().await.map_err(|source| GrabError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(GrabError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| GrabError::Fetch {
        url: url.to_string(),
        source,
    })?;

    Ok(body.to_vec())
}

/// Downloads `url` into a new file at `destination`
///
/// The body is streamed chunk by chunk. If the transfer fails after the file
/// was created, the partial file is removed again so a later run does not
/// take it for a finished download.
///
/// # Returns
///
/// * `Ok(u64)` - Number of bytes written
/// * `Err(GrabError)` - Transfer or filesystem failure
pub async fn fetch_to_file(
    client: &Client,
    url: &str,
    destination: &Path,
) -> Result<u64, GrabError> {
    let response = client.get(url).send().await.map_err(|source| GrabError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(GrabError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let file = File::create(destination).await?;

    match write_body(response, file, url).await {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                tracing::warn!(
                    "Failed to remove partial file {}: {}",
                    destination.display(),
                    remove_err
                );
            }
            Err(e)
        }
    }
}

async fn write_body(
    mut response: reqwest::Response,
    mut file: File,
    url: &str,
) -> Result<u64, GrabError> {
    let mut written: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(|source| GrabError::Fetch {
        url: url.to_string(),
        source,
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&GrabberConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_insecure_client() {
        let config = GrabberConfig {
            accept_invalid_certs: true,
            ..GrabberConfig::default()
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = build_http_client(&GrabberConfig::default()).unwrap();
        let body = fetch_page(&client, &format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_non_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client(&GrabberConfig::default()).unwrap();
        let result = fetch_page(&client, &format!("{}/missing", server.uri())).await;
        assert!(matches!(
            result,
            Err(GrabError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_to_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("file.bin");
        let client = build_http_client(&GrabberConfig::default()).unwrap();

        let written = fetch_to_file(&client, &format!("{}/file.bin", server.uri()), &destination)
            .await
            .unwrap();

        assert_eq!(written, 4096);
        assert_eq!(std::fs::read(&destination).unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn test_fetch_to_file_error_status_creates_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("file.bin");
        let client = build_http_client(&GrabberConfig::default()).unwrap();

        let url = format!("{}/file.bin", server.uri());
        let result = fetch_to_file(&client, &url, &destination).await;

        assert!(result.is_err());
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let client = build_http_client(&GrabberConfig::default()).unwrap();
        let result = fetch_page(&client, "http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(GrabError::Fetch { .. })));
    }
}
