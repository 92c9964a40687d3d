//! Raw byte acquisition, the only asynchronous step of a load.
//!
//! A source is either a local path or an `http(s)` URL. Failures surface as
//! [`IngestError::ReadFailure`], never as parse errors.

use async_trait::async_trait;
use tracing::debug;

use crate::error::IngestError;

/// Executes HTTP requests; swapped out in tests or for authenticated clients.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

#[derive(Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn read_failure(source: &str, io: std::io::Error) -> IngestError {
    IngestError::ReadFailure {
        source_name: source.to_string(),
        io,
    }
}

/// Downloads `url`, treating non-success statuses as failures.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>, IngestError> {
    let parsed = url
        .parse()
        .map_err(|e| read_failure(url, std::io::Error::other(e)))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| read_failure(url, std::io::Error::other(e)))?;

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| read_failure(url, std::io::Error::other(e)))?;
    Ok(bytes.to_vec())
}

/// Reads a source from disk or over HTTP.
pub async fn read_source<C: HttpClient + ?Sized>(
    client: &C,
    source: &str,
) -> Result<Vec<u8>, IngestError> {
    let bytes = if is_url(source) {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| read_failure(source, e))?
    };
    debug!(source, bytes = bytes.len(), "Source read");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.org/class.xlsx"));
        assert!(is_url("http://localhost/a.csv"));
        assert!(!is_url("data/http.csv"));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_failure() {
        let err = read_source(&BasicClient::new(), "/nonexistent/class.xlsx")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::ReadFailure { .. }));
        assert!(err.to_string().contains("/nonexistent/class.xlsx"));
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"a,b,c").unwrap();

        let bytes = read_source(&BasicClient::new(), file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"a,b,c");
    }
}
