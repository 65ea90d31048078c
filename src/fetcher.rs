use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ResolvedConfig;
use crate::error::GeoDatasetsError;

/// Byte transfer from a URL to a local file.
pub trait Downloader: Send + Sync {
    fn download(&self, url: &str, destination: &Path) -> Result<(), GeoDatasetsError>;
}

#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
    max_retries: usize,
}

impl HttpDownloader {
    pub fn new(config: &ResolvedConfig) -> Result<Self, GeoDatasetsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("geodatasets/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GeoDatasetsError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GeoDatasetsError::Http(err.to_string()))?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, GeoDatasetsError> {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        tracing::debug!(url, status, attempt, "retrying download");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        tracing::debug!(url, error = %err, attempt, "retrying download");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(GeoDatasetsError::Http(format!("{url}: {err}")));
                }
            }
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, destination: &Path) -> Result<(), GeoDatasetsError> {
        let mut response = self.send_with_retries(url)?;
        if !response.status().is_success() {
            return Err(GeoDatasetsError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let mut file = File::create(destination)
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| GeoDatasetsError::Http(format!("{url}: {err}")))?;
        Ok(())
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }
}
