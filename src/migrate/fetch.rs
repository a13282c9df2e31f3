use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use anyhow::{Context, Result};

use crate::config::HttpConfig;
use crate::error::MigrateError;

/// A fully buffered response body plus the headers the migrator cares about.
#[derive(Clone, Debug)]
pub struct Download {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[allow(async_fn_in_trait)]
pub trait Downloader {
    async fn download(&self, url: &str) -> Result<Download, MigrateError>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &cfg.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name {:?}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {}", name))?;
            headers.insert(name, value);
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .default_headers(headers)
            .build()?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Download, MigrateError> {
        let resp = self.client.get(url).send().await
            .map_err(|e| MigrateError::DownloadFailed { url: url.to_string(), source: Box::new(e) })?;
        let status = resp.status().as_u16();
        let content_type = resp.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.bytes().await
            .map_err(|e| MigrateError::ReadFailed { url: url.to_string(), source: Box::new(e) })?;
        Ok(Download { status, content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // Answer one request with `response`, handing back the raw request head.
    async fn serve_once(response: &'static [u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 { break; }
                head.extend_from_slice(&buf[..n]);
            }
            sock.write_all(response).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_lowercase()
        });
        (format!("http://{}", addr), handle)
    }

    fn http_config() -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(5),
            headers: vec![
                ("User-Agent".to_string(), "migrate-test/1.0".to_string()),
                ("Referer".to_string(), "https://drive.google.com/".to_string()),
            ],
        }
    }

    #[tokio::test]
    async fn sends_configured_headers_and_captures_content_type() {
        let (base, server) = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 4\r\nConnection: close\r\n\r\n\x89PNG",
        ).await;
        let dl = HttpDownloader::new(&http_config()).unwrap();

        let got = dl.download(&format!("{}/photo", base)).await.unwrap();

        assert_eq!(got.status, 200);
        assert_eq!(got.content_type.as_deref(), Some("image/png"));
        assert_eq!(&got.body[..], b"\x89PNG");
        let head = server.await.unwrap();
        assert!(head.starts_with("get /photo "));
        assert!(head.contains("user-agent: migrate-test/1.0\r\n"));
        assert!(head.contains("referer: https://drive.google.com/\r\n"));
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_failed() {
        let (base, server) = serve_once(
            b"HTTP/1.1 403 Forbidden\r\nContent-Type: text/html\r\nContent-Length: 22\r\nConnection: close\r\n\r\n<html>forbidden</html>",
        ).await;
        let dl = HttpDownloader::new(&http_config()).unwrap();

        let got = dl.download(&format!("{}/photo.jpg", base)).await.unwrap();

        assert_eq!(got.status, 403);
        assert_eq!(got.content_type.as_deref(), Some("text/html"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_download_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let dl = HttpDownloader::new(&http_config()).unwrap();

        let err = dl.download(&format!("http://{}/photo.jpg", addr)).await.unwrap_err();
        assert_eq!(err.kind(), "download_failed");
    }

    #[tokio::test]
    async fn truncated_body_is_read_failed() {
        let (base, server) = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
        ).await;
        let dl = HttpDownloader::new(&http_config()).unwrap();

        let err = dl.download(&format!("{}/photo.jpg", base)).await.unwrap_err();
        assert_eq!(err.kind(), "read_failed");
        server.await.unwrap();
    }

    #[test]
    fn rejects_invalid_header_names() {
        let mut cfg = http_config();
        cfg.headers.push(("Bad Header".to_string(), "x".to_string()));
        assert!(HttpDownloader::new(&cfg).is_err());
    }
}
