// HTTP state store: one REST resource per document key on the draft backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::StateStore;

/// `GET`/`POST`/`DELETE {base_url}/{key}`. A `404` on `GET` means nothing is
/// stored yet.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl StateStore for RemoteStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let url = self.url(key);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;
        let value = resp
            .json::<Value>()
            .await
            .with_context(|| format!("GET {url} returned invalid JSON"))?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let url = self.url(key);
        self.http
            .post(&url)
            .json(value)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = self.url(key);
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {url} failed"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        resp.error_for_status()
            .with_context(|| format!("DELETE {url} returned an error status"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned response; the request head is sent back on the channel.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = tx.send(read_request(&mut stream).await);
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });
        (format!("http://{addr}"), rx)
    }

    /// Read a request head plus its `Content-Length` body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).into_owned();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let body_len = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= head_end + 4 + body_len {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn store(base: &str) -> RemoteStore {
        RemoteStore::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn load_reads_key_resource() {
        let (base, request) = serve_once("200 OK", r#"{"HOK": [3]}"#).await;
        let value = store(&base).load("priority_list").await.unwrap();
        assert_eq!(value, Some(json!({"HOK": [3]})));
        assert!(request.await.unwrap().starts_with("GET /priority_list "));
    }

    #[tokio::test]
    async fn load_not_found_is_none() {
        let (base, _request) = serve_once("404 Not Found", "").await;
        assert!(store(&base).load("league").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_posts_json_body() {
        let (base, request) = serve_once("200 OK", "{}").await;
        store(&base)
            .save("drafted_players", &json!({"MID": [9]}))
            .await
            .unwrap();
        let head = request.await.unwrap();
        assert!(head.starts_with("POST /drafted_players "));
        assert!(head.contains(r#"{"MID":[9]}"#));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let (base, _request) = serve_once("500 Internal Server Error", "").await;
        assert!(store(&base).save("priority_list", &json!({})).await.is_err());

        let (base, _request) = serve_once("503 Service Unavailable", "").await;
        assert!(store(&base).load("priority_list").await.is_err());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_resource() {
        let (base, request) = serve_once("404 Not Found", "").await;
        store(&base).delete("league").await.unwrap();
        assert!(request.await.unwrap().starts_with("DELETE /league "));
    }
}
