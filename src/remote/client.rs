use crate::config::RemoteConfig;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, error, info};

/// Blocking-style GET helper for the people endpoint.
///
/// Every failure (bad URL, refused connection, timeout, HTTP error status)
/// is logged and collapsed into `None`; callers only learn that no data
/// arrived.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  url: String,
  token: Option<String>,
}

impl HttpFetcher {
  pub fn new(remote: &RemoteConfig, token: Option<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .connect_timeout(remote.connect_timeout())
      .read_timeout(remote.read_timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      url: remote.url.clone(),
      token,
    })
  }

  /// The endpoint this fetcher was configured with
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Fetch the configured endpoint with the configured token
  pub async fn fetch_configured(&self) -> Option<String> {
    self.fetch(&self.url, self.token.as_deref()).await
  }

  /// GET `url` and return the body text, or `None` on any failure.
  pub async fn fetch(&self, url: &str, token: Option<&str>) -> Option<String> {
    debug!(url, "Making request");

    match self.try_fetch(url, token).await {
      Ok(body) => {
        info!(url, length = body.len(), "Response received");
        Some(body)
      }
      Err(e) => {
        error!(url, "Request failed: {}", e);
        None
      }
    }
  }

  async fn try_fetch(&self, url: &str, token: Option<&str>) -> Result<String> {
    let url = url::Url::parse(url).map_err(|e| eyre!("Malformed URL '{}': {}", url, e))?;

    let mut request = self
      .client
      .get(url)
      .header(CONTENT_TYPE, "application/json")
      .header(ACCEPT, "application/json");

    // Only add token if it's provided and not empty
    if let Some(token) = token.filter(|t| !t.is_empty()) {
      request = request.bearer_auth(token);
      debug!("Authorization token added");
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("Failed to send request: {}", e))?;

    let status = response.status();
    debug!(%status, "Response status");

    // Read the body either way so error responses can be diagnosed
    let body = response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response body: {}", e))?;

    if !status.is_success() {
      if body.is_empty() {
        return Err(eyre!("HTTP error: {}", status));
      }
      return Err(eyre!("HTTP error: {} - {}", status, body));
    }

    Ok(body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  /// Accept one connection, answer with a canned response and hand back
  /// the raw request text.
  async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();

      let mut request = Vec::new();
      let mut chunk = [0u8; 1024];
      loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&chunk[..n]);
        if request.windows(4).any(|w| w == b"\r\n\r\n") {
          break;
        }
      }

      let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      let _ = socket.shutdown().await;

      String::from_utf8_lossy(&request).to_lowercase()
    });

    (format!("http://{}/people", addr), handle)
  }

  fn fetcher(read_timeout_secs: u64) -> HttpFetcher {
    let remote = RemoteConfig {
      read_timeout_secs,
      ..RemoteConfig::default()
    };
    HttpFetcher::new(&remote, None).unwrap()
  }

  #[tokio::test]
  async fn test_success_returns_body() {
    let (url, server) = serve_once("200 OK", r#"{"data": []}"#).await;

    let body = fetcher(15).fetch(&url, None).await;

    assert_eq!(body.as_deref(), Some(r#"{"data": []}"#));
    let request = server.await.unwrap();
    assert!(request.starts_with("get /people"));
    assert!(request.contains("accept: application/json"));
    assert!(request.contains("content-type: application/json"));
    assert!(!request.contains("authorization"));
  }

  #[tokio::test]
  async fn test_token_is_sent_as_bearer() {
    let (url, server) = serve_once("200 OK", "[]").await;

    fetcher(15).fetch(&url, Some("s3cret")).await;

    let request = server.await.unwrap();
    assert!(request.contains("authorization: bearer s3cret"));
  }

  #[tokio::test]
  async fn test_empty_token_is_not_sent() {
    let (url, server) = serve_once("200 OK", "[]").await;

    fetcher(15).fetch(&url, Some("")).await;

    let request = server.await.unwrap();
    assert!(!request.contains("authorization"));
  }

  #[tokio::test]
  async fn test_error_status_returns_none() {
    let (url, server) = serve_once("404 Not Found", r#"{"error": "missing"}"#).await;

    assert_eq!(fetcher(15).fetch(&url, None).await, None);
    server.await.unwrap();
  }

  #[tokio::test]
  async fn test_malformed_url_returns_none() {
    assert_eq!(fetcher(15).fetch("not a url", None).await, None);
  }

  #[tokio::test]
  async fn test_refused_connection_returns_none() {
    // Grab a free port, then close it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/people", addr);
    assert_eq!(fetcher(15).fetch(&url, None).await, None);
  }

  #[tokio::test]
  async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and hold the connection open without answering
    let server = tokio::spawn(async move {
      let (socket, _) = listener.accept().await.unwrap();
      tokio::time::sleep(std::time::Duration::from_secs(5)).await;
      drop(socket);
    });

    let url = format!("http://{}/people", addr);
    assert_eq!(fetcher(1).fetch(&url, None).await, None);
    server.abort();
  }

  #[tokio::test]
  async fn test_fetch_configured_uses_config_url() {
    let (url, server) = serve_once("200 OK", "[]").await;
    let remote = RemoteConfig {
      url,
      ..RemoteConfig::default()
    };
    let fetcher = HttpFetcher::new(&remote, Some("tok".to_string())).unwrap();

    assert_eq!(fetcher.fetch_configured().await.as_deref(), Some("[]"));
    let request = server.await.unwrap();
    assert!(request.contains("authorization: bearer tok"));
  }
}
