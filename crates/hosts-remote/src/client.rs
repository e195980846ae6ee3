//! Blocking HTTP fetch for remote hosts lists.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::debug;

use hosts_model::{HostsError, Result};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response-size ceiling for tracked sources. Longer bodies are truncated,
/// not rejected.
pub const MAX_RESPONSE_BYTES: u64 = 50 * 1024 * 1024;

/// Tighter ceiling for one-off fetches of urls with no tracked source.
pub const MAX_DIRECT_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// User agent sent with every fetch.
const FETCH_USER_AGENT: &str = concat!("hosts-manager/", env!("CARGO_PKG_VERSION"));

/// Client for downloading remote hosts lists.
#[derive(Debug)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| HostsError::Network {
                url: "(client setup)".to_string(),
                reason: error.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Fetch `url` with the standard response ceiling.
    pub fn fetch_url(&self, url: &str) -> Result<String> {
        self.fetch_with_limit(url, MAX_RESPONSE_BYTES)
    }

    /// Fetch `url`, reading at most `limit` bytes of the body.
    ///
    /// Bodies are decoded lossily, so a list with stray non-UTF-8 bytes
    /// still comes through instead of failing the whole fetch.
    pub fn fetch_with_limit(&self, url: &str, limit: u64) -> Result<String> {
        debug!(url, "fetching remote hosts content");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, FETCH_USER_AGENT)
            .header(ACCEPT, "text/plain, */*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .map_err(|error| network_error(url, &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostsError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut body = Vec::new();
        response
            .take(limit)
            .read_to_end(&mut body)
            .map_err(|error| HostsError::Network {
                url: url.to_string(),
                reason: error.to_string(),
            })?;
        debug!(url, bytes = body.len(), "fetched remote hosts content");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn network_error(url: &str, error: &reqwest::Error) -> HostsError {
    HostsError::Network {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hosts_model::ErrorKind;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a loopback port; the join handle
    /// yields the raw request the client sent.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
            let _ = stream.write_all(response.as_bytes());
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn fetch_returns_the_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 20\r\nConnection: close\r\n\r\n0.0.0.0 ads.example\n",
        );
        let client = FetchClient::new().unwrap();

        let body = client.fetch_url(&url).unwrap();

        assert_eq!(body, "0.0.0.0 ads.example\n");
        server.join().unwrap();
    }

    #[test]
    fn fetch_sends_identifying_headers() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let client = FetchClient::new().unwrap();
        client.fetch_url(&url).unwrap();

        let request = server.join().unwrap();
        assert!(request.contains("user-agent: hosts-manager/"));
        assert!(request.contains("accept: text/plain, */*"));
        assert!(request.contains("accept-language: en-US,en;q=0.9"));
    }

    #[test]
    fn non_success_status_is_a_network_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let client = FetchClient::new().unwrap();

        let error = client.fetch_url(&url).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Network);
        assert!(matches!(error, HostsError::HttpStatus { status: 500, .. }));
        server.join().unwrap();
    }

    #[test]
    fn oversize_body_is_truncated_not_failed() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 16\r\nConnection: close\r\n\r\nabcdefghijklmnop",
        );
        let client = FetchClient::new().unwrap();

        let body = client.fetch_with_limit(&url, 8).unwrap();

        assert_eq!(body, "abcdefgh");
        server.join().unwrap();
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        // Bind then drop to get a port with no listener.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = FetchClient::new().unwrap();

        let error = client.fetch_url(&format!("http://127.0.0.1:{port}/")).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Network);
        assert!(matches!(error, HostsError::Network { .. }));
    }
}
