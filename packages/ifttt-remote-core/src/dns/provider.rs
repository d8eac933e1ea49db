//! Dynamic-DNS provider abstraction and the SPDYN implementation.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::{RemoteError, RemoteResult};
use crate::protocol_constants::{DEFAULT_DNS_UPDATE_URL, DEFAULT_IP_CHECK_URL};

/// Trait for the two outbound calls of an IP update.
///
/// Used by `DnsSynchronizer`; tests substitute a recording mock.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Discovers the host's current public IP address.
    async fn discover_ip(&self) -> RemoteResult<String>;

    /// Pushes `ip` for `hostname` and returns the provider's raw reply.
    ///
    /// # Arguments
    /// * `hostname` - Registered hostname, also the Basic auth user
    /// * `token` - Update token, the Basic auth password
    /// * `ip` - Address to publish
    async fn update(&self, hostname: &str, token: &str, ip: &str) -> RemoteResult<String>;
}

/// Endpoints used by [`SpdynProvider`].
#[derive(Debug, Clone)]
pub struct DnsEndpoints {
    /// Plain-text "what is my IP" endpoint.
    pub ip_check_url: String,
    /// dyndns2-style update endpoint.
    pub update_url: String,
}

impl Default for DnsEndpoints {
    fn default() -> Self {
        Self {
            ip_check_url: DEFAULT_IP_CHECK_URL.to_string(),
            update_url: DEFAULT_DNS_UPDATE_URL.to_string(),
        }
    }
}

/// SPDYN (securepoint dynamic DNS) provider over the dyndns2 protocol.
pub struct SpdynProvider {
    http: Client,
    endpoints: DnsEndpoints,
}

impl SpdynProvider {
    /// Creates a provider using `http` for both calls.
    ///
    /// The client should not carry a request timeout: these calls run once at
    /// startup and a slow provider only delays that one sync.
    #[must_use]
    pub fn new(http: Client, endpoints: DnsEndpoints) -> Self {
        Self { http, endpoints }
    }
}

/// Removes every CR and LF from a plain-text reply.
pub(crate) fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

#[async_trait]
impl DnsProvider for SpdynProvider {
    async fn discover_ip(&self) -> RemoteResult<String> {
        let res = self
            .http
            .get(&self.endpoints.ip_check_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(strip_line_breaks(&res.text().await?))
    }

    async fn update(&self, hostname: &str, token: &str, ip: &str) -> RemoteResult<String> {
        let url = Url::parse_with_params(
            &self.endpoints.update_url,
            &[("hostname", hostname), ("myip", ip)],
        )
        .map_err(|e| RemoteError::Network(format!("invalid update URL: {}", e)))?;

        // Rejections such as `badauth` arrive with a 4xx status; the body is
        // returned as-is so the caller can report it.
        let res = self
            .http
            .get(url)
            .basic_auth(hostname, Some(token))
            .send()
            .await?;
        Ok(strip_line_breaks(&res.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_crlf_anywhere() {
        assert_eq!(strip_line_breaks("good 1.2.3.4\r\n"), "good 1.2.3.4");
        assert_eq!(strip_line_breaks("1.2.\n3.4"), "1.2.3.4");
    }

    /// Serves a fake IP checker and update endpoint on a loopback port.
    async fn fake_spdyn(update_status: u16, update_body: &'static str) -> DnsEndpoints {
        use axum::extract::RawQuery;
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::get;

        let app = axum::Router::new()
            .route("/", get(|| async { "1.2.3.4\r\n" }))
            .route(
                "/nic/update",
                get(move |RawQuery(query): RawQuery, headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body = format!("{}|{}|{}", update_body, query.unwrap_or_default(), auth);
                    (StatusCode::from_u16(update_status).unwrap(), body)
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        DnsEndpoints {
            ip_check_url: format!("{}/", base),
            update_url: format!("{}/nic/update", base),
        }
    }

    #[tokio::test]
    async fn discovers_ip_without_line_breaks() {
        let provider = SpdynProvider::new(Client::new(), fake_spdyn(200, "good").await);
        assert_eq!(provider.discover_ip().await.unwrap(), "1.2.3.4");
    }

    #[tokio::test]
    async fn update_sends_query_and_basic_auth() {
        let provider = SpdynProvider::new(Client::new(), fake_spdyn(200, "good").await);

        let reply = provider
            .update("home.spdns.de", "abcd-efgh", "1.2.3.4")
            .await
            .unwrap();

        let parts: Vec<&str> = reply.split('|').collect();
        assert_eq!(parts[0], "good");
        assert_eq!(parts[1], "hostname=home.spdns.de&myip=1.2.3.4");
        // base64("home.spdns.de:abcd-efgh")
        assert_eq!(parts[2], "Basic aG9tZS5zcGRucy5kZTphYmNkLWVmZ2g=");
    }

    #[tokio::test]
    async fn rejected_update_still_returns_body() {
        let provider = SpdynProvider::new(Client::new(), fake_spdyn(401, "badauth").await);
        let reply = provider.update("h", "t", "1.2.3.4").await.unwrap();
        assert!(reply.starts_with("badauth|"));
    }

    #[test]
    fn default_endpoints_point_at_spdyn() {
        let endpoints = DnsEndpoints::default();
        assert!(endpoints.ip_check_url.contains("checkip4.spdns.de"));
        assert!(endpoints.update_url.ends_with("/nic/update"));
    }
}
