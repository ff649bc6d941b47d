use async_trait::async_trait;
use chrono::Utc;
use mexcnode_core::*;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::signing::{sign_query, API_KEY_HEADER};

const ORDER_ENDPOINT: &str = "/api/v3/order";

/// Configuration for connecting to the MEXC spot API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MexcConfig {
    /// REST base URL (e.g. "https://api.mexc.com").
    pub base_url: String,
    /// How long a signed request stays valid on the exchange side.
    pub recv_window_ms: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MexcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mexc.com".to_string(),
            recv_window_ms: Some(5000),
            timeout_secs: 10,
        }
    }
}

/// Error body MEXC returns on rejected requests.
#[derive(Debug, Deserialize)]
struct MexcErrorBody {
    code: i64,
    msg: String,
}

/// MEXC spot client bound to one API key pair.
pub struct MexcSpotClient {
    config: MexcConfig,
    credential: Credential,
    http_client: reqwest::Client,
}

impl MexcSpotClient {
    pub fn new(config: MexcConfig, credential: Credential) -> Result<Self, ExchangeError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::ConnectionFailed(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self::with_http_client(config, credential, http_client))
    }

    /// Use a preconfigured HTTP client (proxies, custom TLS, tests).
    pub fn with_http_client(
        config: MexcConfig,
        credential: Credential,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            credential,
            http_client,
        }
    }

    pub fn config(&self) -> &MexcConfig {
        &self.config
    }

    /// Query parameters for an order, in the order they are signed and sent.
    fn order_params(&self, request: &OrderRequest, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", request.symbol().to_string()),
            ("side", request.side().as_str().to_string()),
            ("type", request.order_type().as_str().to_string()),
            ("timeInForce", request.time_in_force().as_str().to_string()),
            ("quantity", request.quantity().to_string()),
            ("price", request.price().to_string()),
        ];
        if let Some(recv_window) = self.config.recv_window_ms {
            params.push(("recvWindow", recv_window.to_string()));
        }
        params.push(("timestamp", timestamp.to_string()));
        params
    }

    /// Build the full request URL with `signature` appended last.
    fn signed_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ExchangeError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))
            .map_err(|e| ExchangeError::Other(format!("Invalid base URL '{}': {}", base, e)))?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        let query = url.query().unwrap_or_default().to_string();
        let signature = sign_query(&self.credential.api_secret, &query)?;
        url.query_pairs_mut().append_pair("signature", &signature);

        Ok(url)
    }

    fn build_headers(&self) -> Result<HeaderMap, ExchangeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.credential.api_key)
                .map_err(|e| ExchangeError::Authentication(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    async fn signed_post(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ExchangeError> {
        let url = self.signed_url(path, params)?;
        let headers = self.build_headers()?;

        let response = self
            .http_client
            .post(url)
            .headers(headers)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), path, "MEXC response");

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                ExchangeError::Parse(format!("Failed to parse response: {} - Body: {}", e, body))
            })
        } else {
            Err(error_from_response(status.as_u16(), &body))
        }
    }
}

fn transport_error(e: reqwest::Error) -> ExchangeError {
    if e.is_timeout() {
        ExchangeError::ConnectionFailed(format!("Request timed out: {}", e))
    } else {
        ExchangeError::ConnectionFailed(e.to_string())
    }
}

/// Map a non-2xx response to an exchange error.
fn error_from_response(status: u16, body: &str) -> ExchangeError {
    let parsed = serde_json::from_str::<MexcErrorBody>(body).ok();
    match (status, parsed) {
        (401 | 403, Some(err)) => ExchangeError::Authentication(err.msg),
        (401 | 403, None) => ExchangeError::Authentication(format!("HTTP {}: {}", status, body)),
        (_, Some(err)) => ExchangeError::Rejected {
            code: err.code,
            message: err.msg,
        },
        (_, None) => ExchangeError::Status {
            status,
            body: body.to_string(),
        },
    }
}

#[async_trait]
impl SpotExchange for MexcSpotClient {
    fn name(&self) -> &str {
        "mexc"
    }

    async fn new_order(&self, request: &OrderRequest) -> Result<Value, ExchangeError> {
        let params = self.order_params(request, Utc::now().timestamp_millis());
        info!(
            symbol = %request.symbol(),
            side = request.side().as_str(),
            quantity = %request.quantity(),
            price = %request.price(),
            "Placing MEXC order"
        );
        self.signed_post(ORDER_ENDPOINT, &params).await
    }
}

/// Builds a `MexcSpotClient` per credential.
#[derive(Debug, Clone, Default)]
pub struct MexcConnector {
    config: MexcConfig,
}

impl MexcConnector {
    pub fn new(config: MexcConfig) -> Self {
        Self { config }
    }
}

impl ExchangeConnector for MexcConnector {
    fn connect(&self, credential: &Credential) -> Result<Box<dyn SpotExchange>, ExchangeError> {
        let client = MexcSpotClient::new(self.config.clone(), credential.clone())?;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn client(base_url: String) -> MexcSpotClient {
        let config = MexcConfig {
            base_url,
            ..Default::default()
        };
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        MexcSpotClient::with_http_client(config, Credential::new("test-key", "test-secret"), http)
    }

    fn order() -> OrderRequest {
        OrderRequest::limit("ethusdt", Side::Buy, TimeInForce::Gtc, dec!(1), dec!(2000))
    }

    #[tokio::test]
    async fn test_new_order_signs_query_and_returns_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"symbol":"ETHUSDT","orderId":"abc123","orderListId":-1,"price":"2000","origQty":"1","type":"LIMIT","side":"BUY","transactTime":1666676533741}"#,
        )
        .await;

        let result = client(base).new_order(&order()).await.unwrap();
        assert_eq!(result["orderId"], "abc123");
        assert_eq!(result["transactTime"], 1666676533741i64);

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("POST /api/v3/order?"));
        assert!(request.to_lowercase().contains("x-mexc-apikey: test-key"));

        let target = request_line.split_whitespace().nth(1).unwrap();
        let query = target.split_once('?').unwrap().1;
        let (signed_part, signature) = query.rsplit_once("&signature=").unwrap();
        assert!(signed_part.starts_with(
            "symbol=ETHUSDT&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=2000&recvWindow=5000&timestamp="
        ));
        assert_eq!(signature, sign_query("test-secret", signed_part).unwrap());
    }

    #[tokio::test]
    async fn test_exchange_rejection_is_mapped() {
        let (base, server) = serve_once(
            "HTTP/1.1 400 Bad Request",
            r#"{"code":30004,"msg":"Insufficient position"}"#,
        )
        .await;

        match client(base).new_order(&order()).await {
            Err(ExchangeError::Rejected { code, message }) => {
                assert_eq!(code, 30004);
                assert_eq!(message, "Insufficient position");
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[test]
    fn test_error_mapping() {
        match error_from_response(403, r#"{"code":700002,"msg":"Signature for this request is not valid."}"#) {
            ExchangeError::Authentication(msg) => assert!(msg.contains("Signature")),
            other => panic!("Expected authentication error, got {:?}", other),
        }
        match error_from_response(502, "Bad Gateway") {
            ExchangeError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_recv_window_is_optional() {
        let config = MexcConfig {
            recv_window_ms: None,
            ..Default::default()
        };
        let client = MexcSpotClient::new(config, Credential::new("k", "s")).unwrap();
        let params = client.order_params(&order(), 42);
        assert!(params.iter().all(|(k, _)| *k != "recvWindow"));
        assert_eq!(params.last().unwrap(), &("timestamp", "42".to_string()));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MexcConfig = serde_json::from_str(r#"{"timeout_secs": 3}"#).unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.base_url, "https://api.mexc.com");
    }
}
