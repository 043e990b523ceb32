//! # HTTP Backend
//!
//! [`ReturnsBackend`] over the Kajamart REST API with reqwest.
//!
//! ## Endpoints
//! | Operation          | Request                          |
//! |--------------------|----------------------------------|
//! | `find_sales`       | `GET  /api/sales?search={term}`  |
//! | `get_sale`         | `GET  /api/sales/{id}`           |
//! | `search_products`  | `GET  /api/products?search={term}` |
//! | `submit_return`    | `POST /api/returns`              |
//! | `submit_write_off` | `POST /api/write-offs`           |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kajamart_core::{ProductRecord, SaleRecord};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::backend::{ReturnReceipt, ReturnRequest, ReturnsBackend, WriteOffReceipt, WriteOffRequest};
use crate::config::ApiSettings;
use crate::credentials::CredentialProvider;
use crate::error::{ClientError, ClientResult};

/// REST client for the Kajamart API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpBackend {
    /// Builds a client with the configured base URL and timeout.
    pub fn new(settings: &ApiSettings, credentials: Arc<dyn CredentialProvider>) -> ClientResult<Self> {
        let base_url = settings.parsed_base_url()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(HttpBackend {
            client,
            base_url,
            credentials,
        })
    }

    /// Joins path segments under the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> ClientResult<T> {
        debug!(%url, "GET");
        let response = self.authorize(self.client.get(url).query(query)).send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> ClientResult<T> {
        debug!(%url, "POST");
        let response = self.authorize(self.client.post(url).json(body)).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            warn!(status = status.as_u16(), "API request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => {
                    self.credentials.clear();
                    ClientError::Unauthorized
                }
                StatusCode::FORBIDDEN => ClientError::Forbidden(text),
                StatusCode::NOT_FOUND => ClientError::NotFound(text),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Rejected(text)
                }
                _ => ClientError::Server {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ReturnsBackend for HttpBackend {
    async fn find_sales(&self, term: &str) -> ClientResult<Vec<SaleRecord>> {
        let url = self.endpoint(&["api", "sales"])?;
        self.get(url, &[("search", term)]).await
    }

    async fn get_sale(&self, sale_id: &str) -> ClientResult<SaleRecord> {
        let url = self.endpoint(&["api", "sales", sale_id])?;
        self.get(url, &[]).await
    }

    async fn search_products(&self, term: &str) -> ClientResult<Vec<ProductRecord>> {
        let url = self.endpoint(&["api", "products"])?;
        self.get(url, &[("search", term)]).await
    }

    async fn submit_return(&self, request: &ReturnRequest) -> ClientResult<ReturnReceipt> {
        let url = self.endpoint(&["api", "returns"])?;
        self.post(url, request).await
    }

    async fn submit_write_off(&self, request: &WriteOffRequest) -> ClientResult<WriteOffReceipt> {
        let url = self.endpoint(&["api", "write-offs"])?;
        self.post(url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Envelope;
    use crate::credentials::InMemoryCredentials;
    use kajamart_core::{ReturnSubmission, SettlementResult};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single request with a canned response and hands back the raw
    /// request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn backend_with(base_url: &str, credentials: Arc<InMemoryCredentials>) -> HttpBackend {
        let settings = ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        };
        HttpBackend::new(&settings, credentials).unwrap()
    }

    fn return_request() -> ReturnRequest {
        Envelope::new(ReturnSubmission {
            sale_id: "V-1001".to_string(),
            returned_items: vec![],
            replacement_items: vec![],
            settlement: SettlementResult::default(),
        })
    }

    fn backend(base_url: &str) -> HttpBackend {
        let settings = ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        };
        HttpBackend::new(&settings, Arc::new(InMemoryCredentials::new())).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let http = backend("https://api.kajamart.co");
        assert_eq!(
            http.endpoint(&["api", "sales"]).unwrap().as_str(),
            "https://api.kajamart.co/api/sales"
        );

        let http = backend("https://kajamart.co/backend/");
        assert_eq!(
            http.endpoint(&["api", "write-offs"]).unwrap().as_str(),
            "https://kajamart.co/backend/api/write-offs"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let http = backend("http://localhost:3000");
        assert_eq!(
            http.endpoint(&["api", "sales", "V 10/01"]).unwrap().as_str(),
            "http://localhost:3000/api/sales/V%2010%2F01"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let settings = ApiSettings {
            base_url: "localhost".to_string(),
            timeout_secs: 5,
        };
        let result = HttpBackend::new(&settings, Arc::new(InMemoryCredentials::new()));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credentials() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"error":"expired"}"#).await;
        let credentials = Arc::new(InMemoryCredentials::with_token("tok-123"));
        let http = backend_with(&url, credentials.clone());

        let err = http.get_sale("V-1001").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(credentials.get(), None);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /api/sales/v-1001 "));
        assert!(request.contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn test_unprocessable_submission_is_rejected() {
        let (url, server) = serve_once("422 Unprocessable Entity", "sale already settled").await;
        let http = backend_with(&url, Arc::new(InMemoryCredentials::new()));

        let err = http.submit_return(&return_request()).await.unwrap_err();
        match err {
            ClientError::Rejected(body) => assert_eq!(body, "sale already settled"),
            other => panic!("expected Rejected, got {:?}", other),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/returns "));
        assert!(request.contains("\"saleId\":\"V-1001\""));
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases: [(&'static str, fn(&ClientError) -> bool); 4] = [
            ("403 Forbidden", |e| matches!(e, ClientError::Forbidden(_))),
            ("404 Not Found", |e| matches!(e, ClientError::NotFound(_))),
            ("400 Bad Request", |e| matches!(e, ClientError::Rejected(_))),
            ("503 Service Unavailable", |e| {
                matches!(e, ClientError::Server { status: 503, .. })
            }),
        ];

        for (status_line, expected) in cases {
            let (url, server) = serve_once(status_line, "nope").await;
            let credentials = Arc::new(InMemoryCredentials::with_token("tok"));
            let http = backend_with(&url, credentials.clone());

            let err = http.find_sales("ana").await.unwrap_err();
            assert!(expected(&err), "{} mapped to {:?}", status_line, err);
            assert!(credentials.get().is_some(), "{} cleared the token", status_line);
            server.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let (url, server) = serve_once("200 OK", r#"{"not":"a list"}"#).await;
        let http = backend_with(&url, Arc::new(InMemoryCredentials::new()));

        let err = http.search_products("arroz 5kg").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/products?search=arroz+5kg "));
    }

    #[tokio::test]
    async fn test_success_decodes_records() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"id":"R-1","name":"Gorra","barcode":null,"price":20000,"stock":4}]"#,
        )
        .await;
        let http = backend_with(&url, Arc::new(InMemoryCredentials::new()));

        let products = http.search_products("gorra").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price.minor(), 20000);
        assert!(products[0].is_active);
        server.await.unwrap();
    }
}
