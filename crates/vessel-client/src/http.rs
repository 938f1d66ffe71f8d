//! HTTP transport for the vesseld daemon

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use vessel_api::envelope::Envelope;

use crate::error::{ClientError, Result};
use crate::transport::{Body, Content, Method, Transport, TransportRequest, TransportResponse};

/// [`Transport`] implementation over HTTPS.
///
/// `base_url` carries scheme, host and port; request paths are absolute
/// and replace the URL path.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Create a new HTTP transport with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { client, base_url })
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut url = self.url(&request.path)?;
        if !request.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &request.params {
                query.append_pair(key, value);
            }
        }
        tracing::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match request.body {
            Some(Body::Json(content)) => builder.json(&content),
            Some(Body::Bytes(bytes)) => builder.body(bytes),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("unknown error");
            let body = response.text().await.unwrap_or_default();
            if is_json {
                if let Ok(envelope) = serde_json::from_str::<Envelope>(&body) {
                    return Err(ClientError::Api {
                        code: envelope.error_code.unwrap_or_else(|| status.as_u16()),
                        message: envelope.error.unwrap_or_else(|| fallback.to_string()),
                    });
                }
            }
            return Err(ClientError::Api {
                code: status.as_u16(),
                message: if body.is_empty() {
                    fallback.to_string()
                } else {
                    body
                },
            });
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let content = if is_json {
            Content::Json(response.json().await?)
        } else {
            Content::Binary(response.bytes().await?.to_vec())
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            content,
        })
    }
}
