//! Session handle for a vesseld server

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::Collection;
use crate::error::{ClientError, Result};
use crate::http::HttpTransport;
use crate::operation::Operations;
use crate::registry::{ResourceKind, ResourceRegistry};
use crate::response::{ApiResponse, ResponseKind};
use crate::transport::{Method, Transport, TransportRequest};

struct RemoteInner {
    transport: Arc<dyn Transport>,
    registry: ResourceRegistry,
}

/// Handle to a live server session.
///
/// Cheap to clone; every entity and collection constructed from a Remote
/// shares its transport (and connection pool). Two handles refer to the
/// same remote iff they share the inner session, which is what entity
/// equality keys on.
#[derive(Clone)]
pub struct Remote {
    inner: Arc<RemoteInner>,
}

impl Remote {
    /// Connect to a daemon at `base_url`, e.g. `https://vessel-host:8443`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(base_url)?)))
    }

    /// Connect with a custom `reqwest::Client` (certificates, timeouts).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: reqwest::Client) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(HttpTransport::with_client(
            base_url, client,
        )?)))
    }

    /// Build a Remote over any [`Transport`], with the builtin registry.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::with_transport_and_registry(transport, ResourceRegistry::builtin())
    }

    /// Build a Remote over any [`Transport`] and a custom registry.
    pub fn with_transport_and_registry(
        transport: Arc<dyn Transport>,
        registry: ResourceRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(RemoteInner {
                transport,
                registry,
            }),
        }
    }

    pub(crate) fn registry(&self) -> &ResourceRegistry {
        &self.inner.registry
    }

    pub(crate) fn same_as(&self, other: &Remote) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn token(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Perform one API call and classify the result.
    ///
    /// Content-type is derived from the body (`content` ⇒ JSON, `upload` ⇒
    /// octet-stream, never both); error envelopes are translated to
    /// [`ClientError::Api`] so callers only ever see sync/async/raw
    /// responses.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        headers: Vec<(String, String)>,
        content: Option<Value>,
        upload: Option<Vec<u8>>,
    ) -> Result<ApiResponse> {
        let request = TransportRequest::new(method, path)
            .with_params(
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            )
            .with_headers(headers)
            .with_body(content, upload)?;
        tracing::debug!("{} {}", method, path);
        let response = self.inner.transport.send(request).await?;
        let response = ApiResponse::classify(response)?;
        if response.kind() == ResponseKind::Error {
            return Err(ClientError::Api {
                code: response.error_code().unwrap_or_else(|| response.http_code()),
                message: response.error_message().unwrap_or_default().to_string(),
            });
        }
        Ok(response)
    }

    /// Server configuration and capabilities, from the API root.
    pub async fn info(&self) -> Result<Value> {
        let response = self
            .request(Method::Get, "/", &[], Vec::new(), None, None)
            .await?;
        Ok(response.metadata().clone())
    }

    /// Collection of a given kind rooted at its top-level URI.
    pub fn collection(&self, kind: ResourceKind) -> Collection {
        Collection::new(self.clone(), kind, format!("/{}", kind.uri_name()))
    }

    pub fn certificates(&self) -> Collection {
        self.collection(ResourceKind::Certificate)
    }

    pub fn containers(&self) -> Collection {
        self.collection(ResourceKind::Container)
    }

    pub fn images(&self) -> Collection {
        self.collection(ResourceKind::Image)
    }

    pub fn networks(&self) -> Collection {
        self.collection(ResourceKind::Network)
    }

    pub fn profiles(&self) -> Collection {
        self.collection(ResourceKind::Profile)
    }

    pub fn storage_pools(&self) -> Collection {
        self.collection(ResourceKind::StoragePool)
    }

    pub fn operations(&self) -> Operations {
        Operations::new(self.clone())
    }
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Remote({:p})", Arc::as_ptr(&self.inner))
    }
}
