//! Local proxies for URI-addressed resources

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use vessel_api::requests::RenameRequest;

use crate::error::{ClientError, Result};
use crate::registry::ResourceKind;
use crate::remote::Remote;
use crate::resolve::{Resolved, resolve_field};
use crate::response::ApiResponse;
use crate::transport::Method;

/// Cached state from the last successful call, plus the current URI.
///
/// The URI lives under the same lock so a rename swaps both atomically.
#[derive(Debug)]
struct EntityState {
    uri: String,
    etag: Option<String>,
    details: Option<Value>,
}

/// Local proxy for one remote resource.
///
/// Holds the last-known server state; callers decide when to refresh it.
/// Cloning shares the cached state. Two entities are equal when they point
/// at the same URI through the same remote, whether or not they share state.
#[derive(Clone)]
pub struct Entity {
    remote: Remote,
    kind: ResourceKind,
    state: Arc<RwLock<EntityState>>,
}

impl Entity {
    pub(crate) fn new(remote: Remote, kind: ResourceKind, uri: impl Into<String>) -> Self {
        Self {
            remote,
            kind,
            state: Arc::new(RwLock::new(EntityState {
                uri: uri.into(),
                etag: None,
                details: None,
            })),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn uri(&self) -> String {
        self.read_state().uri.clone()
    }

    pub(crate) fn remote(&self) -> &Remote {
        &self.remote
    }

    /// ETag cached by the last read, if any.
    pub fn etag(&self) -> Option<String> {
        self.read_state().etag.clone()
    }

    /// Snapshot of the last-known details; `None` before any read.
    ///
    /// May be stale: nothing invalidates it except this instance's own
    /// calls. Use [`Entity::refreshed_details`] to force a round trip.
    pub fn details(&self) -> Option<Value> {
        self.read_state().details.clone()
    }

    /// Read from the server and return the fresh details.
    pub async fn refreshed_details(&self) -> Result<Value> {
        let response = self.read().await?;
        Ok(response.metadata().clone())
    }

    /// Fetch the resource, caching etag and details on success.
    pub async fn read(&self) -> Result<ApiResponse> {
        self.read_with_params(&[]).await
    }

    /// Fetch the resource with extra query parameters (e.g. an image
    /// secret token).
    pub async fn read_with_params(&self, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let uri = self.uri();
        let response = self
            .remote
            .request(Method::Get, &uri, params, Vec::new(), None, None)
            .await?;
        let mut state = self.write_state();
        state.etag = response.etag().map(str::to_string);
        state.details = Some(response.metadata().clone());
        drop(state);
        Ok(response)
    }

    /// PATCH a partial update. With `use_etag`, a cached ETag is sent for
    /// optimistic concurrency.
    pub async fn update(&self, content: Value, use_etag: bool) -> Result<ApiResponse> {
        self.write_back(Method::Patch, content, use_etag).await
    }

    /// PUT a full replacement, same ETag policy as [`Entity::update`].
    pub async fn replace(&self, content: Value, use_etag: bool) -> Result<ApiResponse> {
        self.write_back(Method::Put, content, use_etag).await
    }

    async fn write_back(
        &self,
        method: Method,
        content: Value,
        use_etag: bool,
    ) -> Result<ApiResponse> {
        let (uri, headers) = {
            let state = self.read_state();
            let mut headers = Vec::new();
            if use_etag {
                if let Some(etag) = &state.etag {
                    headers.push(("ETag".to_string(), etag.clone()));
                }
            }
            (state.uri.clone(), headers)
        };
        self.remote
            .request(method, &uri, &[], headers, Some(content), None)
            .await
    }

    /// DELETE the resource. The cached state is left as-is.
    pub async fn delete(&self) -> Result<ApiResponse> {
        let uri = self.uri();
        self.remote
            .request(Method::Delete, &uri, &[], Vec::new(), None, None)
            .await
    }

    /// Rename the resource, retargeting this entity at its new URI.
    ///
    /// The new URI is taken from the response Location, falling back to a
    /// sibling of the old URI. Cached details are invalidated together with
    /// the URI swap.
    pub async fn rename(&self, name: &str) -> Result<ApiResponse> {
        if !self.kind.renameable() {
            return Err(ClientError::RenameUnsupported(self.kind));
        }
        let uri = self.uri();
        let content = serde_json::to_value(RenameRequest::new(name))?;
        let response = self
            .remote
            .request(Method::Post, &uri, &[], Vec::new(), Some(content), None)
            .await?;
        let new_uri = match response.location() {
            Some(location) => location.to_string(),
            None => sibling_uri(&uri, name),
        };
        let mut state = self.write_state();
        state.uri = new_uri;
        state.etag = None;
        state.details = None;
        drop(state);
        Ok(response)
    }

    /// Cached detail field, run through the resource-linking resolver.
    pub fn field(&self, key: &str) -> Result<Resolved> {
        let state = self.read_state();
        let details = state.details.as_ref().ok_or(ClientError::NotLoaded)?;
        let value = details
            .get(key)
            .ok_or_else(|| ClientError::MissingField(key.to_string()))?;
        Ok(resolve_field(&self.remote, self.kind, key, value))
    }

    /// URI of a sub-path below this resource.
    pub(crate) fn child_uri(&self, segment: &str) -> String {
        format!("{}/{}", self.uri(), segment)
    }

    /// Replace cached details (and etag) without a network call; used when
    /// a response already carries the entity's state.
    pub(crate) fn store(&self, details: Value, etag: Option<&str>) {
        let mut state = self.write_state();
        state.details = Some(details);
        state.etag = etag.map(str::to_string);
    }

    /// POST on a sub-path, expecting a background operation back.
    pub(crate) async fn post_operation(&self, segment: &str) -> Result<crate::operation::Operation> {
        let uri = self.child_uri(segment);
        let response = self
            .remote
            .request(Method::Post, &uri, &[], Vec::new(), None, None)
            .await?;
        crate::operation::Operation::from_response(&self.remote, &response)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, EntityState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, EntityState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sibling_uri(uri: &str, name: &str) -> String {
    match uri.rsplit_once('/') {
        Some((parent, _)) => format!("{parent}/{name}"),
        None => format!("/{name}"),
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.remote.same_as(&other.remote) && self.uri() == other.uri()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.remote.token().hash(state);
        self.uri().hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, {:?})", self.kind, self.uri())
    }
}
