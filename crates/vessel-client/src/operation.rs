//! Asynchronous server-side operations

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

use crate::entity::Entity;
use crate::error::{ClientError, Result};
use crate::registry::ResourceKind;
use crate::remote::Remote;
use crate::resolve::Resolved;
use crate::response::ApiResponse;
use crate::transport::Method;

/// Status of a server-side operation. Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Queued,
    Running,
    Completed,
    Error,
    Cancelled,
}

impl OperationStatus {
    /// Whether the operation is done, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Completed | OperationStatus::Error | OperationStatus::Cancelled
        )
    }
}

impl FromStr for OperationStatus {
    type Err = ClientError;

    fn from_str(status: &str) -> Result<Self> {
        let parsed = match status.to_ascii_lowercase().as_str() {
            "queued" => OperationStatus::Queued,
            "running" => OperationStatus::Running,
            "completed" => OperationStatus::Completed,
            "error" => OperationStatus::Error,
            "cancelled" => OperationStatus::Cancelled,
            _ => {
                return Err(ClientError::InvalidResponse(format!(
                    "unknown operation status: {status}"
                )));
            }
        };
        Ok(parsed)
    }
}

/// Entity proxy for a background task, polled via `wait`.
///
/// A failed operation is reported through its terminal status, not as an
/// error; only transport failures around the polling call fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    entity: Entity,
}

impl Operation {
    pub(crate) fn new(remote: Remote, uri: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(remote, ResourceKind::Operation, uri),
        }
    }

    /// Wrap the operation named by an async response.
    ///
    /// The response metadata primes the cached details, so the operation is
    /// readable without another round trip.
    pub fn from_response(remote: &Remote, response: &ApiResponse) -> Result<Self> {
        let location = response.location().ok_or_else(|| {
            ClientError::InvalidResponse("async response has no Location".to_string())
        })?;
        let operation = Self::new(remote.clone(), location);
        operation
            .entity
            .store(response.metadata().clone(), response.etag());
        Ok(operation)
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn uri(&self) -> String {
        self.entity.uri()
    }

    /// Snapshot of the last-known operation record.
    pub fn details(&self) -> Option<Value> {
        self.entity.details()
    }

    /// Operation identifier from the cached record.
    pub fn id(&self) -> Result<String> {
        match self.entity.field("id")? {
            Resolved::Value(Value::String(id)) => Ok(id),
            other => Err(ClientError::InvalidResponse(format!(
                "operation id is not a string: {other:?}"
            ))),
        }
    }

    /// Status from the cached record.
    pub fn status(&self) -> Result<OperationStatus> {
        match self.entity.field("status")? {
            Resolved::Value(Value::String(status)) => status.parse(),
            other => Err(ClientError::InvalidResponse(format!(
                "operation status is not a string: {other:?}"
            ))),
        }
    }

    /// Fetch the operation record, updating the cached details.
    pub async fn read(&self) -> Result<ApiResponse> {
        self.entity.read().await
    }

    /// Block server-side until the operation progresses, for at most
    /// `timeout` seconds when given.
    ///
    /// One GET per call; the server may well return a non-terminal status,
    /// in which case calling again is up to the caller. The response
    /// metadata replaces the cached details.
    pub async fn wait(&self, timeout: Option<u64>) -> Result<ApiResponse> {
        let uri = self.entity.child_uri("wait");
        let timeout = timeout.map(|timeout| timeout.to_string());
        let params: Vec<(&str, &str)> = match &timeout {
            Some(timeout) => vec![("timeout", timeout.as_str())],
            None => Vec::new(),
        };
        let response = self
            .entity
            .remote()
            .request(Method::Get, &uri, &params, Vec::new(), None, None)
            .await?;
        self.entity
            .store(response.metadata().clone(), response.etag());
        Ok(response)
    }

    /// Ask the server to cancel the operation. Only non-terminal
    /// operations can be cancelled.
    pub async fn cancel(&self) -> Result<ApiResponse> {
        self.entity.delete().await
    }

    /// Entities referenced by the operation record, grouped by the
    /// server's resource-type names (e.g. which container a create
    /// operation produced).
    pub fn resources(&self) -> Result<BTreeMap<String, Vec<Entity>>> {
        let Resolved::Map(groups) = self.entity.field("resources")? else {
            return Err(ClientError::InvalidResponse(
                "operation resources is not a mapping".to_string(),
            ));
        };
        let mut resources = BTreeMap::new();
        for (name, group) in groups {
            let entities = match group {
                Resolved::List(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Resolved::Entity(entity) => Some(entity),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            resources.insert(name, entities);
        }
        Ok(resources)
    }
}

/// Collection aggregating operations across the server's status buckets.
#[derive(Debug, Clone)]
pub struct Operations {
    remote: Remote,
}

/// Buckets drained first, in this order; the rest follow alphabetically.
const BUCKET_ORDER: &[&str] = &["running", "queued"];

impl Operations {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// List operations across all status buckets as one ordered list,
    /// preserving within-bucket server order.
    pub async fn read(&self) -> Result<Vec<Operation>> {
        let response = self
            .remote
            .request(Method::Get, "/operations", &[], Vec::new(), None, None)
            .await?;
        let buckets = response.metadata().as_object().ok_or_else(|| {
            ClientError::InvalidResponse(
                "expected operations grouped by status bucket".to_string(),
            )
        })?;

        let mut names: Vec<&str> = Vec::with_capacity(buckets.len());
        for &name in BUCKET_ORDER {
            if buckets.contains_key(name) {
                names.push(name);
            }
        }
        let mut rest: Vec<&str> = buckets
            .keys()
            .map(String::as_str)
            .filter(|name| !BUCKET_ORDER.contains(name))
            .collect();
        rest.sort_unstable();
        names.extend(rest);

        let mut operations = Vec::new();
        for name in names {
            let uris = buckets[name].as_array().ok_or_else(|| {
                ClientError::InvalidResponse(format!("bucket {name} is not a list"))
            })?;
            for uri in uris {
                let uri = uri.as_str().ok_or_else(|| {
                    ClientError::InvalidResponse(format!("non-string URI entry: {uri}"))
                })?;
                operations.push(Operation::new(self.remote.clone(), uri));
            }
        }
        Ok(operations)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::testing::FakeTransport;

    fn remote(transport: &Arc<FakeTransport>) -> Remote {
        Remote::with_transport(transport.clone())
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "Completed".parse::<OperationStatus>().unwrap(),
            OperationStatus::Completed
        );
        assert_eq!(
            "running".parse::<OperationStatus>().unwrap(),
            OperationStatus::Running
        );
        assert!("Exploded".parse::<OperationStatus>().is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(OperationStatus::Completed.is_terminal());
        assert!(OperationStatus::Error.is_terminal());
        assert!(OperationStatus::Cancelled.is_terminal());
        assert!(!OperationStatus::Queued.is_terminal());
        assert!(!OperationStatus::Running.is_terminal());
    }

    #[tokio::test]
    async fn test_from_response() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_with_headers(
            202,
            &[("Location", "/operations/op")],
            json!({"type": "async", "metadata": {"id": "op", "status": "Running"}}),
        );
        let remote = remote(&transport);
        let response = remote
            .request(Method::Post, "/containers", &[], Vec::new(), None, None)
            .await
            .unwrap();
        let operation = Operation::from_response(&remote, &response).unwrap();
        assert_eq!(operation.uri(), "/operations/op");
        assert_eq!(operation.id().unwrap(), "op");
        assert_eq!(operation.status().unwrap(), OperationStatus::Running);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_from_response_requires_location() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(202, json!({"type": "async", "metadata": {}}));
        let remote = remote(&transport);
        let response = remote
            .request(Method::Post, "/containers", &[], Vec::new(), None, None)
            .await
            .unwrap();
        assert!(matches!(
            Operation::from_response(&remote, &response),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_wait_updates_cached_details() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({"id": "op", "status": "Completed"}));
        let operation = Operation::new(remote(&transport), "/operations/op");
        let response = operation.wait(None).await.unwrap();
        assert_eq!(response.metadata()["status"], "Completed");
        assert_eq!(operation.status().unwrap(), OperationStatus::Completed);
        let [call] = &transport.calls()[..] else {
            panic!("expected exactly one call");
        };
        assert_eq!(call.path, "/operations/op/wait");
        assert!(call.params.is_empty());
    }

    #[tokio::test]
    async fn test_wait_with_timeout() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({"id": "op", "status": "Completed"}));
        let operation = Operation::new(remote(&transport), "/operations/op");
        operation.wait(Some(20)).await.unwrap();
        let [call] = &transport.calls()[..] else {
            panic!("expected exactly one call");
        };
        assert_eq!(call.path, "/operations/op/wait");
        assert_eq!(call.params, vec![("timeout".to_string(), "20".to_string())]);
    }

    #[tokio::test]
    async fn test_wait_returns_error_status_without_failing() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({"id": "op", "status": "Error", "err": "exit code 1"}));
        let operation = Operation::new(remote(&transport), "/operations/op");
        operation.wait(None).await.unwrap();
        assert_eq!(operation.status().unwrap(), OperationStatus::Error);
    }

    #[tokio::test]
    async fn test_resources_resolved_to_entities() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_with_headers(
            202,
            &[("Location", "/operations/op")],
            json!({"type": "async", "metadata": {
                "id": "op",
                "status": "Running",
                "resources": {
                    "containers": ["/containers/c"],
                    "images": ["/images/i"],
                },
            }}),
        );
        let remote = remote(&transport);
        let response = remote
            .request(Method::Post, "/containers", &[], Vec::new(), None, None)
            .await
            .unwrap();
        let operation = Operation::from_response(&remote, &response).unwrap();
        let resources = operation.resources().unwrap();
        let [container] = &resources["containers"][..] else {
            panic!("expected one container");
        };
        assert_eq!(container.kind(), ResourceKind::Container);
        assert_eq!(container.uri(), "/containers/c");
        let [image] = &resources["images"][..] else {
            panic!("expected one image");
        };
        assert_eq!(image.kind(), ResourceKind::Image);
        assert_eq!(image.uri(), "/images/i");
    }

    #[tokio::test]
    async fn test_cancel_issues_delete() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({}));
        let operation = Operation::new(remote(&transport), "/operations/op");
        operation.cancel().await.unwrap();
        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::Delete);
        assert_eq!(call.path, "/operations/op");
    }

    #[tokio::test]
    async fn test_operations_read_flattens_buckets() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({
            "running": ["/operations/one", "/operations/two"],
            "queued": ["/operations/three"],
        }));
        let operations = remote(&transport).operations().read().await.unwrap();
        let uris: Vec<_> = operations.iter().map(Operation::uri).collect();
        assert_eq!(
            uris,
            ["/operations/one", "/operations/two", "/operations/three"]
        );
    }

    #[tokio::test]
    async fn test_operations_read_other_buckets_sorted_after_declared() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({
            "success": ["/operations/s"],
            "queued": ["/operations/q"],
            "cancelled": ["/operations/c"],
            "running": ["/operations/r"],
        }));
        let operations = remote(&transport).operations().read().await.unwrap();
        let uris: Vec<_> = operations.iter().map(Operation::uri).collect();
        assert_eq!(
            uris,
            [
                "/operations/r",
                "/operations/q",
                "/operations/c",
                "/operations/s"
            ]
        );
    }

    #[tokio::test]
    async fn test_operations_read_rejects_list_payload() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!(["/operations/one"]));
        assert!(matches!(
            remote(&transport).operations().read().await,
            Err(ClientError::InvalidResponse(_))
        ));
    }
}
