//! Container-specific operations

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::{ClientError, Result};
use crate::registry::ResourceKind;

/// A container entity with its nested collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    entity: Entity,
}

impl Container {
    /// Wrap a container entity.
    ///
    /// # Errors
    /// Fails with `WrongKind` when the entity is not a container.
    pub fn from_entity(entity: Entity) -> Result<Self> {
        if entity.kind() != ResourceKind::Container {
            return Err(ClientError::WrongKind {
                expected: ResourceKind::Container,
                actual: entity.kind(),
            });
        }
        Ok(Self { entity })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Log files for this container.
    pub fn logs(&self) -> Collection {
        self.sub_collection(ResourceKind::Logfile)
    }

    /// Snapshots of this container.
    pub fn snapshots(&self) -> Collection {
        self.sub_collection(ResourceKind::Snapshot)
    }

    fn sub_collection(&self, kind: ResourceKind) -> Collection {
        Collection::new(
            self.entity.remote().clone(),
            kind,
            format!("{}/{}", self.entity.uri(), kind.uri_name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::remote::Remote;
    use crate::testing::FakeTransport;

    fn container(transport: &Arc<FakeTransport>) -> Container {
        let remote = Remote::with_transport(transport.clone());
        Container::from_entity(remote.containers().get("c")).unwrap()
    }

    #[test]
    fn test_from_entity_checks_kind() {
        let transport = Arc::new(FakeTransport::new());
        let remote = Remote::with_transport(transport);
        assert!(matches!(
            Container::from_entity(remote.images().get("img")),
            Err(ClientError::WrongKind { .. })
        ));
    }

    #[tokio::test]
    async fn test_logs_collection() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!(["/containers/c/logs/boot.log"]));
        let logs = container(&transport).logs();
        assert_eq!(logs.base_uri(), "/containers/c/logs");
        let entities = logs.read().await.unwrap().entities().unwrap();
        let [logfile] = &entities[..] else {
            panic!("expected one logfile");
        };
        assert_eq!(logfile.kind(), ResourceKind::Logfile);
        assert_eq!(logfile.uri(), "/containers/c/logs/boot.log");
        assert_eq!(transport.calls()[0].path, "/containers/c/logs");
    }

    #[tokio::test]
    async fn test_snapshots_collection() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!(["/containers/c/snapshots/s1"]));
        let snapshots = container(&transport).snapshots();
        let entities = snapshots.read().await.unwrap().entities().unwrap();
        let [snapshot] = &entities[..] else {
            panic!("expected one snapshot");
        };
        assert_eq!(snapshot.kind(), ResourceKind::Snapshot);
        assert_eq!(snapshot.uri(), "/containers/c/snapshots/s1");
    }

    #[tokio::test]
    async fn test_snapshot_get_then_rename() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_with_headers(
            204,
            &[("Location", "/containers/c/snapshots/after")],
            json!({"type": "sync"}),
        );
        let snapshot = container(&transport).snapshots().get("before");
        assert_eq!(snapshot.uri(), "/containers/c/snapshots/before");
        snapshot.rename("after").await.unwrap();
        assert_eq!(snapshot.uri(), "/containers/c/snapshots/after");
    }
}
