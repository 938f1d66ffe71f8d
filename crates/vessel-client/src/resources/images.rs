//! Image-specific operations

use crate::entity::Entity;
use crate::error::{ClientError, Result};
use crate::operation::Operation;
use crate::registry::ResourceKind;
use crate::resolve::Resolved;
use crate::response::ApiResponse;

/// An image entity, with the surfaces only images have.
///
/// Aliases are embedded in the image details and resolve to alias entities
/// through [`Image::aliases`]; they have no collection of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    entity: Entity,
}

impl Image {
    /// Wrap an image entity.
    ///
    /// # Errors
    /// Fails with `WrongKind` when the entity is not an image.
    pub fn from_entity(entity: Entity) -> Result<Self> {
        if entity.kind() != ResourceKind::Image {
            return Err(ClientError::WrongKind {
                expected: ResourceKind::Image,
                actual: entity.kind(),
            });
        }
        Ok(Self { entity })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Read a private image using a secret token from [`Image::secret`].
    pub async fn read_with_secret(&self, secret: &str) -> Result<ApiResponse> {
        self.entity.read_with_params(&[("secret", secret)]).await
    }

    /// Start an operation granting temporary access to a private image.
    pub async fn secret(&self) -> Result<Operation> {
        self.entity.post_operation("secret").await
    }

    /// Start an operation refreshing the image from its origin.
    pub async fn refresh(&self) -> Result<Operation> {
        self.entity.post_operation("refresh").await
    }

    /// Alias entities embedded in the cached image details.
    pub fn aliases(&self) -> Result<Vec<Entity>> {
        let aliases = match self.entity.field("aliases") {
            Ok(Resolved::List(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Resolved::Entity(entity) => Some(entity),
                    _ => None,
                })
                .collect(),
            Ok(_) => Vec::new(),
            Err(ClientError::MissingField(_)) => Vec::new(),
            Err(error) => return Err(error),
        };
        Ok(aliases)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::remote::Remote;
    use crate::testing::FakeTransport;
    use crate::transport::Method;

    fn image(transport: &Arc<FakeTransport>) -> Image {
        let remote = Remote::with_transport(transport.clone());
        Image::from_entity(remote.images().get("img")).unwrap()
    }

    #[test]
    fn test_from_entity_checks_kind() {
        let transport = Arc::new(FakeTransport::new());
        let remote = Remote::with_transport(transport);
        let result = Image::from_entity(remote.containers().get("c"));
        assert!(matches!(
            result,
            Err(ClientError::WrongKind {
                expected: ResourceKind::Image,
                actual: ResourceKind::Container,
            })
        ));
    }

    #[tokio::test]
    async fn test_read_with_secret() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({"fingerprint": "ff00"}));
        image(&transport).read_with_secret("abc").await.unwrap();
        let call = &transport.calls()[0];
        assert_eq!(call.path, "/images/img");
        assert_eq!(call.params, vec![("secret".to_string(), "abc".to_string())]);
    }

    #[tokio::test]
    async fn test_secret_returns_operation() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_async("/operations/op", json!({"id": "op", "status": "Running"}));
        let operation = image(&transport).secret().await.unwrap();
        assert_eq!(operation.uri(), "/operations/op");
        assert_eq!(operation.details().unwrap()["id"], "op");
        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.path, "/images/img/secret");
    }

    #[tokio::test]
    async fn test_refresh_returns_operation() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_async("/operations/op", json!({"id": "op", "status": "Running"}));
        let operation = image(&transport).refresh().await.unwrap();
        assert_eq!(operation.uri(), "/operations/op");
        assert_eq!(transport.calls()[0].path, "/images/img/refresh");
    }

    #[tokio::test]
    async fn test_aliases_resolve_from_details() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({
            "fingerprint": "ff00",
            "aliases": [
                {"name": "default", "description": "latest"},
                {"name": "stable", "description": ""},
            ],
        }));
        let image = image(&transport);
        image.entity().read().await.unwrap();
        let aliases = image.aliases().unwrap();
        let uris: Vec<_> = aliases.iter().map(Entity::uri).collect();
        assert_eq!(uris, ["/images/aliases/default", "/images/aliases/stable"]);
        assert_eq!(aliases[0].kind(), ResourceKind::ImageAlias);
    }

    #[tokio::test]
    async fn test_aliases_empty_when_absent() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_sync(json!({"fingerprint": "ff00"}));
        let image = image(&transport);
        image.entity().read().await.unwrap();
        assert!(image.aliases().unwrap().is_empty());
    }

    #[test]
    fn test_aliases_before_read_fails() {
        let transport = Arc::new(FakeTransport::new());
        assert!(matches!(
            image(&transport).aliases(),
            Err(ClientError::NotLoaded)
        ));
    }
}
