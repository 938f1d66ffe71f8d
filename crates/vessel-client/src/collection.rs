//! Collections of API resources

use serde_json::Value;

use crate::entity::Entity;
use crate::error::{ClientError, Result};
use crate::operation::Operation;
use crate::registry::ResourceKind;
use crate::remote::Remote;
use crate::response::ResponseKind;
use crate::transport::Method;

/// Proxy for a resource collection rooted at a base URI.
#[derive(Debug, Clone)]
pub struct Collection {
    remote: Remote,
    kind: ResourceKind,
    base_uri: String,
    raw: bool,
}

/// What `create` produced: a ready entity for synchronous responses, a
/// background operation otherwise.
#[derive(Debug, Clone)]
pub enum Created {
    Entity(Entity),
    Operation(Operation),
}

impl Created {
    pub fn entity(self) -> Option<Entity> {
        match self {
            Created::Entity(entity) => Some(entity),
            Created::Operation(_) => None,
        }
    }

    pub fn operation(self) -> Option<Operation> {
        match self {
            Created::Operation(operation) => Some(operation),
            Created::Entity(_) => None,
        }
    }
}

/// What `read` produced: entities, or the unconverted payload in raw mode.
#[derive(Debug, Clone)]
pub enum CollectionRead {
    Entities(Vec<Entity>),
    Raw(Value),
}

impl CollectionRead {
    pub fn entities(self) -> Option<Vec<Entity>> {
        match self {
            CollectionRead::Entities(entities) => Some(entities),
            CollectionRead::Raw(_) => None,
        }
    }

    pub fn raw(self) -> Option<Value> {
        match self {
            CollectionRead::Raw(value) => Some(value),
            CollectionRead::Entities(_) => None,
        }
    }
}

impl Collection {
    pub(crate) fn new(remote: Remote, kind: ResourceKind, base_uri: impl Into<String>) -> Self {
        Self {
            remote,
            kind,
            base_uri: base_uri.into(),
            raw: false,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// An equivalent collection whose `read` returns unconverted payloads.
    /// The original collection is left untouched.
    pub fn raw(&self) -> Collection {
        Collection {
            raw: true,
            ..self.clone()
        }
    }

    /// Address a member without a network call. The entity has no cached
    /// state until it is read.
    pub fn get(&self, id: &str) -> Entity {
        Entity::new(
            self.remote.clone(),
            self.kind,
            format!("{}/{}", self.base_uri, id),
        )
    }

    /// List the collection, preserving the server-provided order.
    pub async fn read(&self) -> Result<CollectionRead> {
        let response = self
            .remote
            .request(Method::Get, &self.base_uri, &[], Vec::new(), None, None)
            .await?;
        if self.raw {
            return Ok(CollectionRead::Raw(response.metadata().clone()));
        }
        let uris = response.metadata().as_array().ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "expected a list of URIs for {}",
                self.base_uri
            ))
        })?;
        let entities = uris
            .iter()
            .map(|uri| {
                uri.as_str()
                    .map(|uri| Entity::new(self.remote.clone(), self.kind, uri))
                    .ok_or_else(|| {
                        ClientError::InvalidResponse(format!("non-string URI entry: {uri}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CollectionRead::Entities(entities))
    }

    /// Create a new member from `content` or an `upload` body.
    ///
    /// A synchronous response yields the created entity, addressed by the
    /// response Location; an asynchronous one yields the operation to
    /// `wait` on, whose `resources` name the member once it exists.
    pub async fn create(
        &self,
        content: Option<Value>,
        upload: Option<Vec<u8>>,
    ) -> Result<Created> {
        let response = self
            .remote
            .request(Method::Post, &self.base_uri, &[], Vec::new(), content, upload)
            .await?;
        if response.kind() == ResponseKind::Async {
            return Ok(Created::Operation(Operation::from_response(
                &self.remote,
                &response,
            )?));
        }
        let location = response.location().ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "create response for {} has no Location",
                self.base_uri
            ))
        })?;
        Ok(Created::Entity(Entity::new(
            self.remote.clone(),
            self.kind,
            location,
        )))
    }
}
