//! Resource-linking resolver
//!
//! Turns URI references embedded in response payloads into typed entities.
//! Runs on field access, never at cache time, and never touches the
//! network; resolved entities start with no cached state.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::entity::Entity;
use crate::registry::{Relation, ResourceKind};
use crate::remote::Remote;

/// A detail value after reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Passed through unchanged.
    Value(Value),
    /// A recognized resource reference.
    Entity(Entity),
    List(Vec<Resolved>),
    Map(BTreeMap<String, Resolved>),
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Resolved::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Resolved]> {
        match self {
            Resolved::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Resolved>> {
        match self {
            Resolved::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Collapse back to plain JSON, rendering entities as their URIs.
    pub fn into_value(self) -> Value {
        match self {
            Resolved::Value(value) => value,
            Resolved::Entity(entity) => Value::String(entity.uri()),
            Resolved::List(items) => {
                Value::Array(items.into_iter().map(Resolved::into_value).collect())
            }
            Resolved::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_value()))
                    .collect(),
            ),
        }
    }
}

/// Resolve one detail field of an entity of kind `owner`.
///
/// Fields named by one of the owner's declared relations resolve inline
/// objects through that relation; everything else goes through plain URI
/// matching.
pub(crate) fn resolve_field(
    remote: &Remote,
    owner: ResourceKind,
    key: &str,
    value: &Value,
) -> Resolved {
    match owner.relations().iter().find(|relation| relation.field == key) {
        Some(relation) => resolve_relation(remote, relation, value),
        None => resolve_value(remote, value),
    }
}

/// Resolve a value by URI-prefix matching, recursing through lists and
/// mappings.
pub(crate) fn resolve_value(remote: &Remote, value: &Value) -> Resolved {
    match value {
        Value::String(text) => match remote.registry().match_uri(text) {
            Some(kind) => Resolved::Entity(Entity::new(remote.clone(), kind, text.clone())),
            None => {
                if text.starts_with('/') {
                    tracing::debug!("unresolved reference: {text}");
                }
                Resolved::Value(value.clone())
            }
        },
        Value::Array(items) => Resolved::List(
            items
                .iter()
                .map(|item| resolve_value(remote, item))
                .collect(),
        ),
        Value::Object(entries) => Resolved::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), resolve_value(remote, item)))
                .collect(),
        ),
        other => Resolved::Value(other.clone()),
    }
}

/// Resolve inline related entries: objects carrying an identifier instead
/// of a URI become entities in the relation's collection namespace.
fn resolve_relation(remote: &Remote, relation: &Relation, value: &Value) -> Resolved {
    match value {
        Value::Array(entries) => Resolved::List(
            entries
                .iter()
                .map(|entry| resolve_relation_entry(remote, relation, entry))
                .collect(),
        ),
        other => resolve_relation_entry(remote, relation, other),
    }
}

fn resolve_relation_entry(remote: &Remote, relation: &Relation, entry: &Value) -> Resolved {
    let id = entry.get(relation.id_key).and_then(Value::as_str);
    match id {
        Some(id) => {
            let uri = format!("/{}/{}", relation.kind.uri_name(), id);
            Resolved::Entity(Entity::new(remote.clone(), relation.kind, uri))
        }
        None => resolve_value(remote, entry),
    }
}
