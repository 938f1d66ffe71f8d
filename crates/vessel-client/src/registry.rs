//! Static registry of API resource kinds

use std::fmt;

/// Resource kinds the daemon exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Certificate,
    Container,
    Image,
    ImageAlias,
    Logfile,
    Network,
    Operation,
    Profile,
    Snapshot,
    StoragePool,
}

impl ResourceKind {
    /// Name of the kind's collection in URIs.
    pub fn uri_name(&self) -> &'static str {
        match self {
            ResourceKind::Certificate => "certificates",
            ResourceKind::Container => "containers",
            ResourceKind::Image => "images",
            ResourceKind::ImageAlias => "images/aliases",
            ResourceKind::Logfile => "logs",
            ResourceKind::Network => "networks",
            ResourceKind::Operation => "operations",
            ResourceKind::Profile => "profiles",
            ResourceKind::Snapshot => "snapshots",
            ResourceKind::StoragePool => "storage-pools",
        }
    }

    /// Whether resources of this kind can be renamed via POST on their URI.
    pub fn renameable(&self) -> bool {
        matches!(
            self,
            ResourceKind::Container
                | ResourceKind::ImageAlias
                | ResourceKind::Network
                | ResourceKind::Profile
                | ResourceKind::Snapshot
                | ResourceKind::StoragePool
        )
    }

    /// Inline relations: detail fields holding objects that stand for
    /// resources of another kind, keyed by an identifier instead of a URI.
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            ResourceKind::Image => &[Relation {
                field: "aliases",
                kind: ResourceKind::ImageAlias,
                id_key: "name",
            }],
            _ => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Certificate => "certificate",
            ResourceKind::Container => "container",
            ResourceKind::Image => "image",
            ResourceKind::ImageAlias => "image alias",
            ResourceKind::Logfile => "logfile",
            ResourceKind::Network => "network",
            ResourceKind::Operation => "operation",
            ResourceKind::Profile => "profile",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::StoragePool => "storage pool",
        };
        f.write_str(name)
    }
}

/// An inline relation declared by a resource kind.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Detail field holding the related entries.
    pub field: &'static str,
    /// Kind of the related resources.
    pub kind: ResourceKind,
    /// Key identifying an entry within its object.
    pub id_key: &'static str,
}

/// Maps URI prefixes to resource kinds.
///
/// Built once and handed to the Remote; no runtime class lookup. Longest
/// prefix wins, so `/images/aliases/x` resolves to an alias, not an image.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    entries: Vec<(String, ResourceKind)>,
}

impl ResourceRegistry {
    /// Registry covering every kind the daemon serves.
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        for kind in [
            ResourceKind::Certificate,
            ResourceKind::Container,
            ResourceKind::Image,
            ResourceKind::ImageAlias,
            ResourceKind::Network,
            ResourceKind::Operation,
            ResourceKind::Profile,
            ResourceKind::StoragePool,
        ] {
            registry.register(format!("/{}", kind.uri_name()), kind);
        }
        registry
    }

    /// Add a prefix for a kind, keeping longest-prefix-first order.
    pub fn register(&mut self, prefix: impl Into<String>, kind: ResourceKind) {
        let prefix = prefix.into();
        let at = self
            .entries
            .partition_point(|(existing, _)| existing.len() >= prefix.len());
        self.entries.insert(at, (prefix, kind));
    }

    /// Kind for a URI, if its prefix is registered.
    ///
    /// A match requires an identifier segment after the prefix; the bare
    /// collection URI is not a resource reference.
    pub fn match_uri(&self, uri: &str) -> Option<ResourceKind> {
        self.entries.iter().find_map(|(prefix, kind)| {
            uri.strip_prefix(prefix.as_str())
                .filter(|rest| rest.starts_with('/') && rest.len() > 1)
                .map(|_| *kind)
        })
    }
}
