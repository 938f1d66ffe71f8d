//! vessel-client: client library for the vesseld REST API
//!
//! Maps the daemon's URI-addressed resources onto local entities and
//! collections, and tracks long-running server-side operations until they
//! reach a terminal status.
//!
//! # Examples
//!
//! ## Reading and updating a resource
//!
//! ```no_run
//! use serde_json::json;
//! use vessel_client::Remote;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let remote = Remote::new("https://vessel-host:8443")?;
//!
//! // List containers
//! let containers = remote.containers().read().await?.entities().unwrap();
//!
//! // Address one directly and read it
//! let container = remote.containers().get("web-1");
//! container.read().await?;
//! println!("status: {:?}", container.field("status")?);
//!
//! // Partial update, guarded by the cached ETag
//! container
//!     .update(json!({"config": {"limits.memory": "2GiB"}}), true)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Waiting on an asynchronous creation
//!
//! ```no_run
//! use serde_json::json;
//! use vessel_client::{Created, Remote};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let remote = Remote::new("https://vessel-host:8443")?;
//!
//! let created = remote
//!     .containers()
//!     .create(Some(json!({"name": "web-2", "source": {"alias": "noble"}})), None)
//!     .await?;
//!
//! if let Created::Operation(operation) = created {
//!     loop {
//!         operation.wait(Some(20)).await?;
//!         if operation.status()?.is_terminal() {
//!             break;
//!         }
//!     }
//!     let resources = operation.resources()?;
//!     println!("created: {:?}", resources.get("containers"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod entity;
pub mod error;
pub mod events;
pub mod http;
pub mod operation;
pub mod registry;
pub mod remote;
pub mod resolve;
pub mod resources;
pub mod response;
pub mod testing;
pub mod transport;

pub use collection::{Collection, CollectionRead, Created};
pub use entity::Entity;
pub use error::{ClientError, Result};
pub use events::EventStream;
pub use http::HttpTransport;
pub use operation::{Operation, OperationStatus, Operations};
pub use registry::{ResourceKind, ResourceRegistry};
pub use remote::Remote;
pub use resolve::Resolved;
pub use resources::{Container, Image};
pub use response::{ApiResponse, ResponseKind};
pub use transport::{Body, Content, Method, Transport, TransportRequest, TransportResponse};
