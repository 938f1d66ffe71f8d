//! vessel-api: Shared wire types for the vesseld REST API
//!
//! Contains the JSON response envelope, typed request bodies, and event
//! types used by the client library.

pub mod envelope;
pub mod events;
pub mod requests;

pub use envelope::{Envelope, ResponseType};
pub use events::Event;
pub use requests::RenameRequest;
