//! Resource subsystem.
//!
//! # Data Flow
//! ```text
//! request mapped to (scope, name)
//!     → registry.rs (SharedResources lookup)
//!     → Resource::new_resource_response (descriptor per request)
//!     → responder.rs (validators, caching, 304 / error short-circuit)
//!     → write.rs (headers committed, callback streams the body)
//! ```
//!
//! # Design Decisions
//! - Descriptors are request-scoped and consumed once
//! - Resources only describe; the responder owns the HTTP protocol
//! - The responder is synchronous; the server runs it on the blocking pool

pub mod attributes;
pub mod byte_array;
pub mod dynamic_image;
pub mod error;
pub mod file;
pub mod mime;
pub mod registry;
pub mod responder;
pub mod response;
pub mod settings;
pub mod write;

pub use attributes::Attributes;
pub use byte_array::ByteArrayResource;
pub use dynamic_image::DynamicImageResource;
pub use error::ResourceError;
pub use file::FileResource;
pub use mime::{MimeRegistry, MimeTypes};
pub use registry::{ResourceKey, SharedResources};
pub use response::{CacheDuration, ContentDisposition, ResourceResponse};
pub use settings::ResourceSettings;
pub use write::{write_stream, StreamWriteCallback, WriteCallback};

/// A kind of resource that can answer requests.
pub trait Resource: Send + Sync {
    /// Build the descriptor for this request.
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse;

    /// Answer the request.
    fn respond(&self, attributes: &mut Attributes<'_>) -> Result<(), ResourceError> {
        responder::respond(self, attributes)
    }
}
