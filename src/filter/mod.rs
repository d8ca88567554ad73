//! Filter mount subsystem.
//!
//! # Data Flow
//! ```text
//! FilterConfig
//!     → path.rs (FilterPath with a lazily resolved source)
//!     → web_xml.rs (deployment descriptor lookup, if that is the source)
//!
//! Per request:
//!     middleware.rs → check_if_redirect_required → 302 or next layer
//!     server        → relative_path → request mapping
//! ```
//!
//! # Design Decisions
//! - Resolution happens on the first request, not at startup
//! - Only `/*` and `/<prefix>/*` patterns are supported

pub mod error;
pub mod middleware;
pub mod path;
pub mod web_xml;

pub use error::FilterPathError;
pub use middleware::redirect_middleware;
pub use path::{canonicalise_filter_path, url_pattern_to_filter_path, FilterPath, FilterPathSource};
