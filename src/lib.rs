//! Resource filter library.
//!
//! Serves shared resources with HTTP caching and conditional requests from
//! below a filter mount, plus autocomplete callbacks and form processing.

pub mod autocomplete;
pub mod config;
pub mod filter;
pub mod form;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resource;
pub mod routing;

pub use config::schema::AppConfig;
pub use filter::FilterPath;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
