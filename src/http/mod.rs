//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, WebRequest snapshot)
//!     → [filter mount redirect, request mapping]
//!     → [resource responder or autocomplete behavior]
//!     → response.rs (caching headers, streamed or buffered body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id_layers, MakeRequestUuid, WebRequest, X_REQUEST_ID};
pub use response::{
    BufferedResponse, CacheScope, ResponseHead, ResponseReceiver, StreamingResponse, WebResponse,
    MAX_CACHE_DURATION,
};
pub use server::{AppState, HttpServer};
