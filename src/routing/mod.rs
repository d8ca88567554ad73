//! Request mapping subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request path
//!     → FilterPath::relative_path (strip context and mount)
//!     → router.rs (matcher scan)
//!     → matcher.rs (evaluate URL families)
//!     → Return: RequestTarget or no match
//! ```
//!
//! # Design Decisions
//! - Mapper built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same target
//! - First match wins

pub mod matcher;
pub mod router;

pub use matcher::{AutoCompleteMatcher, Matcher, RequestTarget, ResourceMatcher};
pub use router::RequestMapper;
