//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_control.rs (token allowlist, when configured)
//!     → headers.rs (reduce to the forwardable header subset)
//!     → Pass to upstream dispatch
//!
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop, add CORS)
//! ```
//!
//! # Design Decisions
//! - No trust in client headers: only a fixed subset is forwarded
//! - Absent allowlist is the permissive default, not an error

pub mod access_control;
pub mod headers;

pub use access_control::TokenAllowlist;
pub use headers::{apply_cors, filter_request_headers, strip_hop_by_hop};
