//! Request classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → path.rs (health probe? `/bot<token>/<method>`? neither?)
//!     → RequestTarget handed to the forwarding handler
//! ```
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex: a literal prefix check and a single scan

pub mod path;

pub use path::{classify, loggable_path, BotPath, RequestTarget};
