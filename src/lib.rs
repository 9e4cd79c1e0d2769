//! # uninavi-search
//!
//! Streaming client for the uninavi university-search backend. The backend
//! answers a search request with a long-lived `text/event-stream` response;
//! this crate consumes it incrementally: frames are decoded out of raw byte
//! chunks, classified into domain events, and folded into an observable
//! session state with a monotonic progress value and an ordered,
//! de-duplicated result list.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (University, SearchFilters, etc.)
//! - [`stream`]: Frame decoding, event interpretation, progress tracking,
//!   result accumulation, and the session controller
//! - [`transport`]: The HTTP transport and its mock counterpart behind the
//!   [`transport::SearchTransport`] seam
//! - [`favorites`]: The injected favorites store collaborator
//! - [`config`]: Configuration management

pub mod config;
pub mod favorites;
pub mod models;
pub mod stream;
pub mod transport;

// Re-export commonly used types
pub use favorites::{FavoritesStore, MemoryFavorites};
pub use models::{SearchFilters, University, UniversityKey};
pub use stream::{SearchSession, SessionPhase, SessionState};
pub use transport::{HttpTransport, SearchTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
