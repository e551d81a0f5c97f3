//! Outbound adapters implementing domain ports.
//!
//! - **session_store**: process-local session table keyed by token
//!   fingerprints.
//! - **memory_catalogue**: category and product repositories held in memory.
//!
//! Adapters translate between domain types and storage representations.
//! They contain no business rules.

pub mod memory_catalogue;
pub mod session_store;

pub use memory_catalogue::InMemoryCatalogue;
pub use session_store::InMemorySessionStore;
