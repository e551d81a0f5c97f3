//! Inbound adapters translating external requests into domain calls.
//!
//! HTTP is the only transport; see [`http`].

pub mod http;
