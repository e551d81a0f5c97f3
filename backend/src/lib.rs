//! Bakery storefront API.
//!
//! Every business endpoint runs through one request pipeline that sanitises,
//! authenticates, authorises and validates input before a handler sees it,
//! and renders every failure through the same error envelope.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
