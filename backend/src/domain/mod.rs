//! Domain primitives for the storefront API.
//!
//! Types here are transport agnostic. The HTTP adapter in
//! `inbound::http` owns status codes and wire envelopes.
//!
//! Public surface:
//! - Error / ErrorCode: the single failure type every stage returns.
//! - TraceId: task-local request identifier captured by errors.
//! - Identity / Role: the resolved principal and its privilege level.
//! - validation / sanitize: pure input processing used by the pipeline.

pub mod auth;
pub mod catalogue;
pub mod error;
pub mod identity;
pub mod ports;
pub mod role;
pub mod sanitize;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::catalogue::{
    Category, CategoryDraft, Page, PageRequest, Product, ProductDraft, SortOrder,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{Identity, SessionMetadata, SessionToken};
pub use self::role::{Role, UnknownRole};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Account, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use storefront::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::forbidden("insufficient permissions"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
