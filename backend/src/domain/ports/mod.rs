//! Domain ports for the hexagonal boundary.
//!
//! Each trait exposes a strongly typed error so adapters map their failures
//! into predictable variants; every port error converts into the domain
//! [`Error`](crate::domain::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_repository;
mod login_service;
mod session_store;

pub use catalogue_repository::{CatalogueRepositoryError, CategoryRepository, ProductRepository};
#[cfg(test)]
pub use catalogue_repository::{MockCategoryRepository, MockProductRepository};
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use session_store::{IssuedSession, SessionStore, SessionStoreError};
#[cfg(test)]
pub use session_store::MockSessionStore;
