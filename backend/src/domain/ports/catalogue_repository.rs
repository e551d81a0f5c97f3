//! Driven ports for catalogue persistence.
//!
//! Handlers only see these traits; the in-memory adapter in
//! `outbound::memory_catalogue` is the sole implementation today.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryDraft, Error, Page, PageRequest, Product, ProductDraft,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repositories.
    pub enum CatalogueRepositoryError {
        /// A unique field already holds this value.
        Duplicate { field: String, value: String } =>
            "{field} '{value}' already exists",
        /// No record exists with the given id.
        Missing { resource: String } =>
            "{resource} does not exist",
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue connection failed: {message}",
    }
}

impl From<CatalogueRepositoryError> for Error {
    fn from(value: CatalogueRepositoryError) -> Self {
        let message = value.to_string();
        match value {
            CatalogueRepositoryError::Duplicate { field, .. } => {
                Error::conflict(message).with_details(serde_json::json!({ "field": field }))
            }
            CatalogueRepositoryError::Missing { resource } => Error::resource_not_found(resource),
            CatalogueRepositoryError::Connection { .. } => Error::unexpected(message),
        }
    }
}

/// Port for category reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Page through categories by creation time.
    async fn list(&self, page: PageRequest) -> Result<Page<Category>, CatalogueRepositoryError>;

    /// Fetch one category.
    async fn find(&self, id: Uuid) -> Result<Option<Category>, CatalogueRepositoryError>;

    /// Create a category; names are unique, case-insensitively.
    async fn create(&self, draft: CategoryDraft) -> Result<Category, CatalogueRepositoryError>;

    /// Replace a category's name and description.
    async fn update(
        &self,
        id: Uuid,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogueRepositoryError>;

    /// Delete a category. Missing ids are an error.
    async fn delete(&self, id: Uuid) -> Result<(), CatalogueRepositoryError>;
}

/// Port for product reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Page through products, optionally restricted to one category.
    async fn list(
        &self,
        page: PageRequest,
        category_id: Option<Uuid>,
    ) -> Result<Page<Product>, CatalogueRepositoryError>;

    /// Fetch one product.
    async fn find(&self, id: Uuid) -> Result<Option<Product>, CatalogueRepositoryError>;

    /// Create a product under an existing category.
    async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogueRepositoryError>;
}
