//! In-memory catalogue repositories.
//!
//! Both repositories share one table set so products can check that their
//! category exists. Records are kept in creation order.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{CatalogueRepositoryError, CategoryRepository, ProductRepository};
use crate::domain::{Category, CategoryDraft, Page, PageRequest, Product, ProductDraft};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Shared in-memory catalogue implementing both catalogue ports.
#[derive(Clone)]
pub struct InMemoryCatalogue {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCatalogue {
    /// Create an empty catalogue.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, CatalogueRepositoryError> {
        self.tables
            .read()
            .map_err(|_| CatalogueRepositoryError::connection("catalogue lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, CatalogueRepositoryError> {
        self.tables
            .write()
            .map_err(|_| CatalogueRepositoryError::connection("catalogue lock poisoned"))
    }
}

fn name_taken(categories: &[Category], name: &str, except: Option<Uuid>) -> bool {
    categories
        .iter()
        .filter(|category| Some(category.id) != except)
        .any(|category| category.name.eq_ignore_ascii_case(name))
}

#[async_trait]
impl CategoryRepository for InMemoryCatalogue {
    async fn list(&self, page: PageRequest) -> Result<Page<Category>, CatalogueRepositoryError> {
        Ok(page.apply(&self.read()?.categories))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>, CatalogueRepositoryError> {
        Ok(self
            .read()?
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned())
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, CatalogueRepositoryError> {
        let mut tables = self.write()?;
        if name_taken(&tables.categories, &draft.name, None) {
            return Err(CatalogueRepositoryError::duplicate("name", draft.name));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            created_at: self.clock.utc(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogueRepositoryError> {
        let mut tables = self.write()?;
        if name_taken(&tables.categories, &draft.name, Some(id)) {
            return Err(CatalogueRepositoryError::duplicate("name", draft.name));
        }
        let category = tables
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| CatalogueRepositoryError::missing(format!("category {id}")))?;
        category.name = draft.name;
        category.description = draft.description;
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), CatalogueRepositoryError> {
        let mut tables = self.write()?;
        let before = tables.categories.len();
        tables.categories.retain(|category| category.id != id);
        if tables.categories.len() == before {
            return Err(CatalogueRepositoryError::missing(format!("category {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogue {
    async fn list(
        &self,
        page: PageRequest,
        category_id: Option<Uuid>,
    ) -> Result<Page<Product>, CatalogueRepositoryError> {
        let tables = self.read()?;
        let matching: Vec<Product> = tables
            .products
            .iter()
            .filter(|product| category_id.is_none_or(|id| product.category_id == id))
            .cloned()
            .collect();
        Ok(page.apply(&matching))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, CatalogueRepositoryError> {
        Ok(self
            .read()?
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogueRepositoryError> {
        let mut tables = self.write()?;
        if !tables
            .categories
            .iter()
            .any(|category| category.id == draft.category_id)
        {
            return Err(CatalogueRepositoryError::missing(format!(
                "category {}",
                draft.category_id
            )));
        }
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category_id: draft.category_id,
            available: draft.available,
            tags: draft.tags,
            created_at: self.clock.utc(),
        };
        tables.products.push(product.clone());
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortOrder;
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalogue() -> InMemoryCatalogue {
        InMemoryCatalogue::new(Arc::new(DefaultClock))
    }

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_owned(),
            description: None,
        }
    }

    fn loaf(category_id: Uuid) -> ProductDraft {
        ProductDraft {
            name: "Seeded rye".to_owned(),
            description: None,
            price: 6.5,
            category_id,
            available: true,
            tags: vec!["rye".to_owned()],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn category_names_are_unique_ignoring_case(catalogue: InMemoryCatalogue) {
        CategoryRepository::create(&catalogue, draft("Sourdough"))
            .await
            .expect("first");
        let err = CategoryRepository::create(&catalogue, draft("sourdough"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, CatalogueRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_to_own_name_is_allowed(catalogue: InMemoryCatalogue) {
        let created = CategoryRepository::create(&catalogue, draft("Buns"))
            .await
            .expect("create");
        let renamed = catalogue
            .update(created.id, draft("BUNS"))
            .await
            .expect("rename");
        assert_eq!(renamed.name, "BUNS");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_ids_are_reported(catalogue: InMemoryCatalogue) {
        let id = Uuid::new_v4();
        let err = catalogue.update(id, draft("x")).await.expect_err("missing");
        assert_eq!(err, CatalogueRepositoryError::missing(format!("category {id}")));
        assert!(catalogue.delete(id).await.is_err());
        let err = ProductRepository::create(&catalogue, loaf(id))
            .await
            .expect_err("unknown category");
        assert!(matches!(err, CatalogueRepositoryError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn products_filter_by_category(catalogue: InMemoryCatalogue) {
        let bread = CategoryRepository::create(&catalogue, draft("Bread"))
            .await
            .expect("bread");
        let cakes = CategoryRepository::create(&catalogue, draft("Cakes"))
            .await
            .expect("cakes");
        ProductRepository::create(&catalogue, loaf(bread.id))
            .await
            .expect("loaf");
        ProductRepository::create(&catalogue, loaf(cakes.id))
            .await
            .expect("cake");

        let page = PageRequest {
            page: 1,
            limit: 10,
            order: SortOrder::Asc,
        };
        let all = ProductRepository::list(&catalogue, page, None)
            .await
            .expect("all");
        assert_eq!(all.total, 2);
        let bread_only = ProductRepository::list(&catalogue, page, Some(bread.id))
            .await
            .expect("filtered");
        assert_eq!(bread_only.total, 1);
        assert_eq!(bread_only.items[0].category_id, bread.id);
    }
}
