//! Catalogue endpoints.
//!
//! ```text
//! GET    /api/v1/categories?page=1&limit=10&order=desc
//! GET    /api/v1/categories/{id}
//! POST   /api/v1/categories        {"name":"Sourdough"}
//! PUT    /api/v1/categories/{id}   {"name":"Rye"}
//! DELETE /api/v1/categories/{id}
//! GET    /api/v1/products?categoryId=..
//! GET    /api/v1/products/{id}
//! POST   /api/v1/products          {"name":"Rye loaf","price":6.5,"categoryId":".."}
//! ```
//!
//! Reads are public; writes need the admin role.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::ports::{CategoryRepository, ProductRepository};
use crate::domain::{CategoryDraft, Error, PageRequest, ProductDraft, Role};

use super::pipeline::{Endpoint, Handler, Reply, ValidatedRequest, handler_fn};
use super::rules;

pub const CATEGORIES_PATH: &str = "/api/v1/categories";
pub const CATEGORY_PATH: &str = "/api/v1/categories/{id}";
pub const PRODUCTS_PATH: &str = "/api/v1/products";
pub const PRODUCT_PATH: &str = "/api/v1/products/{id}";

/// Shared category repository handle.
pub type Categories = Arc<dyn CategoryRepository>;
/// Shared product repository handle.
pub type Products = Arc<dyn ProductRepository>;

/// Normalised product listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListQuery {
    #[serde(flatten)]
    page: PageRequest,
    #[serde(default)]
    category_id: Option<Uuid>,
}

fn category_not_found(id: Uuid) -> Error {
    Error::resource_not_found(format!("category {id}"))
}

fn product_not_found(id: Uuid) -> Error {
    Error::resource_not_found(format!("product {id}"))
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(
        ("page" = Option<u32>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size 1..=100, default 10"),
        ("order" = Option<String>, Query, description = "asc or desc, default desc"),
    ),
    responses(
        (status = 200, description = "Category page", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 400, description = "Invalid query", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
pub async fn list_categories(
    repo: Categories,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let page: PageRequest = request.query_as()?;
    Reply::ok(repo.list(page).await?)
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 404, description = "Unknown category", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "getCategory",
    security([])
)]
pub async fn get_category(
    repo: Categories,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let id = request.param_uuid("id")?;
    let category = repo.find(id).await?.ok_or_else(|| category_not_found(id))?;
    Reply::ok(category)
}

/// Create a category. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryDraft,
    responses(
        (status = 201, description = "Created", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 400, description = "Invalid body", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 401, description = "No session", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 403, description = "Not an admin", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 409, description = "Name already used", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
pub async fn create_category(
    repo: Categories,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let draft: CategoryDraft = request.body_as()?;
    let category = repo.create(draft).await?;
    Ok(Reply::created(category)?.message("category created"))
}

/// Rename or redescribe a category. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryDraft,
    responses(
        (status = 200, description = "Updated", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 400, description = "Invalid body", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 404, description = "Unknown category", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 409, description = "Name already used", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "updateCategory"
)]
pub async fn update_category(
    repo: Categories,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let id = request.param_uuid("id")?;
    let draft: CategoryDraft = request.body_as()?;
    Reply::ok(repo.update(id, draft).await?)
}

/// Remove a category. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Deleted", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 404, description = "Unknown category", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "deleteCategory"
)]
pub async fn delete_category(
    repo: Categories,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let id = request.param_uuid("id")?;
    repo.delete(id).await?;
    Ok(Reply::ok(serde_json::json!({ "id": id }))?.message("category deleted"))
}

/// List products, optionally within one category.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("page" = Option<u32>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size 1..=100, default 10"),
        ("order" = Option<String>, Query, description = "asc or desc, default desc"),
        ("categoryId" = Option<Uuid>, Query, description = "Only products in this category"),
    ),
    responses(
        (status = 200, description = "Product page", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 400, description = "Invalid query", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "listProducts",
    security([])
)]
pub async fn list_products(
    repo: Products,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let query: ProductListQuery = request.query_as()?;
    Reply::ok(repo.list(query.page, query.category_id).await?)
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 404, description = "Unknown product", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "getProduct",
    security([])
)]
pub async fn get_product(
    repo: Products,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let id = request.param_uuid("id")?;
    let product = repo.find(id).await?.ok_or_else(|| product_not_found(id))?;
    Reply::ok(product)
}

/// Create a product. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductDraft,
    responses(
        (status = 201, description = "Created", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 400, description = "Invalid body", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 401, description = "No session", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 403, description = "Not an admin", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 404, description = "Unknown category", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["catalogue"],
    operation_id = "createProduct"
)]
pub async fn create_product(
    repo: Products,
    request: ValidatedRequest,
) -> Result<Reply, Error> {
    let draft: ProductDraft = request.body_as()?;
    let product = repo.create(draft).await?;
    Ok(Reply::created(product)?.message("product created"))
}

/// Close a handler over its repository.
fn bind<R, F, Fut>(repo: &Arc<R>, f: F) -> impl Handler + 'static
where
    R: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<R>, ValidatedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    let repo = Arc::clone(repo);
    handler_fn(move |request| f(Arc::clone(&repo), request))
}

/// Declare every catalogue endpoint over the given repositories.
pub fn endpoints(
    categories: &Categories,
    products: &Products,
) -> Vec<Endpoint> {
    vec![
        Endpoint::get(CATEGORIES_PATH, bind(categories, list_categories)).query(rules::pagination()),
        Endpoint::get(CATEGORY_PATH, bind(categories, get_category)).params(rules::id_param()),
        Endpoint::post(CATEGORIES_PATH, bind(categories, create_category))
            .min_role(Role::Admin)
            .body(rules::category_body()),
        Endpoint::put(CATEGORY_PATH, bind(categories, update_category))
            .min_role(Role::Admin)
            .params(rules::id_param())
            .body(rules::category_body()),
        Endpoint::delete(CATEGORY_PATH, bind(categories, delete_category))
            .min_role(Role::Admin)
            .params(rules::id_param()),
        Endpoint::get(PRODUCTS_PATH, bind(products, list_products)).query(rules::product_query()),
        Endpoint::get(PRODUCT_PATH, bind(products, get_product)).params(rules::id_param()),
        Endpoint::post(PRODUCTS_PATH, bind(products, create_product))
            .min_role(Role::Admin)
            .body(rules::product_body()),
    ]
}
