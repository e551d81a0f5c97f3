//! Bakery catalogue entities: categories and products.
//!
//! Field-level input checks happen in the request pipeline, so these types
//! only carry already-normalised values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product grouping shown in the storefront navigation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Sourdough")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Values for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sellable bakery item.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Seeded rye loaf")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = 6.5)]
    pub price: f64,
    pub category_id: Uuid,
    pub available: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Values for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Uuid,
    pub available: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Listing order by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Normalised pagination query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub order: SortOrder,
}

impl PageRequest {
    /// Number of items to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    /// Slice `items` (already in ascending creation order) into this page.
    #[must_use]
    pub fn apply<T: Clone>(&self, ascending: &[T]) -> Page<T> {
        let ordered: Vec<&T> = match self.order {
            SortOrder::Asc => ascending.iter().collect(),
            SortOrder::Desc => ascending.iter().rev().collect(),
        };
        let items = ordered
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .cloned()
            .collect();
        Page {
            items,
            page: self.page,
            limit: self.limit,
            total: ascending.len(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            order: SortOrder::Desc,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
}
