//! Wire representations of categories.

use serde::Serialize;

use crate::category::{Category, CategoryId, CategoryKind};

/// A category as it appears in response bodies.
///
/// Built-in and user categories share one shape; built-ins are told apart
/// by their `default_` ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id(),
            name: category.name().to_owned(),
            icon: category.icon().to_owned(),
            color: category.color().to_owned(),
            kind: category.kind(),
        }
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self::from(&category)
    }
}
