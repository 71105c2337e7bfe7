//! The category catalog: built-in categories, user categories, and their
//! endpoints.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod models;

pub use core::{
    BUILTIN_CATEGORIES, BuiltinCategory, BuiltinCategoryId, Category, CategoryIcon, CategoryId,
    CategoryKind, CategoryName, NewCategory, UserCategory, all_categories, create_category,
    create_category_table, delete_category, resolve_category,
};
pub use create_endpoint::{CreateCategoryRequest, create_category_endpoint};
pub use delete_endpoint::delete_category_endpoint;
pub use list_endpoint::list_categories_endpoint;
pub use models::CategoryResponse;
