// src/dtos/menu.rs
use crate::models::menu::{Category, MenuItem, Modifier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image shown for items without a picture.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-food.jpg";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallQuery {
    pub stall_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub image: String,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub categories: Vec<CategoryResponse>,
    pub items: Vec<MenuItemResponse>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color: category.color,
        }
    }
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description.unwrap_or_default(),
            price: item.price,
            category_id: item.category_id,
            image: item.image_url.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            is_available: item.is_available,
            modifiers: item.modifiers,
        }
    }
}
