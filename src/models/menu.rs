use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub name: String,
    pub color: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Toggle,
    Radio,
    Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierOption {
    pub label: String,
    #[serde(default)]
    pub price: f64,
}

/// Customer-selectable add-on or variant. Stored as JSON on the menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ModifierOption>,
}

/// Quantity of one inventory item consumed per unit sold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ingredient {
    pub inventory_item_id: Uuid,
    pub quantity: f64,
}

/// A menu item together with its recipe.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_public: bool,
    pub sort_order: i32,
    pub ingredients: Vec<Ingredient>,
    pub modifiers: Vec<Modifier>,
}
