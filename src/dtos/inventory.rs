// src/dtos/inventory.rs
use crate::models::inventory::{InventoryItem, Unit};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub low_stock_threshold: f64,
    pub is_low_stock: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdjustInventoryRequest {
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct InventoryPreviewRequest {
    pub items: Vec<PreviewLine>,
}

/// Stock as it would be after the previewed cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPreviewResponse {
    pub updated: Vec<InventoryItemResponse>,
    pub low_stock_warnings: Vec<InventoryItemResponse>,
}

impl From<InventoryItem> for InventoryItemResponse {
    fn from(item: InventoryItem) -> Self {
        Self {
            is_low_stock: item.is_low_stock(),
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            low_stock_threshold: item.low_stock_threshold,
        }
    }
}
