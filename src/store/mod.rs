//! Record store used by the order pipeline and the HTTP handlers.
//!
//! The store is the only place where coordination between concurrent
//! requests happens: token uniqueness per stall and day, clamped inventory
//! decrements and terminal-state guards are all enforced here rather than
//! with locks held by the application.

use crate::models::inventory::InventoryItem;
use crate::models::menu::{Category, MenuItem};
use crate::models::order::{NewOrder, Order, OrderFilter, OrderStatus};
use crate::models::stall::{Stall, StallFlags};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another order of the same stall and day already holds this token.
    #[error("token {0} is already taken for this day")]
    TokenConflict(i32),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored value could not be mapped back onto the domain model.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn stall(&self, stall_id: Uuid) -> Result<Option<Stall>, StoreError>;

    /// Applies the flags set in `patch` and returns the updated stall.
    async fn update_stall_flags(
        &self,
        stall_id: Uuid,
        patch: &StallFlags,
    ) -> Result<Option<Stall>, StoreError>;

    /// Categories and public menu items of a stall, in display order.
    async fn menu(&self, stall_id: Uuid) -> Result<(Vec<Category>, Vec<MenuItem>), StoreError>;

    /// Menu items (with recipes) of a stall by id. Unknown ids are skipped.
    async fn menu_items(&self, stall_id: Uuid, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError>;

    async fn tokens_for_day(&self, stall_id: Uuid, day: NaiveDate) -> Result<HashSet<i32>, StoreError>;

    /// Writes header and lines atomically. Fails with
    /// [`StoreError::TokenConflict`] when the token is already used.
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn order_status(&self, order_id: Uuid) -> Result<Option<OrderStatus>, StoreError>;

    async fn list_orders(&self, stall_id: Uuid, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Sets the status unless the order is missing or already terminal, in
    /// which case `None` is returned.
    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    async fn inventory(&self, stall_id: Uuid) -> Result<Vec<InventoryItem>, StoreError>;

    /// Atomically subtracts `amount`, flooring at zero. Returns the new
    /// quantity, or `None` when the item does not exist for the stall.
    async fn decrement_inventory(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        amount: f64,
    ) -> Result<Option<f64>, StoreError>;

    async fn set_inventory_quantity(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        quantity: f64,
    ) -> Result<Option<InventoryItem>, StoreError>;
}
