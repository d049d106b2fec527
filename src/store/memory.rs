//! In-memory store.
//!
//! Keeps every table in one map guarded by a read-write lock, so each trait
//! call is atomic in the same way a single SQL statement or transaction is.
//! Backs the test suite; the service binary always runs on PostgreSQL.

use super::{OrderStore, StoreError};
use crate::models::inventory::InventoryItem;
use crate::models::menu::{Category, MenuItem};
use crate::models::order::{NewOrder, Order, OrderFilter, OrderStatus};
use crate::models::stall::{Stall, StallFlags};
use crate::services::inventory::clamped_sub;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    stalls: HashMap<Uuid, Stall>,
    categories: Vec<Category>,
    menu_items: HashMap<Uuid, MenuItem>,
    inventory: HashMap<Uuid, InventoryItem>,
    orders: HashMap<Uuid, Order>,
    tokens: HashSet<(Uuid, NaiveDate, i32)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_stall(&self, stall: Stall) {
        self.tables.write().await.stalls.insert(stall.id, stall);
    }

    pub async fn insert_category(&self, category: Category) {
        self.tables.write().await.categories.push(category);
    }

    pub async fn insert_menu_item(&self, item: MenuItem) {
        self.tables.write().await.menu_items.insert(item.id, item);
    }

    pub async fn insert_inventory_item(&self, item: InventoryItem) {
        self.tables.write().await.inventory.insert(item.id, item);
    }

    /// Drops an order as if it had been removed behind the service's back.
    pub async fn remove_order(&self, order_id: Uuid) {
        let mut tables = self.tables.write().await;
        if let Some(order) = tables.orders.remove(&order_id) {
            tables
                .tokens
                .remove(&(order.stall_id, order.order_day, order.token));
        }
    }

    /// Makes every subsequent order write fail with a transient error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn stall(&self, stall_id: Uuid) -> Result<Option<Stall>, StoreError> {
        Ok(self.tables.read().await.stalls.get(&stall_id).cloned())
    }

    async fn update_stall_flags(
        &self,
        stall_id: Uuid,
        patch: &StallFlags,
    ) -> Result<Option<Stall>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.stalls.get_mut(&stall_id).map(|stall| {
            stall.flags.merge(patch);
            stall.clone()
        }))
    }

    async fn menu(&self, stall_id: Uuid) -> Result<(Vec<Category>, Vec<MenuItem>), StoreError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.stall_id == stall_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));

        let mut items: Vec<MenuItem> = tables
            .menu_items
            .values()
            .filter(|i| i.stall_id == stall_id && i.is_public)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));

        Ok((categories, items))
    }

    async fn menu_items(&self, stall_id: Uuid, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.menu_items.get(id))
            .filter(|item| item.stall_id == stall_id)
            .cloned()
            .collect())
    }

    async fn tokens_for_day(&self, stall_id: Uuid, day: NaiveDate) -> Result<HashSet<i32>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .iter()
            .filter(|(stall, d, _)| *stall == stall_id && *d == day)
            .map(|(_, _, token)| *token)
            .collect())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        let key = (order.stall_id, order.order_day, order.token);
        if tables.tokens.contains(&key) {
            return Err(StoreError::TokenConflict(order.token));
        }

        let now = Utc::now();
        let stored = Order {
            id: order.id,
            stall_id: order.stall_id,
            token: order.token,
            order_day: order.order_day,
            items: order.items.clone(),
            total: order.total,
            fulfillment: order.fulfillment.clone(),
            payment_method: order.payment_method,
            status: OrderStatus::Waiting,
            notes: order.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.tokens.insert(key);
        tables.orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.orders.get(&order_id).cloned())
    }

    async fn order_status(&self, order_id: Uuid) -> Result<Option<OrderStatus>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .get(&order_id)
            .map(|o| o.status))
    }

    async fn list_orders(&self, stall_id: Uuid, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.stall_id == stall_id)
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .filter(|o| filter.day.map_or(true, |d| o.order_day == d))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        match tables.orders.get_mut(&order_id) {
            Some(order) if !order.status.is_terminal() => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn inventory(&self, stall_id: Uuid) -> Result<Vec<InventoryItem>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| i.stall_id == stall_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn decrement_inventory(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        amount: f64,
    ) -> Result<Option<f64>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .inventory
            .get_mut(&item_id)
            .filter(|item| item.stall_id == stall_id)
            .map(|item| {
                item.quantity = clamped_sub(item.quantity, amount);
                item.quantity
            }))
    }

    async fn set_inventory_quantity(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        quantity: f64,
    ) -> Result<Option<InventoryItem>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .inventory
            .get_mut(&item_id)
            .filter(|item| item.stall_id == stall_id)
            .map(|item| {
                item.quantity = quantity;
                item.clone()
            }))
    }
}
