//! PostgreSQL store.
//!
//! Money columns are NUMERIC and are cast to FLOAT8 on the way out. Token
//! uniqueness relies on the `orders_stall_day_token_key` constraint and
//! inventory deductions are single `UPDATE` statements.

use super::{OrderStore, StoreError};
use crate::models::inventory::InventoryItem;
use crate::models::menu::{Category, Ingredient, MenuItem, Modifier};
use crate::models::order::{
    DeliveryInfo, Fulfillment, NewOrder, Order, OrderFilter, OrderLineItem, OrderStatus,
};
use crate::models::stall::{Stall, StallFlags};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

const TOKEN_CONSTRAINT: &str = "orders_stall_day_token_key";

const STALL_COLUMNS: &str = "id, stall_name, accept_new_orders, enable_digital_menu,
     enable_delivery, enable_dine_in, enable_digital_payment";

const MENU_ITEM_COLUMNS: &str = "id, stall_id, category_id, name, description,
     price::FLOAT8 AS price, image_url, is_available, is_public, sort_order, modifiers";

const ORDER_COLUMNS: &str = "id, stall_id, token, order_day, total::FLOAT8 AS total,
     fulfillment_type, payment_method, status, customer_name, customer_phone,
     delivery_address, notes, created_at, updated_at";

const INVENTORY_COLUMNS: &str = "id, stall_id, name, quantity, unit, low_stock_threshold";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StallRow {
    id: Uuid,
    stall_name: String,
    accept_new_orders: Option<bool>,
    enable_digital_menu: Option<bool>,
    enable_delivery: Option<bool>,
    enable_dine_in: Option<bool>,
    enable_digital_payment: Option<bool>,
}

impl From<StallRow> for Stall {
    fn from(row: StallRow) -> Self {
        Self {
            id: row.id,
            stall_name: row.stall_name,
            flags: StallFlags {
                accept_new_orders: row.accept_new_orders,
                enable_digital_menu: row.enable_digital_menu,
                enable_delivery: row.enable_delivery,
                enable_dine_in: row.enable_dine_in,
                enable_digital_payment: row.enable_digital_payment,
            },
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    stall_id: Uuid,
    name: String,
    color: String,
    sort_order: i32,
}

#[derive(FromRow)]
struct MenuItemRow {
    id: Uuid,
    stall_id: Uuid,
    category_id: Uuid,
    name: String,
    description: Option<String>,
    price: f64,
    image_url: Option<String>,
    is_available: bool,
    is_public: bool,
    sort_order: i32,
    modifiers: Json<Vec<Modifier>>,
}

#[derive(FromRow)]
struct IngredientRow {
    menu_item_id: Uuid,
    inventory_item_id: Uuid,
    quantity: f64,
}

#[derive(FromRow)]
struct InventoryRow {
    id: Uuid,
    stall_id: Uuid,
    name: String,
    quantity: f64,
    unit: String,
    low_stock_threshold: f64,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = StoreError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            stall_id: row.stall_id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit.parse().map_err(StoreError::Corrupt)?,
            low_stock_threshold: row.low_stock_threshold,
        })
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    stall_id: Uuid,
    token: i32,
    order_day: NaiveDate,
    total: f64,
    fulfillment_type: String,
    payment_method: String,
    status: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    delivery_address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLineItem>) -> Result<Order, StoreError> {
        // Delivery details are stored flat; any of them present means the
        // customer filled the form.
        let delivery_info = match (self.customer_name, self.customer_phone, self.delivery_address) {
            (None, None, None) => None,
            (name, phone, address) => Some(DeliveryInfo {
                name: name.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
                address: address.unwrap_or_default(),
            }),
        };

        Ok(Order {
            id: self.id,
            stall_id: self.stall_id,
            token: self.token,
            order_day: self.order_day,
            items,
            total: self.total,
            fulfillment: Fulfillment {
                kind: self.fulfillment_type.parse().map_err(StoreError::Corrupt)?,
                delivery_info,
            },
            payment_method: self.payment_method.parse().map_err(StoreError::Corrupt)?,
            status: self.status.parse().map_err(StoreError::Corrupt)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    menu_item_id: Uuid,
    menu_item_name: String,
    menu_item_price: f64,
    menu_item_image: Option<String>,
    quantity: i32,
    selected_modifiers: Json<BTreeMap<String, Value>>,
    subtotal: f64,
}

impl From<OrderItemRow> for OrderLineItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            menu_item_id: row.menu_item_id,
            name: row.menu_item_name,
            price: row.menu_item_price,
            image: row.menu_item_image,
            quantity: row.quantity,
            selected_modifiers: row.selected_modifiers.0,
            subtotal: row.subtotal,
        }
    }
}

fn map_token_conflict(err: sqlx::Error, token: i32) -> StoreError {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(TOKEN_CONSTRAINT) =>
        {
            StoreError::TokenConflict(token)
        }
        other => other.into(),
    }
}

impl PgStore {
    async fn attach_ingredients(&self, rows: Vec<MenuItemRow>) -> Result<Vec<MenuItem>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
            "SELECT menu_item_id, inventory_item_id, quantity
             FROM menu_item_ingredients
             WHERE menu_item_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut recipes: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in ingredient_rows {
            recipes.entry(row.menu_item_id).or_default().push(Ingredient {
                inventory_item_id: row.inventory_item_id,
                quantity: row.quantity,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| MenuItem {
                ingredients: recipes.remove(&row.id).unwrap_or_default(),
                id: row.id,
                stall_id: row.stall_id,
                category_id: row.category_id,
                name: row.name,
                description: row.description,
                price: row.price,
                image_url: row.image_url,
                is_available: row.is_available,
                is_public: row.is_public,
                sort_order: row.sort_order,
                modifiers: row.modifiers.0,
            })
            .collect())
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, menu_item_id, menu_item_name,
                    menu_item_price::FLOAT8 AS menu_item_price, menu_item_image,
                    quantity, selected_modifiers, subtotal::FLOAT8 AS subtotal
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, line_no",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
        for row in item_rows {
            lines.entry(row.order_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn stall(&self, stall_id: Uuid) -> Result<Option<Stall>, StoreError> {
        let row = sqlx::query_as::<_, StallRow>(&format!(
            "SELECT {STALL_COLUMNS} FROM stalls WHERE id = $1"
        ))
        .bind(stall_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Stall::from))
    }

    async fn update_stall_flags(
        &self,
        stall_id: Uuid,
        patch: &StallFlags,
    ) -> Result<Option<Stall>, StoreError> {
        let row = sqlx::query_as::<_, StallRow>(&format!(
            "UPDATE stalls SET
                accept_new_orders      = COALESCE($2, accept_new_orders),
                enable_digital_menu    = COALESCE($3, enable_digital_menu),
                enable_delivery        = COALESCE($4, enable_delivery),
                enable_dine_in         = COALESCE($5, enable_dine_in),
                enable_digital_payment = COALESCE($6, enable_digital_payment),
                updated_at             = now()
             WHERE id = $1
             RETURNING {STALL_COLUMNS}"
        ))
        .bind(stall_id)
        .bind(patch.accept_new_orders)
        .bind(patch.enable_digital_menu)
        .bind(patch.enable_delivery)
        .bind(patch.enable_dine_in)
        .bind(patch.enable_digital_payment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Stall::from))
    }

    async fn menu(&self, stall_id: Uuid) -> Result<(Vec<Category>, Vec<MenuItem>), StoreError> {
        let categories = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, stall_id, name, color, sort_order
             FROM categories WHERE stall_id = $1
             ORDER BY sort_order, name",
        )
        .bind(stall_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Category {
            id: row.id,
            stall_id: row.stall_id,
            name: row.name,
            color: row.color,
            sort_order: row.sort_order,
        })
        .collect();

        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items
             WHERE stall_id = $1 AND is_public
             ORDER BY sort_order, name"
        ))
        .bind(stall_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((categories, self.attach_ingredients(rows).await?))
    }

    async fn menu_items(&self, stall_id: Uuid, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items
             WHERE stall_id = $1 AND id = ANY($2)"
        ))
        .bind(stall_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        self.attach_ingredients(rows).await
    }

    async fn tokens_for_day(&self, stall_id: Uuid, day: NaiveDate) -> Result<HashSet<i32>, StoreError> {
        let tokens = sqlx::query_scalar::<_, i32>(
            "SELECT token FROM orders WHERE stall_id = $1 AND order_day = $2",
        )
        .bind(stall_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(tokens.into_iter().collect())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let delivery = order.fulfillment.delivery_info.as_ref();

        // Header and lines commit together; dropping the transaction on any
        // error rolls the header back.
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, stall_id, token, order_day, total, fulfillment_type,
                                 payment_method, customer_name, customer_phone,
                                 delivery_address, notes)
             VALUES ($1, $2, $3, $4, $5::FLOAT8, $6, $7, $8, $9, $10, $11)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.stall_id)
        .bind(order.token)
        .bind(order.order_day)
        .bind(order.total)
        .bind(order.fulfillment.kind.as_str())
        .bind(order.payment_method.as_str())
        .bind(delivery.map(|d| d.name.as_str()))
        .bind(delivery.map(|d| d.phone.as_str()))
        .bind(delivery.map(|d| d.address.as_str()))
        .bind(order.notes.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_token_conflict(e, order.token))?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (order_id, line_no, menu_item_id, menu_item_name,
                                          menu_item_price, menu_item_image, quantity,
                                          selected_modifiers, subtotal)
                 VALUES ($1, $2, $3, $4, $5::FLOAT8, $6, $7, $8, $9::FLOAT8)",
            )
            .bind(order.id)
            .bind(line_no as i32)
            .bind(item.menu_item_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.image.as_deref())
            .bind(item.quantity)
            .bind(Json(&item.selected_modifiers))
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        header.into_order(order.items.clone())
    }

    async fn order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn order_status(&self, order_id: Uuid) -> Result<Option<OrderStatus>, StoreError> {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        status
            .map(|s| s.parse().map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn list_orders(&self, stall_id: Uuid, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE stall_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::DATE IS NULL OR order_day = $3)
             ORDER BY created_at DESC"
        ))
        .bind(stall_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.day)
        .fetch_all(&self.pool)
        .await?;
        self.attach_items(rows).await
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            "UPDATE orders SET status = $2, updated_at = now()
             WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
             RETURNING id",
        )
        .bind(order_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.order(id).await,
            None => Ok(None),
        }
    }

    async fn inventory(&self, stall_id: Uuid) -> Result<Vec<InventoryItem>, StoreError> {
        sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory_items WHERE stall_id = $1 ORDER BY name"
        ))
        .bind(stall_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(InventoryItem::try_from)
        .collect()
    }

    async fn decrement_inventory(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        amount: f64,
    ) -> Result<Option<f64>, StoreError> {
        let remaining = sqlx::query_scalar::<_, f64>(
            "UPDATE inventory_items
             SET quantity = GREATEST(quantity - $3, 0), updated_at = now()
             WHERE id = $2 AND stall_id = $1
             RETURNING quantity",
        )
        .bind(stall_id)
        .bind(item_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;
        Ok(remaining)
    }

    async fn set_inventory_quantity(
        &self,
        stall_id: Uuid,
        item_id: Uuid,
        quantity: f64,
    ) -> Result<Option<InventoryItem>, StoreError> {
        sqlx::query_as::<_, InventoryRow>(&format!(
            "UPDATE inventory_items SET quantity = $3, updated_at = now()
             WHERE id = $2 AND stall_id = $1
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(stall_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .map(InventoryItem::try_from)
        .transpose()
    }
}
