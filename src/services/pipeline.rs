//! Order submission.
//!
//! Validates a customer cart against the stall and its menu, prices it on
//! the server, reserves a display token for the stall's current day and
//! persists the order. Ingredient stock is deducted afterwards; shortfalls
//! and deduction errors are logged and never undo an accepted order.

use crate::models::menu::MenuItem;
use crate::models::order::{
    DeliveryInfo, Fulfillment, FulfillmentType, NewOrder, OrderLineItem, PaymentMethod,
};
use crate::models::stall::{Stall, StallFlags};
use crate::services::inventory::{check_availability, low_stock, requirements_for, Requirements};
use crate::services::{pricing, token};
use crate::store::{OrderStore, StoreError};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Inserts tried before giving up on token conflicts.
const MAX_TOKEN_ATTEMPTS: usize = 5;

/// Largest quantity accepted on one cart line.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Largest order total the `NUMERIC(10, 2)` money columns can hold.
pub const MAX_ORDER_TOTAL: f64 = 99_999_999.99;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Stall not found")]
    StallNotFound,
    #[error("Stall is not accepting orders at the moment")]
    OrdersClosed,
    #[error("{0}")]
    InvalidCart(String),
    #[error("No order tokens left for today, please try again later")]
    TokenCapacityExhausted,
    #[error("Failed to create order")]
    PersistenceFailure(#[source] StoreError),
}

impl OrderError {
    fn invalid(message: impl Into<String>) -> Self {
        OrderError::InvalidCart(message.into())
    }
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub selected_modifiers: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SubmitOrder {
    pub stall_id: Uuid,
    pub items: Vec<CartLine>,
    pub fulfillment: Fulfillment,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub token: i32,
}

/// Places an order for `order_day`, the stall-local calendar day tokens are
/// scoped to.
#[instrument(skip(store, request), fields(stall_id = %request.stall_id, lines = request.items.len()))]
pub async fn submit(
    store: &dyn OrderStore,
    order_day: NaiveDate,
    request: SubmitOrder,
) -> Result<PlacedOrder, OrderError> {
    let stall = store
        .stall(request.stall_id)
        .await
        .map_err(OrderError::PersistenceFailure)?
        .ok_or(OrderError::StallNotFound)?;

    if !stall.flags.accepts_orders() {
        return Err(OrderError::OrdersClosed);
    }
    check_fulfillment(&stall.flags, &request.fulfillment, request.payment_method)?;

    let recipes = load_cart_items(store, &stall, &request.items).await?;
    let lines: Vec<OrderLineItem> = request
        .items
        .into_iter()
        .map(|line| {
            let item = &recipes[&line.menu_item_id];
            pricing::snapshot_line(item, line.quantity, line.selected_modifiers)
        })
        .collect();
    let total = pricing::order_total(&lines);
    if !total.is_finite() || total > MAX_ORDER_TOTAL {
        return Err(OrderError::invalid("Order total is too large"));
    }

    let mut order = NewOrder {
        id: Uuid::new_v4(),
        stall_id: stall.id,
        token: 0,
        order_day,
        items: lines,
        total,
        fulfillment: request.fulfillment,
        payment_method: request.payment_method,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
    };

    let placed = persist_with_token(store, &mut order).await?;
    info!(order_id = %placed.order_id, token = placed.token, total, "Order placed");

    let recipe_list: Vec<MenuItem> = recipes.into_values().collect();
    let requirements = requirements_for(&order.items, &recipe_list);
    deduct_inventory(store, stall.id, &requirements).await;

    Ok(placed)
}

fn check_fulfillment(
    flags: &StallFlags,
    fulfillment: &Fulfillment,
    payment: PaymentMethod,
) -> Result<(), OrderError> {
    match fulfillment.kind {
        FulfillmentType::DineIn if !flags.dine_in_enabled() => {
            return Err(OrderError::invalid("Dine-in is not available at this stall"));
        }
        FulfillmentType::Delivery if !flags.delivery_enabled() => {
            return Err(OrderError::invalid("Delivery is not available at this stall"));
        }
        FulfillmentType::Delivery => {
            let complete = fulfillment
                .delivery_info
                .as_ref()
                .is_some_and(delivery_info_complete);
            if !complete {
                return Err(OrderError::invalid(
                    "Delivery orders need a name, phone number and address",
                ));
            }
        }
        _ => {}
    }

    if payment == PaymentMethod::Digital && !flags.digital_payment_enabled() {
        return Err(OrderError::invalid("Digital payment is not available at this stall"));
    }
    Ok(())
}

fn delivery_info_complete(info: &DeliveryInfo) -> bool {
    [&info.name, &info.phone, &info.address]
        .iter()
        .all(|field| !field.trim().is_empty())
}

async fn load_cart_items(
    store: &dyn OrderStore,
    stall: &Stall,
    cart: &[CartLine],
) -> Result<HashMap<Uuid, MenuItem>, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::invalid("Cart is empty"));
    }
    if let Some(line) = cart
        .iter()
        .find(|l| !(1..=MAX_LINE_QUANTITY).contains(&l.quantity))
    {
        return Err(OrderError::invalid(format!(
            "Invalid quantity {} for item {}",
            line.quantity, line.menu_item_id
        )));
    }

    let mut ids: Vec<Uuid> = cart.iter().map(|l| l.menu_item_id).collect();
    ids.sort();
    ids.dedup();

    let items: HashMap<Uuid, MenuItem> = store
        .menu_items(stall.id, &ids)
        .await
        .map_err(OrderError::PersistenceFailure)?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    for id in &ids {
        match items.get(id) {
            Some(item) if item.is_available && item.is_public => {}
            Some(item) => {
                return Err(OrderError::invalid(format!("{} is currently unavailable", item.name)));
            }
            None => return Err(OrderError::invalid(format!("Menu item {id} not found"))),
        }
    }
    Ok(items)
}

async fn persist_with_token(
    store: &dyn OrderStore,
    order: &mut NewOrder,
) -> Result<PlacedOrder, OrderError> {
    let mut last_conflict = None;

    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
        let used = store
            .tokens_for_day(order.stall_id, order.order_day)
            .await
            .map_err(OrderError::PersistenceFailure)?;
        order.token = token::allocate(&used).map_err(|_| OrderError::TokenCapacityExhausted)?;

        match store.insert_order(order).await {
            Ok(stored) => {
                return Ok(PlacedOrder {
                    order_id: stored.id,
                    token: stored.token,
                });
            }
            Err(e @ StoreError::TokenConflict(_)) => {
                warn!(attempt, token = order.token, "Token taken concurrently, retrying");
                last_conflict = Some(e);
            }
            Err(e) => return Err(OrderError::PersistenceFailure(e)),
        }
    }

    Err(OrderError::PersistenceFailure(last_conflict.unwrap_or_else(|| {
        StoreError::Unavailable("token allocation gave up".into())
    })))
}

async fn deduct_inventory(store: &dyn OrderStore, stall_id: Uuid, requirements: &Requirements) {
    if requirements.is_empty() {
        return;
    }

    match store.inventory(stall_id).await {
        Ok(snapshot) => {
            let availability = check_availability(requirements, &snapshot);
            if !availability.available {
                warn!(
                    %stall_id,
                    items = ?availability.insufficient,
                    "Order accepted with insufficient stock, clamping at zero"
                );
            }
        }
        Err(e) => warn!(%stall_id, error = %e, "Could not read inventory before deduction"),
    }

    for (item_id, amount) in requirements {
        match store.decrement_inventory(stall_id, *item_id, *amount).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(%stall_id, %item_id, "Recipe references unknown inventory item"),
            Err(e) => warn!(%stall_id, %item_id, error = %e, "Inventory deduction failed"),
        }
    }

    match store.inventory(stall_id).await {
        Ok(after) => {
            for item in low_stock(&after)
                .iter()
                .filter(|item| requirements.contains_key(&item.id))
            {
                warn!(
                    %stall_id,
                    item = %item.name,
                    quantity = item.quantity,
                    unit = item.unit.as_str(),
                    threshold = item.low_stock_threshold,
                    "Low stock"
                );
            }
        }
        Err(e) => warn!(%stall_id, error = %e, "Could not read inventory for low-stock check"),
    }
}
