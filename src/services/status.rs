//! Order status state machine.
//!
//! `waiting → cooking → ready → completed`, with `cancelled` reachable from
//! any non-terminal state. Forward jumps (e.g. waiting straight to ready)
//! are accepted; moving backward or out of a terminal state is not.

use crate::models::order::{Order, OrderStatus};
use crate::services::stream::StatusBus;
use crate::store::{OrderStore, StoreError};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order is already {0}")]
    Terminal(OrderStatus),
    #[error("Order cannot move back from {from} to {to}")]
    Backward { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("Order not found")]
    NotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates a status change and returns the status to store.
pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::Terminal(from));
    }
    match (from.stage(), to.stage()) {
        (Some(current), Some(target)) if target < current => {
            Err(TransitionError::Backward { from, to })
        }
        _ => Ok(to),
    }
}

/// Applies a merchant (or demo timer) status change.
///
/// `stall_id` scopes the lookup to one stall's orders; `None` skips the
/// ownership check. Watchers of the order are woken on success.
#[instrument(skip(store, bus))]
pub async fn change_status(
    store: &dyn OrderStore,
    bus: &StatusBus,
    stall_id: Option<Uuid>,
    order_id: Uuid,
    target: OrderStatus,
) -> Result<Order, StatusChangeError> {
    let order = store
        .order(order_id)
        .await?
        .filter(|o| stall_id.map_or(true, |s| o.stall_id == s))
        .ok_or(StatusChangeError::NotFound)?;

    let next = transition(order.status, target)?;
    if next == order.status {
        return Ok(order);
    }

    match store.update_order_status(order_id, next).await? {
        Some(updated) => {
            info!(%order_id, from = %order.status, to = %next, "Order status changed");
            bus.publish(order_id);
            Ok(updated)
        }
        None => {
            // Someone else moved the order into a terminal state first.
            let current = store
                .order_status(order_id)
                .await?
                .ok_or(StatusChangeError::NotFound)?;
            Err(TransitionError::Terminal(current).into())
        }
    }
}
