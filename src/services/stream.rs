//! Status propagation to customers.
//!
//! Each open stream owns one task that polls the order's status on a fixed
//! interval and forwards changes over a channel. Status changes made through
//! this process also publish on [`StatusBus`], which wakes the matching
//! watchers right away instead of at the next tick. The task stops when the
//! order reaches a status the customer no longer waits on, when the order
//! disappears, or as soon as the receiving side is dropped.

use crate::models::order::OrderStatus;
use crate::store::{OrderStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

const BUS_CAPACITY: usize = 256;
const EVENT_BUFFER: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// In-process fan-out of "this order's status changed" notices.
#[derive(Clone)]
pub struct StatusBus {
    tx: broadcast::Sender<Uuid>,
}

impl StatusBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, order_id: Uuid) {
        // No receivers just means nobody is watching.
        let _ = self.tx.send(order_id);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Uuid> {
        self.tx.subscribe()
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StatusWatch {
    pub events: mpsc::Receiver<StatusEvent>,
    /// `None` when there was nothing to watch.
    pub task: Option<JoinHandle<()>>,
}

/// Opens a watch on `order_id`.
///
/// The current status is read before returning and produces no event. A
/// missing order, or one already past the point a customer waits for,
/// yields a watch whose channel is already closed.
pub async fn watch(
    store: Arc<dyn OrderStore>,
    bus: &StatusBus,
    order_id: Uuid,
    interval: Duration,
) -> Result<StatusWatch, StoreError> {
    // Subscribe before the initial read so no change slips in between.
    let wake = bus.subscribe();
    let (tx, events) = mpsc::channel(EVENT_BUFFER);

    let initial = match store.order_status(order_id).await? {
        Some(status) if !status.ends_watch() => status,
        _ => return Ok(StatusWatch { events, task: None }),
    };

    let task = tokio::spawn(poll_status(store, wake, order_id, initial, interval, tx));
    Ok(StatusWatch {
        events,
        task: Some(task),
    })
}

async fn poll_status(
    store: Arc<dyn OrderStore>,
    wake: broadcast::Receiver<Uuid>,
    order_id: Uuid,
    mut last_seen: OrderStatus,
    interval: Duration,
    tx: mpsc::Sender<StatusEvent>,
) {
    let mut wake = Some(wake);
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tx.closed() => {
                debug!(%order_id, "Status watcher disconnected");
                return;
            }
            _ = ticker.tick() => {}
            _ = woken(&mut wake, order_id) => {}
        }

        let status = match store.order_status(order_id).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(%order_id, "Watched order disappeared");
                return;
            }
            Err(e) => {
                warn!(%order_id, error = %e, "Status poll failed, retrying next tick");
                continue;
            }
        };

        if status != last_seen {
            last_seen = status;
            let event = StatusEvent {
                order_id,
                status,
                timestamp: Utc::now(),
            };
            if tx.send(event).await.is_err() {
                return;
            }
        }

        if status.ends_watch() {
            debug!(%order_id, %status, "Status watch finished");
            return;
        }
    }
}

/// Resolves when the bus reports a change for `order_id` (or when notices
/// were dropped and one may have been ours). Never resolves once the bus
/// is gone.
async fn woken(wake: &mut Option<broadcast::Receiver<Uuid>>, order_id: Uuid) {
    loop {
        let received = match wake.as_mut() {
            Some(rx) => rx.recv().await,
            None => return std::future::pending().await,
        };
        match received {
            Ok(id) if id != order_id => continue,
            Err(RecvError::Closed) => *wake = None,
            Ok(_) | Err(RecvError::Lagged(_)) => return,
        }
    }
}
