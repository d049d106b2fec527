//! Demo progression: walks a freshly placed order through the kitchen on a
//! timer so the customer view can be tried without a merchant.

use crate::models::order::OrderStatus;
use crate::services::status::change_status;
use crate::services::stream::StatusBus;
use crate::store::OrderStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

const STEPS: [(Duration, OrderStatus); 2] = [
    (Duration::from_secs(10), OrderStatus::Cooking),
    (Duration::from_secs(20), OrderStatus::Ready),
];

pub fn schedule(store: Arc<dyn OrderStore>, bus: StatusBus, order_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        for (delay, status) in STEPS {
            tokio::time::sleep(delay).await;
            if let Err(e) = change_status(store.as_ref(), &bus, None, order_id, status).await {
                // Usually the merchant already moved the order on.
                debug!(%order_id, error = %e, "Demo progression stopped");
                return;
            }
        }
    })
}
