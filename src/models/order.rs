use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Waiting,
    Cooking,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Waiting => "waiting",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No status change is accepted once an order is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Position on the kitchen line; `None` for `Cancelled`, which sits off it.
    pub fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Waiting => Some(0),
            OrderStatus::Cooking => Some(1),
            OrderStatus::Ready => Some(2),
            OrderStatus::Completed => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    /// A customer watching the order has nothing left to wait for.
    pub fn ends_watch(&self) -> bool {
        matches!(
            self,
            OrderStatus::Ready | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(OrderStatus::Waiting),
            "cooking" => Ok(OrderStatus::Cooking),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FulfillmentType {
    DineIn,
    Takeaway,
    Delivery,
}

impl FulfillmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentType::DineIn => "dine-in",
            FulfillmentType::Takeaway => "takeaway",
            FulfillmentType::Delivery => "delivery",
        }
    }
}

impl FromStr for FulfillmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dine-in" => Ok(FulfillmentType::DineIn),
            "takeaway" => Ok(FulfillmentType::Takeaway),
            "delivery" => Ok(FulfillmentType::Delivery),
            other => Err(format!("unknown fulfillment type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Digital,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Digital => "digital",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "digital" => Ok(PaymentMethod::Digital),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fulfillment {
    pub kind: FulfillmentType,
    pub delivery_info: Option<DeliveryInfo>,
}

/// One cart line as frozen at submission time. Name, price, image and
/// subtotal are copies and are never re-read from the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub quantity: i32,
    pub selected_modifiers: BTreeMap<String, Value>,
    pub subtotal: f64,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub token: i32,
    pub order_day: NaiveDate,
    pub items: Vec<OrderLineItem>,
    pub total: f64,
    pub fulfillment: Fulfillment,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order header and lines ready to be written in one unit.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub token: i32,
    pub order_day: NaiveDate,
    pub items: Vec<OrderLineItem>,
    pub total: f64,
    pub fulfillment: Fulfillment,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub day: Option<NaiveDate>,
}
