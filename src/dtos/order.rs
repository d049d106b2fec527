// src/dtos/order.rs
use crate::dtos::menu::PLACEHOLDER_IMAGE;
use crate::models::order::{
    DeliveryInfo, Fulfillment, FulfillmentType, Order, OrderLineItem, OrderStatus, PaymentMethod,
};
use crate::services::pipeline::{CartLine, SubmitOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub selected_modifiers: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentBody {
    #[serde(rename = "type")]
    pub kind: FulfillmentType,
    pub delivery_info: Option<DeliveryInfo>,
}

/// Checkout payload. Fulfillment may come either flat
/// (`fulfillmentType` + `deliveryInfo`) or nested as `fulfillment`.
/// Client-side prices and totals are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub stall_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub fulfillment_type: Option<FulfillmentType>,
    pub delivery_info: Option<DeliveryInfo>,
    pub fulfillment: Option<FulfillmentBody>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// `None` when no fulfillment type was given in either form.
    pub fn into_submission(self) -> Option<SubmitOrder> {
        let fulfillment = match (self.fulfillment, self.fulfillment_type) {
            (Some(body), _) => Fulfillment {
                kind: body.kind,
                delivery_info: body.delivery_info.or(self.delivery_info),
            },
            (None, Some(kind)) => Fulfillment {
                kind,
                delivery_info: self.delivery_info,
            },
            (None, None) => return None,
        };

        Some(SubmitOrder {
            stall_id: self.stall_id,
            items: self
                .items
                .into_iter()
                .map(|i| CartLine {
                    menu_item_id: i.menu_item_id,
                    quantity: i.quantity,
                    selected_modifiers: i.selected_modifiers,
                })
                .collect(),
            fulfillment,
            payment_method: self.payment_method,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub token: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub quantity: i32,
    pub selected_modifiers: BTreeMap<String, Value>,
    pub subtotal: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    #[serde(rename = "type")]
    pub kind: FulfillmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_info: Option<DeliveryInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub token: i32,
    pub items: Vec<OrderItemResponse>,
    pub total: f64,
    pub fulfillment: FulfillmentResponse,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub date: Option<NaiveDate>,
}

impl From<OrderLineItem> for OrderItemResponse {
    fn from(line: OrderLineItem) -> Self {
        Self {
            menu_item_id: line.menu_item_id,
            name: line.name,
            price: line.price,
            image: line.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            quantity: line.quantity,
            selected_modifiers: line.selected_modifiers,
            subtotal: line.subtotal,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            token: order.token,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            total: order.total,
            fulfillment: FulfillmentResponse {
                kind: order.fulfillment.kind,
                delivery_info: order.fulfillment.delivery_info,
            },
            payment_method: order.payment_method,
            status: order.status,
            notes: order.notes,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}
