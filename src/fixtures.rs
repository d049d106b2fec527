//! Test data shared by the unit and HTTP tests.

use crate::auth::jwt::Claims;
use crate::models::inventory::{InventoryItem, Unit};
use crate::models::menu::{Category, Ingredient, MenuItem, Modifier, ModifierKind, ModifierOption};
use crate::models::order::{Fulfillment, FulfillmentType, NewOrder, OrderLineItem, PaymentMethod};
use crate::models::stall::{Stall, StallFlags};
use crate::services::pricing::snapshot_line;
use crate::store::memory::MemoryStore;
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// Stands in for the identity provider: an 8 hour merchant token for `stall_id`.
pub fn sign_token(stall_id: Uuid, secret: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: stall_id.to_string(),
        role: "merchant".into(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(8)).timestamp() as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .unwrap()
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

pub fn stall(accepting: bool) -> Stall {
    Stall {
        id: Uuid::new_v4(),
        stall_name: "Street Bites".into(),
        flags: StallFlags {
            accept_new_orders: Some(accepting),
            ..Default::default()
        },
    }
}

pub fn category(stall_id: Uuid, name: &str, sort_order: i32) -> Category {
    Category {
        id: Uuid::new_v4(),
        stall_id,
        name: name.into(),
        color: "#F59E0B".into(),
        sort_order,
    }
}

pub fn inventory_item(stall_id: Uuid, name: &str, quantity: f64, threshold: f64) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        stall_id,
        name: name.into(),
        quantity,
        unit: Unit::Kg,
        low_stock_threshold: threshold,
    }
}

pub fn menu_item(stall_id: Uuid, name: &str, price: f64) -> MenuItem {
    MenuItem {
        id: Uuid::new_v4(),
        stall_id,
        category_id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        price,
        image_url: None,
        is_available: true,
        is_public: true,
        sort_order: 0,
        ingredients: Vec::new(),
        modifiers: Vec::new(),
    }
}

impl MenuItem {
    pub fn with_ingredient(mut self, inventory_item_id: Uuid, quantity: f64) -> Self {
        self.ingredients.push(Ingredient {
            inventory_item_id,
            quantity,
        });
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

fn toggle(id: &str, name: &str, price: f64) -> Modifier {
    Modifier {
        id: id.into(),
        name: name.into(),
        kind: ModifierKind::Toggle,
        price: Some(price),
        options: Vec::new(),
    }
}

/// 150, with a spice level radio (Extra Hot +10) and extra cheese (+20).
pub fn dynamit_chicken(stall_id: Uuid) -> MenuItem {
    let spice = Modifier {
        id: "spice".into(),
        name: "Spice Level".into(),
        kind: ModifierKind::Radio,
        price: None,
        options: [("Mild", 0.0), ("Medium", 0.0), ("Hot", 0.0), ("Extra Hot", 10.0)]
            .into_iter()
            .map(|(label, price)| ModifierOption {
                label: label.into(),
                price,
            })
            .collect(),
    };
    menu_item(stall_id, "Dynamit Chicken", 150.0)
        .with_modifier(spice)
        .with_modifier(toggle("extra-cheese", "Extra Cheese", 20.0))
}

/// 180, with extra patty (+50) and cheese (+15).
pub fn sunshine_burger(stall_id: Uuid) -> MenuItem {
    let mut burger = menu_item(stall_id, "Sunshine Burger", 180.0)
        .with_modifier(toggle("extra-patty", "Extra Patty", 50.0))
        .with_modifier(toggle("cheese", "Cheese", 15.0));
    burger.image_url = Some("/images/sunshine-burger.jpg".into());
    burger.sort_order = 1;
    burger
}

pub fn line(item: &MenuItem, quantity: i32) -> OrderLineItem {
    snapshot_line(item, quantity, BTreeMap::new())
}

pub fn new_order(stall_id: Uuid, order_day: NaiveDate, token: i32) -> NewOrder {
    NewOrder {
        id: Uuid::new_v4(),
        stall_id,
        token,
        order_day,
        items: Vec::new(),
        total: 0.0,
        fulfillment: Fulfillment {
            kind: FulfillmentType::Takeaway,
            delivery_info: None,
        },
        payment_method: PaymentMethod::Cash,
        notes: None,
    }
}

pub async fn seed(store: &MemoryStore, stall: &Stall, items: &[MenuItem], inventory: &[InventoryItem]) {
    store.insert_stall(stall.clone()).await;
    for item in items {
        store.insert_menu_item(item.clone()).await;
    }
    for item in inventory {
        store.insert_inventory_item(item.clone()).await;
    }
}
