// src/dtos/stall.rs
use crate::models::stall::{Stall, StallFlags};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view used by checkout to decide which options to offer.
#[derive(Debug, Serialize)]
pub struct StallSettingsResponse {
    pub enable_delivery: bool,
    pub enable_dine_in: bool,
    pub enable_digital_payment: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminSettingsResponse {
    pub id: Uuid,
    pub stall_name: String,
    pub accept_new_orders: bool,
    pub enable_digital_menu: bool,
    pub enable_delivery: bool,
    pub enable_dine_in: bool,
    pub enable_digital_payment: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStallSettingsRequest {
    pub accept_new_orders: Option<bool>,
    pub enable_digital_menu: Option<bool>,
    pub enable_delivery: Option<bool>,
    pub enable_dine_in: Option<bool>,
    pub enable_digital_payment: Option<bool>,
}

impl From<&StallFlags> for StallSettingsResponse {
    fn from(flags: &StallFlags) -> Self {
        Self {
            enable_delivery: flags.delivery_enabled(),
            enable_dine_in: flags.dine_in_enabled(),
            enable_digital_payment: flags.digital_payment_enabled(),
        }
    }
}

impl From<Stall> for AdminSettingsResponse {
    fn from(stall: Stall) -> Self {
        Self {
            id: stall.id,
            accept_new_orders: stall.flags.accepts_orders(),
            enable_digital_menu: stall.flags.digital_menu_enabled(),
            enable_delivery: stall.flags.delivery_enabled(),
            enable_dine_in: stall.flags.dine_in_enabled(),
            enable_digital_payment: stall.flags.digital_payment_enabled(),
            stall_name: stall.stall_name,
        }
    }
}

impl From<UpdateStallSettingsRequest> for StallFlags {
    fn from(req: UpdateStallSettingsRequest) -> Self {
        Self {
            accept_new_orders: req.accept_new_orders,
            enable_digital_menu: req.enable_digital_menu,
            enable_delivery: req.enable_delivery,
            enable_dine_in: req.enable_dine_in,
            enable_digital_payment: req.enable_digital_payment,
        }
    }
}

impl UpdateStallSettingsRequest {
    pub fn is_empty(&self) -> bool {
        [
            self.accept_new_orders,
            self.enable_digital_menu,
            self.enable_delivery,
            self.enable_dine_in,
            self.enable_digital_payment,
        ]
        .iter()
        .all(Option::is_none)
    }
}
