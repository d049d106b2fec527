pub mod admin_order;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod settings;
pub mod stall;
