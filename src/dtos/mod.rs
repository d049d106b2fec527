pub mod inventory;
pub mod menu;
pub mod order;
pub mod stall;
