//! Ordering backend for food stalls.
//!
//! Customers browse a stall's menu, place orders and follow them live over
//! server-sent events. Merchants move orders through the kitchen, keep an eye
//! on ingredient stock and switch stall options on and off.
//!
//! The HTTP layer (`routes`, `handlers`, `dtos`) sits on top of the order
//! services in [`services`], which only talk to storage through
//! [`store::OrderStore`].

pub mod auth;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use routes::create_router;
