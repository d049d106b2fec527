pub mod demo;
pub mod inventory;
pub mod pipeline;
pub mod pricing;
pub mod status;
pub mod stream;
pub mod token;
