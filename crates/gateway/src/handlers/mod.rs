//! API handlers module

pub mod extract;
pub mod health;
pub mod papers;
pub mod webhooks;
