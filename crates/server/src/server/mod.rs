//! HTTP surface: router and request handlers.

pub mod errors;
pub mod handlers;
pub mod router;
