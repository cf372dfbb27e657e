//! Lumo Bot — conversational engagement bot core.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod engagement;
pub mod error;
pub mod store;
