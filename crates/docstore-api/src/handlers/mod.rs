//! HTTP request handlers.

pub mod document;
pub mod health;
