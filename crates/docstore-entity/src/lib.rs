//! # docstore-entity
//!
//! Domain entity models for DocStore. Database entities derive
//! `sqlx::FromRow` alongside `Serialize`/`Deserialize`.

pub mod document;
