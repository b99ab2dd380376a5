// src/repositories/mod.rs
//
// Thin query layer over the four collections. Functions return raw
// `sqlx::Error`; callers decide which conditions are user-facing.

pub mod assignments;
pub mod attempts;
pub mod users;
