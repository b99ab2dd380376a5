// src/models/mod.rs

pub mod assignment;
pub mod attempt;
pub mod test;
pub mod user;
