//! API handlers for circulation REST endpoints

pub mod health;
pub mod loans;
pub mod openapi;
pub mod titles;
