//! Domain models

pub mod copy;
pub mod patron;
pub mod title;
