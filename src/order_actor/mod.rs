//! Placed orders and their status transitions.

pub mod entity;
pub mod error;

pub use error::*;
