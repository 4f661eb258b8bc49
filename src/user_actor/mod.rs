//! User accounts: validation, unique e-mail, profile updates.

pub mod entity;
pub mod error;

pub use error::*;
