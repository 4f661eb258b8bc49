//! Password hashing and bearer tokens.

pub mod error;
pub mod password;
pub mod token;

pub use error::*;
pub use password::*;
pub use token::*;
