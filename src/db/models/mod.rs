//! Database models split into domain-specific modules.

pub mod goal;
pub mod user;

pub use goal::*;
pub use user::*;
