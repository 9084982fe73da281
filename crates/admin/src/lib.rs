//! Operator tooling for the IT week service: roster import and badge lists.

pub mod badges;
pub mod error;
pub mod roster;

pub use error::{AdminError, Result};
