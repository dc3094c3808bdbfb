//! Target chip types and database
//!
//! This module describes the flash geometry of the supported targets and
//! provides the table used to identify a target from its debug chip id.

mod database;
mod types;

pub use database::*;
pub use types::*;
