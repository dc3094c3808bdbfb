//! Protocol implementations
//!
//! This module contains the Chipcon debug command set and the 8051
//! instruction sequences used to reach flash through it.

mod ccdebug;
pub mod opcodes;

pub use ccdebug::*;

#[cfg(test)]
pub(crate) mod test_link;
