//! Programmer traits and abstractions
//!
//! This module defines the traits that debug interface programmers
//! implement to reach the target.

pub mod bitbang;
mod traits;

pub use bitbang::BitbangDebugPort;
pub use traits::*;
