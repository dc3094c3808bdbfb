//! CLI command implementations
//!
//! Each command opens its own session through the programmer registry and
//! reports per-page progress through [`progress::IndicatifProgress`].

mod error;
pub mod flash;
mod list;
pub mod progress;
pub mod read;

pub use error::CommandError;
pub use list::list_programmers;
