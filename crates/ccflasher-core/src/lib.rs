//! ccflasher-core - Core library for Chipcon CC111x/CC251x flash programming
//!
//! This crate provides the page-oriented pipeline used to program, verify
//! and read back the flash of 8051-core Chipcon radio SoCs over their
//! two-wire debug interface. It is designed to be `no_std` compatible
//! (with `alloc`) so the protocol and pipeline can run on a microcontroller
//! acting as the programmer.
//!
//! # Features
//!
//! - `std` - Enable standard library support, the [`loader`] module and
//!   `std::error::Error` for [`Error`]
//!
//! # Example
//!
//! ```ignore
//! use ccflasher_core::flash::{self, CcDebugDevice, DeviceSession, NoProgress};
//!
//! fn dump<L: DebugLink>(link: L) -> ccflasher_core::Result<Vec<u8>> {
//!     let session = DeviceSession::open(CcDebugDevice::new(link))?;
//!     let readback = flash::read_image(session, 31, &mut NoProgress)?;
//!     Ok(readback.bytes().to_vec())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod error;
pub mod flash;
#[cfg(feature = "std")]
pub mod loader;
pub mod programmer;
pub mod protocol;

pub use error::{Error, Result};
