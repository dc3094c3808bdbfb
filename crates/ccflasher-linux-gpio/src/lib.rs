//! ccflasher-linux-gpio - Chipcon debug interface over Linux GPIO
//!
//! This crate drives the two-wire debug interface of Chipcon
//! CC111x/CC251x chips by bit-banging GPIO lines through the Linux
//! character device GPIO interface (gpiocdev).
//!
//! # Usage with ccflasher CLI
//!
//! ```bash
//! # Raspberry Pi header defaults (gpiochip0, DC=24, DD=25, RESET_N=23)
//! ccflasher -p linux_gpio -r dump.bin
//!
//! # Explicit pins on another chip
//! ccflasher -p linux_gpio:gpiochip=1,dc=4,dd=5,reset=6 -f firmware.hex
//!
//! # Slower clock for long wires
//! ccflasher -p linux_gpio:delay_ns=5000 -f firmware.hex
//! ```
//!
//! # GPIO Pin Wiring
//!
//! | Target Pin | GPIO Function     | Description                   |
//! |------------|-------------------|-------------------------------|
//! | P2_2 (DC)  | DC (output)       | Debug clock                   |
//! | P2_1 (DD)  | DD (bidirectional)| Debug data                    |
//! | RESET_N    | RESET (output)    | Reset, active low             |
//! | GND        | GND               | Ground                        |
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioDebug, LinuxGpioDebugConfig};
pub use error::{LinuxGpioError, Result};

use ccflasher_core::flash::CcDebugDevice;

/// Open a Linux GPIO debug port and wrap it as a page transport
///
/// This is a convenience function for use in the CLI programmer dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from programmer string parsing
pub fn open_linux_gpio(options: &[(&str, &str)]) -> Result<CcDebugDevice<LinuxGpioDebug>> {
    let config = parse_options(options)?;
    let port = LinuxGpioDebug::open(&config)?;
    Ok(CcDebugDevice::new(port))
}
