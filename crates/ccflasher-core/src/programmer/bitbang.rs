//! Bitbang helpers for the Chipcon two-wire debug port
//!
//! The debug port has a clock line (DC, always driven by the host), a
//! bidirectional data line (DD) and the chip's RESET_N. Programmers that
//! toggle GPIO pins implement [`BitbangDebugPort`] and use the helper
//! functions here to build a [`DebugLink`](super::DebugLink).
//!
//! Timing: the host changes DD after the rising edge of DC and the target
//! samples on the falling edge. When the target answers, it sets DD up on
//! the rising edge and the host samples after the falling edge.

use crate::error::{Error, Result};

/// Number of dummy bytes to clock while waiting for the target to pull
/// DD low before giving up
pub const READY_RETRIES: usize = 16;

/// Trait for low-level bitbang debug port operations
pub trait BitbangDebugPort {
    /// Set the debug clock line
    fn set_dc(&mut self, high: bool);

    /// Drive the debug data line (only meaningful while DD is an output)
    fn set_dd(&mut self, high: bool);

    /// Sample the debug data line (only meaningful while DD is an input)
    fn get_dd(&mut self) -> bool;

    /// Switch DD between output (host drives) and input (target drives)
    fn set_dd_output(&mut self, output: bool);

    /// Assert (drive low) or release RESET_N
    fn set_reset(&mut self, asserted: bool);

    /// Delay for half a clock period
    fn half_period_delay(&self);
}

/// Write a byte to the target (MSB first)
pub fn write_byte<P: BitbangDebugPort + ?Sized>(port: &mut P, byte: u8) {
    for i in (0..8).rev() {
        port.set_dc(true);
        port.set_dd((byte >> i) & 1 != 0);
        port.half_period_delay();
        port.set_dc(false);
        port.half_period_delay();
    }
}

/// Read a byte from the target (MSB first)
pub fn read_byte<P: BitbangDebugPort + ?Sized>(port: &mut P) -> u8 {
    let mut byte = 0u8;
    for _ in 0..8 {
        port.set_dc(true);
        port.half_period_delay();
        port.set_dc(false);
        byte <<= 1;
        if port.get_dd() {
            byte |= 1;
        }
        port.half_period_delay();
    }
    byte
}

/// Wait until the target signals it is ready to answer
///
/// The target holds DD high while it is busy. Each retry clocks out one
/// dummy byte before checking again.
pub fn wait_ready<P: BitbangDebugPort + ?Sized>(port: &mut P) -> Result<()> {
    for _ in 0..READY_RETRIES {
        if !port.get_dd() {
            return Ok(());
        }
        read_byte(port);
    }
    log::debug!("debug port: target never pulled DD low");
    Err(Error::Timeout)
}

/// Send a command and read its response
pub fn exchange<P: BitbangDebugPort + ?Sized>(
    port: &mut P,
    command: &[u8],
    response: &mut [u8],
) -> Result<()> {
    port.set_dd_output(true);
    for &byte in command {
        write_byte(port, byte);
    }
    port.set_dd_output(false);

    if response.is_empty() {
        return Ok(());
    }

    port.half_period_delay();
    wait_ready(port)?;
    for byte in response.iter_mut() {
        *byte = read_byte(port);
    }
    Ok(())
}

/// Reset the target into debug mode
pub fn enter_debug_mode<P: BitbangDebugPort + ?Sized>(port: &mut P) {
    port.set_dd_output(true);
    port.set_dd(false);
    port.set_dc(false);
    port.set_reset(true);
    port.half_period_delay();
    for _ in 0..2 {
        port.set_dc(true);
        port.half_period_delay();
        port.set_dc(false);
        port.half_period_delay();
    }
    port.set_reset(false);
    port.half_period_delay();
}

/// Reset the target without clocking DC (leaves debug mode)
pub fn reset_target<P: BitbangDebugPort + ?Sized>(port: &mut P) {
    port.set_dc(false);
    port.set_reset(true);
    port.half_period_delay();
    port.set_reset(false);
    port.half_period_delay();
}
