//! Programmer trait definitions
//!
//! There are two levels:
//! - [`DebugLink`] moves raw debug command bytes to and from the target.
//!   Bit-level programmers (GPIO bitbang) implement this and get the
//!   Chipcon command set for free through `CcDebugDevice`.
//! - [`DebugTransport`] is the page-level interface the program/verify
//!   pipeline drives. Emulators implement it directly.

use crate::chip::TargetInfo;
use crate::error::Result;

/// Byte-level access to the two-wire debug port
pub trait DebugLink {
    /// Put the target into debug mode
    ///
    /// This is the reset sequence: hold RESET_N low, give two rising
    /// edges on DC, then release RESET_N.
    fn enter_debug_mode(&mut self) -> Result<()>;

    /// Send one debug command and read its response
    ///
    /// `command` is the command byte followed by its inputs. `response`
    /// is filled with the output bytes; an empty slice reads nothing.
    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<()>;

    /// Pulse RESET_N without clocking DC so the target leaves debug mode
    /// and starts running its firmware
    fn reset_target(&mut self);

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

impl<L: DebugLink + ?Sized> DebugLink for alloc::boxed::Box<L> {
    fn enter_debug_mode(&mut self) -> Result<()> {
        (**self).enter_debug_mode()
    }

    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<()> {
        (**self).exchange(command, response)
    }

    fn reset_target(&mut self) {
        (**self).reset_target()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Page-level debug transport
///
/// `init` must be called once before any other method. Page indices are
/// zero based and buffers are exactly one page long.
pub trait DebugTransport {
    /// Open the debug session and identify the target
    ///
    /// # Errors
    /// * `TransportInit` - the target did not answer
    /// * `UnsupportedChip` - the target is not in the chip table
    fn init(&mut self) -> Result<TargetInfo>;

    /// Erase the entire flash array to 0xFF
    fn mass_erase(&mut self) -> Result<()>;

    /// Program one page (the page must already be erased)
    fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()>;

    /// Read one page into `buf`
    fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()>;

    /// Leave debug mode and let the target run
    ///
    /// Best effort: failures are logged by the implementation.
    fn reset(&mut self);
}

impl<T: DebugTransport + ?Sized> DebugTransport for alloc::boxed::Box<T> {
    fn init(&mut self) -> Result<TargetInfo> {
        (**self).init()
    }

    fn mass_erase(&mut self) -> Result<()> {
        (**self).mass_erase()
    }

    fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        (**self).write_page(page, data)
    }

    fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()> {
        (**self).read_page(page, buf)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<T: DebugTransport + ?Sized> DebugTransport for &mut T {
    fn init(&mut self) -> Result<TargetInfo> {
        (**self).init()
    }

    fn mass_erase(&mut self) -> Result<()> {
        (**self).mass_erase()
    }

    fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        (**self).write_page(page, data)
    }

    fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()> {
        (**self).read_page(page, buf)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Information about a programmer
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
    /// Whether this programmer usually requires elevated privileges
    pub requires_root: bool,
}
