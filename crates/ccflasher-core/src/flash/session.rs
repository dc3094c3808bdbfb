//! Device session
//!
//! A [`DeviceSession`] owns an initialized transport for the duration of
//! one operation. It normalizes transport failures to the operation error
//! they represent, checks page indices against the target geometry, and
//! resets the target when the operation ends, whether explicitly through
//! [`DeviceSession::finish`] or implicitly when dropped after a failure.

use crate::chip::{FlashGeometry, TargetInfo};
use crate::error::{Error, Result};
use crate::programmer::DebugTransport;

/// An open connection to one target
pub struct DeviceSession<T: DebugTransport> {
    transport: T,
    target: TargetInfo,
    finished: bool,
}

impl<T: DebugTransport> DeviceSession<T> {
    /// Initialize the transport and identify the target
    ///
    /// # Errors
    /// * `UnsupportedChip` - the target answered with an unknown chip id
    /// * `TransportInit` - any other initialization failure
    pub fn open(mut transport: T) -> Result<Self> {
        let target = match transport.init() {
            Ok(target) => target,
            Err(e @ Error::UnsupportedChip { .. }) => return Err(e),
            Err(e) => {
                log::debug!("transport init failed: {}", e);
                return Err(Error::TransportInit);
            }
        };

        log::info!(
            "Found {} (chip id 0x{:02X}, revision 0x{:02X}), {} pages of {} bytes",
            target.name,
            target.chip_id,
            target.revision,
            target.geometry.page_count(),
            target.geometry.page_size()
        );

        Ok(Self {
            transport,
            target,
            finished: false,
        })
    }

    /// Information about the connected target
    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    /// Flash geometry of the connected target
    pub fn geometry(&self) -> FlashGeometry {
        self.target.geometry
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Erase the whole flash array
    pub fn mass_erase(&mut self) -> Result<()> {
        self.transport.mass_erase().map_err(|e| {
            log::debug!("mass erase failed: {}", e);
            Error::Erase
        })
    }

    /// Program one page; the page must be erased
    pub fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        self.geometry().check_page_buffer(page, data.len())?;
        self.transport.write_page(page, data).map_err(|e| {
            log::debug!("write of page {} failed: {}", page, e);
            Error::Write { page }
        })
    }

    /// Read one page into `buf`
    pub fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()> {
        self.geometry().check_page_buffer(page, buf.len())?;
        self.transport.read_page(page, buf).map_err(|e| {
            log::debug!("read of page {} failed: {}", page, e);
            Error::Readback { page }
        })
    }

    /// End the session and reset the target
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.finished {
            self.finished = true;
            log::debug!("Resetting target");
            self.transport.reset();
        }
    }
}

impl<T: DebugTransport> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        self.release();
    }
}
