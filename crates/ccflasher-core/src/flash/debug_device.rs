//! Chipcon debug interface as a page transport
//!
//! [`CcDebugDevice`] adapts any [`DebugLink`] (raw command exchange) into
//! a [`DebugTransport`] (page operations) using the command sequences in
//! [`crate::protocol`].

use crate::chip::{find_chip_by_id, FlashGeometry, TargetInfo};
use crate::error::{Error, Result};
use crate::programmer::{DebugLink, DebugTransport};
use crate::protocol::{self, DebugConfig, DebugStatus};

/// Debug configuration used while the CPU is halted
const HALTED_CONFIG: DebugConfig = DebugConfig::TIMERS_OFF
    .union(DebugConfig::DMA_PAUSE)
    .union(DebugConfig::TIMER_SUSPEND);

/// A CC111x/CC251x target reached through a debug link
pub struct CcDebugDevice<L: DebugLink> {
    link: L,
    geometry: FlashGeometry,
    locked: bool,
    prepared: bool,
}

impl<L: DebugLink> CcDebugDevice<L> {
    /// Wrap a debug link; nothing is sent until `init`
    pub fn new(link: L) -> Self {
        Self {
            link,
            geometry: FlashGeometry::default(),
            locked: false,
            prepared: false,
        }
    }

    /// Borrow the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Whether the target reported the debug lock bit
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Halt the CPU and switch to the crystal so flash can be accessed
    fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }
        let status = protocol::halt(&mut self.link)?;
        log::trace!("halt: status {:?}", status);
        protocol::write_config(&mut self.link, HALTED_CONFIG)?;
        protocol::select_xosc(&mut self.link)?;
        self.prepared = true;
        Ok(())
    }

    fn page_address(&self, page: u16) -> Result<u16> {
        self.geometry.check_page(page)?;
        u16::try_from(self.geometry.page_offset(page)).map_err(|_| Error::PageOutOfRange { page })
    }
}

impl<L: DebugLink> DebugTransport for CcDebugDevice<L> {
    fn init(&mut self) -> Result<TargetInfo> {
        self.link.enter_debug_mode()?;
        let (chip_id, revision) = protocol::get_chip_id(&mut self.link)?;
        log::debug!("GET_CHIP_ID: 0x{:02X} rev 0x{:02X}", chip_id, revision);

        if chip_id == 0x00 || chip_id == 0xFF {
            log::error!("No target answered on the debug interface");
            return Err(Error::TransportInit);
        }
        let chip = find_chip_by_id(chip_id).ok_or(Error::UnsupportedChip { chip_id })?;
        self.geometry = chip.geometry;

        let status = protocol::read_status(&mut self.link)?;
        log::debug!("Debug status: {:?}", status);
        self.locked = status.contains(DebugStatus::DEBUG_LOCKED);
        self.prepared = false;
        if self.locked {
            log::warn!("{} is debug locked, only a mass erase is possible", chip.name);
        } else {
            self.prepare()?;
        }

        Ok(TargetInfo::from_def(chip, revision))
    }

    fn mass_erase(&mut self) -> Result<()> {
        protocol::chip_erase(&mut self.link)?;
        if self.locked {
            // Erase clears the lock bit
            self.locked = false;
        }
        self.prepare()
    }

    fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        if self.locked {
            return Err(Error::Write { page });
        }
        self.page_address(page)?;
        protocol::write_flash_page(&mut self.link, page, self.geometry.page_size(), data)
    }

    fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()> {
        if self.locked {
            return Err(Error::Readback { page });
        }
        let addr = self.page_address(page)?;
        self.geometry.check_page_buffer(page, buf.len())?;
        protocol::read_code(&mut self.link, addr, buf)
    }

    fn reset(&mut self) {
        self.prepared = false;
        self.link.reset_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::{
        program_image, read_image, DeviceSession, FlashImage, NoProgress, ProgramOptions,
    };
    use crate::protocol::opcodes::{CHIP_ERASE, HALT, WR_CONFIG};
    use crate::protocol::test_link::EmulatedLink;

    #[test]
    fn test_init_identifies_chip() {
        let mut device = CcDebugDevice::new(EmulatedLink::new(0x91, 0x02));
        let info = device.init().unwrap();
        assert_eq!(info.name, "CC2511");
        assert_eq!(info.revision, 0x02);
        assert_eq!(info.geometry, FlashGeometry::CC_32K);

        let link = device.link();
        assert_eq!(link.debug_entries, 1);
        assert!(link.commands.iter().any(|c| c[0] == HALT));
        assert!(link
            .commands
            .iter()
            .any(|c| c[..] == [WR_CONFIG, HALTED_CONFIG.bits()]));
    }

    #[test]
    fn test_init_no_target() {
        for id in [0x00, 0xFF] {
            let mut device = CcDebugDevice::new(EmulatedLink::new(id, 0x00));
            assert_eq!(device.init(), Err(Error::TransportInit));
        }
    }

    #[test]
    fn test_init_unknown_chip() {
        let mut device = CcDebugDevice::new(EmulatedLink::new(0x42, 0x00));
        assert_eq!(
            device.init(),
            Err(Error::UnsupportedChip { chip_id: 0x42 })
        );
    }

    #[test]
    fn test_locked_chip_needs_erase() {
        let mut link = EmulatedLink::new(0x01, 0x00);
        link.status.insert(DebugStatus::DEBUG_LOCKED);
        let mut device = CcDebugDevice::new(link);
        device.init().unwrap();
        assert!(device.is_locked());
        assert!(!device.link().commands.iter().any(|c| c[0] == HALT));

        let mut buf = [0u8; 1024];
        assert_eq!(device.read_page(0, &mut buf), Err(Error::Readback { page: 0 }));

        device.mass_erase().unwrap();
        assert!(!device.is_locked());
        assert!(device.link().commands.iter().any(|c| c[0] == CHIP_ERASE));
        assert!(device.read_page(0, &mut buf).is_ok());
    }

    #[test]
    fn test_program_and_read_back_through_link() {
        let mut device = CcDebugDevice::new(EmulatedLink::new(0x01, 0x03));
        device.link_mut().code.fill(0x00);

        let mut image = FlashImage::new(FlashGeometry::CC_32K);
        image.write_at(0, b"\x02\x00\x06").unwrap();
        image.write_at(5 * 1024, &[0xA5; 1024]).unwrap();

        let session = DeviceSession::open(&mut device).unwrap();
        let stats =
            program_image(session, &image, &ProgramOptions::default(), &mut NoProgress).unwrap();
        assert_eq!(stats.pages_programmed, 2);
        assert_eq!(device.link().code, image.as_bytes());
        assert_eq!(device.link().resets, 1);

        let session = DeviceSession::open(&mut device).unwrap();
        let readback = read_image(session, 5, &mut NoProgress).unwrap();
        assert_eq!(readback.bytes(), &image.as_bytes()[..6 * 1024]);
    }

    #[test]
    fn test_erase_timeout_is_erase_error() {
        let mut link = EmulatedLink::new(0x01, 0x00);
        link.erase_polls_needed = usize::MAX;
        let mut device = CcDebugDevice::new(link);
        let mut session = DeviceSession::open(&mut device).unwrap();
        assert_eq!(session.mass_erase(), Err(Error::Erase));
    }

    #[test]
    fn test_dead_link_write_error() {
        let mut device = CcDebugDevice::new(EmulatedLink::new(0x01, 0x00));
        let mut session = DeviceSession::open(&mut device).unwrap();
        session.transport_mut().link_mut().dead = true;
        assert_eq!(
            session.write_page(1, &[0u8; 1024]),
            Err(Error::Write { page: 1 })
        );
    }
}
