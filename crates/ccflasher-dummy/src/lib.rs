//! ccflasher-dummy - In-memory target emulator for testing
//!
//! This crate provides a dummy debug transport that emulates a target's
//! flash array in memory. It's useful for testing and development without
//! real hardware, and can inject faults at chosen pages to exercise the
//! error paths of the program/verify pipeline.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use ccflasher_core::chip::{find_chip_by_id, FlashGeometry, TargetInfo, ERASED_VALUE};
use ccflasher_core::error::{Error, Result};
use ccflasher_core::programmer::DebugTransport;

/// Configuration for the dummy target
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Chip id reported by `init`
    pub chip_id: u8,
    /// Silicon revision reported by `init`
    pub revision: u8,
    /// Flash size in bytes
    pub flash_size: u32,
    /// Erase/program page size in bytes
    pub page_size: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            chip_id: 0x01, // CC1110
            revision: 0x03,
            flash_size: 32 * 1024,
            page_size: 1024,
        }
    }
}

/// Faults to inject into the dummy target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultConfig {
    /// `init` fails
    pub fail_init: bool,
    /// `mass_erase` fails
    pub fail_erase: bool,
    /// `write_page` fails for this page
    pub fail_write_page: Option<u16>,
    /// `read_page` fails for this page
    pub fail_read_page: Option<u16>,
    /// `read_page` returns one flipped bit for this page
    pub corrupt_read_page: Option<u16>,
}

/// A call made on the dummy transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyOp {
    /// `init`
    Init,
    /// `mass_erase`
    MassErase,
    /// `write_page`
    WritePage(u16),
    /// `read_page`
    ReadPage(u16),
    /// `reset`
    Reset,
}

/// Dummy debug transport
///
/// Emulates a target's flash in memory. Programming can only clear bits,
/// so writing a page that was not erased leaves the AND of old and new
/// contents, like the real flash controller.
pub struct DummyTarget {
    config: DummyConfig,
    faults: FaultConfig,
    data: Vec<u8>,
    ops: Vec<DummyOp>,
}

impl DummyTarget {
    /// Create a new dummy target with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![ERASED_VALUE; config.flash_size as usize];
        Self {
            config,
            faults: FaultConfig::default(),
            data,
            ops: Vec::new(),
        }
    }

    /// Create a new dummy target with default configuration (CC1110)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy target with pre-filled flash contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut target = Self::new(config);
        let len = core::cmp::min(initial_data.len(), target.data.len());
        target.data[..len].copy_from_slice(&initial_data[..len]);
        target
    }

    /// Set the faults to inject
    pub fn with_faults(mut self, faults: FaultConfig) -> Self {
        self.faults = faults;
        self
    }

    /// Get a reference to the flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get the injected faults
    pub fn faults_mut(&mut self) -> &mut FaultConfig {
        &mut self.faults
    }

    /// Every call made so far, in order
    pub fn ops(&self) -> &[DummyOp] {
        &self.ops
    }

    /// Forget the recorded calls
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn page_range(&self, page: u16, len: usize) -> Result<core::ops::Range<usize>> {
        let page_size = self.config.page_size as usize;
        let start = page as usize * page_size;
        if start + page_size > self.data.len() {
            return Err(Error::PageOutOfRange { page });
        }
        if len != page_size {
            return Err(Error::BufferSize {
                expected: page_size,
                actual: len,
            });
        }
        Ok(start..start + page_size)
    }
}

impl DebugTransport for DummyTarget {
    fn init(&mut self) -> Result<TargetInfo> {
        self.ops.push(DummyOp::Init);
        if self.faults.fail_init {
            log::debug!("dummy: injected init failure");
            return Err(Error::TransportInit);
        }

        let geometry = FlashGeometry::new(self.config.flash_size, self.config.page_size)?;
        let name = find_chip_by_id(self.config.chip_id)
            .map(|c| c.name)
            .unwrap_or("DUMMY");
        Ok(TargetInfo {
            name,
            chip_id: self.config.chip_id,
            revision: self.config.revision,
            geometry,
        })
    }

    fn mass_erase(&mut self) -> Result<()> {
        self.ops.push(DummyOp::MassErase);
        if self.faults.fail_erase {
            log::debug!("dummy: injected erase failure");
            return Err(Error::Erase);
        }
        self.data.fill(ERASED_VALUE);
        Ok(())
    }

    fn write_page(&mut self, page: u16, data: &[u8]) -> Result<()> {
        self.ops.push(DummyOp::WritePage(page));
        if self.faults.fail_write_page == Some(page) {
            log::debug!("dummy: injected write failure on page {}", page);
            return Err(Error::Write { page });
        }
        let range = self.page_range(page, data.len())?;
        // Flash programming: can only change 1 -> 0
        for (dst, &src) in self.data[range].iter_mut().zip(data) {
            *dst &= src;
        }
        Ok(())
    }

    fn read_page(&mut self, page: u16, buf: &mut [u8]) -> Result<()> {
        self.ops.push(DummyOp::ReadPage(page));
        if self.faults.fail_read_page == Some(page) {
            log::debug!("dummy: injected read failure on page {}", page);
            return Err(Error::Readback { page });
        }
        let range = self.page_range(page, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        if self.faults.corrupt_read_page == Some(page) {
            buf[0] ^= 0x01;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.ops.push(DummyOp::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccflasher_core::flash::{
        program_image, read_image, DeviceSession, FlashImage, NoProgress, ProgramOptions,
    };

    #[test]
    fn test_init_reports_config() {
        let mut target = DummyTarget::new(DummyConfig {
            chip_id: 0x81,
            ..Default::default()
        });
        let info = target.init().unwrap();
        assert_eq!(info.name, "CC2510");
        assert_eq!(info.geometry.page_count(), 32);
    }

    #[test]
    fn test_custom_geometry() {
        let mut target = DummyTarget::new(DummyConfig {
            chip_id: 0x7E,
            flash_size: 8 * 1024,
            page_size: 512,
            ..Default::default()
        });
        let info = target.init().unwrap();
        assert_eq!(info.name, "DUMMY");
        assert_eq!(info.geometry.page_count(), 16);
    }

    #[test]
    fn test_invalid_geometry() {
        let mut target = DummyTarget::new(DummyConfig {
            flash_size: 1000,
            page_size: 256,
            ..Default::default()
        });
        assert_eq!(target.init(), Err(Error::InvalidGeometry));
    }

    #[test]
    fn test_write_only_clears_bits() {
        let mut target = DummyTarget::new_default();
        let mut page = [0xFFu8; 1024];
        page[0] = 0xF0;
        target.write_page(2, &page).unwrap();
        page[0] = 0x0F;
        target.write_page(2, &page).unwrap();
        assert_eq!(target.data()[2 * 1024], 0x00);

        target.mass_erase().unwrap();
        assert!(target.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_bad_page_and_buffer() {
        let mut target = DummyTarget::new_default();
        let mut buf = [0u8; 1024];
        assert_eq!(
            target.read_page(32, &mut buf),
            Err(Error::PageOutOfRange { page: 32 })
        );
        assert!(matches!(
            target.write_page(0, &buf[..10]),
            Err(Error::BufferSize { .. })
        ));
    }

    #[test]
    fn test_corrupt_read() {
        let mut target = DummyTarget::new_default().with_faults(FaultConfig {
            corrupt_read_page: Some(1),
            ..Default::default()
        });
        let mut buf = [0u8; 1024];
        target.read_page(1, &mut buf).unwrap();
        assert_eq!(buf[0], 0xFE);
        target.read_page(0, &mut buf).unwrap();
        assert_eq!(buf[0], 0xFF);
    }

    #[test]
    fn test_records_ops() {
        let mut target = DummyTarget::new_default();
        let mut image = FlashImage::new(FlashGeometry::CC_32K);
        image.write_at(3 * 1024, b"hello").unwrap();

        let session = DeviceSession::open(&mut target).unwrap();
        program_image(session, &image, &ProgramOptions::default(), &mut NoProgress).unwrap();

        assert_eq!(
            target.ops(),
            [
                DummyOp::Init,
                DummyOp::MassErase,
                DummyOp::WritePage(3),
                DummyOp::ReadPage(3),
                DummyOp::Reset
            ]
        );
        assert_eq!(target.data(), image.as_bytes());
    }

    #[test]
    fn test_read_round_trip() {
        let contents: Vec<u8> = (0..32 * 1024).map(|i| (i * 7) as u8).collect();
        let mut target = DummyTarget::with_data(DummyConfig::default(), &contents);

        let session = DeviceSession::open(&mut target).unwrap();
        let readback = read_image(session, 31, &mut NoProgress).unwrap();
        assert_eq!(readback.bytes(), &contents[..]);
    }

    #[test]
    fn test_injected_erase_failure() {
        let mut target = DummyTarget::new_default().with_faults(FaultConfig {
            fail_erase: true,
            ..Default::default()
        });
        let image = FlashImage::new(FlashGeometry::CC_32K);
        let session = DeviceSession::open(&mut target).unwrap();
        assert_eq!(
            program_image(session, &image, &ProgramOptions::default(), &mut NoProgress),
            Err(Error::Erase)
        );
        assert_eq!(target.ops().last(), Some(&DummyOp::Reset));
    }

    #[test]
    fn test_injected_init_failure() {
        let mut target = DummyTarget::new_default().with_faults(FaultConfig {
            fail_init: true,
            ..Default::default()
        });
        assert!(matches!(
            DeviceSession::open(&mut target),
            Err(Error::TransportInit)
        ));
        assert_eq!(target.ops(), [DummyOp::Init]);
    }
}
