//! Chip type definitions

use crate::error::{Error, Result};

/// Fill value of erased (or untouched) flash
pub const ERASED_VALUE: u8 = 0xFF;

/// Flash array geometry
///
/// The flash size is always an exact multiple of the page size, which is
/// enforced by [`FlashGeometry::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    flash_size: u32,
    page_size: u32,
}

impl FlashGeometry {
    /// Geometry of the 32 KiB parts (CC1110/CC1111/CC2510/CC2511)
    pub const CC_32K: Self = Self {
        flash_size: 32 * 1024,
        page_size: 1024,
    };

    /// Create a geometry, checking that pages tile the flash exactly
    pub fn new(flash_size: u32, page_size: u32) -> Result<Self> {
        if page_size == 0 || flash_size == 0 || flash_size % page_size != 0 {
            return Err(Error::InvalidGeometry);
        }
        if flash_size / page_size > u16::MAX as u32 {
            return Err(Error::InvalidGeometry);
        }
        Ok(Self {
            flash_size,
            page_size,
        })
    }

    /// Total flash size in bytes
    pub fn flash_size(&self) -> usize {
        self.flash_size as usize
    }

    /// Page size in bytes
    pub fn page_size(&self) -> usize {
        self.page_size as usize
    }

    /// Number of pages in the flash array
    pub fn page_count(&self) -> u16 {
        (self.flash_size / self.page_size) as u16
    }

    /// Byte offset of the first byte of `page`
    pub fn page_offset(&self, page: u16) -> usize {
        page as usize * self.page_size()
    }

    /// Check that `page` addresses an existing page
    pub fn check_page(&self, page: u16) -> Result<()> {
        if page >= self.page_count() {
            return Err(Error::PageOutOfRange { page });
        }
        Ok(())
    }

    /// Check that `page` exists and `len` equals the page size
    pub fn check_page_buffer(&self, page: u16, len: usize) -> Result<()> {
        self.check_page(page)?;
        if len != self.page_size() {
            return Err(Error::BufferSize {
                expected: self.page_size(),
                actual: len,
            });
        }
        Ok(())
    }
}

impl Default for FlashGeometry {
    fn default() -> Self {
        Self::CC_32K
    }
}

/// A known target chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDef {
    /// Chip name (e.g. "CC1110")
    pub name: &'static str,
    /// Chip id returned by the GET_CHIP_ID debug command
    pub chip_id: u8,
    /// Flash geometry
    pub geometry: FlashGeometry,
}

/// Information about the target discovered when a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    /// Chip name
    pub name: &'static str,
    /// Raw chip id
    pub chip_id: u8,
    /// Silicon revision
    pub revision: u8,
    /// Flash geometry
    pub geometry: FlashGeometry,
}

impl TargetInfo {
    /// Build target information from a chip table entry
    pub fn from_def(def: &ChipDef, revision: u8) -> Self {
        Self {
            name: def.name,
            chip_id: def.chip_id,
            revision,
            geometry: def.geometry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_geometry() {
        let geo = FlashGeometry::CC_32K;
        assert_eq!(geo.flash_size(), 32768);
        assert_eq!(geo.page_size(), 1024);
        assert_eq!(geo.page_count(), 32);
        assert_eq!(geo.page_offset(5), 5 * 1024);
    }

    #[test]
    fn test_geometry_must_tile() {
        assert_eq!(FlashGeometry::new(1000, 256), Err(Error::InvalidGeometry));
        assert_eq!(FlashGeometry::new(0, 256), Err(Error::InvalidGeometry));
        assert_eq!(FlashGeometry::new(4096, 0), Err(Error::InvalidGeometry));
        assert!(FlashGeometry::new(4096, 256).is_ok());
    }

    #[test]
    fn test_check_page_buffer() {
        let geo = FlashGeometry::CC_32K;
        assert!(geo.check_page_buffer(31, 1024).is_ok());
        assert_eq!(
            geo.check_page_buffer(32, 1024),
            Err(Error::PageOutOfRange { page: 32 })
        );
        assert_eq!(
            geo.check_page_buffer(0, 512),
            Err(Error::BufferSize {
                expected: 1024,
                actual: 512
            })
        );
    }
}
