//! Flash image and page classification

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::chip::{FlashGeometry, ERASED_VALUE};
use crate::error::{Error, Result};

/// Classification of a page's intended contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    /// Every byte is the erased value (0xFF)
    Blank,
    /// At least one byte differs from the erased value
    Dirty,
}

/// Classify a page; stops at the first non-erased byte
pub fn classify_page(data: &[u8]) -> PageClass {
    if data.iter().all(|&b| b == ERASED_VALUE) {
        PageClass::Blank
    } else {
        PageClass::Dirty
    }
}

/// A borrowed page of a [`FlashImage`]
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Zero-based page index
    pub index: u16,
    /// Page contents
    pub data: &'a [u8],
}

impl Page<'_> {
    /// Classify this page
    pub fn classify(&self) -> PageClass {
        classify_page(self.data)
    }

    /// Check whether this page is blank
    pub fn is_blank(&self) -> bool {
        self.classify() == PageClass::Blank
    }
}

/// The intended byte-for-byte contents of the target's flash
///
/// The buffer is always exactly `geometry.flash_size()` bytes. Regions
/// that were never loaded hold the erased value, so an untouched page and
/// a page of 0xFF data look the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashImage {
    geometry: FlashGeometry,
    data: Vec<u8>,
}

impl FlashImage {
    /// Create an image with every byte set to the erased value
    pub fn new(geometry: FlashGeometry) -> Self {
        Self {
            geometry,
            data: vec![ERASED_VALUE; geometry.flash_size()],
        }
    }

    /// Flash geometry of this image
    pub fn geometry(&self) -> FlashGeometry {
        self.geometry
    }

    /// Image contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable image contents (length cannot change)
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Image length in bytes (always the flash size)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// An image is never empty; provided for API completeness
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Set every byte back to the erased value
    pub fn clear(&mut self) {
        self.data.fill(ERASED_VALUE);
    }

    /// Copy `bytes` into the image at `offset`
    ///
    /// # Errors
    /// * `PageOutOfRange` - if any byte would land beyond the flash size
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                self.data[offset..end].copy_from_slice(bytes);
                Ok(())
            }
            None => Err(Error::PageOutOfRange {
                page: (offset / self.geometry.page_size()).min(u16::MAX as usize) as u16,
            }),
        }
    }

    /// Get a page by index
    pub fn page(&self, index: u16) -> Result<Page<'_>> {
        self.geometry.check_page(index)?;
        let start = self.geometry.page_offset(index);
        Ok(Page {
            index,
            data: &self.data[start..start + self.geometry.page_size()],
        })
    }

    /// Get a mutable page buffer by index
    pub fn page_mut(&mut self, index: u16) -> Result<&mut [u8]> {
        self.geometry.check_page(index)?;
        let start = self.geometry.page_offset(index);
        let end = start + self.geometry.page_size();
        Ok(&mut self.data[start..end])
    }

    /// Iterate over all pages in ascending order
    pub fn pages(&self) -> impl Iterator<Item = Page<'_>> + '_ {
        self.data
            .chunks_exact(self.geometry.page_size())
            .enumerate()
            .map(|(i, data)| Page {
                index: i as u16,
                data,
            })
    }

    /// Indices of all pages that contain data
    pub fn dirty_pages(&self) -> impl Iterator<Item = u16> + '_ {
        self.pages().filter(|p| !p.is_blank()).map(|p| p.index)
    }
}

/// Format bytes as contiguous upper-case hex, the way page dumps are
/// printed on verify failures
pub fn hex_string(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for b in data {
        let _ = write!(s, "{:02X}", b);
    }
    s
}
