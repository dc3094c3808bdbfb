//! Program/verify and read-back pipelines
//!
//! Both pipelines walk the flash one page at a time in ascending order
//! and stop at the first hard failure. Per-page outcomes are reported as
//! they happen through [`ProgramProgress`] and [`ReadProgress`].

use alloc::vec;
use alloc::vec::Vec;

use super::image::{hex_string, FlashImage};
use super::session::DeviceSession;
use crate::error::{Error, Result};
use crate::programmer::DebugTransport;

/// What to do with pages whose intended contents are all 0xFF
///
/// An all-0xFF page is indistinguishable from a page that was never
/// loaded. Right after a mass erase both already hold the right
/// contents, so skipping them is safe but also means such pages are
/// never verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankPagePolicy {
    /// Skip blank pages entirely
    #[default]
    Skip,
    /// Write and verify every page
    Program,
}

/// What to do when a page reads back differently from what was written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyPolicy {
    /// Stop with `Error::Verify` on the first mismatch
    #[default]
    Abort,
    /// Record the page and keep programming
    Continue,
}

/// Options for [`program_pages`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Blank page handling
    pub blank_pages: BlankPagePolicy,
    /// Verify failure handling
    pub verify: VerifyPolicy,
}

/// Statistics from a program operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStats {
    /// Number of pages in the image
    pub pages_total: u16,
    /// Pages skipped as blank
    pub pages_skipped: u16,
    /// Pages written and read back
    pub pages_programmed: u16,
    /// Pages whose read-back did not match (only with `VerifyPolicy::Continue`)
    pub mismatched_pages: Vec<u16>,
}

impl ProgramStats {
    /// True if every programmed page verified
    pub fn verified(&self) -> bool {
        self.mismatched_pages.is_empty()
    }
}

/// Progress callback for program operations
pub trait ProgramProgress {
    /// Called before the mass erase
    fn erasing(&mut self);

    /// Called when a blank page is skipped
    fn page_skipped(&mut self, page: u16);

    /// Called before a page is written
    fn page_programming(&mut self, page: u16);

    /// Called when a page read back correctly
    fn page_verified(&mut self, page: u16);

    /// Called when a page read back differently; `actual` is what the
    /// device returned
    fn verify_mismatch(&mut self, page: u16, actual: &[u8], expected: &[u8]);

    /// Called after the last page
    fn complete(&mut self, stats: &ProgramStats);
}

/// Progress callback for read operations
pub trait ReadProgress {
    /// Called before the first page with the number of pages to read
    fn reading(&mut self, pages: u16);

    /// Called before a page is read
    fn page_reading(&mut self, page: u16);

    /// Called after each page
    fn page_read(&mut self, page: u16, data: &[u8]);

    /// Called when reading stopped at the page limit with pages remaining
    fn limit_reached(&mut self, limit: u16);
}

/// A no-op progress reporter
pub struct NoProgress;

impl ProgramProgress for NoProgress {
    fn erasing(&mut self) {}
    fn page_skipped(&mut self, _page: u16) {}
    fn page_programming(&mut self, _page: u16) {}
    fn page_verified(&mut self, _page: u16) {}
    fn verify_mismatch(&mut self, _page: u16, _actual: &[u8], _expected: &[u8]) {}
    fn complete(&mut self, _stats: &ProgramStats) {}
}

impl ReadProgress for NoProgress {
    fn reading(&mut self, _pages: u16) {}
    fn page_reading(&mut self, _page: u16) {}
    fn page_read(&mut self, _page: u16, _data: &[u8]) {}
    fn limit_reached(&mut self, _limit: u16) {}
}

/// Erase the target and program every page of `image` that needs it
///
/// Runs a single mass erase, then for each page in ascending order either
/// skips it (blank, with `BlankPagePolicy::Skip`) or writes it, reads it
/// back and compares. The session is left open; see [`program_image`].
///
/// # Errors
/// * `GeometryMismatch` - image and target disagree on geometry
/// * `Erase`, `Write`, `Readback` - the device operation failed
/// * `Verify` - read-back mismatch with `VerifyPolicy::Abort`
pub fn program_pages<T: DebugTransport, P: ProgramProgress>(
    session: &mut DeviceSession<T>,
    image: &FlashImage,
    options: &ProgramOptions,
    progress: &mut P,
) -> Result<ProgramStats> {
    let geometry = image.geometry();
    if geometry != session.geometry() {
        log::error!(
            "Image is {} bytes in {} byte pages, target has {} bytes in {} byte pages",
            geometry.flash_size(),
            geometry.page_size(),
            session.geometry().flash_size(),
            session.geometry().page_size()
        );
        return Err(Error::GeometryMismatch);
    }

    let mut stats = ProgramStats {
        pages_total: geometry.page_count(),
        ..Default::default()
    };

    progress.erasing();
    session.mass_erase()?;

    let mut verbuf = vec![0u8; geometry.page_size()];
    for page in image.pages() {
        if options.blank_pages == BlankPagePolicy::Skip && page.is_blank() {
            log::debug!("Page {} is all 0xFF, treating it as blank", page.index);
            progress.page_skipped(page.index);
            stats.pages_skipped += 1;
            continue;
        }

        progress.page_programming(page.index);
        session.write_page(page.index, page.data)?;
        session.read_page(page.index, &mut verbuf)?;
        stats.pages_programmed += 1;

        if verbuf.as_slice() == page.data {
            progress.page_verified(page.index);
            continue;
        }

        progress.verify_mismatch(page.index, &verbuf, page.data);
        match options.verify {
            VerifyPolicy::Abort => return Err(Error::Verify { page: page.index }),
            VerifyPolicy::Continue => {
                log::warn!("Page {} failed verification, continuing", page.index);
                stats.mismatched_pages.push(page.index);
            }
        }
    }

    progress.complete(&stats);
    Ok(stats)
}

/// Program `image` and end the session
///
/// The target is reset when programming finishes and also when it fails
/// part way, leaving the device partially programmed.
pub fn program_image<T: DebugTransport, P: ProgramProgress>(
    mut session: DeviceSession<T>,
    image: &FlashImage,
    options: &ProgramOptions,
    progress: &mut P,
) -> Result<ProgramStats> {
    let stats = program_pages(&mut session, image, options, progress)?;
    session.finish();
    Ok(stats)
}

/// Result of a read operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBack {
    image: FlashImage,
    pages_read: u16,
}

impl ReadBack {
    /// Number of pages read from the device
    pub fn pages_read(&self) -> u16 {
        self.pages_read
    }

    /// The bytes that were read, in page order
    pub fn bytes(&self) -> &[u8] {
        let len = self.pages_read as usize * self.image.geometry().page_size();
        &self.image.as_bytes()[..len]
    }

    /// Full-size image; pages that were not read hold 0xFF
    pub fn image(&self) -> &FlashImage {
        &self.image
    }
}

/// Read pages `0..=limit`, clamped to the page count
///
/// Exactly `min(limit + 1, page_count)` pages are read. There is no blank
/// skipping on this path.
pub fn read_pages<T: DebugTransport, P: ReadProgress>(
    session: &mut DeviceSession<T>,
    limit: u16,
    progress: &mut P,
) -> Result<ReadBack> {
    let geometry = session.geometry();
    let page_count = geometry.page_count();
    let pages = (limit as u32 + 1).min(page_count as u32) as u16;

    let mut image = FlashImage::new(geometry);
    progress.reading(pages);

    for page in 0..pages {
        progress.page_reading(page);
        let buf = image.page_mut(page)?;
        session.read_page(page, buf)?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("page {}: {}", page, hex_string(buf));
        }
        progress.page_read(page, buf);
    }

    if pages < page_count {
        progress.limit_reached(limit);
    }

    Ok(ReadBack {
        image,
        pages_read: pages,
    })
}

/// Read pages `0..=limit` and end the session
pub fn read_image<T: DebugTransport, P: ReadProgress>(
    mut session: DeviceSession<T>,
    limit: u16,
    progress: &mut P,
) -> Result<ReadBack> {
    let readback = read_pages(&mut session, limit, progress)?;
    session.finish();
    Ok(readback)
}
