//! Error types for ccflasher-core
//!
//! The core error type is `no_std` compatible and `Copy`. Failures that
//! carry file-system detail (image loading) live in the `loader` module
//! instead.

use core::fmt;

/// Core error type
///
/// Every variant is fatal to the operation that produced it; nothing in
/// the pipeline retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Session errors
    /// The debug transport could not be opened or the target did not
    /// answer (commonly missing permissions on the GPIO device)
    TransportInit,
    /// The target answered with a chip id that is not in the chip table
    UnsupportedChip {
        /// Raw chip id returned by GET_CHIP_ID
        chip_id: u8,
    },

    // Operation errors
    /// Mass erase failed or did not complete
    Erase,
    /// Programming a page failed
    Write {
        /// Page index
        page: u16,
    },
    /// Reading a page back from the device failed
    Readback {
        /// Page index
        page: u16,
    },
    /// Programmed content does not match the intended content
    Verify {
        /// Page index
        page: u16,
    },
    /// Debug link did not become ready in time
    Timeout,

    // Geometry errors
    /// Flash size is zero or not a multiple of the page size
    InvalidGeometry,
    /// Image geometry does not match the connected target
    GeometryMismatch,
    /// Page index is beyond the end of the flash array
    PageOutOfRange {
        /// Page index
        page: u16,
    },
    /// Buffer length does not match the page size
    BufferSize {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportInit => write!(
                f,
                "failed to initialise debug interface (check permissions on the GPIO device)"
            ),
            Self::UnsupportedChip { chip_id } => {
                write!(f, "unsupported chip id 0x{:02X}", chip_id)
            }
            Self::Erase => write!(f, "mass erase failed"),
            Self::Write { page } => write!(f, "programming page {} failed", page),
            Self::Readback { page } => write!(f, "reading page {} failed", page),
            Self::Verify { page } => write!(f, "verify failed on page {}", page),
            Self::Timeout => write!(f, "debug interface timed out"),
            Self::InvalidGeometry => {
                write!(f, "flash size must be a non-zero multiple of the page size")
            }
            Self::GeometryMismatch => {
                write!(f, "image size does not match the target's flash geometry")
            }
            Self::PageOutOfRange { page } => write!(f, "page {} is out of range", page),
            Self::BufferSize { expected, actual } => write!(
                f,
                "buffer is {} bytes, expected {} bytes",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
