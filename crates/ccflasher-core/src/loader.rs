//! Image loading and dump persistence
//!
//! Builds a [`FlashImage`] from an Intel HEX file or a raw dump, and
//! writes read-back bytes to disk. Nothing here touches the device.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::string::String;
use std::vec::Vec;

use ihex::Record;
use thiserror::Error;

use crate::chip::FlashGeometry;
use crate::flash::FlashImage;

/// What to do with a raw dump that is larger than the flash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpOverflow {
    /// Use the leading bytes and ignore the rest
    #[default]
    Truncate,
    /// Refuse to load the dump
    Reject,
}

/// Errors raised while loading or saving images
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The output file could not be written
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The Intel HEX codec rejected the file
    #[error("invalid Intel HEX: {0}")]
    Hex(#[from] ihex::ReaderError),
    /// A data record lies outside the flash
    #[error("data at 0x{addr:X} ({len} bytes) is outside the {capacity} byte flash")]
    AddressOutOfRange {
        /// Absolute start address of the record
        addr: u32,
        /// Record length
        len: usize,
        /// Flash size
        capacity: usize,
    },
    /// A raw dump is larger than the flash
    #[error("dump is {len} bytes but the flash holds {capacity} bytes")]
    Oversized {
        /// Dump length
        len: u64,
        /// Flash size
        capacity: usize,
    },
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_error(path: &Path) -> impl FnOnce(io::Error) -> LoadError + '_ {
    move |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Load an Intel HEX file into a fresh image
pub fn load_hex(path: &Path, geometry: FlashGeometry) -> Result<FlashImage, LoadError> {
    let mut text = String::new();
    open(path)?
        .read_to_string(&mut text)
        .map_err(read_error(path))?;
    log::debug!("Decoding {} ({} bytes)", path.display(), text.len());
    load_hex_str(&text, geometry)
}

/// Decode Intel HEX text into a fresh image
///
/// Bytes not covered by a data record stay 0xFF.
pub fn load_hex_str(text: &str, geometry: FlashGeometry) -> Result<FlashImage, LoadError> {
    let mut image = FlashImage::new(geometry);
    let mut base_address = 0u32;
    let mut data_bytes = 0usize;

    for record in ihex::Reader::new(text) {
        match record? {
            Record::Data { offset, value } => {
                let addr = base_address + offset as u32;
                image
                    .write_at(addr as usize, &value)
                    .map_err(|_| LoadError::AddressOutOfRange {
                        addr,
                        len: value.len(),
                        capacity: image.len(),
                    })?;
                data_bytes += value.len();
            }
            Record::EndOfFile => break,
            Record::ExtendedSegmentAddress(address) => {
                base_address = (address as u32) * 16;
            }
            Record::StartSegmentAddress { .. } => (),
            Record::ExtendedLinearAddress(address) => {
                base_address = (address as u32) << 16;
            }
            Record::StartLinearAddress(_) => (),
        }
    }

    log::debug!(
        "Loaded {} data bytes, {} dirty pages",
        data_bytes,
        image.dirty_pages().count()
    );
    Ok(image)
}

/// Load a raw dump into a fresh image
///
/// A short dump leaves the tail at 0xFF. A dump longer than the flash is
/// handled according to `overflow`.
pub fn load_dump(
    path: &Path,
    geometry: FlashGeometry,
    overflow: DumpOverflow,
) -> Result<FlashImage, LoadError> {
    let file = open(path)?;
    let capacity = geometry.flash_size();
    let len = file.metadata().map_err(read_error(path))?.len();

    if len > capacity as u64 {
        match overflow {
            DumpOverflow::Reject => return Err(LoadError::Oversized { len, capacity }),
            DumpOverflow::Truncate => log::warn!(
                "{} is {} bytes, only the first {} bytes will be used",
                path.display(),
                len,
                capacity
            ),
        }
    }

    let mut data = Vec::with_capacity(capacity);
    file.take(capacity as u64)
        .read_to_end(&mut data)
        .map_err(read_error(path))?;

    let mut image = FlashImage::new(geometry);
    image.as_bytes_mut()[..data.len()].copy_from_slice(&data);
    log::debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(image)
}

/// Write bytes to `path` in one go, replacing any existing file
pub fn write_dump(path: &Path, data: &[u8]) -> Result<(), LoadError> {
    std::fs::write(path, data).map_err(|source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    })
}
