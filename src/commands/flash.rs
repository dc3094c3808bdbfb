//! Flash and write commands
//!
//! Both load an image first, then erase the target once and program it
//! page by page. They differ only in how the image is loaded.

use super::progress::IndicatifProgress;
use super::CommandError;
use crate::cli::Config;
use ccflasher_core::chip::FlashGeometry;
use ccflasher_core::flash::{program_image, DeviceSession, FlashImage};
use ccflasher_core::loader;
use ccflasher_core::programmer::DebugTransport;
use ccflasher_flash::open_session;
use std::path::Path;

/// Program an Intel HEX image
pub fn run_flash(config: &Config, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = loader::load_hex(input, FlashGeometry::default())?;
    println!(
        "Loaded {}: {} page(s) with data",
        input.display(),
        image.dirty_pages().count()
    );
    let session = open_session(&config.programmer)?;
    program(session, &image, config)
}

/// Program a raw dump
pub fn run_write(config: &Config, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = loader::load_dump(input, FlashGeometry::default(), config.dump_overflow)?;
    println!(
        "Loaded {}: {} page(s) with data",
        input.display(),
        image.dirty_pages().count()
    );
    let session = open_session(&config.programmer)?;
    program(session, &image, config)
}

/// Erase, program and verify `image` on an open session
pub fn program<T: DebugTransport>(
    session: DeviceSession<T>,
    image: &FlashImage,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Target: {} (chip id 0x{:02X}, rev 0x{:02X})",
        session.target().name,
        session.target().chip_id,
        session.target().revision
    );

    let mut progress = IndicatifProgress::new(session.geometry().page_count());
    let stats = program_image(session, image, &config.program, &mut progress)?;

    if !stats.verified() {
        return Err(CommandError::VerifyFailed {
            pages: stats.mismatched_pages,
        }
        .into());
    }
    Ok(())
}
