//! Read command

use super::progress::IndicatifProgress;
use crate::cli::Config;
use ccflasher_core::flash::{read_pages, DeviceSession};
use ccflasher_core::loader;
use ccflasher_core::programmer::DebugTransport;
use ccflasher_flash::open_session;
use std::path::Path;

/// Read pages `0..=config.page_limit` into a raw dump
pub fn run_read(config: &Config, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(&config.programmer)?;
    read_to_file(session, config.page_limit, output)
}

/// Read from an open session, write the dump, then reset the target
pub fn read_to_file<T: DebugTransport>(
    mut session: DeviceSession<T>,
    page_limit: u16,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress = IndicatifProgress::new(session.geometry().page_count());
    let readback = read_pages(&mut session, page_limit, &mut progress)?;
    drop(progress);

    loader::write_dump(output, readback.bytes())?;
    session.finish();

    println!("Number of bytes read: {}", readback.bytes().len());
    println!("Reading completed");
    Ok(())
}
