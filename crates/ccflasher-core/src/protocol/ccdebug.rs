//! Chipcon debug protocol implementation
//!
//! Command sequences for the CC111x/CC251x debug interface. Flash is not
//! memory mapped for the debugger, so reads and writes are performed by
//! feeding 8051 instructions to the halted CPU with DEBUG_INSTR:
//!
//! - reads walk DPTR over code memory with `MOVC A,@A+DPTR`
//! - writes stage the page in SRAM and let DMA channel 0 feed the flash
//!   controller, which is the only way to keep up with its write timing

use super::opcodes::*;
use crate::error::{Error, Result};
use crate::programmer::DebugLink;
use bitflags::bitflags;

/// Number of status polls while waiting for a chip erase
pub const ERASE_POLLS: usize = 200;
/// Delay between chip erase polls
pub const ERASE_POLL_INTERVAL_US: u32 = 1000;
/// Number of FCTL polls while waiting for a page write
pub const WRITE_POLLS: usize = 100;
/// Delay between FCTL polls
pub const WRITE_POLL_INTERVAL_US: u32 = 500;
/// Number of polls while waiting for the crystal oscillator
pub const XOSC_POLLS: usize = 100;

bitflags! {
    /// Debug status byte returned by READ_STATUS, HALT and friends
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugStatus: u8 {
        /// Chip erase finished
        const CHIP_ERASE_DONE   = 1 << 7;
        /// PCON.IDLE is set
        const PCON_IDLE         = 1 << 6;
        /// CPU is halted
        const CPU_HALTED        = 1 << 5;
        /// Chip is in power mode 0
        const POWER_MODE_0      = 1 << 4;
        /// Halt was caused by a breakpoint or HALT command
        const HALT_STATUS       = 1 << 3;
        /// Debug lock bit is set; only CHIP_ERASE is accepted
        const DEBUG_LOCKED      = 1 << 2;
        /// Oscillators are stable
        const OSCILLATOR_STABLE = 1 << 1;
        /// Stack overflow occurred
        const STACK_OVERFLOW    = 1 << 0;
    }
}

bitflags! {
    /// Debug configuration byte written by WR_CONFIG
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugConfig: u8 {
        /// Disable timers while halted
        const TIMERS_OFF          = 1 << 3;
        /// Pause DMA while halted
        const DMA_PAUSE           = 1 << 2;
        /// Suspend timers while halted
        const TIMER_SUSPEND       = 1 << 1;
        /// Map the flash information page instead of page 0
        const SEL_FLASH_INFO_PAGE = 1 << 0;
    }
}

/// Read the chip id and revision
///
/// Returns (chip_id, revision) on success.
pub fn get_chip_id<L: DebugLink + ?Sized>(link: &mut L) -> Result<(u8, u8)> {
    let mut resp = [0u8; 2];
    link.exchange(&[GET_CHIP_ID], &mut resp)?;
    Ok((resp[0], resp[1]))
}

/// Read the debug status byte
pub fn read_status<L: DebugLink + ?Sized>(link: &mut L) -> Result<DebugStatus> {
    let mut resp = [0u8; 1];
    link.exchange(&[READ_STATUS], &mut resp)?;
    Ok(DebugStatus::from_bits_retain(resp[0]))
}

/// Halt the CPU
pub fn halt<L: DebugLink + ?Sized>(link: &mut L) -> Result<DebugStatus> {
    let mut resp = [0u8; 1];
    link.exchange(&[HALT], &mut resp)?;
    Ok(DebugStatus::from_bits_retain(resp[0]))
}

/// Write the debug configuration byte
pub fn write_config<L: DebugLink + ?Sized>(
    link: &mut L,
    config: DebugConfig,
) -> Result<DebugStatus> {
    let mut resp = [0u8; 1];
    link.exchange(&[WR_CONFIG, config.bits()], &mut resp)?;
    Ok(DebugStatus::from_bits_retain(resp[0]))
}

/// Execute a single 8051 instruction (1-3 bytes) on the halted CPU
///
/// Returns the accumulator after the instruction.
pub fn debug_instr<L: DebugLink + ?Sized>(link: &mut L, instr: &[u8]) -> Result<u8> {
    debug_assert!(
        (1..=3).contains(&instr.len()),
        "8051 instructions are 1-3 bytes"
    );
    let mut cmd = [0u8; 4];
    cmd[0] = DEBUG_INSTR | instr.len() as u8;
    cmd[1..=instr.len()].copy_from_slice(instr);

    let mut resp = [0u8; 1];
    link.exchange(&cmd[..=instr.len()], &mut resp)?;
    Ok(resp[0])
}

/// Erase the entire flash array and wait for completion
pub fn chip_erase<L: DebugLink + ?Sized>(link: &mut L) -> Result<()> {
    let mut resp = [0u8; 1];
    link.exchange(&[CHIP_ERASE], &mut resp)?;

    for _ in 0..ERASE_POLLS {
        link.delay_us(ERASE_POLL_INTERVAL_US);
        if read_status(link)?.contains(DebugStatus::CHIP_ERASE_DONE) {
            return Ok(());
        }
    }

    log::debug!("chip erase: CHIP_ERASE_DONE never set");
    Err(Error::Timeout)
}

/// Load DPTR with a 16-bit address
pub fn set_dptr<L: DebugLink + ?Sized>(link: &mut L, addr: u16) -> Result<()> {
    let [hi, lo] = addr.to_be_bytes();
    debug_instr(link, &[MOV_DPTR_IMM, hi, lo])?;
    Ok(())
}

/// Write a special function register
pub fn write_sfr<L: DebugLink + ?Sized>(link: &mut L, sfr: u8, value: u8) -> Result<()> {
    debug_instr(link, &[MOV_DIRECT_IMM, sfr, value])?;
    Ok(())
}

/// Read a special function register
pub fn read_sfr<L: DebugLink + ?Sized>(link: &mut L, sfr: u8) -> Result<u8> {
    debug_instr(link, &[MOV_A_DIRECT, sfr])
}

/// Read code memory (flash) starting at `addr`
pub fn read_code<L: DebugLink + ?Sized>(link: &mut L, addr: u16, buf: &mut [u8]) -> Result<()> {
    set_dptr(link, addr)?;
    for byte in buf.iter_mut() {
        debug_instr(link, &[CLR_A])?;
        *byte = debug_instr(link, &[MOVC_A_DPTR])?;
        debug_instr(link, &[INC_DPTR])?;
    }
    Ok(())
}

/// Write XDATA memory (SRAM or memory-mapped registers) starting at `addr`
pub fn write_xdata<L: DebugLink + ?Sized>(link: &mut L, addr: u16, data: &[u8]) -> Result<()> {
    set_dptr(link, addr)?;
    for &byte in data {
        debug_instr(link, &[MOV_A_IMM, byte])?;
        debug_instr(link, &[MOVX_DPTR_A])?;
        debug_instr(link, &[INC_DPTR])?;
    }
    Ok(())
}

/// Switch the system clock to the 26 MHz crystal
///
/// Flash write timing (FWT) assumes the crystal clock.
pub fn select_xosc<L: DebugLink + ?Sized>(link: &mut L) -> Result<()> {
    write_sfr(link, SFR_CLKCON, CLKCON_XOSC)?;
    for _ in 0..XOSC_POLLS {
        if read_sfr(link, SFR_SLEEP)? & SLEEP_XOSC_STB != 0 {
            return Ok(());
        }
        link.delay_us(100);
    }
    log::debug!("crystal oscillator did not stabilise");
    Err(Error::Timeout)
}

/// Build a DMA descriptor that copies `len` bytes from SRAM at `src`
/// into FWDATA, one byte per flash trigger
pub fn flash_dma_descriptor(src: u16, len: u16) -> [u8; 8] {
    let [src_hi, src_lo] = src.to_be_bytes();
    let [dst_hi, dst_lo] = XDATA_FWDATA.to_be_bytes();
    [
        src_hi,
        src_lo,
        dst_hi,
        dst_lo,
        // VLEN = 0 (use LEN), LEN[12:8]
        ((len >> 8) & 0x1F) as u8,
        len as u8,
        // WORDSIZE = byte, TMODE = single, TRIG = FLASH
        DMA_TRIG_FLASH,
        // SRCINC = 1, DESTINC = 0, IRQMASK = 0, M8 = 0, PRIORITY = high
        0x42,
    ]
}

/// Program one flash page
///
/// The page must already be erased. `page_size` is the chip's erase page
/// size; flash addresses are given to the controller in 16-bit words.
pub fn write_flash_page<L: DebugLink + ?Sized>(
    link: &mut L,
    page: u16,
    page_size: usize,
    data: &[u8],
) -> Result<()> {
    if data.len() != page_size {
        return Err(Error::BufferSize {
            expected: page_size,
            actual: data.len(),
        });
    }

    let desc_addr = XDATA_PAGE_BUFFER + page_size as u16;
    write_xdata(link, XDATA_PAGE_BUFFER, data)?;
    write_xdata(
        link,
        desc_addr,
        &flash_dma_descriptor(XDATA_PAGE_BUFFER, page_size as u16),
    )?;

    let [desc_hi, desc_lo] = desc_addr.to_be_bytes();
    write_sfr(link, SFR_DMA0CFGH, desc_hi)?;
    write_sfr(link, SFR_DMA0CFGL, desc_lo)?;

    let word_addr = ((page as usize * page_size) / 2) as u16;
    let [faddr_hi, faddr_lo] = word_addr.to_be_bytes();
    write_sfr(link, SFR_FADDRH, faddr_hi)?;
    write_sfr(link, SFR_FADDRL, faddr_lo)?;
    write_sfr(link, SFR_FWT, FWT_26MHZ)?;

    // Arm channel 0, then start the write
    write_sfr(link, SFR_DMAARM, 0x01)?;
    write_sfr(link, SFR_FCTL, FCTL_WRITE)?;

    for _ in 0..WRITE_POLLS {
        if read_sfr(link, SFR_FCTL)? & FCTL_BUSY == 0 {
            return Ok(());
        }
        link.delay_us(WRITE_POLL_INTERVAL_US);
    }

    log::debug!("page {}: flash controller stayed busy", page);
    Err(Error::Timeout)
}
