//! Instruction-level target emulator for protocol tests
//!
//! Understands just enough of the debug command set and the 8051
//! instructions issued by `ccdebug` to model code memory, XDATA, SFRs
//! and the DMA-driven flash write.

use super::opcodes::*;
use super::DebugStatus;
use crate::error::{Error, Result};
use crate::programmer::DebugLink;
use alloc::vec;
use alloc::vec::Vec;

pub(crate) struct EmulatedLink {
    pub chip_id: u8,
    pub revision: u8,
    pub code: Vec<u8>,
    pub xdata: Vec<u8>,
    pub sfr: [u8; 256],
    pub commands: Vec<Vec<u8>>,
    pub status: DebugStatus,
    /// READ_STATUS polls needed before a chip erase completes
    pub erase_polls_needed: usize,
    /// FCTL.BUSY never clears
    pub flash_stuck_busy: bool,
    /// Every exchange fails once set
    pub dead: bool,
    pub debug_entries: usize,
    pub resets: usize,
    dptr: u16,
    acc: u8,
    erase_polls: Option<usize>,
}

impl EmulatedLink {
    pub fn new(chip_id: u8, revision: u8) -> Self {
        Self {
            chip_id,
            revision,
            code: vec![0xFF; 32 * 1024],
            xdata: vec![0; 0x10000],
            sfr: [0; 256],
            commands: Vec::new(),
            status: DebugStatus::OSCILLATOR_STABLE,
            erase_polls_needed: 1,
            flash_stuck_busy: false,
            dead: false,
            debug_entries: 0,
            resets: 0,
            dptr: 0,
            acc: 0,
            erase_polls: None,
        }
    }

    fn execute(&mut self, instr: &[u8]) {
        match *instr {
            [MOV_DPTR_IMM, hi, lo] => self.dptr = u16::from_be_bytes([hi, lo]),
            [INC_DPTR] => self.dptr = self.dptr.wrapping_add(1),
            [CLR_A] => self.acc = 0,
            [MOVC_A_DPTR] => {
                let addr = self.dptr as usize + self.acc as usize;
                self.acc = self.code.get(addr).copied().unwrap_or(0xFF);
            }
            [MOV_A_IMM, value] => self.acc = value,
            [MOVX_DPTR_A] => self.xdata[self.dptr as usize] = self.acc,
            [MOVX_A_DPTR] => self.acc = self.xdata[self.dptr as usize],
            [MOV_A_DIRECT, sfr] => self.acc = self.read_sfr(sfr),
            [MOV_DIRECT_IMM, sfr, value] => {
                self.sfr[sfr as usize] = value;
                if sfr == SFR_FCTL && value & FCTL_WRITE != 0 {
                    self.run_flash_dma();
                }
            }
            _ => {}
        }
    }

    fn read_sfr(&self, sfr: u8) -> u8 {
        match sfr {
            SFR_FCTL if self.flash_stuck_busy => FCTL_BUSY,
            SFR_FCTL => self.sfr[SFR_FCTL as usize] & !FCTL_BUSY,
            SFR_SLEEP => SLEEP_XOSC_STB,
            _ => self.sfr[sfr as usize],
        }
    }

    fn run_flash_dma(&mut self) {
        if self.sfr[SFR_DMAARM as usize] & 0x01 == 0 {
            return;
        }
        let desc = u16::from_be_bytes([
            self.sfr[SFR_DMA0CFGH as usize],
            self.sfr[SFR_DMA0CFGL as usize],
        ]) as usize;
        let d = &self.xdata[desc..desc + 8];
        let src = u16::from_be_bytes([d[0], d[1]]) as usize;
        let dst = u16::from_be_bytes([d[2], d[3]]);
        let len = (((d[4] & 0x1F) as usize) << 8) | d[5] as usize;
        if dst != XDATA_FWDATA {
            return;
        }

        let faddr = u16::from_be_bytes([
            self.sfr[SFR_FADDRH as usize],
            self.sfr[SFR_FADDRL as usize],
        ]) as usize
            * 2;
        for i in 0..len {
            // Programming only clears bits
            self.code[faddr + i] &= self.xdata[src + i];
        }
        self.sfr[SFR_DMAARM as usize] = 0;
    }
}

impl DebugLink for EmulatedLink {
    fn enter_debug_mode(&mut self) -> Result<()> {
        self.debug_entries += 1;
        Ok(())
    }

    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<()> {
        if self.dead {
            return Err(Error::Timeout);
        }
        self.commands.push(command.to_vec());

        match command[0] {
            GET_CHIP_ID => {
                response[0] = self.chip_id;
                response[1] = self.revision;
            }
            READ_STATUS => {
                if let Some(polls) = self.erase_polls.as_mut() {
                    *polls += 1;
                    if *polls >= self.erase_polls_needed {
                        self.code.iter_mut().for_each(|b| *b = 0xFF);
                        self.status.insert(DebugStatus::CHIP_ERASE_DONE);
                        self.erase_polls = None;
                    }
                }
                response[0] = self.status.bits();
            }
            HALT => {
                self.status.insert(DebugStatus::CPU_HALTED);
                response[0] = self.status.bits();
            }
            WR_CONFIG => response[0] = self.status.bits(),
            CHIP_ERASE => {
                self.status.remove(DebugStatus::CHIP_ERASE_DONE);
                self.status.remove(DebugStatus::DEBUG_LOCKED);
                self.erase_polls = Some(0);
                response[0] = self.status.bits();
            }
            cmd if cmd & 0xFC == DEBUG_INSTR => {
                self.execute(&command[1..]);
                response[0] = self.acc;
            }
            _ => {}
        }
        Ok(())
    }

    fn reset_target(&mut self) {
        self.resets += 1;
    }

    fn delay_us(&mut self, _us: u32) {}
}
