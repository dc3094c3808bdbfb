//! Debug command bytes, 8051 opcodes and register addresses

// Debug commands. The low bits of some commands carry arguments.

/// Erase the whole flash array (also clears the debug lock)
pub const CHIP_ERASE: u8 = 0x14;
/// Write the debug configuration byte
pub const WR_CONFIG: u8 = 0x1D;
/// Read the debug configuration byte
pub const RD_CONFIG: u8 = 0x24;
/// Read the debug status byte
pub const READ_STATUS: u8 = 0x34;
/// Halt the CPU
pub const HALT: u8 = 0x44;
/// Resume the CPU
pub const RESUME: u8 = 0x4C;
/// Execute 1-3 instruction bytes; OR the byte count into the low bits
pub const DEBUG_INSTR: u8 = 0x54;
/// Read the chip id and revision
pub const GET_CHIP_ID: u8 = 0x68;

// 8051 instructions issued through DEBUG_INSTR

/// NOP
pub const NOP: u8 = 0x00;
/// MOV DPTR,#data16
pub const MOV_DPTR_IMM: u8 = 0x90;
/// INC DPTR
pub const INC_DPTR: u8 = 0xA3;
/// CLR A
pub const CLR_A: u8 = 0xE4;
/// MOVC A,@A+DPTR
pub const MOVC_A_DPTR: u8 = 0x93;
/// MOVX A,@DPTR
pub const MOVX_A_DPTR: u8 = 0xE0;
/// MOVX @DPTR,A
pub const MOVX_DPTR_A: u8 = 0xF0;
/// MOV A,#data
pub const MOV_A_IMM: u8 = 0x74;
/// MOV A,direct
pub const MOV_A_DIRECT: u8 = 0xE5;
/// MOV direct,#data
pub const MOV_DIRECT_IMM: u8 = 0x75;

// Special function registers (CC111x/CC251x)

/// Flash write timing
pub const SFR_FWT: u8 = 0xAB;
/// Flash address low byte (word address)
pub const SFR_FADDRL: u8 = 0xAC;
/// Flash address high byte (word address)
pub const SFR_FADDRH: u8 = 0xAD;
/// Flash control
pub const SFR_FCTL: u8 = 0xAE;
/// Sleep mode control (oscillator status)
pub const SFR_SLEEP: u8 = 0xBE;
/// Clock control
pub const SFR_CLKCON: u8 = 0xC6;
/// DMA channel 0 descriptor address low byte
pub const SFR_DMA0CFGL: u8 = 0xD4;
/// DMA channel 0 descriptor address high byte
pub const SFR_DMA0CFGH: u8 = 0xD5;
/// DMA channel arm
pub const SFR_DMAARM: u8 = 0xD6;

/// FCTL: flash controller busy
pub const FCTL_BUSY: u8 = 0x80;
/// FCTL: start a write
pub const FCTL_WRITE: u8 = 0x02;
/// SLEEP: high-speed crystal oscillator stable
pub const SLEEP_XOSC_STB: u8 = 0x40;
/// CLKCON: 32 kHz RC, high-speed crystal, full speed
pub const CLKCON_XOSC: u8 = 0x80;
/// FWT value for a 26 MHz system clock
pub const FWT_26MHZ: u8 = 0x22;

// XDATA map

/// Flash write data register as seen from XDATA (DMA destination)
pub const XDATA_FWDATA: u16 = 0xDFAF;
/// Start of on-chip SRAM used to stage a page
pub const XDATA_PAGE_BUFFER: u16 = 0xF000;

/// DMA trigger number for the flash controller
pub const DMA_TRIG_FLASH: u8 = 18;
