//! Built-in chip table
//!
//! The CC111x and CC251x families share the same 8051 memory map and
//! flash controller, so one debug protocol implementation covers all of
//! them.

use super::types::{ChipDef, FlashGeometry};

/// All chips known to ccflasher
pub static CHIPS: &[ChipDef] = &[
    ChipDef {
        name: "CC1110",
        chip_id: 0x01,
        geometry: FlashGeometry::CC_32K,
    },
    ChipDef {
        name: "CC1111",
        chip_id: 0x11,
        geometry: FlashGeometry::CC_32K,
    },
    ChipDef {
        name: "CC2510",
        chip_id: 0x81,
        geometry: FlashGeometry::CC_32K,
    },
    ChipDef {
        name: "CC2511",
        chip_id: 0x91,
        geometry: FlashGeometry::CC_32K,
    },
];

/// Look up a chip by its debug chip id
pub fn find_chip_by_id(chip_id: u8) -> Option<&'static ChipDef> {
    CHIPS.iter().find(|c| c.chip_id == chip_id)
}

/// Look up a chip by name (case-insensitive)
pub fn find_chip_by_name(name: &str) -> Option<&'static ChipDef> {
    CHIPS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
