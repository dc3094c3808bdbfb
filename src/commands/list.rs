//! List command implementation

use ccflasher_core::chip::CHIPS;
use ccflasher_flash::available_programmers;

/// List all available programmers and supported chips
pub fn list_programmers() {
    println!("Available programmers:");
    println!();
    for programmer in available_programmers() {
        let aliases = if programmer.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", programmer.aliases.join(", "))
        };
        let root = if programmer.requires_root {
            " [may need root]"
        } else {
            ""
        };
        println!(
            "  {:<12} {}{}{}",
            programmer.name, programmer.description, aliases, root
        );
    }

    println!();
    println!("Supported chips:");
    println!();
    println!("{:<10} {:>8} {:>10} {:>10}", "Name", "Chip ID", "Flash", "Page");
    println!("{}", "-".repeat(42));
    for chip in CHIPS {
        println!(
            "{:<10} {:>8} {:>10} {:>10}",
            chip.name,
            format!("0x{:02X}", chip.chip_id),
            format_size(chip.geometry.flash_size()),
            format_size(chip.geometry.page_size())
        );
    }
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(32 * 1024), "32 KiB");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2 * 1024 * 1024), "2 MiB");
    }
}
