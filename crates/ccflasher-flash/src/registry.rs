//! Programmer registry and initialization
//!
//! This module handles opening programmers by name and wrapping them in a
//! `DeviceSession`.

use ccflasher_core::flash::DeviceSession;
use ccflasher_core::programmer::{DebugTransport, ProgrammerInfo};
use std::collections::HashMap;

/// A type-erased debug transport
pub type BoxedTransport = Box<dyn DebugTransport>;

/// A session over a type-erased transport
pub type Session = DeviceSession<BoxedTransport>;

/// Parsed programmer parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerParams {
    /// Programmer name (canonical)
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl ProgrammerParams {
    /// Parameters as borrowed key/value pairs, the shape backends take
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a programmer string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_programmer_params("linux_gpio:dc=24")?;
/// assert_eq!(params.name, "linux_gpio");
/// assert_eq!(params.params.get("dc"), Some(&"24".to_string()));
/// ```
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    if name.is_empty() {
        return Err("Programmer name is empty".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Open a programmer's transport without initializing the target
///
/// # Arguments
/// * `programmer` - Programmer specification (e.g., "dummy" or "linux_gpio:dc=24")
pub fn open_transport(programmer: &str) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let params = parse_programmer_params(programmer)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" | "gpio" => open_linux_gpio(&params),

        _ => Err(format!(
            "Unknown programmer: {} (available: {})",
            params.name,
            programmer_names_short()
        )
        .into()),
    }
}

/// Open a programmer and initialize the target
///
/// This is the main entry point for the CLI. It handles:
/// 1. Parsing the programmer string
/// 2. Opening the appropriate programmer
/// 3. Entering debug mode and identifying the chip
///
/// The returned session resets the target when finished or dropped.
pub fn open_session(programmer: &str) -> Result<Session, Box<dyn std::error::Error>> {
    let transport = open_transport(programmer)?;
    Ok(DeviceSession::open(transport)?)
}

#[cfg(feature = "dummy")]
fn parse_number<T: TryFrom<u64>>(key: &str, value: &str) -> Result<T, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| format!("Invalid {} value: {}", key, value))
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &ProgrammerParams) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    use ccflasher_dummy::{DummyConfig, DummyTarget, FaultConfig};

    log::info!("Opening dummy programmer...");

    let mut config = DummyConfig::default();
    let mut faults = FaultConfig::default();
    let mut image: Option<&str> = None;

    for (key, value) in params.pairs() {
        match key {
            "chip_id" => config.chip_id = parse_number(key, value)?,
            "size" => config.flash_size = parse_number(key, value)?,
            "page_size" => config.page_size = parse_number(key, value)?,
            "image" => image = Some(value),
            "fail_init" => faults.fail_init = value == "1" || value == "yes",
            "fail_erase" => faults.fail_erase = value == "1" || value == "yes",
            "fail_write" => faults.fail_write_page = Some(parse_number(key, value)?),
            "fail_read" => faults.fail_read_page = Some(parse_number(key, value)?),
            "corrupt" => faults.corrupt_read_page = Some(parse_number(key, value)?),
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    let target = match image {
        Some(path) => {
            let data = std::fs::read(path)
                .map_err(|e| format!("Failed to read dummy image {}: {}", path, e))?;
            DummyTarget::with_data(config, &data)
        }
        None => DummyTarget::new(config),
    };

    Ok(Box::new(target.with_faults(faults)))
}

#[cfg(feature = "linux-gpio")]
fn open_linux_gpio(params: &ProgrammerParams) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    log::info!("Opening Linux GPIO programmer...");

    let device = ccflasher_linux_gpio::open_linux_gpio(&params.pairs()).map_err(|e| {
        format!(
            "Failed to open Linux GPIO debug interface: {}\n\
             Make sure the GPIO chip exists and you have read/write permissions.\n\
             You may need to: sudo usermod -aG gpio $USER",
            e
        )
    })?;

    Ok(Box::new(device))
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory target emulator for testing \
                      (chip_id=, size=, page_size=, image=, fail_write=N, corrupt=N, ...)",
        requires_root: false,
    });

    #[cfg(feature = "linux-gpio")]
    programmers.push(ProgrammerInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpio"],
        description: "Chipcon debug interface bit-banged over /dev/gpiochipN \
                      (dev=, dc=, dd=, reset=, delay_ns=)",
        requires_root: true,
    });

    programmers
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    if programmers.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}
