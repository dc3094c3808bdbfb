//! Linux GPIO Chipcon debug port implementation
//!
//! This module provides the `LinuxGpioDebug` struct that drives the
//! Chipcon two-wire debug interface (DC, DD and RESET_N) by bit-banging
//! GPIO lines through Linux's GPIO character device interface (gpiocdev).
//!
//! DD is bidirectional: it is an output while the host sends a command and
//! is turned around to an input while the target answers.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use ccflasher_core::error::Result as CoreResult;
use ccflasher_core::programmer::bitbang::{self, BitbangDebugPort};
use ccflasher_core::programmer::DebugLink;

/// Default half-period delay in nanoseconds (~500 kHz debug clock)
const DEFAULT_HALF_PERIOD_NS: u64 = 1000;

/// Default GPIO chip (Raspberry Pi header)
pub const DEFAULT_DEVICE: &str = "/dev/gpiochip0";
/// Default DC line (Raspberry Pi header)
pub const DEFAULT_DC: Offset = 24;
/// Default DD line (Raspberry Pi header)
pub const DEFAULT_DD: Offset = 25;
/// Default RESET_N line (Raspberry Pi header)
pub const DEFAULT_RESET: Offset = 23;

/// Configuration for opening a Linux GPIO debug port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxGpioDebugConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// DC (debug clock) GPIO line offset
    pub dc: Offset,
    /// DD (debug data) GPIO line offset
    pub dd: Offset,
    /// RESET_N GPIO line offset
    pub reset: Offset,
    /// Half-period delay in nanoseconds
    pub half_period_ns: u64,
}

impl Default for LinuxGpioDebugConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            dc: DEFAULT_DC,
            dd: DEFAULT_DD,
            reset: DEFAULT_RESET,
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
        }
    }
}

impl LinuxGpioDebugConfig {
    /// Create a new configuration with the given device path and pins
    pub fn new(device: impl Into<String>, dc: Offset, dd: Offset, reset: Offset) -> Self {
        Self {
            device: device.into(),
            dc,
            dd,
            reset,
            ..Default::default()
        }
    }

    /// Set the half-period delay in nanoseconds
    pub fn with_half_period_ns(mut self, ns: u64) -> Self {
        self.half_period_ns = ns;
        self
    }
}

fn level(high: bool) -> Value {
    if high {
        Value::Active
    } else {
        Value::Inactive
    }
}

/// Chipcon debug port driven over Linux GPIO lines
///
/// Implements `BitbangDebugPort` for the bit-level signalling and
/// `DebugLink` on top of it, so it can be wrapped in a
/// `ccflasher_core::flash::CcDebugDevice`.
pub struct LinuxGpioDebug {
    /// GPIO line request handle
    request: Request,
    dc: Offset,
    dd: Offset,
    reset: Offset,
    /// Last level driven on DC
    dc_high: bool,
    /// Last level driven on RESET_N (true = asserted, line low)
    reset_asserted: bool,
    /// Whether DD is currently an output
    dd_output: bool,
    /// Half-period delay in nanoseconds
    half_period_ns: u64,
}

impl LinuxGpioDebug {
    /// Open a Linux GPIO debug port with the given configuration
    pub fn open(config: &LinuxGpioDebugConfig) -> Result<Self> {
        if config.dc == config.dd || config.dc == config.reset || config.dd == config.reset {
            return Err(LinuxGpioError::InvalidParameter(
                "dc, dd and reset must be different lines".to_string(),
            ));
        }

        log::debug!("linux_gpio: Opening device {}", config.device);

        // Initial state: DC low, DD input, RESET_N released (high)
        let mut req_config = Config::default();
        req_config.with_line(config.dc).as_output(Value::Inactive);
        req_config.with_line(config.dd).as_input();
        req_config.with_line(config.reset).as_output(Value::Active);

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer("ccflasher")
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: config.device.clone(),
                source,
            })?;

        log::info!(
            "linux_gpio: Opened {} (dc={}, dd={}, reset={})",
            config.device,
            config.dc,
            config.dd,
            config.reset
        );

        Ok(Self {
            request,
            dc: config.dc,
            dd: config.dd,
            reset: config.reset,
            dc_high: false,
            reset_asserted: false,
            dd_output: false,
            half_period_ns: config.half_period_ns,
        })
    }

    fn set_line(&self, offset: Offset, value: Value, name: &str) {
        if let Err(e) = self.request.set_value(offset, value) {
            log::error!("Failed to set {}: {}", name, e);
        }
    }
}

impl BitbangDebugPort for LinuxGpioDebug {
    fn set_dc(&mut self, high: bool) {
        self.dc_high = high;
        self.set_line(self.dc, level(high), "DC");
    }

    fn set_dd(&mut self, high: bool) {
        self.set_line(self.dd, level(high), "DD");
    }

    fn get_dd(&mut self) -> bool {
        match self.request.value(self.dd) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("Failed to get DD: {}", e);
                false
            }
        }
    }

    fn set_dd_output(&mut self, output: bool) {
        if self.dd_output == output {
            return;
        }

        // The request is reconfigured as a whole, so restate DC and RESET_N
        let mut cfg = Config::default();
        cfg.with_line(self.dc).as_output(level(self.dc_high));
        cfg.with_line(self.reset)
            .as_output(level(!self.reset_asserted));
        if output {
            cfg.with_line(self.dd).as_output(Value::Inactive);
        } else {
            cfg.with_line(self.dd).as_input();
        }

        if let Err(e) = self.request.reconfigure(&cfg) {
            log::error!(
                "Failed to configure DD as {}: {}",
                if output { "output" } else { "input" },
                e
            );
        }
        self.dd_output = output;
    }

    fn set_reset(&mut self, asserted: bool) {
        // RESET_N is active low
        self.reset_asserted = asserted;
        self.set_line(self.reset, level(!asserted), "RESET_N");
    }

    fn half_period_delay(&self) {
        if self.half_period_ns > 0 {
            std::thread::sleep(std::time::Duration::from_nanos(self.half_period_ns));
        }
    }
}

impl DebugLink for LinuxGpioDebug {
    fn enter_debug_mode(&mut self) -> CoreResult<()> {
        bitbang::enter_debug_mode(self);
        Ok(())
    }

    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> CoreResult<()> {
        bitbang::exchange(self, command, response)
    }

    fn reset_target(&mut self) {
        bitbang::reset_target(self);
        // Leave DD floating so the running firmware owns the pin
        self.set_dd_output(false);
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

fn parse_line(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidLineNumber {
            name,
            value: value.to_string(),
        })
}

/// Parse programmer options from a list of key-value pairs
///
/// Options that are not given keep the Raspberry Pi header defaults
/// (`dev=/dev/gpiochip0,dc=24,dd=25,reset=23`).
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `dc=N` - DC (debug clock) GPIO line offset
/// - `dd=N` - DD (debug data) GPIO line offset
/// - `reset=N` - RESET_N GPIO line offset
/// - `delay_ns=N` - Half-period delay in nanoseconds
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioDebugConfig> {
    let mut config = LinuxGpioDebugConfig::default();
    let mut dev: Option<String> = None;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => dev = Some(value.to_string()),
            "gpiochip" => {
                gpiochip = Some(value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("Invalid gpiochip value: {}", value))
                })?);
            }
            "dc" => config.dc = parse_line("dc", value)?,
            "dd" => config.dd = parse_line("dd", value)?,
            "reset" => config.reset = parse_line("reset", value)?,
            "delay_ns" => {
                config.half_period_ns = value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("Invalid delay_ns value: {}", value))
                })?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    match (dev, gpiochip) {
        (Some(_), Some(_)) => {
            return Err(LinuxGpioError::InvalidParameter(
                "Only one of 'dev' or 'gpiochip' can be specified".to_string(),
            ))
        }
        (Some(dev), None) => config.device = dev,
        (None, Some(n)) => config.device = format!("/dev/gpiochip{}", n),
        (None, None) => {}
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!((config.dc, config.dd, config.reset), (24, 25, 23));
        assert_eq!(config.half_period_ns, DEFAULT_HALF_PERIOD_NS);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_options(&[("dd", "17"), ("delay_ns", "0")]).unwrap();
        assert_eq!(config.dd, 17);
        assert_eq!(config.dc, DEFAULT_DC);
        assert_eq!(config.reset, DEFAULT_RESET);
        assert_eq!(config.half_period_ns, 0);
    }

    #[test]
    fn test_gpiochip_number() {
        let config = parse_options(&[("gpiochip", "4")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip4");

        let config = parse_options(&[("dev", "/dev/gpiochip2")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip2");
    }

    #[test]
    fn test_dev_and_gpiochip_conflict() {
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("gpiochip", "0")]),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bad_line_number() {
        assert!(matches!(
            parse_options(&[("dc", "abc")]),
            Err(LinuxGpioError::InvalidLineNumber { name: "dc", .. })
        ));
    }

    #[test]
    fn test_open_rejects_shared_lines() {
        let config = LinuxGpioDebugConfig::new("/dev/gpiochip0", 5, 5, 6);
        assert!(matches!(
            LinuxGpioDebug::open(&config),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }
}
