//! Programmer registry for ccflasher
//!
//! This crate turns a programmer string such as
//! `linux_gpio:dev=/dev/gpiochip0,dc=24,dd=25,reset=23` into an open
//! [`DeviceSession`]. The CLI only deals with sessions and never with the
//! concrete transport types.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        CLI (ccflasher)        │
//! └──────────────────────────────┘
//!                │ open_session("linux_gpio:...")
//!                ▼
//! ┌──────────────────────────────┐
//! │  ccflasher-flash (this crate) │
//! └──────────────────────────────┘
//!        │                  │
//!        ▼                  ▼
//! ┌──────────────┐  ┌──────────────────────┐
//! │ dummy        │  │ linux-gpio           │
//! │ DummyTarget  │  │ CcDebugDevice<Gpio>  │
//! └──────────────┘  └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ccflasher_flash::open_session;
//!
//! let session = open_session("dummy")?;
//! println!("Connected to {}", session.target().name);
//! ```

mod registry;

pub use registry::{
    available_programmers, open_session, open_transport, parse_programmer_params,
    programmer_names_short, BoxedTransport, ProgrammerParams, Session,
};

// Re-export core types that the CLI needs
pub use ccflasher_core::programmer::ProgrammerInfo;
