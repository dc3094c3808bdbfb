//! ccflasher - Chipcon CC111x/CC251x flash programmer
//!
//! Programs, verifies and reads back the flash of 8051-core Chipcon radio
//! SoCs over their two-wire debug interface.
//!
//! # Architecture
//!
//! The CLI builds a [`cli::Config`] once and hands it to one command:
//! - **flash** (`-f`) loads an Intel HEX image and programs it
//! - **write** (`-w`) loads a raw dump and programs it
//! - **read** (`-r`) reads pages `0..=N` into a raw dump
//!
//! Programming always mass erases once, then writes and verifies each
//! page that holds data. The programmer registry in `ccflasher-flash`
//! hides the concrete debug transport.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Config, Operation};

fn main() {
    let cli = Cli::parse();

    // Initialize logger, verbosity raises the default level
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.config();
    log::debug!("{:?}", config);

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match &config.operation {
        Operation::Flash(input) => commands::flash::run_flash(config, input),
        Operation::Write(input) => commands::flash::run_write(config, input),
        Operation::Read(output) => commands::read::run_read(config, output),
        Operation::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    }
}
