//! CLI argument parsing

use ccflasher_core::flash::{BlankPagePolicy, ProgramOptions, VerifyPolicy};
use ccflasher_core::loader::DumpOverflow;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Default programmer when neither `-p` nor the environment names one
pub const DEFAULT_PROGRAMMER: &str = "linux_gpio";

/// Default page limit for reads
pub const DEFAULT_PAGE_LIMIT: u16 = 32;

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use, e.g. linux_gpio:dc=24,dd=25,reset=23 [available: {}]",
        ccflasher_flash::programmer_names_short()
    )
}

#[derive(Parser, Debug)]
#[command(name = "ccflasher")]
#[command(author, version, about = "Chipcon CC111x/CC251x flash programmer", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["flash", "read", "write", "list_programmers"])
))]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(
        short,
        long,
        env = "CCFLASHER_PROGRAMMER",
        default_value = DEFAULT_PROGRAMMER,
        help = programmer_help()
    )]
    pub programmer: String,

    /// Program an Intel HEX firmware image
    #[arg(short = 'f', long, value_name = "FILE")]
    pub flash: Option<PathBuf>,

    /// Read flash contents to a raw dump
    #[arg(short = 'r', long, value_name = "FILE")]
    pub read: Option<PathBuf>,

    /// Program a raw dump previously captured with --read
    #[arg(short = 'w', long, value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Highest page index to read (pages 0..=N, clamped to the flash size)
    ///
    /// This is the page cap older Chipcon flashers took as `-p N`; here
    /// `-p` selects the programmer.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub pages: u16,

    /// Write and verify all-0xFF pages instead of skipping them
    #[arg(long)]
    pub program_blank: bool,

    /// Keep programming after a page fails verification
    #[arg(long)]
    pub continue_on_verify_error: bool,

    /// Refuse raw dumps larger than the flash instead of truncating them
    #[arg(long)]
    pub strict_size: bool,

    /// List available programmers and supported chips
    #[arg(long)]
    pub list_programmers: bool,
}

/// The single operation requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Program an Intel HEX image
    Flash(PathBuf),
    /// Program a raw dump
    Write(PathBuf),
    /// Read flash to a raw dump
    Read(PathBuf),
    /// Print programmer and chip lists
    ListProgrammers,
}

/// Everything a command needs, built once from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Requested operation
    pub operation: Operation,
    /// Programmer specification string
    pub programmer: String,
    /// Highest page index to read
    pub page_limit: u16,
    /// Program/verify policies
    pub program: ProgramOptions,
    /// Handling of oversized raw dumps
    pub dump_overflow: DumpOverflow,
}

impl Cli {
    /// Build the run configuration
    pub fn config(&self) -> Config {
        let operation = if let Some(path) = &self.flash {
            Operation::Flash(path.clone())
        } else if let Some(path) = &self.write {
            Operation::Write(path.clone())
        } else if let Some(path) = &self.read {
            Operation::Read(path.clone())
        } else {
            Operation::ListProgrammers
        };

        Config {
            operation,
            programmer: self.programmer.clone(),
            page_limit: self.pages,
            program: ProgramOptions {
                blank_pages: if self.program_blank {
                    BlankPagePolicy::Program
                } else {
                    BlankPagePolicy::Skip
                },
                verify: if self.continue_on_verify_error {
                    VerifyPolicy::Continue
                } else {
                    VerifyPolicy::Abort
                },
            },
            dump_overflow: if self.strict_size {
                DumpOverflow::Reject
            } else {
                DumpOverflow::Truncate
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ccflasher").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_is_required() {
        let err = parse(&["-p", "dummy"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_modes_conflict() {
        let err = parse(&["-p", "dummy", "-f", "a.hex", "-r", "b.bin"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_flash_defaults() {
        let config = parse(&["-p", "dummy", "-f", "fw.hex"]).unwrap().config();
        assert_eq!(config.operation, Operation::Flash(PathBuf::from("fw.hex")));
        assert_eq!(config.programmer, "dummy");
        assert_eq!(config.page_limit, 32);
        assert_eq!(config.program, ProgramOptions::default());
        assert_eq!(config.dump_overflow, DumpOverflow::Truncate);
    }

    #[test]
    fn test_policies() {
        let config = parse(&[
            "-p",
            "dummy",
            "-w",
            "dump.bin",
            "--program-blank",
            "--continue-on-verify-error",
            "--strict-size",
        ])
        .unwrap()
        .config();
        assert_eq!(config.operation, Operation::Write(PathBuf::from("dump.bin")));
        assert_eq!(config.program.blank_pages, BlankPagePolicy::Program);
        assert_eq!(config.program.verify, VerifyPolicy::Continue);
        assert_eq!(config.dump_overflow, DumpOverflow::Reject);
    }

    #[test]
    fn test_read_with_page_limit() {
        let cli = parse(&["-p", "dummy", "-v", "-v", "-r", "out.bin", "--pages", "3"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let config = cli.config();
        assert_eq!(config.operation, Operation::Read(PathBuf::from("out.bin")));
        assert_eq!(config.page_limit, 3);
    }

    #[test]
    fn test_pages_help_mentions_old_flag() {
        let cmd = Cli::command();
        let pages = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "pages")
            .unwrap();
        let help = pages.get_long_help().unwrap().to_string();
        assert!(help.contains("-p N"), "{}", help);
    }

    #[test]
    fn test_list_programmers() {
        let config = parse(&["--list-programmers"]).unwrap().config();
        assert_eq!(config.operation, Operation::ListProgrammers);
    }
}
