//! Command-level errors

use thiserror::Error;

/// Failures detected by the commands themselves rather than by the
/// pipeline
#[derive(Debug, Error)]
pub enum CommandError {
    /// Programming finished but some pages did not verify
    #[error("verify failed on page(s) {}", format_pages(.pages))]
    VerifyFailed {
        /// Pages whose read-back did not match
        pages: Vec<u16>,
    },
}

fn format_pages(pages: &[u16]) -> String {
    pages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
