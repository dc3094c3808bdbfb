//! Progress reporting with indicatif
//!
//! Per-page messages go to the reporter's writer (stdout by default). While
//! a progress bar is on screen the bar is suspended around each message so
//! the two interleave cleanly. A hidden bar (stderr is not a terminal)
//! never swallows a message.

use ccflasher_core::flash::{hex_string, ProgramProgress, ProgramStats, ReadProgress};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Create a page progress bar style
fn create_progress_bar_style(phase: &str) -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} pages {}",
            phase
        ))?
        .progress_chars("#>-"))
}

/// Create a standard spinner style
fn create_spinner_style() -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?)
}

/// Progress reporter using indicatif progress bars
pub struct IndicatifProgress {
    total_pages: u16,
    current_bar: Option<ProgressBar>,
    phase: &'static str,
    out: Box<dyn Write>,
    draw_bars: bool,
}

impl IndicatifProgress {
    /// Create a reporter for an operation over `total_pages` pages
    pub fn new(total_pages: u16) -> Self {
        Self::with_writer(total_pages, Box::new(io::stdout()), true)
    }

    /// Create a reporter that prints its messages to `out`
    ///
    /// With `draw_bars` false the progress bars are never drawn and only
    /// the messages are written.
    pub fn with_writer(total_pages: u16, out: Box<dyn Write>, draw_bars: bool) -> Self {
        Self {
            total_pages,
            current_bar: None,
            phase: "Programming",
            out,
            draw_bars,
        }
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        if self.draw_bars {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        }
    }

    fn create_bar(&mut self, total: u64, phase: &'static str) {
        self.phase = phase;
        let pb = ProgressBar::with_draw_target(Some(total), self.draw_target());
        pb.set_style(
            create_progress_bar_style(phase).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.current_bar = Some(pb);
    }

    fn create_spinner(&mut self, message: &str) {
        let pb = ProgressBar::with_draw_target(None, self.draw_target());
        pb.set_style(create_spinner_style().unwrap_or_else(|_| ProgressStyle::default_spinner()));
        pb.set_message(message.to_string());
        if !pb.is_hidden() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        self.current_bar = Some(pb);
    }

    fn finish(&mut self, message: &str) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Switch from the erase spinner to the page bar on the first page
    fn page_bar(&mut self) -> &ProgressBar {
        if !matches!(&self.current_bar, Some(pb) if pb.length().is_some()) {
            self.finish("Erase complete");
            self.create_bar(self.total_pages as u64, self.phase);
        }
        let total = self.total_pages as u64;
        let target = self.draw_target();
        self.current_bar
            .get_or_insert_with(|| ProgressBar::with_draw_target(Some(total), target))
    }

    fn println(&mut self, message: impl AsRef<str>) {
        let Self {
            current_bar, out, ..
        } = self;
        let message = message.as_ref();
        let result = match current_bar {
            Some(pb) if !pb.is_hidden() => pb.suspend(|| writeln!(out, "{}", message)),
            _ => writeln!(out, "{}", message),
        };
        if let Err(e) = result {
            log::warn!("Failed to write progress message: {}", e);
        }
    }
}

impl ProgramProgress for IndicatifProgress {
    fn erasing(&mut self) {
        self.phase = "Programming";
        self.create_spinner("Erasing flash...");
    }

    fn page_skipped(&mut self, page: u16) {
        self.page_bar().inc(1);
        self.println(format!("Skipping blank page {}", page));
    }

    fn page_programming(&mut self, page: u16) {
        self.page_bar();
        self.println(format!("Programming and verifying page {}", page));
    }

    fn page_verified(&mut self, _page: u16) {
        self.page_bar().inc(1);
    }

    fn verify_mismatch(&mut self, page: u16, actual: &[u8], expected: &[u8]) {
        self.page_bar().inc(1);
        self.println(format!("Verify failed on page {}", page));
        self.println(format!("verbuf = {}", hex_string(actual)));
        self.println(format!("expected = {}", hex_string(expected)));
    }

    fn complete(&mut self, stats: &ProgramStats) {
        if stats.verified() {
            self.finish("Done");
            self.println("Programming complete");
        } else {
            self.finish("Done with errors");
            self.println(format!(
                "Programming finished, {} page(s) failed verification",
                stats.mismatched_pages.len()
            ));
        }
        log::info!(
            "{} pages programmed, {} blank pages skipped",
            stats.pages_programmed,
            stats.pages_skipped
        );
    }
}

impl ReadProgress for IndicatifProgress {
    fn reading(&mut self, pages: u16) {
        self.create_bar(pages as u64, "Reading");
    }

    fn page_reading(&mut self, page: u16) {
        self.println(format!("Reading page {}", page));
    }

    fn page_read(&mut self, _page: u16, _data: &[u8]) {
        if let Some(pb) = &self.current_bar {
            pb.inc(1);
        }
    }

    fn limit_reached(&mut self, _limit: u16) {
        self.println("Reached max number of pages!");
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.abandon();
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer whose contents stay readable after the reporter takes it
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.borrow().clone())
                .unwrap()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn hidden_reporter(total_pages: u16) -> (IndicatifProgress, SharedBuf) {
        let buf = SharedBuf::default();
        let progress = IndicatifProgress::with_writer(total_pages, Box::new(buf.clone()), false);
        (progress, buf)
    }

    #[test]
    fn test_hidden_bar_still_prints() {
        let (mut progress, buf) = hidden_reporter(4);
        progress.erasing();
        progress.page_skipped(0);
        progress.page_programming(1);
        progress.page_verified(1);
        progress.verify_mismatch(2, &[0x10, 0xFF], &[0x11, 0xFF]);
        assert!(progress.current_bar.as_ref().unwrap().is_hidden());

        assert_eq!(
            buf.lines(),
            [
                "Skipping blank page 0",
                "Programming and verifying page 1",
                "Verify failed on page 2",
                "verbuf = 10FF",
                "expected = 11FF",
            ]
        );
    }

    #[test]
    fn test_read_messages() {
        let (mut progress, buf) = hidden_reporter(32);
        progress.reading(2);
        for page in 0..2 {
            progress.page_reading(page);
            progress.page_read(page, &[0xFF; 4]);
        }
        progress.limit_reached(1);

        assert_eq!(
            buf.lines(),
            [
                "Reading page 0",
                "Reading page 1",
                "Reached max number of pages!"
            ]
        );
    }

    #[cfg(feature = "dummy")]
    mod dummy {
        use super::*;
        use ccflasher_core::chip::FlashGeometry;
        use ccflasher_core::flash::{
            program_image, read_image, FlashImage, ProgramOptions, VerifyPolicy,
        };
        use ccflasher_flash::open_session;

        fn image_with_pages_0_and_5() -> FlashImage {
            let mut image = FlashImage::new(FlashGeometry::CC_32K);
            image.write_at(0, &[0x00]).unwrap();
            image.write_at(5 * 1024, &[0x11]).unwrap();
            image
        }

        #[test]
        fn test_program_output_sequence() {
            let image = image_with_pages_0_and_5();
            let (mut progress, buf) = hidden_reporter(32);
            let session = open_session("dummy").unwrap();
            let stats =
                program_image(session, &image, &ProgramOptions::default(), &mut progress).unwrap();
            drop(progress);
            assert!(stats.verified());

            let mut expected = Vec::new();
            for page in 0..32 {
                if page == 0 || page == 5 {
                    expected.push(format!("Programming and verifying page {}", page));
                } else {
                    expected.push(format!("Skipping blank page {}", page));
                }
            }
            expected.push("Programming complete".to_string());
            assert_eq!(buf.lines(), expected);
        }

        #[test]
        fn test_verify_mismatch_dumps_buffers() {
            let image = image_with_pages_0_and_5();
            let (mut progress, buf) = hidden_reporter(32);
            let options = ProgramOptions {
                verify: VerifyPolicy::Continue,
                ..ProgramOptions::default()
            };
            let session = open_session("dummy:corrupt=5").unwrap();
            let stats = program_image(session, &image, &options, &mut progress).unwrap();
            drop(progress);
            assert_eq!(stats.mismatched_pages, [5]);

            let mut expected_page = vec![0xFFu8; 1024];
            expected_page[0] = 0x11;
            let mut actual_page = expected_page.clone();
            actual_page[0] = 0x10;

            let lines = buf.lines();
            let at = lines
                .iter()
                .position(|l| l == "Verify failed on page 5")
                .unwrap();
            assert_eq!(lines[at - 1], "Programming and verifying page 5");
            assert_eq!(lines[at + 1], format!("verbuf = {}", hex_string(&actual_page)));
            assert_eq!(
                lines[at + 2],
                format!("expected = {}", hex_string(&expected_page))
            );
            assert_eq!(
                lines.last().unwrap(),
                "Programming finished, 1 page(s) failed verification"
            );
        }

        #[test]
        fn test_read_limit_output() {
            let (mut progress, buf) = hidden_reporter(32);
            let session = open_session("dummy").unwrap();
            let readback = read_image(session, 2, &mut progress).unwrap();
            drop(progress);
            assert_eq!(readback.pages_read(), 3);

            assert_eq!(
                buf.lines(),
                [
                    "Reading page 0",
                    "Reading page 1",
                    "Reading page 2",
                    "Reached max number of pages!"
                ]
            );
        }
    }
}
