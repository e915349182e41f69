/// Console status display
use jukebox_core::StatusReporter;
use std::io::Write;
use tracing::{debug, info};

/// Prints status, now-playing and artwork notices to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn print(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "{}", line).is_err() {
            debug!("stdout closed; dropping status line");
        }
    }
}

impl StatusReporter for ConsoleReporter {
    fn report_status(&self, message: &str) {
        info!(status = %message, "status");
        self.print(&format!("* {}", message));
    }

    fn report_now_playing(&self, display: &str) {
        self.print(&format!("> {}", display));
    }

    fn report_artwork(&self, data: &[u8], mime_type: &str) {
        debug!(bytes = data.len(), mime = %mime_type, "artwork");
        self.print(&format!("  [cover: {}, {} bytes]", mime_type, data.len()));
    }
}
