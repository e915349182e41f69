/// Output volume control through a shell command
use jukebox_core::DeviceControl;
use std::process::Command;
use tracing::{debug, warn};

/// Runs `"<audiocontrol> on"` through `sh -c` to unmute the output
#[derive(Debug, Clone)]
pub struct ShellDeviceControl {
    unmute_command: String,
}

impl ShellDeviceControl {
    pub fn new(unmute_command: impl Into<String>) -> Self {
        Self {
            unmute_command: unmute_command.into(),
        }
    }

    pub fn unmute_command(&self) -> &str {
        &self.unmute_command
    }

    /// Run the unmute command, returning whether it succeeded
    pub fn run_unmute(&self) -> bool {
        match Command::new("sh").arg("-c").arg(&self.unmute_command).status() {
            Ok(status) if status.success() => {
                debug!(command = %self.unmute_command, "output unmuted");
                true
            }
            Ok(status) => {
                warn!(command = %self.unmute_command, %status, "unmute command failed");
                false
            }
            Err(e) => {
                warn!(command = %self.unmute_command, error = %e, "cannot run unmute command");
                false
            }
        }
    }
}

impl DeviceControl for ShellDeviceControl {
    fn unmute_output(&self) {
        self.run_unmute();
    }

    fn stop_other_audio(&self) {
        // the console host runs no other players
        debug!("no foreign audio to stop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_command_status() {
        assert!(ShellDeviceControl::new("true").run_unmute());
        assert!(!ShellDeviceControl::new("exit 3").run_unmute());
    }
}
