/// Jukebox configuration
use crate::error::{AppError, Result};
use jukebox_audio::PumpConfig;
use jukebox_playback::ControllerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File looked up in the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.txt";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JukeboxConfig {
    /// Volume control command prefix; `"<audiocontrol> on"` unmutes
    #[serde(default = "default_audiocontrol")]
    pub audiocontrol: String,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_handoff_grace_ms")]
    pub handoff_grace_ms: u64,

    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,

    #[serde(default = "default_lossy_chunk_frames")]
    pub lossy_chunk_frames: usize,

    /// Output device name; the host default when unset
    #[serde(default)]
    pub output_device: Option<String>,
}

impl JukeboxConfig {
    /// Load configuration from `config.txt` and the environment
    ///
    /// `config.txt` is read from `dir` (or the working directory) as
    /// `key = value` lines with `#` comments. A missing file is not an
    /// error. `JUKEBOX_*` environment variables override file values.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let path = dir.unwrap_or_else(|| Path::new(".")).join(CONFIG_FILE_NAME);

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Ini)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("JUKEBOX").try_parsing(true))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audiocontrol.trim().is_empty() {
            return Err(AppError::Config("audiocontrol must not be empty".to_string()));
        }
        if self.lossy_chunk_frames == 0 {
            return Err(AppError::Config(
                "lossy_chunk_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Shell command that unmutes the output
    pub fn unmute_command(&self) -> String {
        format!("{} on", self.audiocontrol.trim())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            history_capacity: self.history_capacity,
            handoff_grace: Duration::from_millis(self.handoff_grace_ms),
        }
    }

    pub fn pump_config(&self) -> PumpConfig {
        PumpConfig {
            pause_poll: Duration::from_millis(self.pause_poll_ms),
        }
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

// Default values
fn default_audiocontrol() -> String {
    "amixer set Master -q".to_string()
}

fn default_history_capacity() -> usize {
    jukebox_playback::DEFAULT_HISTORY_CAPACITY
}

fn default_handoff_grace_ms() -> u64 {
    200
}

fn default_pause_poll_ms() -> u64 {
    500
}

fn default_long_press_ms() -> u64 {
    500
}

fn default_lossy_chunk_frames() -> usize {
    jukebox_audio::DEFAULT_LOSSY_CHUNK_FRAMES
}

impl Default for JukeboxConfig {
    fn default() -> Self {
        Self {
            audiocontrol: default_audiocontrol(),
            history_capacity: default_history_capacity(),
            handoff_grace_ms: default_handoff_grace_ms(),
            pause_poll_ms: default_pause_poll_ms(),
            long_press_ms: default_long_press_ms(),
            lossy_chunk_frames: default_lossy_chunk_frames(),
            output_device: None,
        }
    }
}
