//! Folder Jukebox
//!
//! Console host for the folder jukebox: configuration, status display,
//! volume control and key mapping around the playback engine.
//!
//! This library exposes the host components for testing purposes.

pub mod config;
pub mod device;
pub mod error;
pub mod keys;
pub mod reporter;

// Re-export commonly used types for convenience
pub use config::JukeboxConfig;
pub use device::ShellDeviceControl;
pub use error::{AppError, Result};
pub use reporter::ConsoleReporter;

use jukebox_audio::{CpalSinkFactory, DecodePump, SymphoniaOpener};
use jukebox_core::{DeviceControl, StatusReporter};
use jukebox_metadata::LoftyTrackInfoReader;
use jukebox_playback::SessionController;
use std::sync::Arc;

/// Track player used by the console host
pub type Player = DecodePump<CpalSinkFactory, SymphoniaOpener>;

/// Wire decoders, output, tag reader and volume control into a controller
pub fn build_controller(
    config: &JukeboxConfig,
    reporter: Arc<dyn StatusReporter>,
) -> SessionController<Player> {
    let device: Arc<dyn DeviceControl> = Arc::new(ShellDeviceControl::new(config.unmute_command()));

    let mut sinks = CpalSinkFactory::new();
    if let Some(name) = &config.output_device {
        sinks = sinks.with_device(name.clone());
    }

    let pump = DecodePump::with_opener(
        sinks,
        SymphoniaOpener::new(config.lossy_chunk_frames),
        Arc::new(LoftyTrackInfoReader::new()),
        Arc::clone(&reporter),
        Arc::clone(&device),
        config.pump_config(),
    );

    SessionController::new(pump, reporter, device, config.controller_config())
}
