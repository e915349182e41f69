//! Console key mapping
//!
//! The console has no real buttons, so each key line is replayed as a
//! down/up edge pair through the press classifier. `b` holds the button
//! past the long-press window.

use jukebox_playback::PressClassifier;
use std::time::Duration;

/// The single play button on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayButton;

/// Action requested by one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Tap the play button (next random track)
    Next,
    /// Hold the play button (step back)
    Back,
    /// Toggle pause
    Pause,
    /// Stop playback
    Stop,
    /// Leave the program
    Quit,
    /// Print the key help
    Help,
}

impl KeyAction {
    /// Parse one line of input
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "n" | "" => Some(KeyAction::Next),
            "b" => Some(KeyAction::Back),
            "p" => Some(KeyAction::Pause),
            "s" => Some(KeyAction::Stop),
            "q" => Some(KeyAction::Quit),
            "h" | "?" => Some(KeyAction::Help),
            _ => None,
        }
    }
}

/// Key help shown on start and on `h`
pub const HELP: &str = "keys: [n]ext (or enter)  [b]ack  [p]ause  [s]top  [q]uit";

/// Replay a tap: down and immediately up
pub fn tap<F>(classifier: &PressClassifier<PlayButton, F>)
where
    F: Fn(PlayButton, jukebox_playback::PressKind) + Send + Sync + 'static,
{
    classifier.button_down(PlayButton);
    classifier.button_up(PlayButton);
}

/// Replay a hold: down now, up once the long-press window has passed
pub async fn hold<F>(classifier: &PressClassifier<PlayButton, F>)
where
    F: Fn(PlayButton, jukebox_playback::PressKind) + Send + Sync + 'static,
{
    classifier.button_down(PlayButton);
    tokio::time::sleep(classifier.window() + Duration::from_millis(20)).await;
    classifier.button_up(PlayButton);
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_playback::PressKind;
    use std::sync::{Arc, Mutex};

    #[test]
    fn parses_keys() {
        assert_eq!(KeyAction::parse("n\n"), Some(KeyAction::Next));
        assert_eq!(KeyAction::parse(""), Some(KeyAction::Next));
        assert_eq!(KeyAction::parse(" b "), Some(KeyAction::Back));
        assert_eq!(KeyAction::parse("p"), Some(KeyAction::Pause));
        assert_eq!(KeyAction::parse("s"), Some(KeyAction::Stop));
        assert_eq!(KeyAction::parse("q"), Some(KeyAction::Quit));
        assert_eq!(KeyAction::parse("?"), Some(KeyAction::Help));
        assert_eq!(KeyAction::parse("x"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_is_short_and_hold_is_long() {
        let presses = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&presses);
        let classifier = PressClassifier::new(Duration::from_millis(500), move |_, kind| {
            sink.lock().unwrap().push(kind);
        });

        tap(&classifier);
        hold(&classifier).await;

        assert_eq!(*presses.lock().unwrap(), vec![PressKind::Short, PressKind::Long]);
    }
}
