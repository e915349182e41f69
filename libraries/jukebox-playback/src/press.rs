//! Short/long press classification
//!
//! A press becomes `Long` once the button has been held for the whole window,
//! even if it is still held; otherwise releasing it yields `Short`. Each press
//! yields exactly one classification.

use crate::types::PressKind;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{trace, warn};

/// Default hold time before a press counts as long
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct ButtonState {
    pressed: bool,
    fired: bool,
    generation: u64,
}

/// Turns down/up edges into `PressKind`s
pub struct PressClassifier<K, F> {
    window: Duration,
    buttons: Arc<Mutex<HashMap<K, ButtonState>>>,
    on_press: Arc<F>,
}

impl<K, F> PressClassifier<K, F>
where
    K: Clone + Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    F: Fn(K, PressKind) + Send + Sync + 'static,
{
    /// Create a classifier that calls `on_press` once per press
    pub fn new(window: Duration, on_press: F) -> Self {
        Self {
            window,
            buttons: Arc::new(Mutex::new(HashMap::new())),
            on_press: Arc::new(on_press),
        }
    }

    /// Long-press window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Button went down
    ///
    /// Must be called inside a tokio runtime for long presses to fire while
    /// the button is still held; outside one, every press resolves on release.
    pub fn button_down(&self, key: K) {
        let generation = {
            let mut buttons = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
            let state = buttons.entry(key.clone()).or_default();
            if state.pressed {
                // key repeat
                return;
            }
            state.pressed = true;
            state.fired = false;
            state.generation += 1;
            state.generation
        };
        trace!(?key, generation, "button down");

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(?key, "no runtime; long press detection disabled");
            return;
        };

        let buttons = Arc::clone(&self.buttons);
        let on_press = Arc::clone(&self.on_press);
        let window = self.window;
        runtime.spawn(async move {
            tokio::time::sleep(window).await;

            let fire = {
                let mut buttons = buttons.lock().unwrap_or_else(PoisonError::into_inner);
                match buttons.get_mut(&key) {
                    Some(state) if state.pressed && !state.fired && state.generation == generation => {
                        state.fired = true;
                        true
                    }
                    _ => false,
                }
            };

            if fire {
                on_press(key, PressKind::Long);
            }
        });
    }

    /// Button came up
    pub fn button_up(&self, key: K) {
        let fire = {
            let mut buttons = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
            match buttons.get_mut(&key) {
                Some(state) if state.pressed => {
                    state.pressed = false;
                    let fire = !state.fired;
                    state.fired = true;
                    fire
                }
                _ => false,
            }
        };
        trace!(?key, fire, "button up");

        if fire {
            (self.on_press)(key, PressKind::Short);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Arc<Mutex<Vec<(u8, PressKind)>>>;

    fn classifier() -> (PressClassifier<u8, impl Fn(u8, PressKind) + Send + Sync + 'static>, Log) {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let classifier = PressClassifier::new(DEFAULT_LONG_PRESS, move |key, kind| {
            sink.lock().unwrap().push((key, kind));
        });
        (classifier, log)
    }

    #[tokio::test(start_paused = true)]
    async fn quick_release_is_short() {
        let (classifier, log) = classifier();

        classifier.button_down(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        classifier.button_up(1);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*log.lock().unwrap(), vec![(1, PressKind::Short)]);
    }

    #[tokio::test(start_paused = true)]
    async fn hold_fires_long_before_release() {
        let (classifier, log) = classifier();

        classifier.button_down(2);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*log.lock().unwrap(), vec![(2, PressKind::Long)]);

        classifier.button_up(2);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_fire_for_next_press() {
        let (classifier, log) = classifier();

        classifier.button_down(3);
        tokio::time::sleep(Duration::from_millis(300)).await;
        classifier.button_up(3);
        classifier.button_down(3);
        // first press' timer expires here; second press is only 300ms old
        tokio::time::sleep(Duration::from_millis(300)).await;
        classifier.button_up(3);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec![(3, PressKind::Short), (3, PressKind::Short)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn buttons_are_independent() {
        let (classifier, log) = classifier();

        classifier.button_down(1);
        classifier.button_down(2);
        tokio::time::sleep(Duration::from_millis(100)).await;
        classifier.button_up(2);
        tokio::time::sleep(Duration::from_millis(500)).await;
        classifier.button_up(1);

        assert_eq!(
            *log.lock().unwrap(),
            vec![(2, PressKind::Short), (1, PressKind::Long)]
        );
    }

    #[test]
    fn release_without_press_is_ignored() {
        let (classifier, log) = classifier();
        classifier.button_up(9);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn without_runtime_every_press_is_short() {
        let (classifier, log) = classifier();
        classifier.button_down(4);
        classifier.button_up(4);
        assert_eq!(*log.lock().unwrap(), vec![(4, PressKind::Short)]);
    }
}
