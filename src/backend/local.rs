//! In-process media hosts for the terminal front end
//!
//! A terminal cannot render video, so both hosts only keep a playback clock:
//! `ClockSurface` hands out native elements that push time updates, and
//! `LocalEmbedHost` stands in for the remote embed service (library fetch
//! latency, ready handshake, no pushed time).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::embedded::{
    EmbedApi, EmbedError, EmbedEvent, EmbedEventSink, EmbedPlayer, EmbedPlayerConfig, EmbedState,
};
use super::native::{MediaElement, MediaSource, MediaSurface};
use super::{BackendError, BackendEvent, EventSink};

const CLOCK_TICK: Duration = Duration::from_millis(250);
const DEFAULT_EMBED_DURATION: f64 = 60.0;

#[derive(Debug, Default)]
struct PlaybackClock {
    position: f64,
    duration: f64,
    playing: bool,
}

impl PlaybackClock {
    fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
            playing: false,
        }
    }

    /// Advance by `dt` seconds. Returns true when the end was reached.
    fn advance(&mut self, dt: f64) -> bool {
        if !self.playing {
            return false;
        }
        self.position = (self.position + dt).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
            return true;
        }
        false
    }

    fn seek(&mut self, time: f64) {
        self.position = time.clamp(0.0, self.duration);
    }
}

type SharedClock = Arc<Mutex<PlaybackClock>>;

fn lock(clock: &SharedClock) -> MutexGuard<'_, PlaybackClock> {
    clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Native media surface backed by a playback clock
///
/// With `block_autoplay` set, each element rejects its first `play()` the
/// way a browser refuses unmuted autoplay. Later calls count as user
/// initiated and succeed.
#[derive(Default)]
pub struct ClockSurface {
    block_autoplay: bool,
}

impl ClockSurface {
    pub fn new(block_autoplay: bool) -> Self {
        Self { block_autoplay }
    }
}

impl MediaSurface for ClockSurface {
    fn attach(
        &self,
        source: &MediaSource,
        events: EventSink,
    ) -> Result<Box<dyn MediaElement>, BackendError> {
        if source.url.is_empty() {
            return Err(BackendError::MissingSurface);
        }

        let clock = Arc::new(Mutex::new(PlaybackClock::new(source.duration_hint)));
        events.emit(BackendEvent::DurationChange {
            duration: source.duration_hint,
        });

        let ticker = {
            let clock = clock.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(CLOCK_TICK);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let (position, ended, playing) = {
                        let mut clock = lock(&clock);
                        let was_playing = clock.playing;
                        let ended = clock.advance(CLOCK_TICK.as_secs_f64());
                        (clock.position, ended, was_playing)
                    };
                    if playing {
                        events.emit(BackendEvent::TimeUpdate {
                            current_time: position,
                        });
                    }
                    if ended {
                        events.emit(BackendEvent::Ended);
                    }
                }
            })
        };

        Ok(Box::new(ClockElement {
            clock,
            events,
            ticker: Some(ticker),
            pip: false,
            autoplay_pending: self.block_autoplay,
        }))
    }
}

struct ClockElement {
    clock: SharedClock,
    events: EventSink,
    ticker: Option<JoinHandle<()>>,
    pip: bool,
    autoplay_pending: bool,
}

impl MediaElement for ClockElement {
    fn play(&mut self) -> Result<(), BackendError> {
        if std::mem::take(&mut self.autoplay_pending) {
            self.events.emit(BackendEvent::PlayRejected);
            return Err(BackendError::PlaybackRejected);
        }
        {
            let mut clock = lock(&self.clock);
            if clock.position >= clock.duration {
                clock.position = 0.0;
            }
            clock.playing = true;
        }
        self.events.emit(BackendEvent::Playing);
        Ok(())
    }

    fn pause(&mut self) {
        let was_playing = std::mem::replace(&mut lock(&self.clock).playing, false);
        if was_playing {
            self.events.emit(BackendEvent::Paused);
        }
    }

    fn set_current_time(&mut self, time: f64) {
        let position = {
            let mut clock = lock(&self.clock);
            clock.seek(time);
            clock.position
        };
        self.events.emit(BackendEvent::TimeUpdate {
            current_time: position,
        });
    }

    fn current_time(&self) -> f64 {
        lock(&self.clock).position
    }

    fn duration(&self) -> f64 {
        lock(&self.clock).duration
    }

    fn supports_pip(&self) -> bool {
        true
    }

    fn request_pip(&mut self) -> Result<(), BackendError> {
        if !self.pip {
            self.pip = true;
            self.events.emit(BackendEvent::PipEntered);
        }
        Ok(())
    }

    fn exit_pip(&mut self) -> Result<(), BackendError> {
        if self.pip {
            self.pip = false;
            self.events.emit(BackendEvent::PipLeft);
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Local stand-in for the remote embed service
pub struct LocalEmbedHost {
    durations: HashMap<String, f64>,
    load_delay: Duration,
    ready_delay: Duration,
}

impl LocalEmbedHost {
    pub fn new(durations: HashMap<String, f64>) -> Self {
        Self {
            durations,
            load_delay: Duration::from_millis(400),
            ready_delay: Duration::from_millis(300),
        }
    }
}

#[async_trait]
impl EmbedApi for LocalEmbedHost {
    async fn load_library(&self) -> Result<(), EmbedError> {
        tokio::time::sleep(self.load_delay).await;
        Ok(())
    }

    fn create_player(
        &self,
        config: &EmbedPlayerConfig,
        events: EmbedEventSink,
    ) -> Result<Box<dyn EmbedPlayer>, EmbedError> {
        let duration = self
            .durations
            .get(&config.video_id)
            .copied()
            .unwrap_or(DEFAULT_EMBED_DURATION);
        let clock = Arc::new(Mutex::new(PlaybackClock::new(duration)));
        let autoplay = config
            .player_vars()
            .iter()
            .any(|(key, value)| *key == "autoplay" && value == "1");
        tracing::debug!(url = %config.embed_url(), "Local embed player starting");

        let task = {
            let clock = clock.clone();
            let events = events.clone();
            let ready_delay = self.ready_delay;
            tokio::spawn(async move {
                tokio::time::sleep(ready_delay).await;
                events.emit(EmbedEvent::Ready);
                if autoplay {
                    lock(&clock).playing = true;
                    events.emit(EmbedEvent::StateChange(EmbedState::Playing));
                }

                let mut interval = tokio::time::interval(CLOCK_TICK);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let ended = lock(&clock).advance(CLOCK_TICK.as_secs_f64());
                    if ended {
                        events.emit(EmbedEvent::StateChange(EmbedState::Ended));
                    }
                }
            })
        };

        Ok(Box::new(LocalEmbedPlayer {
            clock,
            events,
            task: Some(task),
        }))
    }
}

struct LocalEmbedPlayer {
    clock: SharedClock,
    events: EmbedEventSink,
    task: Option<JoinHandle<()>>,
}

impl EmbedPlayer for LocalEmbedPlayer {
    fn play_video(&mut self) -> Result<(), EmbedError> {
        {
            let mut clock = lock(&self.clock);
            if clock.position >= clock.duration {
                clock.position = 0.0;
            }
            clock.playing = true;
        }
        self.events.emit(EmbedEvent::StateChange(EmbedState::Playing));
        Ok(())
    }

    fn pause_video(&mut self) -> Result<(), EmbedError> {
        lock(&self.clock).playing = false;
        self.events.emit(EmbedEvent::StateChange(EmbedState::Paused));
        Ok(())
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), EmbedError> {
        lock(&self.clock).seek(seconds);
        Ok(())
    }

    fn current_time(&self) -> Option<f64> {
        Some(lock(&self.clock).position)
    }

    fn duration(&self) -> Option<f64> {
        Some(lock(&self.clock).duration)
    }

    fn destroy(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::backend::{SessionEvent, SessionId};

    #[test]
    fn test_clock_stops_at_duration() {
        let mut clock = PlaybackClock::new(1.0);
        clock.playing = true;
        assert!(!clock.advance(0.5));
        assert!(clock.advance(0.75));
        assert_eq!(clock.position, 1.0);
        assert!(!clock.playing);
        assert!(!clock.advance(0.25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_element_plays_to_end() {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        let source = MediaSource {
            url: "media/a.mp4".to_string(),
            duration_hint: 1.0,
        };
        let mut element = ClockSurface::default()
            .attach(&source, EventSink::new(SessionId(1), tx))
            .unwrap();
        element.play().unwrap();

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e.event);
        }
        assert_eq!(events.first(), Some(&BackendEvent::DurationChange { duration: 1.0 }));
        assert!(events.contains(&BackendEvent::Playing));
        assert_eq!(events.iter().filter(|e| **e == BackendEvent::Ended).count(), 1);
        assert_eq!(element.current_time(), 1.0);
        element.release();
    }

    #[test]
    fn test_clock_surface_requires_source() {
        let (tx, _rx) = mpsc::unbounded_channel::<SessionEvent>();
        let source = MediaSource {
            url: String::new(),
            duration_hint: 1.0,
        };
        assert!(matches!(
            ClockSurface::default().attach(&source, EventSink::new(SessionId(1), tx)),
            Err(BackendError::MissingSurface)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_autoplay_rejects_first_play_only() {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        let source = MediaSource {
            url: "media/a.mp4".to_string(),
            duration_hint: 5.0,
        };
        let mut element = ClockSurface::new(true)
            .attach(&source, EventSink::new(SessionId(1), tx))
            .unwrap();

        assert_eq!(element.play(), Err(BackendError::PlaybackRejected));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(element.current_time(), 0.0);

        element.play().unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(element.current_time() > 0.0);

        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e.event);
        }
        assert_eq!(events.iter().filter(|e| **e == BackendEvent::PlayRejected).count(), 1);
        assert!(events.contains(&BackendEvent::Playing));
        element.release();
    }
}
