//! Native backend over a directly controllable media element

use super::{BackendError, BackendEvent, EventSink, MediaBackend};
use crate::model::MediaKind;

/// What a media surface is asked to play
#[derive(Clone, Debug, PartialEq)]
pub struct MediaSource {
    pub url: String,
    /// Catalog duration, used by surfaces that cannot inspect the media.
    pub duration_hint: f64,
}

/// A playable element owned by the platform.
///
/// Elements push `TimeUpdate`, `DurationChange`, `Playing`, `Paused`, `Ended`
/// and PiP events into the sink they were attached with.
pub trait MediaElement: Send {
    /// Start playback. May be refused by the platform's autoplay policy.
    fn play(&mut self) -> Result<(), BackendError>;

    fn pause(&mut self);

    fn set_current_time(&mut self, time: f64);

    fn current_time(&self) -> f64;

    fn duration(&self) -> f64;

    fn supports_pip(&self) -> bool {
        false
    }

    fn request_pip(&mut self) -> Result<(), BackendError> {
        Err(BackendError::MissingSurface)
    }

    fn exit_pip(&mut self) -> Result<(), BackendError> {
        Err(BackendError::MissingSurface)
    }

    fn release(&mut self);
}

/// Hands out media elements
pub trait MediaSurface: Send + Sync {
    fn attach(
        &self,
        source: &MediaSource,
        events: EventSink,
    ) -> Result<Box<dyn MediaElement>, BackendError>;
}

pub struct NativeBackend {
    element: Option<Box<dyn MediaElement>>,
    pip_supported: bool,
}

impl NativeBackend {
    /// Attach an element for `source`. A surface failure leaves the backend
    /// without an element, and every command becomes a no-op.
    pub fn attach(surface: &dyn MediaSurface, source: &MediaSource, events: EventSink) -> Self {
        let session = events.session();
        match surface.attach(source, events.clone()) {
            Ok(element) => {
                let pip_supported = element.supports_pip();
                tracing::debug!(session = %session, url = %source.url, pip_supported, "Native element attached");
                events.emit(BackendEvent::Ready);
                Self {
                    element: Some(element),
                    pip_supported,
                }
            }
            Err(e) => {
                tracing::warn!(session = %session, url = %source.url, error = %e, "Native element unavailable");
                Self {
                    element: None,
                    pip_supported: false,
                }
            }
        }
    }

    fn element_mut(&mut self) -> Result<&mut Box<dyn MediaElement>, BackendError> {
        self.element.as_mut().ok_or(BackendError::MissingSurface)
    }
}

impl MediaBackend for NativeBackend {
    fn kind(&self) -> MediaKind {
        MediaKind::Native
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.element_mut()?.play()
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.element_mut()?.pause();
        Ok(())
    }

    fn seek(&mut self, time: f64) -> Result<(), BackendError> {
        self.element_mut()?.set_current_time(time);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.element.as_ref().map(|e| e.current_time()).unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.element.as_ref().map(|e| e.duration()).unwrap_or(0.0)
    }

    fn is_ready(&self) -> bool {
        self.element.is_some()
    }

    fn pip_supported(&self) -> bool {
        self.pip_supported
    }

    fn request_pip(&mut self) -> Result<(), BackendError> {
        if !self.pip_supported {
            return Err(BackendError::MissingSurface);
        }
        self.element_mut()?.request_pip()
    }

    fn exit_pip(&mut self) -> Result<(), BackendError> {
        self.element_mut()?.exit_pip()
    }

    fn destroy(&mut self) {
        if let Some(mut element) = self.element.take() {
            element.pause();
            element.release();
        }
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        self.destroy();
    }
}
