//! Autoplay continuation: count down, then open the next related item

use std::time::Duration;

use tokio::time::Instant;

use crate::model::CountdownState;

use super::PlayerController;

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

impl PlayerController {
    /// Start the countdown after the active session ended, if the related set
    /// has somewhere to go.
    pub(super) fn start_countdown(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(next_item) = self.catalog.next_related(&session.item).cloned() else {
            tracing::debug!(item = %session.item.id, "No related item to continue with");
            return;
        };

        tracing::info!(
            from = %session.item.id,
            next = %next_item.id,
            seconds = self.tuning.countdown_seconds,
            "Autoplay countdown started"
        );

        if self.tuning.countdown_seconds == 0 {
            self.open(next_item);
            return;
        }
        self.countdown = Some(CountdownState {
            seconds_remaining: self.tuning.countdown_seconds,
            next_item,
            next_tick: Instant::now() + COUNTDOWN_STEP,
        });
    }

    pub(super) fn tick_countdown(&mut self) {
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        countdown.seconds_remaining = countdown.seconds_remaining.saturating_sub(1);
        if countdown.seconds_remaining > 0 {
            countdown.next_tick += COUNTDOWN_STEP;
            return;
        }

        if let Some(countdown) = self.countdown.take() {
            tracing::info!(next = %countdown.next_item.id, "Autoplay advancing");
            self.open(countdown.next_item);
        }
    }

    /// User-initiated cancel of a pending auto-advance
    pub fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            tracing::info!(next = %countdown.next_item.id, "Autoplay countdown canceled");
        }
    }

    pub(super) fn clear_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            tracing::debug!(next = %countdown.next_item.id, "Autoplay countdown superseded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendEvent;
    use crate::controller::test_support::Harness;
    use crate::model::fixtures::item;
    use crate::model::{MediaKind, PresentationMode};

    async fn ended_on(h: &mut Harness, id: &str, category: &str) {
        h.player.open(item(id, category, MediaKind::Native));
        h.emit(BackendEvent::DurationChange { duration: 30.0 });
        h.emit(BackendEvent::Ended);
        h.advance(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_advances_to_next_related() {
        let mut h = Harness::new();
        ended_on(&mut h, "a", "surf").await;

        let countdown = h.player.countdown().unwrap();
        assert_eq!(countdown.seconds_remaining, 2);
        assert_eq!(countdown.next_item.id, "b");

        h.advance(Duration::from_millis(1000)).await;
        assert_eq!(h.player.countdown().unwrap().seconds_remaining, 1);
        assert_eq!(h.player.session().unwrap().item.id, "a");

        h.advance(Duration::from_millis(1000)).await;
        assert!(h.player.countdown().is_none());
        assert_eq!(h.player.session().unwrap().item.id, "b");
        assert_eq!(h.player.mode(), PresentationMode::Full);
        assert_eq!(h.max_live(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_wraps_to_first_item() {
        let mut h = Harness::new();
        ended_on(&mut h, "c", "surf").await;
        assert_eq!(h.player.countdown().unwrap().next_item.id, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_item_category_does_not_autoplay() {
        let mut h = Harness::new();
        ended_on(&mut h, "d", "city").await;
        assert!(h.player.countdown().is_none());
        h.advance(Duration::from_secs(5)).await;
        assert_eq!(h.player.session().unwrap().item.id, "d");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_advance() {
        let mut h = Harness::new();
        ended_on(&mut h, "a", "surf").await;

        h.advance(Duration::from_millis(1000)).await;
        h.player.cancel_countdown();
        h.advance(Duration::from_secs(5)).await;

        assert_eq!(h.player.session().unwrap().item.id, "a");
        assert_eq!(h.log().iter().filter(|l| l.starts_with("create")).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_and_open_cancel_countdown() {
        let mut h = Harness::new();
        ended_on(&mut h, "a", "surf").await;
        h.player.close();
        assert!(h.player.countdown().is_none());
        h.advance(Duration::from_secs(5)).await;
        assert_eq!(h.player.mode(), PresentationMode::Hidden);
        assert_eq!(h.live(), 0);

        ended_on(&mut h, "e", "food").await;
        assert_eq!(h.player.countdown().unwrap().next_item.id, "f");
        h.player.open(item("d", "city", MediaKind::Native));
        assert!(h.player.countdown().is_none());
        h.advance(Duration::from_secs(5)).await;
        assert_eq!(h.player.session().unwrap().item.id, "d");
    }
}
