//! Gesture recognition for the full-screen player
//!
//! Two recognizers run side by side and never block each other:
//!
//! 1. drag-to-minimize, from pointer down / move / up
//! 2. related-sheet toggle, from wheel deltas and touch swipes
//!
//! Recognizers only produce requests. `PlayerController` applies them, and
//! only while the player is in full mode.

use crate::config::PlayerTuning;
use crate::model::{DragState, PresentationMode};

use super::PlayerController;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetRequest {
    Open,
    Close,
}

#[derive(Clone, Debug)]
pub struct GestureController {
    drag: Option<DragState>,
    touch_start_y: Option<f64>,
    drag_commit_ratio: f64,
    wheel_threshold: f64,
    swipe_threshold: f64,
}

impl GestureController {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            drag: None,
            touch_start_y: None,
            drag_commit_ratio: tuning.drag_commit_ratio,
            wheel_threshold: tuning.wheel_threshold,
            swipe_threshold: tuning.swipe_threshold,
        }
    }

    pub fn drag_offset(&self) -> f64 {
        self.drag.map(|d| d.offset).unwrap_or(0.0)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer pressed. Presses on a control do not start a drag.
    pub fn pointer_down(&mut self, y: f64, on_control: bool) {
        if on_control {
            return;
        }
        self.drag = Some(DragState::new(y));
    }

    pub fn pointer_move(&mut self, y: f64) {
        if let Some(drag) = self.drag.as_mut() {
            drag.track(y);
        }
    }

    /// Pointer released or canceled. Returns true when the drag went far
    /// enough to minimize; otherwise the offset springs back to zero.
    pub fn pointer_release(&mut self, viewport_height: f64) -> bool {
        match self.drag.take() {
            Some(drag) => drag.offset > self.drag_commit_ratio * viewport_height,
            None => false,
        }
    }

    /// Per-event edge trigger; deltas are not accumulated.
    pub fn wheel(&self, delta_y: f64, sheet_open: bool) -> Option<SheetRequest> {
        if delta_y > self.wheel_threshold && !sheet_open {
            Some(SheetRequest::Open)
        } else if delta_y < -self.wheel_threshold && sheet_open {
            Some(SheetRequest::Close)
        } else {
            None
        }
    }

    pub fn touch_start(&mut self, y: f64) {
        self.touch_start_y = Some(y);
    }

    pub fn touch_end(&mut self, y: f64, sheet_open: bool) -> Option<SheetRequest> {
        let start = self.touch_start_y.take()?;
        let travel = y - start;
        if travel < -self.swipe_threshold && !sheet_open {
            Some(SheetRequest::Open)
        } else if travel > self.swipe_threshold && sheet_open {
            Some(SheetRequest::Close)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.drag = None;
        self.touch_start_y = None;
    }
}

impl PlayerController {
    fn gestures_active(&mut self) -> bool {
        if self.mode == PresentationMode::Full {
            return true;
        }
        self.gestures.reset();
        false
    }

    pub fn pointer_down(&mut self, y: f64, on_control: bool) {
        if self.gestures_active() {
            self.gestures.pointer_down(y, on_control);
        }
    }

    pub fn pointer_move(&mut self, y: f64) {
        if self.gestures_active() {
            self.gestures.pointer_move(y);
        }
    }

    pub fn pointer_up(&mut self, y: f64, viewport_height: f64) {
        if !self.gestures_active() {
            return;
        }
        self.gestures.pointer_move(y);
        self.finish_drag(viewport_height);
    }

    pub fn pointer_cancel(&mut self, viewport_height: f64) {
        if self.gestures_active() {
            self.finish_drag(viewport_height);
        }
    }

    fn finish_drag(&mut self, viewport_height: f64) {
        let offset = self.gestures.drag_offset();
        if self.gestures.pointer_release(viewport_height) {
            tracing::debug!(offset, viewport_height, "Drag committed");
            self.minimize();
        } else if offset > 0.0 {
            tracing::trace!(offset, "Drag sprang back");
        }
    }

    pub fn wheel(&mut self, delta_y: f64) {
        if !self.gestures_active() {
            return;
        }
        let request = self.gestures.wheel(delta_y, self.related_sheet_open);
        self.apply_sheet_request(request);
    }

    pub fn touch_start(&mut self, y: f64) {
        if self.gestures_active() {
            self.gestures.touch_start(y);
        }
    }

    pub fn touch_end(&mut self, y: f64) {
        if !self.gestures_active() {
            return;
        }
        let request = self.gestures.touch_end(y, self.related_sheet_open);
        self.apply_sheet_request(request);
    }

    /// Explicit toggle from a key or button
    pub fn toggle_related_sheet(&mut self) {
        if self.mode != PresentationMode::Full {
            return;
        }
        let request = if self.related_sheet_open {
            SheetRequest::Close
        } else {
            SheetRequest::Open
        };
        self.apply_sheet_request(Some(request));
    }

    fn apply_sheet_request(&mut self, request: Option<SheetRequest>) {
        match request {
            Some(SheetRequest::Open) => {
                tracing::trace!("Related sheet opened");
                self.related_sheet_open = true;
            }
            Some(SheetRequest::Close) => {
                tracing::trace!("Related sheet closed");
                self.related_sheet_open = false;
            }
            None => {}
        }
    }
}
