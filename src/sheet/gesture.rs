//! Bottom-sheet drag controller for the mobile table of contents.
//!
//! One touch sequence (start → move* → end) either steers the sheet or is
//! left to the sheet's scrollable content:
//! - Touches on the sheet chrome (header, handle) always steer
//! - Touches on the content steer only at a scroll boundary: swipe up once the
//!   list is scrolled to its bottom, swipe down once it is back at the top
//! - A gesture that started steering keeps steering until release
//!
//! Release commits against a ±50px threshold:
//!
//! ```text
//!   Half ──(Δ < -50)──► Expanded ──(Δ > 50)──► Half
//!   Half ──(Δ > 50)───► Closed
//!   anything else ────► snap back
//! ```

use std::time::Duration;

/// Release distance that commits a state change
pub const COMMIT_THRESHOLD: f32 = 50.0;
/// Slack when deciding the content is scrolled to its bottom edge
pub const SCROLL_EPSILON: f32 = 1.0;
/// Half-open height as a fraction of the viewport; also the shrink floor
pub const HALF_RATIO: f32 = 0.5;
/// Delay before centering the active entry after opening
pub const CENTER_DELAY: Duration = Duration::from_millis(100);

/// Resting state of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetMode {
    #[default]
    Closed,
    Half,
    Expanded,
}

/// Scroll position of the sheet's inner content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn at_top(&self) -> bool {
        self.scroll_top <= 0.0
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - SCROLL_EPSILON
    }
}

/// What the finger is on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchTarget {
    /// Header, handle or any other non-scrolling part of the sheet
    Chrome,
    /// The scrollable TOC list
    Content(ScrollMetrics),
}

/// Result of a move event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Leave the event to native scrolling
    PassThrough,
    /// The sheet consumed the move; the host must suppress document scrolling
    Steer,
}

impl MoveOutcome {
    pub fn prevent_default(self) -> bool {
        self == MoveOutcome::Steer
    }
}

/// Inline style overrides applied while a drag is in progress.
/// `None` means the stylesheet for the current mode is in control.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InlineStyle {
    pub height: Option<f32>,
    pub translate_y: Option<f32>,
    pub transition_suspended: bool,
}

impl InlineStyle {
    pub fn is_clear(&self) -> bool {
        *self == InlineStyle::default()
    }
}

/// Per-gesture bookkeeping, discarded on release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub sheet_mode: SheetMode,
    pub origin_y: f32,
    pub origin_height: f32,
    pub dragging: bool,
}

/// Deferred work the host must schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetEffect {
    /// Scroll the active TOC entry to the vertical center once layout settles
    CenterActiveEntry { after: Duration },
}

/// Bottom-sheet state machine.
pub struct BottomSheet {
    mode: SheetMode,
    viewport_height: f32,
    gesture: Option<GestureState>,
    style: InlineStyle,
}

impl BottomSheet {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            mode: SheetMode::Closed,
            viewport_height,
            gesture: None,
            style: InlineStyle::default(),
        }
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    pub fn mode(&self) -> SheetMode {
        self.mode
    }

    pub fn style(&self) -> InlineStyle {
        self.style
    }

    pub fn gesture(&self) -> Option<&GestureState> {
        self.gesture.as_ref()
    }

    /// Half-open height, and the floor an expanded sheet can be dragged down to
    pub fn half_height(&self) -> f32 {
        self.viewport_height * HALF_RATIO
    }

    fn is_dragging(&self) -> bool {
        self.gesture.is_some_and(|g| g.dragging)
    }

    /// Body-level "no scroll" flag: set while open or mid-drag
    pub fn body_no_scroll(&self) -> bool {
        self.mode != SheetMode::Closed || self.is_dragging()
    }

    /// Floating TOC button hides while the sheet is open
    pub fn toggle_button_hidden(&self) -> bool {
        self.mode != SheetMode::Closed
    }

    /// Begin a touch sequence. `rendered_height` is the sheet's current layout height.
    pub fn touch_start(&mut self, y: f32, rendered_height: f32) {
        if self.mode == SheetMode::Closed {
            return;
        }
        self.gesture = Some(GestureState {
            sheet_mode: self.mode,
            origin_y: y,
            origin_height: rendered_height,
            dragging: false,
        });
        self.style.transition_suspended = true;
    }

    /// Process a move. Returns whether the sheet consumed it.
    pub fn touch_move(&mut self, y: f32, target: TouchTarget) -> MoveOutcome {
        let Some(gesture) = self.gesture.as_mut() else {
            return MoveOutcome::PassThrough;
        };
        let delta_y = y - gesture.origin_y;

        if !gesture.dragging {
            let steer = match target {
                TouchTarget::Chrome => delta_y != 0.0,
                TouchTarget::Content(metrics) => {
                    (delta_y < 0.0 && metrics.at_bottom()) || (delta_y > 0.0 && metrics.at_top())
                }
            };
            if !steer {
                return MoveOutcome::PassThrough;
            }
            gesture.dragging = true;
        }

        let expanded = gesture.sheet_mode == SheetMode::Expanded;
        let origin_height = gesture.origin_height;
        if delta_y < 0.0 {
            // Swipe up: grow towards expanded
            if !expanded {
                self.style.height = Some(origin_height + delta_y.abs());
                self.style.translate_y = Some(0.0);
            }
        } else if expanded {
            // Swipe down from expanded: shrink, never below half
            self.style.height = Some(self.half_height().max(origin_height - delta_y));
        } else {
            // Swipe down from half: slide the whole sheet out
            self.style.translate_y = Some(delta_y);
        }

        MoveOutcome::Steer
    }

    /// Finish the touch sequence at `y` and return the committed mode.
    pub fn touch_end(&mut self, y: f32) -> SheetMode {
        let Some(gesture) = self.gesture.take() else {
            return self.mode;
        };
        self.style = InlineStyle::default();

        if !gesture.dragging {
            return self.mode;
        }

        let delta_y = y - gesture.origin_y;
        self.mode = match gesture.sheet_mode {
            SheetMode::Half if delta_y < -COMMIT_THRESHOLD => SheetMode::Expanded,
            SheetMode::Half if delta_y > COMMIT_THRESHOLD => SheetMode::Closed,
            SheetMode::Expanded if delta_y > COMMIT_THRESHOLD => SheetMode::Half,
            resting => resting,
        };
        log::debug!("Sheet gesture Δ{:.0}px: {:?} → {:?}", delta_y, gesture.sheet_mode, self.mode);
        self.mode
    }

    /// Abort the touch sequence (e.g. `touchcancel`) and snap back.
    pub fn touch_cancel(&mut self) {
        self.gesture = None;
        self.style = InlineStyle::default();
    }

    /// Explicit open trigger (the floating TOC button).
    pub fn open(&mut self) -> SheetEffect {
        self.touch_cancel();
        self.mode = SheetMode::Half;
        SheetEffect::CenterActiveEntry { after: CENTER_DELAY }
    }

    /// Explicit close button.
    pub fn close(&mut self) {
        self.touch_cancel();
        self.mode = SheetMode::Closed;
    }

    pub fn backdrop_tap(&mut self) {
        self.close();
    }

    /// A TOC entry inside the sheet was chosen.
    pub fn select_entry(&mut self) {
        self.close();
    }
}

/// Scroll offset that puts an entry at the vertical center of its container,
/// clamped to the scrollable range.
pub fn center_scroll_top(entry_top: f32, entry_height: f32, metrics: &ScrollMetrics) -> f32 {
    let target = entry_top + entry_height * 0.5 - metrics.client_height * 0.5;
    let max = (metrics.scroll_height - metrics.client_height).max(0.0);
    target.clamp(0.0, max)
}
