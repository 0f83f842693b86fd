//! Page scroll helpers: reading progress, TOC scroll spy, and auto-hiding
//! the floating TOC button while the page scrolls.

use std::time::{Duration, Instant};

/// Sections count as active once scrolled within this distance of their top
pub const SPY_OFFSET: f32 = 200.0;
/// Quiet period after the last scroll tick before the button reappears
pub const RESHOW_DELAY: Duration = Duration::from_millis(300);

/// Reading progress in percent (0–100).
pub fn progress_percent(scroll_y: f32, document_height: f32, window_height: f32) -> f32 {
    let scrollable = document_height - window_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

/// Heading anchor tracked by the scroll spy
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub top: f32,
}

/// Picks the TOC entry to highlight for a scroll position.
#[derive(Debug, Clone, Default)]
pub struct ScrollSpy {
    sections: Vec<Section>,
}

impl ScrollSpy {
    /// `sections` in document order.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Last section whose top (minus [`SPY_OFFSET`]) has been scrolled past.
    pub fn active(&self, scroll_y: f32) -> Option<&str> {
        self.sections
            .iter()
            .filter(|s| scroll_y >= s.top - SPY_OFFSET)
            .last()
            .map(|s| s.id.as_str())
    }

    /// Whether a TOC link `href` should carry the active class.
    pub fn is_active_link(&self, href: &str, scroll_y: f32) -> bool {
        match (href.strip_prefix('#'), self.active(scroll_y)) {
            (Some(anchor), Some(active)) => anchor == active,
            _ => false,
        }
    }
}

/// When a scroll tick hides the floating button.
///
/// Shipped page variants disagreed here, so both are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FabHidePolicy {
    /// Hide on every scroll tick
    EveryTick,
    /// Hide only when the page moved more than this many pixels since the last tick
    DeltaThreshold(f32),
}

impl Default for FabHidePolicy {
    fn default() -> Self {
        FabHidePolicy::DeltaThreshold(5.0)
    }
}

/// Floating TOC button visibility driven by page scrolling.
#[derive(Debug, Clone)]
pub struct FabAutoHide {
    policy: FabHidePolicy,
    last_scroll_y: f32,
    hidden: bool,
    reshow_at: Option<Instant>,
}

impl FabAutoHide {
    pub fn new(policy: FabHidePolicy, scroll_y: f32) -> Self {
        Self {
            policy,
            last_scroll_y: scroll_y,
            hidden: false,
            reshow_at: None,
        }
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Process a scroll event.
    pub fn on_scroll(&mut self, scroll_y: f32, now: Instant) {
        let delta = scroll_y - self.last_scroll_y;
        let hide = match self.policy {
            FabHidePolicy::EveryTick => true,
            FabHidePolicy::DeltaThreshold(min) => delta.abs() > min,
        };
        if hide {
            self.hidden = true;
        }
        self.last_scroll_y = scroll_y;
        // Every tick restarts the re-show timer
        self.reshow_at = Some(now + RESHOW_DELAY);
    }

    /// Advance timers; call from the host's frame or timer callback.
    pub fn tick(&mut self, now: Instant) {
        if self.reshow_at.is_some_and(|at| now >= at) {
            self.hidden = false;
            self.reshow_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(progress_percent(1000.0, 3000.0, 1000.0), 50.0);
        assert_eq!(progress_percent(2500.0, 3000.0, 1000.0), 100.0);
        assert_eq!(progress_percent(100.0, 800.0, 1000.0), 0.0);
    }

    #[test]
    fn test_scroll_spy() {
        let spy = ScrollSpy::new(vec![
            Section { id: "intro".into(), top: 0.0 },
            Section { id: "setup".into(), top: 900.0 },
            Section { id: "results".into(), top: 2000.0 },
        ]);
        assert_eq!(spy.active(0.0), Some("intro"));
        assert_eq!(spy.active(699.0), Some("intro"));
        assert_eq!(spy.active(700.0), Some("setup"));
        assert_eq!(spy.active(5000.0), Some("results"));
        assert!(spy.is_active_link("#setup", 800.0));
        assert!(!spy.is_active_link("setup", 800.0));
        assert_eq!(ScrollSpy::default().active(100.0), None);
    }

    #[test]
    fn test_fab_delta_threshold() {
        let t0 = Instant::now();
        let mut fab = FabAutoHide::new(FabHidePolicy::default(), 0.0);

        fab.on_scroll(3.0, t0);
        assert!(!fab.hidden());

        fab.on_scroll(20.0, t0 + Duration::from_millis(16));
        assert!(fab.hidden());

        fab.tick(t0 + Duration::from_millis(200));
        assert!(fab.hidden());
        fab.tick(t0 + Duration::from_millis(316));
        assert!(!fab.hidden());
    }

    #[test]
    fn test_fab_every_tick() {
        let t0 = Instant::now();
        let mut fab = FabAutoHide::new(FabHidePolicy::EveryTick, 0.0);
        fab.on_scroll(1.0, t0);
        assert!(fab.hidden());
    }
}
