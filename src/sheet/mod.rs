//! Mobile TOC sheet: touch-driven bottom sheet and page scroll UI
//!
//! ┌─────────────────────────┐
//! │      article content     │
//! │                          │  ← body scroll locked while the sheet is open
//! ├──────────── ─ ──────────┤  ← drag handle / header (always steers)
//! │ Contents             [×] │
//! │  1. Intro                │  ← scrollable list (steers at its edges)
//! │  2. Setup   ◄ active     │
//! └─────────────────────────┘

pub mod gesture;
pub mod scroll;

pub use gesture::{
    center_scroll_top, BottomSheet, GestureState, InlineStyle, MoveOutcome, ScrollMetrics,
    SheetEffect, SheetMode, TouchTarget,
};
pub use scroll::{progress_percent, FabAutoHide, FabHidePolicy, ScrollSpy, Section};
