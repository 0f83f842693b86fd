pub mod config;
pub mod theme;

// Post pages
pub mod recolor;
pub mod sheet;

// Build-time tooling
pub mod thumbs;
