//! Compare TCP CUBIC and NewReno congestion-window traces in one chart.
//!
//! ```text
//!  CUBIC .dat ──► loader ──┐
//!                          ├──► app::run ──► Renderer ──► comparison.png
//!  NewReno .dat ► loader ──┘
//! ```

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod render;
