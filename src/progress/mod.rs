//! Progress measurement and rendering.
//!
//! # Overview
//!
//! - `speed` - Exponentially smoothed throughput estimate
//! - `reporter` - Per-download throttling of progress events
//! - `style` - Progress bar styling options and templates
//! - `display` - Console renderer driven by an [`EventChannel`](crate::events::EventChannel)
//!
//! # Examples
//!
//! ```rust
//! use haul::progress::{ProgressBarOpts, StyleOptions};
//!
//! let mut bar = ProgressBarOpts::with_pip_style();
//! bar.set_clear(false);
//! let style = StyleOptions::new(bar, ProgressBarOpts::hidden());
//! assert!(style.is_enabled());
//! ```

pub(crate) mod display;
pub mod reporter;
pub mod speed;
pub(crate) mod style;

pub use display::ConsoleProgress;
pub use reporter::ProgressReporter;
pub use speed::SpeedEstimator;
pub use style::{ProgressBarOpts, StyleOptions};
