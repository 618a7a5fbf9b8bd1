//! Progress bar styling and configuration options.
//!
//! Downloads whose size is announced by the server are drawn as a byte bar;
//! downloads of unknown size are drawn as a spinner with a byte counter.
//!
//! # Examples
//!
//! ```rust
//! use haul::progress::{ProgressBarOpts, StyleOptions};
//!
//! let style = StyleOptions::new(
//!     ProgressBarOpts::new(
//!         Some("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}".to_string()),
//!         Some(ProgressBarOpts::CHARS_FADE_IN.to_string()),
//!         true,
//!         false,
//!     ),
//!     ProgressBarOpts::with_spinner_style(),
//! );
//! assert!(style.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Style options of the console renderer.
///
/// By default finished bars are cleared from the screen.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Bar used when the total size is known.
    pub(crate) known_size: ProgressBarOpts,
    /// Bar used when the total size is unknown.
    pub(crate) unknown_size: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            known_size: ProgressBarOpts::with_pip_style(),
            unknown_size: ProgressBarOpts::with_spinner_style(),
        }
    }
}

impl StyleOptions {
    /// Create new [`StyleOptions`].
    pub fn new(known_size: ProgressBarOpts, unknown_size: ProgressBarOpts) -> Self {
        Self { known_size, unknown_size }
    }

    /// Hide every bar.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
    }

    /// Return `false` if neither kind of bar is enabled.
    pub fn is_enabled(&self) -> bool {
        self.known_size.enabled || self.unknown_size.enabled
    }

    /// Options of the bar used when the total size is known.
    pub fn known_size(&self) -> &ProgressBarOpts {
        &self.known_size
    }

    /// Options of the bar used when the total size is unknown.
    pub fn unknown_size(&self) -> &ProgressBarOpts {
        &self.unknown_size
    }

    pub(crate) fn select(&self, total_known: bool) -> &ProgressBarOpts {
        if total_known {
            &self.known_size
        } else {
            &self.unknown_size
        }
    }
}

/// Define the options for a progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    pub(crate) enabled: bool,
    /// Clear the progress bar once finished.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Template which looks like the Python package installer pip, prefixed
    /// with the download id.
    ///
    /// `iso ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 211.23 KiB/211.23 KiB 1008.31 KiB/s eta 0s`
    pub const TEMPLATE_PIP: &'static str =
        "{msg:12} {bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} eta {eta:.blue}";
    /// Spinner with a byte counter, for downloads of unknown size.
    ///
    /// `iso ⠙ 12.40 MiB 2.10 MiB/s`
    pub const TEMPLATE_SPINNER: &'static str =
        "{msg:12} {spinner:.green} {bytes:>11.green} {bytes_per_sec:>13.red}";
    /// Use fade-in blocks as progress characters: `"█▓▒░  "`.
    pub const CHARS_FADE_IN: &'static str = "█▓▒░  ";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template is logged and replaced by the default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            match ProgressStyle::default_bar().template(template) {
                Ok(templated) => style = templated,
                Err(e) => warn!(template = %template, "Invalid progress template: {}", e),
            }
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(&self, len: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let bar = match len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::no_length(),
        };
        bar.with_style(self.to_progress_style())
    }

    /// Create a new [`ProgressBarOpts`] which looks like Python pip.
    pub fn with_pip_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PIP.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    /// Create a new [`ProgressBarOpts`] drawing a spinner.
    pub fn with_spinner_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_SPINNER.into()),
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }

    /// Set to `true` to clear the progress bar once finished.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bars.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}
