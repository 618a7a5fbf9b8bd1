//! Console rendering of download events.
//!
//! [`ConsoleProgress`] subscribes to an [`EventChannel`] and keeps one
//! indicatif bar per active download. Bars appear with the first progress
//! event of an id and are finished by its terminal event.
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::manager::DownloadManager;
//! use haul::progress::{ConsoleProgress, StyleOptions};
//!
//! # fn example() -> Result<(), haul::Error> {
//! let manager = DownloadManager::builder().build()?;
//! let console = ConsoleProgress::attach(manager.events(), StyleOptions::default());
//!
//! // ... start downloads ...
//!
//! console.detach();
//! # Ok(())
//! # }
//! ```

use crate::download::Total;
use crate::events::{Disposer, DownloadEvent, EventChannel};
use crate::progress::StyleOptions;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

struct Bars {
    multi: MultiProgress,
    style: StyleOptions,
    by_id: Mutex<HashMap<String, ProgressBar>>,
}

/// Progress bars drawn from the events of a channel.
pub struct ConsoleProgress {
    bars: Arc<Bars>,
    subscription: Disposer,
}

impl ConsoleProgress {
    /// Render the events of `events` on stderr.
    pub fn attach(events: &EventChannel, style: StyleOptions) -> Self {
        let multi = match style.is_enabled() {
            true => MultiProgress::new(),
            false => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        Self::with_multi(events, style, multi)
    }

    /// Track the events of `events` without drawing anything.
    pub fn hidden(events: &EventChannel) -> Self {
        Self::with_multi(
            events,
            StyleOptions::default(),
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        )
    }

    fn with_multi(events: &EventChannel, style: StyleOptions, multi: MultiProgress) -> Self {
        let bars = Arc::new(Bars {
            multi,
            style,
            by_id: Mutex::new(HashMap::new()),
        });
        let handler = Arc::clone(&bars);
        let subscription = events.subscribe_all(move |event| handler.render(event));
        Self { bars, subscription }
    }

    /// Number of bars currently on screen.
    pub fn bar_count(&self) -> usize {
        self.bars.by_id.lock().len()
    }

    /// Bytes shown on the bar of `id`.
    pub fn position(&self, id: &str) -> Option<u64> {
        self.bars.by_id.lock().get(id).map(ProgressBar::position)
    }

    /// Stop listening and clear the remaining bars.
    pub fn detach(self) {
        self.subscription.dispose();
        for (_, bar) in self.bars.by_id.lock().drain() {
            bar.finish_and_clear();
        }
    }
}

impl Bars {
    fn render(&self, event: &DownloadEvent) {
        match event {
            DownloadEvent::Progress(p) => {
                let mut by_id = self.by_id.lock();
                let bar = by_id.entry(p.id.clone()).or_insert_with(|| {
                    let bar = self
                        .multi
                        .add(self.style.select(p.total.is_known()).to_progress_bar(p.total.known()));
                    bar.set_message(p.id.clone());
                    bar
                });
                if let Total::Known(total) = p.total {
                    bar.set_length(total);
                }
                bar.set_position(p.downloaded);
            }
            DownloadEvent::Completed(_) => self.finish(event, "done"),
            DownloadEvent::Error(e) => self.finish(event, &format!("failed: {}", e.message)),
            DownloadEvent::Cancelled(_) => self.finish(event, "cancelled"),
        }
    }

    fn finish(&self, event: &DownloadEvent, outcome: &str) {
        let Some(bar) = self.by_id.lock().remove(event.id()) else {
            return;
        };
        let total_known = bar.length().is_some();
        if self.style.select(total_known).clear {
            bar.finish_and_clear();
        } else {
            bar.finish_with_message(format!("{} {}", event.id(), outcome));
        }
        self.multi.remove(&bar);
    }
}
