//! Publish/subscribe registry for download events.

use super::event::{
    CancelledEvent, CompletedEvent, DownloadEvent, ErrorEvent, EventKind, ProgressEvent,
};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::warn;

type Callback = Arc<dyn Fn(&DownloadEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_key: u64,
    by_kind: HashMap<EventKind, Vec<(u64, Callback)>>,
}

/// Fan-out of download events to any number of subscribers.
///
/// Subscriptions are made per [`EventKind`]; each call returns a [`Disposer`]
/// that removes exactly that subscription. Callbacks run on the task that
/// emits the event, so they should return quickly. A panicking callback is
/// logged and does not affect other subscribers or the download.
///
/// ```rust
/// use haul::events::EventChannel;
///
/// let events = EventChannel::new();
/// let progress = events.on_progress(|p| println!("{}: {} bytes", p.id, p.downloaded));
/// let done = events.on_completed(|c| println!("{} saved to {:?}", c.id, c.path));
///
/// progress.dispose();
/// done.dispose();
/// ```
#[derive(Clone, Default)]
pub struct EventChannel {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.lock();
        let counts: HashMap<EventKind, usize> = subscribers
            .by_kind
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventChannel")
            .field("subscribers", &counts)
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Disposer
    where
        F: Fn(&DownloadEvent) + Send + Sync + 'static,
    {
        self.register(&[kind], Arc::new(callback))
    }

    /// Register `callback` for all event kinds at once. The returned
    /// [`Disposer`] removes all four registrations.
    pub fn subscribe_all<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&DownloadEvent) + Send + Sync + 'static,
    {
        self.register(&EventKind::ALL, Arc::new(callback))
    }

    pub fn on_progress<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Progress, move |event| {
            if let DownloadEvent::Progress(e) = event {
                callback(e)
            }
        })
    }

    pub fn on_completed<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&CompletedEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Completed, move |event| {
            if let DownloadEvent::Completed(e) = event {
                callback(e)
            }
        })
    }

    pub fn on_error<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Error, move |event| {
            if let DownloadEvent::Error(e) = event {
                callback(e)
            }
        })
    }

    pub fn on_cancelled<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&CancelledEvent) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Cancelled, move |event| {
            if let DownloadEvent::Cancelled(e) = event {
                callback(e)
            }
        })
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .lock()
            .by_kind
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to every subscriber of its kind, in subscription order.
    ///
    /// The subscriber list is copied before delivery, so callbacks may
    /// subscribe or dispose without deadlocking.
    pub(crate) fn emit(&self, event: &DownloadEvent) {
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock();
            subscribers
                .by_kind
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(id = event.id(), kind = %event.kind(), "Event subscriber panicked");
            }
        }
    }

    fn register(&self, kinds: &[EventKind], callback: Callback) -> Disposer {
        let mut subscribers = self.subscribers.lock();
        let key = subscribers.next_key;
        subscribers.next_key += 1;
        for kind in kinds {
            subscribers
                .by_kind
                .entry(*kind)
                .or_default()
                .push((key, Arc::clone(&callback)));
        }
        Disposer {
            subscribers: Arc::downgrade(&self.subscribers),
            key,
            kinds: kinds.to_vec(),
        }
    }
}

/// Handle removing one subscription from an [`EventChannel`].
///
/// Dropping a disposer without calling [`Disposer::dispose`] keeps the
/// subscription alive for the lifetime of the channel.
#[must_use = "dropping a Disposer keeps the subscription registered"]
pub struct Disposer {
    subscribers: Weak<Mutex<Subscribers>>,
    key: u64,
    kinds: Vec<EventKind>,
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("key", &self.key)
            .field("kinds", &self.kinds)
            .finish()
    }
}

impl Disposer {
    /// Remove the subscription. Other subscriptions are left untouched.
    pub fn dispose(self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        let mut subscribers = subscribers.lock();
        for kind in &self.kinds {
            if let Some(list) = subscribers.by_kind.get_mut(kind) {
                list.retain(|(key, _)| *key != self.key);
            }
        }
    }
}
