//! Change notifications for the shelf
//!
//! Every observable change made through [`ShelfService`](crate::ShelfService)
//! is published as a [`ShelfEvent`] to the subscribers of an [`EventHub`].
//! Delivery is synchronous: subscribers run on the caller's thread, in
//! subscription order, after the change has been fully applied.

use crate::types::Duration;
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A change to the shelf, carrying the state after the change
///
/// Book and track positions are indices at the time the event is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ShelfEvent {
    BookAdded { index: usize, title: String },
    BookRemoved { index: usize, title: String },
    BookMoved { from: usize, to: usize },
    BookSelected { index: Option<usize> },
    TrackAdded { book: usize, index: usize, path: PathBuf },
    TrackRemoved { book: usize, index: usize, path: PathBuf },
    /// New track order of the book after a move or swap
    TrackOrderChanged { book: usize, order: Vec<PathBuf> },
    ElapsedTimeChanged {
        book: usize,
        track: usize,
        elapsed: Duration,
    },
    TrackIndexChanged { book: usize, index: Option<usize> },
    BookTitleChanged { book: usize, title: String },
    BookDurationChanged { book: usize, duration: Duration },
}

impl ShelfEvent {
    /// Stable name of the event kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::BookAdded { .. } => "book-added",
            Self::BookRemoved { .. } => "book-removed",
            Self::BookMoved { .. } => "book-moved",
            Self::BookSelected { .. } => "book-selected",
            Self::TrackAdded { .. } => "track-added",
            Self::TrackRemoved { .. } => "track-removed",
            Self::TrackOrderChanged { .. } => "track-order-changed",
            Self::ElapsedTimeChanged { .. } => "elapsed-time-changed",
            Self::TrackIndexChanged { .. } => "track-index-changed",
            Self::BookTitleChanged { .. } => "book-title-changed",
            Self::BookDurationChanged { .. } => "book-duration-changed",
        }
    }
}

impl fmt::Display for ShelfEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Callback(Box<dyn FnMut(&ShelfEvent) + Send>),
    Channel(Sender<ShelfEvent>),
}

/// Synchronous fan-out of shelf events
#[derive(Default)]
pub struct EventHub {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every published event
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&ShelfEvent) + Send + 'static,
    {
        self.register(Subscriber::Callback(Box::new(handler)))
    }

    /// Registers a channel that receives a copy of every published event
    ///
    /// The subscription is dropped automatically once the receiver is gone.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<ShelfEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = self.register(Subscriber::Channel(tx));
        (id, rx)
    }

    /// Removes a subscription; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        let removed = self.subscribers.len() != before;

        log::debug!("Unsubscribe {:?}: removed={}", id, removed);
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `event` to every subscriber
    pub fn publish(&mut self, event: &ShelfEvent) {
        log::trace!("Publishing {} to {} subscribers", event, self.subscribers.len());

        self.subscribers.retain_mut(|(id, subscriber)| match subscriber {
            Subscriber::Callback(handler) => {
                handler(event);
                true
            }
            Subscriber::Channel(tx) => {
                let delivered = tx.send(event.clone()).is_ok();
                if !delivered {
                    log::debug!("Dropping disconnected channel subscriber {:?}", id);
                }
                delivered
            }
        });
    }

    fn register(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));

        log::debug!("Subscribed {:?}", id);
        id
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
