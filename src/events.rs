//! Output events and the single channel they are emitted through.

use crate::results::Hit;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Name of an output event, used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LoadingChanged,
    ResultsChanged,
    HighlightChanged,
    SelectionMade,
    Commit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent<R> {
    /// A fetch started (`true`) or finished (`false`).
    LoadingChanged(bool),
    /// A new result set was published, or the results were cleared.
    ResultsChanged(Vec<Hit<R>>),
    /// The highlight landed on `record`. The renderer scrolls it into view,
    /// shifted by `scroll_offset` pixels.
    HighlightChanged {
        index: usize,
        record: R,
        scroll_offset: i32,
    },
    SelectionMade(R),
    /// Commit without an active highlight.
    Commit,
}

impl<R> SearchEvent<R> {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::LoadingChanged(_) => EventKind::LoadingChanged,
            Self::ResultsChanged(_) => EventKind::ResultsChanged,
            Self::HighlightChanged { .. } => EventKind::HighlightChanged,
            Self::SelectionMade(_) => EventKind::SelectionMade,
            Self::Commit => EventKind::Commit,
        }
    }
}

pub type Handler<R> = Arc<dyn Fn(&SearchEvent<R>) + Send + Sync>;

/// Returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Maps event names to their subscribed handlers.
///
/// Handlers run synchronously, in subscription order, on whichever task
/// emits. They may subscribe or unsubscribe while being called.
pub struct EventEmitter<R> {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<EventKind, Vec<(SubscriptionId, Handler<R>)>>>,
}

impl<R> Default for EventEmitter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for EventEmitter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.lock();
        f.debug_struct("EventEmitter")
            .field(
                "subscriptions",
                &handlers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl<R> EventEmitter<R> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<(SubscriptionId, Handler<R>)>>> {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&SearchEvent<R>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let mut removed = false;
        for list in handlers.values_mut() {
            let before = list.len();
            list.retain(|(existing, _)| *existing != id);
            removed |= list.len() != before;
        }
        removed
    }

    pub fn emit(&self, event: &SearchEvent<R>) {
        let handlers: Vec<Handler<R>> = self
            .lock()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        tracing::trace!(
            "Emitting {:?} to {} handler(s)",
            event.kind(),
            handlers.len()
        );
        for handler in handlers {
            handler(event);
        }
    }
}

impl<R: Clone + Send + 'static> EventEmitter<R> {
    /// Forward the given event kinds into a channel.
    ///
    /// The subscriptions stay registered after the receiver is dropped; sends
    /// to a closed channel are ignored.
    pub fn channel(
        &self,
        kinds: &[EventKind],
    ) -> (mpsc::UnboundedReceiver<SearchEvent<R>>, Vec<SubscriptionId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ids = kinds
            .iter()
            .map(|kind| {
                let tx = tx.clone();
                self.subscribe(*kind, move |event| {
                    let _ = tx.send(event.clone());
                })
            })
            .collect();
        (rx, ids)
    }
}

/// Every event kind, in no particular order.
pub const ALL_EVENTS: [EventKind; 5] = [
    EventKind::LoadingChanged,
    EventKind::ResultsChanged,
    EventKind::HighlightChanged,
    EventKind::SelectionMade,
    EventKind::Commit,
];
