//! # Event Subscriber
//!
//! Observer side of the bus. A [`Subscription`] pulls events by hand
//! (`recv`, `try_recv`, `drain`); an [`EventStream`] wraps the same receiver
//! as a `Stream` that parks until the next matching event arrives.
//!
//! A slow observer that falls more than the channel capacity behind skips
//! the overwritten events. Both forms count the skipped events in
//! [`Subscription::missed`] / [`EventStream::missed`] instead of failing.

use crate::events::{EventFilter, SignalEvent};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::Stream;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Filtered receiver of [`SignalEvent`]s.
pub struct Subscription {
    receiver: broadcast::Receiver<SignalEvent>,
    filter: EventFilter,
    missed: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<SignalEvent>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            missed: 0,
        }
    }

    /// Next matching event. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<SignalEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered matching event, `Ok(None)` if nothing is buffered.
    pub fn try_recv(&mut self) -> Result<Option<SignalEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Every matching event currently buffered, in publication order.
    pub fn drain(&mut self) -> Vec<SignalEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Events skipped because this subscriber lagged.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Turn this subscription into a [`Stream`].
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
            missed: self.missed,
        }
    }

    fn record_lag(&mut self, skipped: u64) {
        self.missed = self.missed.saturating_add(skipped);
        warn!(skipped, total = self.missed, "Subscriber lagged behind the bus");
    }
}

/// [`Subscription`] as a `Stream`. Ends when the bus is dropped.
pub struct EventStream {
    inner: BroadcastStream<SignalEvent>,
    filter: EventFilter,
    missed: u64,
}

impl EventStream {
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Events skipped because this stream lagged.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }
}

impl Stream for EventStream {
    type Item = SignalEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(event)) if this.filter.matches(&event) => return Poll::Ready(Some(event)),
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    this.missed = this.missed.saturating_add(skipped);
                    warn!(skipped, total = this.missed, "Event stream lagged behind the bus");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
