//! # Event Bus System
//!
//! Provides an event-driven architecture for the Reader Platform Core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between core modules through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, ReaderEvent, ShelfEvent};
//!
//! # let event_bus = EventBus::new(100);
//! let event = ReaderEvent::Shelf(ShelfEvent::BookAdded {
//!     book_id: "src-a/sable-road".to_string(),
//!     title: "Sable Road".to_string(),
//! });
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, ReaderEvent};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {:?}", event),
//!             Err(RecvError::Lagged(n)) => {
//!                 eprintln!("Missed {} events", n);
//!             }
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types
//! of errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n`
//!   events. This is non-fatal; the subscriber can continue receiving new
//!   events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates
//!   shutdown.
//!
//! Subscribers should handle `Lagged` gracefully and treat `Closed` as a
//! signal to exit.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// This value balances memory usage with the ability to handle bursts of
/// events. Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
/// It wraps domain-specific event types for different modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum ReaderEvent {
    /// Shelf membership and metadata events
    Shelf(ShelfEvent),
    /// Reading session events
    Reading(ReadingEvent),
    /// View and settings events
    View(ViewEvent),
    /// Remote fetch lifecycle events
    Fetch(FetchEvent),
}

impl ReaderEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ReaderEvent::Shelf(e) => e.description(),
            ReaderEvent::Reading(e) => e.description(),
            ReaderEvent::View(e) => e.description(),
            ReaderEvent::Fetch(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            ReaderEvent::Fetch(FetchEvent::Failed { .. }) => EventSeverity::Error,
            ReaderEvent::Shelf(ShelfEvent::BookAdded { .. })
            | ReaderEvent::Shelf(ShelfEvent::BookRemoved { .. })
            | ReaderEvent::Reading(ReadingEvent::ChapterEntered { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Shelf Events
// ============================================================================

/// Events related to shelf membership and stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ShelfEvent {
    /// A book was added to the shelf.
    BookAdded {
        /// The book's canonical id.
        book_id: String,
        /// Book title at the time of adding.
        title: String,
    },
    /// A book was removed from the shelf.
    BookRemoved {
        /// The removed book's id.
        book_id: String,
    },
    /// Stored shelf metadata was refreshed from a detail fetch.
    MetadataRefreshed {
        /// The refreshed book's id.
        book_id: String,
        /// Chapter count after the refresh.
        total_chapters: u32,
    },
}

impl ShelfEvent {
    fn description(&self) -> &str {
        match self {
            ShelfEvent::BookAdded { .. } => "Book added to shelf",
            ShelfEvent::BookRemoved { .. } => "Book removed from shelf",
            ShelfEvent::MetadataRefreshed { .. } => "Shelf metadata refreshed",
        }
    }
}

// ============================================================================
// Reading Events
// ============================================================================

/// Which end of the table of contents a no-op navigation hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChapterBoundary {
    First,
    Last,
}

/// Events related to reading sessions and stored progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ReadingEvent {
    /// The reader entered a chapter; progress has been persisted.
    ChapterEntered {
        /// The book being read.
        book_id: String,
        /// The entered chapter's id.
        chapter_id: String,
        /// Zero-based chapter index within the table of contents.
        index: usize,
        /// Percent of chapters entered, 0..=100.
        total_progress: f32,
    },
    /// A navigation request ran off the table of contents and was ignored.
    BoundaryReached {
        /// The book being read.
        book_id: String,
        /// Which end was hit.
        boundary: ChapterBoundary,
    },
    /// Stored progress for a book was explicitly reset.
    ProgressReset {
        /// The book whose progress was cleared.
        book_id: String,
    },
}

impl ReadingEvent {
    fn description(&self) -> &str {
        match self {
            ReadingEvent::ChapterEntered { .. } => "Chapter entered",
            ReadingEvent::BoundaryReached { .. } => "Chapter boundary reached",
            ReadingEvent::ProgressReset { .. } => "Reading progress reset",
        }
    }
}

// ============================================================================
// View Events
// ============================================================================

/// Events related to the active view and display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ViewEvent {
    /// The active view changed.
    Changed {
        /// Stable label of the new view ("search", "shelf", "detail",
        /// "reader").
        view: String,
    },
    /// Display settings were updated and persisted.
    SettingsUpdated,
    /// Search history was cleared.
    HistoryCleared,
}

impl ViewEvent {
    fn description(&self) -> &str {
        match self {
            ViewEvent::Changed { .. } => "Active view changed",
            ViewEvent::SettingsUpdated => "Display settings updated",
            ViewEvent::HistoryCleared => "Search history cleared",
        }
    }
}

// ============================================================================
// Fetch Events
// ============================================================================

/// Events tracing remote fetch lifecycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FetchEvent {
    /// A remote fetch was requested.
    Started {
        /// Resource label ("search", "detail", "chapter").
        resource: String,
        /// The fetch key (keyword or locator).
        key: String,
    },
    /// A remote fetch completed successfully.
    Completed {
        /// Resource label.
        resource: String,
        /// The fetch key.
        key: String,
    },
    /// A remote fetch failed.
    Failed {
        /// Resource label.
        resource: String,
        /// The fetch key.
        key: String,
        /// Stable error kind ("validation", "network", "not_found", "parse").
        kind: String,
        /// Human-readable error message.
        message: String,
    },
}

impl FetchEvent {
    fn description(&self) -> &str {
        match self {
            FetchEvent::Started { .. } => "Fetch started",
            FetchEvent::Completed { .. } => "Fetch completed",
            FetchEvent::Failed { .. } => "Fetch failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, ReaderEvent, ShelfEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let event_bus = EventBus::new(100);
///
/// let mut subscriber1 = event_bus.subscribe();
/// let mut subscriber2 = event_bus.subscribe();
///
/// let event = ReaderEvent::Shelf(ShelfEvent::BookRemoved {
///     book_id: "src-a/sable-road".to_string(),
/// });
/// event_bus.emit(event).ok();
/// # }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ReaderEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: ReaderEvent) -> Result<usize, SendError<ReaderEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<ReaderEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&ReaderEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering
/// capabilities.
///
/// This provides a more ergonomic API for consuming events with optional
/// filtering by event type or severity.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, ReaderEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let event_bus = EventBus::new(100);
/// let stream = EventStream::new(event_bus.subscribe());
///
/// // Filter for shelf events only
/// let mut shelf_stream = stream.filter(|event| {
///     matches!(event, ReaderEvent::Shelf(_))
/// });
/// # }
/// ```
pub struct EventStream {
    receiver: Receiver<ReaderEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<ReaderEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ReaderEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// This will skip events that don't match the filter and return the next
    /// matching event.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events. Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<ReaderEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }

            // Event didn't match filter, continue to next event
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<ReaderEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }

                    // Event didn't match filter, continue
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = ReaderEvent::Shelf(ShelfEvent::BookRemoved {
            book_id: "test".to_string(),
        });

        // Should error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = ReaderEvent::Shelf(ShelfEvent::BookAdded {
            book_id: "src-a/sable-road".to_string(),
            title: "Sable Road".to_string(),
        });

        let result = bus.emit(event.clone());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = ReaderEvent::Fetch(FetchEvent::Started {
            resource: "search".to_string(),
            key: "sable".to_string(),
        });

        bus.emit(event.clone()).ok();

        let received1 = sub1.recv().await.unwrap();
        let received2 = sub2.recv().await.unwrap();

        assert_eq!(received1, event);
        assert_eq!(received2, event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, ReaderEvent::Reading(_)));

        // Emit non-reading event (should be filtered out)
        let view_event = ReaderEvent::View(ViewEvent::Changed {
            view: "shelf".to_string(),
        });
        bus.emit(view_event).ok();

        // Emit reading event (should pass through)
        let reading_event = ReaderEvent::Reading(ReadingEvent::ChapterEntered {
            book_id: "src-a/sable-road".to_string(),
            chapter_id: "ch-1".to_string(),
            index: 0,
            total_progress: 2.5,
        });
        bus.emit(reading_event.clone()).ok();

        let received = stream.recv().await.unwrap();
        assert_eq!(received, reading_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        // Emit more events than buffer size
        for i in 0..5 {
            let event = ReaderEvent::Fetch(FetchEvent::Completed {
                resource: "chapter".to_string(),
                key: format!("ch-{}", i),
            });
            bus.emit(event).ok();
        }

        // First recv should indicate lagging
        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_event_severity() {
        let error_event = ReaderEvent::Fetch(FetchEvent::Failed {
            resource: "detail".to_string(),
            key: "gone".to_string(),
            kind: "not_found".to_string(),
            message: "no such novel".to_string(),
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let info_event = ReaderEvent::Shelf(ShelfEvent::BookAdded {
            book_id: "src-a/sable-road".to_string(),
            title: "Sable Road".to_string(),
        });
        assert_eq!(info_event.severity(), EventSeverity::Info);

        let debug_event = ReaderEvent::View(ViewEvent::Changed {
            view: "search".to_string(),
        });
        assert_eq!(debug_event.severity(), EventSeverity::Debug);
    }

    #[tokio::test]
    async fn test_event_description() {
        let event = ReaderEvent::Reading(ReadingEvent::BoundaryReached {
            book_id: "src-a/sable-road".to_string(),
            boundary: ChapterBoundary::Last,
        });
        assert_eq!(event.description(), "Chapter boundary reached");
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for i in 0..10 {
                let event = ReaderEvent::Fetch(FetchEvent::Started {
                    resource: "chapter".to_string(),
                    key: format!("ch-{}", i),
                });
                bus1.emit(event).ok();
            }
        });

        let handle2 = tokio::spawn(async move {
            for i in 0..10 {
                let event = ReaderEvent::Reading(ReadingEvent::ChapterEntered {
                    book_id: "src-a/sable-road".to_string(),
                    chapter_id: format!("ch-{}", i),
                    index: i,
                    total_progress: (i as f32 + 1.0) * 10.0,
                });
                bus2.emit(event).ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        // Should have received 20 events
        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = ReaderEvent::Reading(ReadingEvent::ChapterEntered {
            book_id: "src-a/sable-road".to_string(),
            chapter_id: "ch-3".to_string(),
            index: 2,
            total_progress: 7.5,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ch-3"));

        let deserialized: ReaderEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_try_recv_with_event() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        let event = ReaderEvent::View(ViewEvent::SettingsUpdated);
        bus.emit(event.clone()).ok();

        let result = stream.try_recv();
        assert!(result.is_some());
        let received = result.unwrap().unwrap();
        assert_eq!(received, event);
    }
}
