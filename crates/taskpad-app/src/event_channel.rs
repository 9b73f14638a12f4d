//! One-shot UI event delivery.
//!
//! [`EventChannel`] is a point-to-point FIFO queue between a view-model
//! (producer) and its presentation layer (consumer). Unlike a broadcast
//! feed, every event is delivered at most once: a consumer that detaches
//! and reattaches resumes draining where it left off, and never sees an
//! already-delivered event again. Undelivered events wait in the buffer
//! rather than being dropped, so nothing is lost while the UI is torn
//! down.

use tokio::sync::{Mutex, mpsc};

/// Default event buffer. UI intents are rare; this never fills in
/// practice, and a full buffer makes `send` wait instead of dropping.
const EVENT_BUFFER: usize = 32;

/// Point-to-point at-most-once event queue.
///
/// Both channel halves live in this struct, so the channel stays open for
/// the owner's whole lifetime; consumers borrow the receiving side one at
/// a time through an async mutex.
pub struct EventChannel<E> {
    tx: mpsc::Sender<E>,
    rx: Mutex<mpsc::Receiver<E>>,
}

impl<E> EventChannel<E> {
    /// Create a channel with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BUFFER)
    }

    /// Create a channel with an explicit buffer size (at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Enqueue one event, waiting for buffer space if necessary.
    pub async fn send(&self, event: E) {
        // The receiver half lives in this struct and is never closed, so
        // the send cannot fail while `self` is alive
        let _ = self.tx.send(event).await;
    }

    /// Receive the next event, waiting until one is sent.
    ///
    /// Attaches this caller as the active consumer until the event
    /// arrives. `None` is only possible once the channel is torn down,
    /// which cannot happen while `self` is intact.
    pub async fn recv(&self) -> Option<E> {
        self.rx.lock().await.recv().await
    }

    /// Take the next event if one is already buffered.
    ///
    /// Returns `None` when the buffer is empty or another consumer is
    /// currently attached.
    pub fn try_recv(&self) -> Option<E> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
