//! Best-effort event fan-out to connected viewers.
//!
//! The bus is a pure invalidation signal: subscribers connected after an
//! event miss it and are expected to re-fetch current state on receipt.
//! Publishing never blocks the triggering mutation; subscribers whose
//! channel closed are pruned on the next publish.

use collab_core::feedback::{Answer, Comment, Question};
use collab_core::plan::PlanEntry;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "plan:added")]
    PlanAdded { plan: PlanEntry },
    #[serde(rename = "plan:updated")]
    PlanUpdated { plan: PlanEntry },
    #[serde(rename = "plan:removed")]
    PlanRemoved { plan_id: String },
    #[serde(rename = "comment:added")]
    CommentAdded { plan_id: String, comment: Comment },
    #[serde(rename = "comment:updated")]
    CommentUpdated { plan_id: String, comment: Comment },
    #[serde(rename = "question:answered")]
    QuestionAnswered {
        plan_id: String,
        question: Question,
        answer: Answer,
    },
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// A live connection the bus can push events into. `send` returns false once
/// the subscriber is gone; the bus drops it on the next publish.
pub trait Subscriber: Send {
    fn send(&self, event: &Event) -> bool;
}

/// Channel-backed subscriber used by the SSE transport. Unbounded so a slow
/// reader cannot stall the mutation that published the event.
struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<Event>,
}

impl Subscriber for ChannelSubscriber {
    fn send(&self, event: &Event) -> bool {
        self.tx.send(event.clone()).is_ok()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<(u64, Box<dyn Subscriber>)>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a channel subscriber; the receiver side feeds a transport.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.attach(id, Box::new(ChannelSubscriber { tx }));
        (id, rx)
    }

    pub fn attach(&self, id: u64, subscriber: Box<dyn Subscriber>) {
        self.lock().push((id, subscriber));
    }

    pub fn unsubscribe(&self, id: u64) {
        self.lock().retain(|(sid, _)| *sid != id);
    }

    /// Fan out to every live subscriber, dropping the dead ones.
    pub fn publish(&self, event: &Event) {
        self.lock().retain(|(_, sub)| sub.send(event));
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Box<dyn Subscriber>)>> {
        self.subscribers.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
