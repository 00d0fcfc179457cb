//! Conversation transcript types and the per-conversation message store.
//!
//! A `MessageStore` is append-only: messages are never edited, reordered, or
//! removed once committed. Each live conversation view owns exactly one store.

use anyhow::{bail, Result};
use chrono::{DateTime, Local};

/// Stable per-conversation message identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One committed message in a conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub body: String,
    pub sent_at: DateTime<Local>,
}

/// Ordered, append-only message history for a single conversation.
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Seed a store from history supplied by the listing collaborator.
    /// Ids assigned later continue past the seeded maximum.
    pub fn with_history(messages: Vec<Message>) -> Self {
        let next_id = messages.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
        Self { messages, next_id }
    }

    /// Append a committed message to the tail and return it finalized.
    ///
    /// The body must be non-empty after trimming; blank bodies never reach the
    /// store through the composer guard, so hitting this error indicates a
    /// caller bug.
    pub fn append(&mut self, sender: Sender, body: &str) -> Result<Message> {
        if body.trim().is_empty() {
            bail!("refusing to store a blank message body");
        }

        let message = Message {
            id: MessageId(self.next_id),
            sender,
            body: body.to_string(),
            sent_at: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Full ordered history as an owned snapshot. Later appends are never
    /// visible through a snapshot already handed out.
    pub fn list(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut store = MessageStore::new();
        store.append(Sender::User, "first").unwrap();
        store.append(Sender::Assistant, "second").unwrap();
        store.append(Sender::User, "third").unwrap();

        let bodies: Vec<_> = store.list().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[test]
    fn append_orders_by_completion_not_submission() {
        // A user send racing an assistant reply lands in whichever order the
        // event loop observes completion. "There" completing first is ordered
        // first regardless of which was submitted earlier.
        let mut store = MessageStore::new();
        store.append(Sender::Assistant, "There").unwrap();
        store.append(Sender::User, "Hi").unwrap();

        let bodies: Vec<_> = store.list().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["There", "Hi"]);
    }

    #[test]
    fn append_rejects_blank_bodies() {
        let mut store = MessageStore::new();
        assert!(store.append(Sender::User, "").is_err());
        assert!(store.append(Sender::User, "   \n\t").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn append_assigns_unique_increasing_ids() {
        let mut store = MessageStore::new();
        let a = store.append(Sender::User, "a").unwrap();
        let b = store.append(Sender::User, "b").unwrap();
        assert_ne!(a.id, b.id);
        assert!(b.id.0 > a.id.0);
    }

    #[test]
    fn snapshots_do_not_observe_later_appends() {
        let mut store = MessageStore::new();
        store.append(Sender::User, "only").unwrap();

        let snapshot = store.list();
        store.append(Sender::Assistant, "later").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn seeded_history_keeps_ids_unique() {
        let seeded = vec![
            Message {
                id: MessageId(1),
                sender: Sender::User,
                body: "seeded".into(),
                sent_at: Local::now(),
            },
            Message {
                id: MessageId(2),
                sender: Sender::Assistant,
                body: "reply".into(),
                sent_at: Local::now(),
            },
        ];
        let mut store = MessageStore::with_history(seeded);
        let fresh = store.append(Sender::User, "new").unwrap();
        assert_eq!(fresh.id, MessageId(3));
    }
}
