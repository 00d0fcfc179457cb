//! Conversation list model and the navigation handoff.
//!
//! Summaries come from an injected `ConversationSource` rather than any
//! process-wide state; the model only resolves selections and allocates ids
//! for new plans.

use chrono::{Duration, Local};
use std::fmt;

use crate::conversation::{Message, MessageId, Sender};

/// Stable conversation identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        ConversationId(s.to_string())
    }
}

/// Immutable display fields for one entry in the conversation list.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub destination: String,
    pub last_message: String,
    pub date: String,
}

/// Parameters handed to the navigation collaborator to open a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub conversation: ConversationId,
    pub title: String,
}

/// Listing/persistence collaborator: supplies the initial summaries and the
/// initial message history per conversation, already valid and ordered.
pub trait ConversationSource {
    fn summaries(&self) -> Vec<ConversationSummary>;
    fn history(&self, id: &ConversationId) -> Vec<Message>;
}

/// Ordered conversation summaries plus fresh-id allocation.
pub struct ConversationListModel {
    entries: Vec<ConversationSummary>,
    next_id: u64,
}

impl ConversationListModel {
    /// Build from the source's explicit sequence; display order is source
    /// order, no implicit sort. The id counter starts past the largest
    /// numeric id so new plans never collide.
    pub fn new(entries: Vec<ConversationSummary>) -> Self {
        let next_id = entries
            .iter()
            .filter_map(|e| e.id.0.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self { entries, next_id }
    }

    pub fn list(&self) -> &[ConversationSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConversationSummary> {
        self.entries.get(index)
    }

    /// Resolve a selection to navigation parameters. Unknown ids yield `None`
    /// and the caller declines to navigate.
    pub fn select(&self, id: &ConversationId) -> Option<NavigationRequest> {
        self.entries.iter().find(|e| &e.id == id).map(|e| NavigationRequest {
            conversation: e.id.clone(),
            title: e.title.clone(),
        })
    }

    /// Allocate a fresh conversation and hand back its navigation request.
    /// The new entry is prepended so the list stays newest-first.
    pub fn create_new(&mut self) -> NavigationRequest {
        let id = ConversationId(self.next_id.to_string());
        self.next_id += 1;

        let title = "New Plan".to_string();
        self.entries.insert(
            0,
            ConversationSummary {
                id: id.clone(),
                title: title.clone(),
                destination: String::new(),
                last_message: String::new(),
                date: Local::now().format("%Y-%m-%d").to_string(),
            },
        );

        NavigationRequest {
            conversation: id,
            title,
        }
    }
}

/// Built-in sample itineraries standing in for a real listing backend.
pub struct SampleItineraries;

impl SampleItineraries {
    pub fn new() -> Self {
        SampleItineraries
    }
}

impl Default for SampleItineraries {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSource for SampleItineraries {
    fn summaries(&self) -> Vec<ConversationSummary> {
        vec![
            ConversationSummary {
                id: ConversationId("1".into()),
                title: "Tokyo Adventure".into(),
                destination: "Tokyo".into(),
                last_message: "Planning a 5-day trip to Tokyo".into(),
                date: "2024-01-15".into(),
            },
            ConversationSummary {
                id: ConversationId("2".into()),
                title: "Kyoto Exploration".into(),
                destination: "Kyoto".into(),
                last_message: "Traditional temples and gardens tour".into(),
                date: "2024-01-14".into(),
            },
            ConversationSummary {
                id: ConversationId("3".into()),
                title: "Osaka Food Tour".into(),
                destination: "Osaka".into(),
                last_message: "Discovering the best street food spots".into(),
                date: "2024-01-13".into(),
            },
        ]
    }

    fn history(&self, id: &ConversationId) -> Vec<Message> {
        if id.as_str() != "1" {
            return Vec::new();
        }

        let base = Local::now() - Duration::minutes(30);
        vec![
            Message {
                id: MessageId(1),
                sender: Sender::User,
                body: "I want to plan a 5-day trip to Tokyo.".into(),
                sent_at: base,
            },
            Message {
                id: MessageId(2),
                sender: Sender::Assistant,
                body: "I'd be happy to help you plan your Tokyo trip! To create the best \
                       itinerary for you, could you tell me what kind of activities you're \
                       most interested in? For example:\n\n- Cultural experiences\n- Food \
                       exploration\n- Shopping\n- Historical sites\n- Modern attractions"
                    .into(),
                sent_at: base + Duration::minutes(1),
            },
            Message {
                id: MessageId(3),
                sender: Sender::User,
                body: "I'm mainly interested in cultural experiences and food exploration."
                    .into(),
                sent_at: base + Duration::minutes(2),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ConversationListModel {
        ConversationListModel::new(SampleItineraries::new().summaries())
    }

    #[test]
    fn list_keeps_source_order() {
        let model = model();
        let titles: Vec<_> = model.list().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Tokyo Adventure", "Kyoto Exploration", "Osaka Food Tour"]
        );
    }

    #[test]
    fn select_carries_the_summary_title() {
        let model = model();
        let request = model.select(&ConversationId::from("2")).unwrap();
        assert_eq!(request.conversation, ConversationId::from("2"));
        assert_eq!(request.title, "Kyoto Exploration");
    }

    #[test]
    fn select_unknown_id_declines() {
        let model = model();
        assert!(model.select(&ConversationId::from("99")).is_none());
    }

    #[test]
    fn create_new_never_collides() {
        let mut model = model();
        let first = model.create_new();
        let second = model.create_new();

        assert_ne!(first.conversation, second.conversation);
        assert_eq!(first.title, "New Plan");
        // Both allocated past the seeded ids.
        for request in [&first, &second] {
            assert!(model.select(&request.conversation).is_some());
            assert!(request.conversation.as_str().parse::<u64>().unwrap() > 3);
        }
    }

    #[test]
    fn create_new_prepends_to_the_list() {
        let mut model = model();
        let request = model.create_new();
        assert_eq!(model.list()[0].id, request.conversation);
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn history_is_seeded_for_the_tokyo_plan_only() {
        let source = SampleItineraries::new();
        assert_eq!(source.history(&ConversationId::from("1")).len(), 3);
        assert!(source.history(&ConversationId::from("2")).is_empty());
    }
}
