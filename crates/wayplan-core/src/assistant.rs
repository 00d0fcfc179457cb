//! Client for the assistant reply collaborator.
//!
//! Speaks the Ollama-compatible generate API: one prompt in, at most one
//! reply text (or an error) out. Transport details stay here; callers only
//! see strings.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Sender};

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Request one reply for a committed message. Errors cover timeouts,
    /// unreachable endpoints, and non-success statuses; the caller recovers
    /// locally.
    pub async fn reply(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "assistant request failed with status: {}",
                response.status()
            ));
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }
}

/// Assemble the prompt for one reply request from the conversation so far.
pub fn build_prompt(title: &str, destination: &str, history: &[Message]) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a travel planning assistant helping build a day-by-day ");
    prompt.push_str("itinerary. Keep suggestions concrete: places, neighborhoods, and ");
    prompt.push_str("rough timing.\n\n");

    prompt.push_str(&format!("Trip: {}", title));
    if !destination.is_empty() {
        prompt.push_str(&format!(" ({})", destination));
    }
    prompt.push_str("\n\n");

    if history.len() > 1 {
        prompt.push_str("Conversation so far:\n");
        for msg in history.iter().take(history.len().saturating_sub(1)) {
            match msg.sender {
                Sender::User => prompt.push_str(&format!("Traveler: {}\n", msg.body)),
                Sender::Assistant => prompt.push_str(&format!("Guide: {}\n", msg.body)),
            }
        }
        prompt.push('\n');
    }

    if let Some(last) = history.last() {
        prompt.push_str("Current message: ");
        prompt.push_str(&last.body);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MessageStore;

    #[test]
    fn prompt_includes_trip_and_current_message() {
        let mut store = MessageStore::new();
        store.append(Sender::User, "Plan Tokyo").unwrap();

        let prompt = build_prompt("Tokyo Adventure", "Tokyo", &store.list());
        assert!(prompt.contains("Trip: Tokyo Adventure (Tokyo)"));
        assert!(prompt.contains("Current message: Plan Tokyo"));
        assert!(!prompt.contains("Conversation so far"));
    }

    #[test]
    fn prompt_replays_prior_turns() {
        let mut store = MessageStore::new();
        store.append(Sender::User, "Plan Tokyo").unwrap();
        store.append(Sender::Assistant, "How many days?").unwrap();
        store.append(Sender::User, "Five").unwrap();

        let prompt = build_prompt("Tokyo Adventure", "", &store.list());
        assert!(prompt.contains("Traveler: Plan Tokyo"));
        assert!(prompt.contains("Guide: How many days?"));
        assert!(prompt.contains("Current message: Five"));
        assert!(!prompt.contains("(Tokyo)"));
    }
}
