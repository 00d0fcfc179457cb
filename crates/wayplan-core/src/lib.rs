pub mod assistant;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod keyboard;
pub mod plans;

// Re-export main types for convenience
pub use assistant::{build_prompt, AssistantClient};
pub use composer::{Composer, ComposerState};
pub use config::Config;
pub use conversation::{Message, MessageId, MessageStore, Sender};
pub use keyboard::{Insets, KeyboardCoordinator, KeyboardSignal, Platform};
pub use plans::{
    ConversationId, ConversationListModel, ConversationSource, ConversationSummary,
    NavigationRequest, SampleItineraries,
};
