use anyhow::{anyhow, Result};
use ratatui::widgets::ListState;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use wayplan_core::{
    build_prompt, AssistantClient, Composer, Config, ConversationId, ConversationListModel,
    ConversationSource, KeyboardCoordinator, KeyboardSignal, MessageStore, NavigationRequest,
    Platform, Sender,
};

use crate::tui::AppEvent;

/// Notice shown inline when a reply request fails; the user's own message
/// stays in the transcript regardless.
pub const REPLY_FAILURE_NOTICE: &str = "Couldn't get a response. Your message was kept.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Plans,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// One mounted conversation detail view. Owns its store, composer, keyboard
/// coordinator, and any outstanding reply tasks; all three die or park with
/// the view.
pub struct ChatView {
    pub conversation: ConversationId,
    pub title: String,
    pub destination: String,
    pub store: MessageStore,
    pub composer: Composer,
    pub keyboard: KeyboardCoordinator,
    pub pending_replies: Vec<JoinHandle<Result<String>>>,
    pub reply_notice: Option<&'static str>,

    // Transcript viewport, updated during render
    pub scroll: u16,
    pub viewport_height: u16,
    pub viewport_width: u16,
}

impl ChatView {
    fn new(request: NavigationRequest, destination: String, store: MessageStore) -> Self {
        let mut view = Self {
            conversation: request.conversation,
            title: request.title,
            destination,
            store,
            composer: Composer::new(),
            keyboard: KeyboardCoordinator::new(Platform::current()),
            pending_replies: Vec::new(),
            reply_notice: None,
            scroll: 0,
            viewport_height: 0,
            viewport_width: 0,
        };
        view.scroll_to_bottom();
        view
    }

    /// Commit the composer draft: append the user message and clear any stale
    /// failure notice. Returns the committed body for dispatch, or `None`
    /// when the composer is empty (submit is inert).
    pub fn commit_draft(&mut self) -> Option<String> {
        let body = self.composer.submit()?;
        match self.store.append(Sender::User, &body) {
            Ok(_) => {
                self.reply_notice = None;
                self.scroll_to_bottom();
                Some(body)
            }
            Err(err) => {
                // Unreachable through the composer guard
                warn!(%err, "committed draft rejected by store");
                None
            }
        }
    }

    pub fn is_waiting(&self) -> bool {
        !self.pending_replies.is_empty()
    }

    /// Scroll so the transcript tail (and the Thinking indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.viewport_width > 0 {
            self.viewport_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.store.list() {
            total_lines += 1; // Sender line
            for line in msg.body.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.reply_notice.is_some() {
            total_lines += 2;
        }
        if self.is_waiting() {
            total_lines += 2; // Sender line + "Thinking..."
        }

        let visible_height = if self.viewport_height > 0 {
            self.viewport_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.scroll = 0;
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Conversation list
    pub plans: ConversationListModel,
    pub plan_state: ListState,

    // Mounted detail view, if any, plus stores parked between visits
    pub chat: Option<ChatView>,
    parked_stores: HashMap<ConversationId, MessageStore>,

    // Collaborators
    source: Box<dyn ConversationSource>,
    assistant: AssistantClient,
    model: String,
    platform_tx: mpsc::UnboundedSender<AppEvent>,

    // Animation state
    pub animation_frame: u8,
}

impl App {
    pub fn new(
        config: &Config,
        source: Box<dyn ConversationSource>,
        platform_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let plans = ConversationListModel::new(source.summaries());

        let mut plan_state = ListState::default();
        if !plans.is_empty() {
            plan_state.select(Some(0));
        }

        Self {
            should_quit: false,
            screen: Screen::Plans,
            input_mode: InputMode::Normal,
            plans,
            plan_state,
            chat: None,
            parked_stores: HashMap::new(),
            source,
            assistant: AssistantClient::new(config.assistant_url()),
            model: config.model().to_string(),
            platform_tx,
            animation_frame: 0,
        }
    }

    // List navigation
    pub fn plans_nav_down(&mut self) {
        let len = self.plans.len();
        if len > 0 {
            let i = self.plan_state.selected().unwrap_or(0);
            self.plan_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn plans_nav_up(&mut self) {
        let i = self.plan_state.selected().unwrap_or(0);
        self.plan_state.select(Some(i.saturating_sub(1)));
    }

    pub fn plans_nav_first(&mut self) {
        if !self.plans.is_empty() {
            self.plan_state.select(Some(0));
        }
    }

    pub fn plans_nav_last(&mut self) {
        let len = self.plans.len();
        if len > 0 {
            self.plan_state.select(Some(len - 1));
        }
    }

    /// Open the conversation under the cursor. Unknown ids decline to
    /// navigate.
    pub fn open_selected(&mut self) {
        let Some(summary) = self.plan_state.selected().and_then(|i| self.plans.get(i)) else {
            return;
        };
        let id = summary.id.clone();
        match self.plans.select(&id) {
            Some(request) => self.open_conversation(request),
            None => warn!(conversation = %id, "selection did not resolve, staying on list"),
        }
    }

    /// Allocate a fresh plan and open it.
    pub fn open_new_plan(&mut self) {
        let request = self.plans.create_new();
        self.plan_state.select(Some(0));
        self.open_conversation(request);
    }

    /// Mount a detail view for the request. The store is resumed from this
    /// session if the conversation was visited before, otherwise created
    /// lazily from the listing collaborator's history.
    pub fn open_conversation(&mut self, request: NavigationRequest) {
        self.close_chat();

        let destination = self
            .plans
            .list()
            .iter()
            .find(|s| s.id == request.conversation)
            .map(|s| s.destination.clone())
            .unwrap_or_default();

        let store = self
            .parked_stores
            .remove(&request.conversation)
            .unwrap_or_else(|| MessageStore::with_history(self.source.history(&request.conversation)));

        debug!(conversation = %request.conversation, "opening conversation");
        self.chat = Some(ChatView::new(request, destination, store));
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Normal;
    }

    /// Back signal: unmount the detail view. Outstanding reply tasks are
    /// aborted; the store is parked for this session.
    pub fn close_chat(&mut self) {
        if let Some(chat) = self.chat.take() {
            for task in &chat.pending_replies {
                task.abort();
            }
            self.parked_stores.insert(chat.conversation.clone(), chat.store);
        }
        self.screen = Screen::Plans;
        self.input_mode = InputMode::Normal;
    }

    /// Submit the composer draft and dispatch a reply request. Sends are not
    /// serialized behind outstanding replies; each submit spawns its own
    /// task.
    pub fn submit_draft(&mut self) {
        let assistant = self.assistant.clone();
        let model = self.model.clone();

        let Some(chat) = self.chat.as_mut() else {
            return;
        };
        if chat.commit_draft().is_none() {
            return;
        }
        debug!(conversation = %chat.conversation, "dispatching reply request");

        let prompt = build_prompt(&chat.title, &chat.destination, &chat.store.list());
        chat.pending_replies.push(tokio::spawn(async move {
            assistant.reply(&model, &prompt).await
        }));
    }

    /// Drain reply tasks that have finished, applying their outcomes in the
    /// order the loop observes completion.
    pub async fn poll_replies(&mut self) {
        let Some(chat) = self.chat.as_mut() else {
            return;
        };
        if chat.pending_replies.is_empty() {
            return;
        }

        let conversation = chat.conversation.clone();
        let mut outcomes = Vec::new();
        let mut still_pending = Vec::new();

        for task in chat.pending_replies.drain(..) {
            if task.is_finished() {
                let outcome = match task.await {
                    Ok(result) => result,
                    Err(err) => Err(anyhow!("reply task failed: {err}")),
                };
                outcomes.push(outcome);
            } else {
                still_pending.push(task);
            }
        }
        chat.pending_replies = still_pending;

        for outcome in outcomes {
            self.apply_reply(&conversation, outcome);
        }
    }

    /// Apply one reply outcome to the view that requested it. Delivery to an
    /// unmounted view, or to a view for a different conversation, is a no-op.
    pub fn apply_reply(&mut self, conversation: &ConversationId, outcome: Result<String>) {
        let Some(chat) = self.chat.as_mut() else {
            return;
        };
        if &chat.conversation != conversation {
            return;
        }

        match outcome {
            Ok(reply) if !reply.trim().is_empty() => {
                if let Err(err) = chat.store.append(Sender::Assistant, reply.trim()) {
                    warn!(%err, "dropping assistant reply");
                }
            }
            Ok(_) => {
                warn!(conversation = %conversation, "assistant returned an empty reply");
                chat.reply_notice = Some(REPLY_FAILURE_NOTICE);
            }
            Err(err) => {
                warn!(conversation = %conversation, %err, "assistant request failed");
                chat.reply_notice = Some(REPLY_FAILURE_NOTICE);
            }
        }
        chat.scroll_to_bottom();
    }

    /// Route a platform keyboard signal to the mounted view's coordinator.
    /// Signals arriving with no view mounted are dropped.
    pub fn handle_keyboard_signal(&mut self, signal: KeyboardSignal) {
        if let Some(chat) = self.chat.as_mut() {
            chat.keyboard.apply(signal);
        }
    }

    /// Hand a signal to the platform delivery channel. The standalone TUI is
    /// its own keyboard subsystem; it announces show/hide around composer
    /// focus changes.
    pub fn emit_keyboard_signal(&self, signal: KeyboardSignal) {
        let _ = self.platform_tx.send(AppEvent::Keyboard(signal));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.as_ref().is_some_and(|c| c.is_waiting()) {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
