use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{ChatMessage, ChatSender, Language};
use super::{AdvisoryError, ChatProvider};

#[derive(Debug, Default)]
struct ChatState {
    language: Option<Language>,
    history: Vec<ChatMessage>,
    sequence: u64,
}

impl ChatState {
    fn next_id(&mut self) -> String {
        self.sequence += 1;
        format!("MSG-{:06}", self.sequence)
    }

    fn record(&mut self, text: String, sender: ChatSender, at: DateTime<Utc>) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id(),
            text,
            sender,
            timestamp: at,
        };
        self.history.push(message.clone());
        message
    }
}

/// One running advisor conversation. Switching language starts a new one.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    state: Mutex<ChatState>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(ChatState::default()),
        }
    }

    /// Send a user message and return the advisor's reply. Failed turns are
    /// not recorded.
    pub async fn send(
        &self,
        message: &str,
        language: Language,
        now: DateTime<Utc>,
    ) -> Result<ChatMessage, AdvisoryError> {
        let history = {
            let mut state = self.lock()?;
            if state.language != Some(language) {
                state.language = Some(language);
                state.history.clear();
            }
            state.history.clone()
        };

        let reply = self.provider.reply(&history, message, language).await?;

        let mut state = self.lock()?;
        if state.language != Some(language) {
            // A concurrent turn switched language; this exchange belongs to the old session.
            return Ok(ChatMessage {
                id: state.next_id(),
                text: reply,
                sender: ChatSender::Ai,
                timestamp: now,
            });
        }
        state.record(message.to_string(), ChatSender::User, now);
        Ok(state.record(reply, ChatSender::Ai, now))
    }

    pub fn history(&self) -> Result<Vec<ChatMessage>, AdvisoryError> {
        Ok(self.lock()?.history.clone())
    }

    pub fn language(&self) -> Result<Option<Language>, AdvisoryError> {
        Ok(self.lock()?.language)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ChatState>, AdvisoryError> {
        self.state
            .lock()
            .map_err(|_| AdvisoryError::SessionUnavailable)
    }
}
