//! Chat command routing
//!
//! Transport-agnostic: incoming text goes through [`Dispatcher::handle`] and
//! replies leave through a [`ChatResponder`].

use crate::error::Result;
use crate::report::{self, Section};
use crate::service::ForecastService;
use async_trait::async_trait;
use forecast_trade::StrategyKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub type ChatId = i64;

const MAX_SYMBOL_LEN: usize = 6;

/// Delivers reply text to a chat
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn reply(&self, chat: ChatId, text: &str) -> Result<()>;
}

/// What the next symbol sent to a chat produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    FullReport,
    Price,
    Predict,
    Trend,
    Suggest,
}

impl ChatMode {
    pub fn sections(&self) -> &'static [Section] {
        match self {
            ChatMode::FullReport => &Section::FULL,
            ChatMode::Price => &[Section::Price],
            ChatMode::Predict => &[Section::Forecast(StrategyKind::SequenceModel)],
            ChatMode::Trend => &[Section::Trend],
            ChatMode::Suggest => &[Section::Suggestion],
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            ChatMode::FullReport => "Send the symbol for a full report:",
            ChatMode::Price => "Send the symbol (e.g., BTC, AAPL):",
            ChatMode::Predict => "Send symbol to train the model and predict:",
            ChatMode::Trend => "Send symbol to check trend:",
            ChatMode::Suggest => "Send symbol for AI recommendation:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    SelectMode(ChatMode),
    Symbol(String),
    Invalid,
}

impl Command {
    pub fn parse(text: &str) -> Command {
        let text = text.trim().to_lowercase();
        match text.as_str() {
            "/start" => Command::Start,
            "/help" | "ℹ️ help" | "help" => Command::Help,
            "💰 price" => Command::SelectMode(ChatMode::Price),
            "🔮 predict" => Command::SelectMode(ChatMode::Predict),
            "📊 trend" => Command::SelectMode(ChatMode::Trend),
            "🧠 ai suggest" => Command::SelectMode(ChatMode::Suggest),
            symbol if is_symbol(symbol) => Command::Symbol(symbol.to_uppercase()),
            _ => Command::Invalid,
        }
    }
}

fn is_symbol(text: &str) -> bool {
    let len = text.chars().count();
    (1..=MAX_SYMBOL_LEN).contains(&len)
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Routes chat text to the forecasting service, one mode per chat
pub struct Dispatcher<R: ChatResponder> {
    service: Arc<ForecastService>,
    responder: R,
    modes: Mutex<HashMap<ChatId, ChatMode>>,
}

impl<R: ChatResponder> Dispatcher<R> {
    pub fn new(service: Arc<ForecastService>, responder: R) -> Self {
        Self {
            service,
            responder,
            modes: Mutex::new(HashMap::new()),
        }
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    /// Mode the next symbol from `chat` will use
    pub async fn mode(&self, chat: ChatId) -> ChatMode {
        self.modes.lock().await.get(&chat).copied().unwrap_or_default()
    }

    pub async fn handle(&self, chat: ChatId, text: &str) -> Result<()> {
        let command = Command::parse(text);
        debug!(chat, ?command, "chat command");

        match command {
            Command::Start => {
                self.modes.lock().await.remove(&chat);
                self.responder.reply(chat, report::WELCOME_TEXT).await
            }
            Command::Help => self.responder.reply(chat, report::HELP_TEXT).await,
            Command::SelectMode(mode) => {
                self.modes.lock().await.insert(chat, mode);
                self.responder.reply(chat, mode.prompt()).await
            }
            Command::Symbol(symbol) => {
                // a selected mode applies to one symbol only
                let mode = self.modes.lock().await.remove(&chat).unwrap_or_default();
                let text = self.service.full_report(&symbol, mode.sections()).await;
                self.responder.reply(chat, &text).await
            }
            Command::Invalid => self.responder.reply(chat, report::INVALID_TEXT).await,
        }
    }
}

/// Prints replies to stdout; backs the interactive CLI
#[derive(Debug, Default)]
pub struct StdoutResponder;

#[async_trait]
impl ChatResponder for StdoutResponder {
    async fn reply(&self, _chat: ChatId, text: &str) -> Result<()> {
        println!("{}\n", text);
        Ok(())
    }
}
