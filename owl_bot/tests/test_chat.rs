use async_trait::async_trait;
use forecast_trade::{InMemoryProvider, PriceHistory};
use owl_bot::report::{HELP_TEXT, INVALID_TEXT, WELCOME_TEXT};
use owl_bot::{BotConfig, ChatId, ChatMode, ChatResponder, Command, Dispatcher, ForecastService};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingResponder {
    replies: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingResponder {
    fn take(&self) -> Vec<(ChatId, String)> {
        std::mem::take(&mut *self.replies.lock().unwrap())
    }
}

#[async_trait]
impl ChatResponder for RecordingResponder {
    async fn reply(&self, chat: ChatId, text: &str) -> owl_bot::Result<()> {
        self.replies.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }
}

fn dispatcher() -> Dispatcher<RecordingResponder> {
    let provider = Arc::new(
        InMemoryProvider::new()
            .with_history(PriceHistory::new("ETH", vec![100.0, 104.0, 102.0, 108.0]).unwrap()),
    );
    let service = ForecastService::from_config(&BotConfig::default(), provider).unwrap();
    Dispatcher::new(Arc::new(service), RecordingResponder::default())
}

#[rstest]
#[case("/start", Command::Start)]
#[case("/help", Command::Help)]
#[case("ℹ️ Help", Command::Help)]
#[case("💰 Price", Command::SelectMode(ChatMode::Price))]
#[case("🔮 predict", Command::SelectMode(ChatMode::Predict))]
#[case("📊 Trend", Command::SelectMode(ChatMode::Trend))]
#[case("🧠 AI Suggest", Command::SelectMode(ChatMode::Suggest))]
#[case("  btc ", Command::Symbol("BTC".to_string()))]
#[case("brk.b", Command::Symbol("BRK.B".to_string()))]
#[case("bitcoin", Command::Invalid)]
#[case("what is up", Command::Invalid)]
#[case("", Command::Invalid)]
fn test_command_parsing(#[case] text: &str, #[case] expected: Command) {
    assert_eq!(Command::parse(text), expected);
}

#[tokio::test]
async fn test_start_and_help() {
    let dispatcher = dispatcher();

    dispatcher.handle(1, "/start").await.unwrap();
    dispatcher.handle(1, "ℹ️ Help").await.unwrap();

    assert_eq!(
        dispatcher.responder().take(),
        vec![(1, WELCOME_TEXT.to_string()), (1, HELP_TEXT.to_string())]
    );
}

#[tokio::test]
async fn test_mode_applies_to_next_symbol_only() {
    let dispatcher = dispatcher();

    dispatcher.handle(7, "💰 Price").await.unwrap();
    assert_eq!(dispatcher.mode(7).await, ChatMode::Price);

    dispatcher.handle(7, "eth").await.unwrap();
    assert_eq!(dispatcher.mode(7).await, ChatMode::FullReport);

    let replies = dispatcher.responder().take();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].1, "Send the symbol (e.g., BTC, AAPL):");
    assert_eq!(replies[1].1, "💰 ETH Price: $108.00");
}

#[tokio::test]
async fn test_modes_are_per_chat() {
    let dispatcher = dispatcher();

    dispatcher.handle(1, "📊 Trend").await.unwrap();
    dispatcher.handle(2, "🧠 AI Suggest").await.unwrap();
    dispatcher.handle(1, "ETH").await.unwrap();
    dispatcher.handle(2, "ETH").await.unwrap();

    let replies = dispatcher.responder().take();
    assert_eq!(
        replies[2],
        (1, "📈 Market Trend for ETH: UP ($8.00 gain)".to_string())
    );
    assert_eq!(
        replies[3],
        (2, "✅ AI Suggestion: Consider Buying ETH".to_string())
    );
}

#[tokio::test]
async fn test_start_clears_mode() {
    let dispatcher = dispatcher();

    dispatcher.handle(3, "🔮 Predict").await.unwrap();
    dispatcher.handle(3, "/start").await.unwrap();

    assert_eq!(dispatcher.mode(3).await, ChatMode::FullReport);
}

#[tokio::test]
async fn test_full_report_for_bare_symbol() {
    let dispatcher = dispatcher();

    dispatcher.handle(5, "eth").await.unwrap();

    let replies = dispatcher.responder().take();
    let sections: Vec<&str> = replies[0].1.split("\n\n").collect();
    assert_eq!(
        sections,
        vec![
            "💰 ETH Price: $108.00",
            "📈 Market Trend for ETH: UP ($8.00 gain)",
            "⚠️ Not enough data for forecast (4 of 31 points).",
            "✅ AI Suggestion: Consider Buying ETH",
        ]
    );
}

#[tokio::test]
async fn test_invalid_input() {
    let dispatcher = dispatcher();

    dispatcher.handle(9, "tell me everything").await.unwrap();

    assert_eq!(
        dispatcher.responder().take(),
        vec![(9, INVALID_TEXT.to_string())]
    );
}
