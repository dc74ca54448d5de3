//! The session loop — one interaction cycle per user message.
//!
//! ```text
//! AwaitingInput → Trimming → Assembling → Invoking → Displaying → Persisting
//!       ↑                                                              │
//!       └──────────────────────────────────────────────────────────────┘
//! AwaitingInput → Stopped   (exit / quit / end of input)
//! ```
//!
//! The [`SessionState`] is an explicit value: every iteration takes it and
//! hands back the next one. Front-ends own the state; the [`Session`] owns
//! only what is fixed for a run (template, store, invoker, retention).

use crate::context::{trim, AssemblyInput, ContextAssembler};
use crate::invoker::CompletionInvoker;
use deskmate_core::channel::{Channel, ChannelMessage};
use deskmate_core::error::{ChannelError, TemplateError};
use deskmate_core::persona::Persona;
use deskmate_core::store::{HistoryStore, TemplateStore};
use deskmate_core::turn::{History, Turn};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Where a session currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingInput,
    Trimming,
    Assembling,
    Invoking,
    Displaying,
    Persisting,
    Stopped,
}

/// What a raw line of user input means to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// `exit` / `quit`, any case, surrounding whitespace ignored
    Stop,
    /// Nothing but whitespace
    Empty,
    /// A message to send, already trimmed
    Message(String),
}

impl UserInput {
    pub fn classify(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            UserInput::Empty
        } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            UserInput::Stop
        } else {
            UserInput::Message(text.to_string())
        }
    }
}

/// Per-turn settings. Front-ends may change these between turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub business_context: String,
    pub persona: Persona,
}

impl SessionConfig {
    pub fn new(business_context: impl Into<String>, persona: Persona) -> Self {
        Self {
            business_context: business_context.into(),
            persona,
        }
    }
}

/// The mutable part of a session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// The full log; only ever grows by whole exchanges.
    pub history: History,
    /// Turns before this index are hidden from display and from the model.
    pub clear_mark: usize,
}

impl SessionState {
    pub fn new(history: History) -> Self {
        Self {
            phase: SessionPhase::AwaitingInput,
            history,
            clear_mark: 0,
        }
    }

    /// Turns the model and the user can still see.
    pub fn visible_turns(&self) -> &[Turn] {
        self.history.since(self.clear_mark)
    }

    /// Hide everything recorded so far. The store is not touched.
    pub fn clear_display(&mut self) {
        self.clear_mark = self.history.len();
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == SessionPhase::Stopped
    }

    fn enter(&mut self, phase: SessionPhase) {
        trace!(from = ?self.phase, to = ?phase, "Session phase");
        self.phase = phase;
    }
}

/// The result of one completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    /// The model's reply, or the rendered error text.
    pub reply: String,
    /// Whether the model call failed.
    pub failed: bool,
    /// Whether the history reached the store.
    pub persisted: bool,
}

/// Everything that stays fixed for the lifetime of a run.
pub struct Session {
    template: String,
    store: Arc<dyn HistoryStore>,
    invoker: CompletionInvoker,
    max_turns: i64,
}

impl Session {
    pub fn new(
        template: impl Into<String>,
        store: Arc<dyn HistoryStore>,
        invoker: CompletionInvoker,
        max_turns: i64,
    ) -> Self {
        Self {
            template: template.into(),
            store,
            invoker,
            max_turns,
        }
    }

    /// Load the template (fatal on failure) and the history (forgiving),
    /// returning a session ready for input.
    pub async fn start(
        templates: &dyn TemplateStore,
        store: Arc<dyn HistoryStore>,
        invoker: CompletionInvoker,
        max_turns: i64,
    ) -> Result<(Self, SessionState), TemplateError> {
        let template = templates.load_template().await?;
        let history = load_or_empty(store.as_ref()).await;
        info!(
            store = store.name(),
            turns = history.len(),
            model = %invoker.params().model,
            "Session ready"
        );
        let session = Self::new(template, store, invoker, max_turns);
        Ok((session, SessionState::new(history)))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn max_turns(&self) -> i64 {
        self.max_turns
    }

    pub fn invoker(&self) -> &CompletionInvoker {
        &self.invoker
    }

    /// Feed one line of raw input (or `None` at end of input) to the loop.
    ///
    /// `display` is awaited with the assistant text once per exchange, before
    /// the history is persisted.
    pub async fn step<F, Fut>(
        &self,
        state: SessionState,
        config: &SessionConfig,
        raw: Option<&str>,
        display: F,
    ) -> (SessionState, Option<TurnOutcome>)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut state = state;
        let Some(raw) = raw else {
            debug!("End of input");
            state.enter(SessionPhase::Stopped);
            return (state, None);
        };

        match UserInput::classify(raw) {
            UserInput::Stop => {
                state.enter(SessionPhase::Stopped);
                (state, None)
            }
            UserInput::Empty => (state, None),
            UserInput::Message(text) => {
                let (state, outcome) = self.process_turn(state, config, &text, display).await;
                (state, Some(outcome))
            }
        }
    }

    /// Drive the loop over a channel until `exit`, `quit` or end of input.
    pub async fn converse(
        &self,
        channel: &dyn Channel,
        input: &mut mpsc::Receiver<Result<ChannelMessage, ChannelError>>,
        state: SessionState,
        config: &SessionConfig,
    ) -> Result<SessionState, ChannelError> {
        let mut state = state;

        while !state.is_stopped() {
            channel.prompt("YOU").await?;
            let line = match input.recv().await {
                Some(Ok(msg)) => Some(msg.content),
                Some(Err(e)) => return Err(e),
                None => None,
            };

            let (next, _) = self
                .step(state, config, line.as_deref(), move |reply| async move {
                    if let Err(e) = channel.send(&format!("\nASSISTANT> {reply}\n")).await {
                        warn!(channel = channel.name(), error = %e, "Failed to display reply");
                    }
                })
                .await;
            state = next;
        }

        channel.send("Goodbye!").await?;
        Ok(state)
    }

    /// Run one full exchange for an already-classified message.
    pub async fn process_turn<F, Fut>(
        &self,
        state: SessionState,
        config: &SessionConfig,
        message: &str,
        display: F,
    ) -> (SessionState, TurnOutcome)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut state = state;

        state.enter(SessionPhase::Trimming);
        let view_start = state.history.len() - trim(state.visible_turns(), self.max_turns).len();

        state.enter(SessionPhase::Assembling);
        let view = state.history.since(view_start);
        let prompt = ContextAssembler::assemble(&AssemblyInput {
            template: &self.template,
            business_context: &config.business_context,
            persona: config.persona,
            history: view,
            user_message: message,
        });
        debug!(
            view_turns = view.len(),
            history_messages = prompt.metadata.history_messages,
            skipped_turns = prompt.metadata.skipped_turns,
            estimated_tokens = prompt.metadata.estimated_tokens,
            persona = %config.persona,
            "Prompt assembled"
        );

        state.enter(SessionPhase::Invoking);
        let (reply, failed) = match self.invoker.invoke(prompt.messages).await {
            Ok(reply) => (reply, false),
            Err(e) => (e.render(), true),
        };

        state.enter(SessionPhase::Displaying);
        display(reply.clone()).await;

        state.enter(SessionPhase::Persisting);
        state.history.push_exchange(message, reply.as_str());
        let persisted = match self.store.save(&state.history).await {
            Ok(()) => true,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Failed to save history");
                false
            }
        };

        state.enter(SessionPhase::AwaitingInput);
        (
            state,
            TurnOutcome {
                reply,
                failed,
                persisted,
            },
        )
    }
}

/// Load the history, treating any failure as an empty log.
pub async fn load_or_empty(store: &dyn HistoryStore) -> History {
    match store.load().await {
        Ok(history) => history,
        Err(e) => {
            warn!(store = store.name(), error = %e, "Could not load history, starting empty");
            History::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, RecordingChannel, ScriptedProvider};
    use deskmate_core::error::{HistoryError, ProviderError};
    use deskmate_core::message::{Message, Role};
    use deskmate_core::provider::ModelParams;
    use deskmate_memory::{InMemoryHistoryStore, StaticTemplate};
    use std::path::PathBuf;

    struct BrokenStore;

    #[async_trait::async_trait]
    impl HistoryStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn load(&self) -> Result<History, HistoryError> {
            Err(HistoryError::Malformed {
                path: PathBuf::from("memory/history.json"),
                reason: "root is not a JSON array".into(),
            })
        }

        async fn save(&self, _history: &History) -> Result<(), HistoryError> {
            Err(HistoryError::Write {
                path: PathBuf::from("memory/history.json"),
                reason: "read-only file system".into(),
            })
        }
    }

    fn config() -> SessionConfig {
        SessionConfig::new("Corner bakery, open 6am-2pm.", Persona::Support)
    }

    fn session_with(
        provider: Arc<dyn deskmate_core::provider::Provider>,
        store: Arc<dyn HistoryStore>,
        max_turns: i64,
    ) -> Session {
        let invoker = CompletionInvoker::new(provider, ModelParams::default());
        Session::new("You are a bakery assistant.", store, invoker, max_turns)
    }

    #[test]
    fn classify_input() {
        assert_eq!(UserInput::classify("  EXIT "), UserInput::Stop);
        assert_eq!(UserInput::classify("Quit"), UserInput::Stop);
        assert_eq!(UserInput::classify("   "), UserInput::Empty);
        assert_eq!(UserInput::classify(""), UserInput::Empty);
        assert_eq!(
            UserInput::classify("  exit the store? "),
            UserInput::Message("exit the store?".into())
        );
    }

    #[tokio::test]
    async fn successful_turn_appends_and_persists() {
        let provider = Arc::new(ScriptedProvider::replies(&["Hi!"]));
        let store = InMemoryHistoryStore::new();
        let session = session_with(provider, Arc::new(store.clone()), 8);

        let mut shown = Vec::new();
        let (state, outcome) = session
            .process_turn(SessionState::new(History::new()), &config(), "Hello", |t| {
                shown.push(t);
                async {}
            })
            .await;

        assert_eq!(shown, vec!["Hi!".to_string()]);
        assert!(!outcome.failed);
        assert!(outcome.persisted);
        assert_eq!(state.phase, SessionPhase::AwaitingInput);
        assert_eq!(state.history.turns(), &[Turn::human("Hello"), Turn::ai("Hi!")]);
        assert_eq!(store.snapshot().await, state.history);
    }

    #[tokio::test]
    async fn failed_call_is_recorded_as_ai_turn() {
        let provider = Arc::new(FailingProvider::new(ProviderError::Network(
            "connection refused".into(),
        )));
        let store = InMemoryHistoryStore::new();
        let session = session_with(provider, Arc::new(store.clone()), 8);

        let (state, outcome) = session
            .process_turn(SessionState::new(History::new()), &config(), "Hello", |_| async {})
            .await;

        assert!(outcome.failed);
        assert!(outcome.reply.starts_with("ERROR calling model:"));
        assert!(outcome.reply.contains("connection refused"));
        assert_eq!(state.history.len(), 2);
        assert_eq!(store.snapshot().await.turns()[1].content, outcome.reply);
    }

    #[tokio::test]
    async fn save_failure_keeps_turn_in_memory() {
        let provider = Arc::new(ScriptedProvider::replies(&["one", "two"]));
        let session = session_with(provider, Arc::new(BrokenStore), 8);

        let (state, first) = session
            .process_turn(SessionState::new(History::new()), &config(), "a", |_| async {})
            .await;
        assert!(!first.persisted);
        let (state, _) = session.process_turn(state, &config(), "b", |_| async {}).await;
        assert_eq!(state.history.len(), 4);
    }

    #[tokio::test]
    async fn prompt_is_trimmed_but_store_is_full() {
        let mut history = History::new();
        for i in 0..5 {
            history.push_exchange(format!("q{i}"), format!("a{i}"));
        }
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let store = InMemoryHistoryStore::with_history(history.clone());
        let session = session_with(provider.clone(), Arc::new(store.clone()), 2);

        let (state, _) = session
            .process_turn(SessionState::new(history), &config(), "next", |_| async {})
            .await;

        let sent = provider.last_request().unwrap().messages;
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1], Message::user("q4"));
        assert_eq!(sent[2], Message::assistant("a4"));
        assert_eq!(sent[3], Message::user("next"));
        assert_eq!(state.history.len(), 12);
        assert_eq!(store.snapshot().await.len(), 12);
    }

    #[tokio::test]
    async fn zero_retention_sends_no_history() {
        let mut history = History::new();
        history.push_exchange("old", "older");
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let session = session_with(provider.clone(), Arc::new(InMemoryHistoryStore::new()), 0);

        session
            .process_turn(SessionState::new(history), &config(), "new", |_| async {})
            .await;
        assert_eq!(provider.last_request().unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn clear_mark_hides_earlier_turns_from_model() {
        let mut history = History::new();
        history.push_exchange("before", "hidden");
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let store = InMemoryHistoryStore::new();
        let session = session_with(provider.clone(), Arc::new(store.clone()), 8);

        let mut state = SessionState::new(history);
        state.clear_display();
        assert!(state.visible_turns().is_empty());

        let (state, _) = session.process_turn(state, &config(), "after", |_| async {}).await;
        let sent = provider.last_request().unwrap().messages;
        assert_eq!(sent.len(), 2);
        assert_eq!(state.visible_turns().len(), 2);
        assert_eq!(store.snapshot().await.len(), 4);
    }

    #[tokio::test]
    async fn config_changes_apply_on_next_turn() {
        let provider = Arc::new(ScriptedProvider::replies(&["one", "two"]));
        let session = session_with(provider.clone(), Arc::new(InMemoryHistoryStore::new()), 8);

        let (state, _) = session
            .process_turn(SessionState::new(History::new()), &config(), "a", |_| async {})
            .await;
        let manager = SessionConfig::new("Now a food truck.", Persona::Manager);
        session.process_turn(state, &manager, "b", |_| async {}).await;

        let requests = provider.requests();
        assert!(requests[0].messages[0].content.contains("ROLE: support"));
        assert!(requests[1].messages[0].content.contains("ROLE: manager"));
        assert!(requests[1].messages[0].content.contains("Now a food truck."));
    }

    #[tokio::test]
    async fn step_handles_stop_empty_and_eof() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let session = session_with(provider.clone(), Arc::new(InMemoryHistoryStore::new()), 8);

        let (state, outcome) = session
            .step(
                SessionState::new(History::new()),
                &config(),
                Some("   "),
                |_| async {},
            )
            .await;
        assert!(outcome.is_none());
        assert_eq!(state.phase, SessionPhase::AwaitingInput);

        let (stopped, _) = session
            .step(state.clone(), &config(), Some("QUIT"), |_| async {})
            .await;
        assert!(stopped.is_stopped());

        let (eof, _) = session.step(state, &config(), None, |_| async {}).await;
        assert!(eof.is_stopped());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn step_sends_trimmed_message() {
        let provider = Arc::new(ScriptedProvider::replies(&["Hi!"]));
        let session = session_with(provider.clone(), Arc::new(InMemoryHistoryStore::new()), 8);

        let (state, outcome) = session
            .step(
                SessionState::new(History::new()),
                &config(),
                Some("  Hello \n"),
                |_| async {},
            )
            .await;
        assert_eq!(outcome.unwrap().reply, "Hi!");
        assert_eq!(state.history.turns()[0], Turn::human("Hello"));
    }

    #[tokio::test]
    async fn start_recovers_from_malformed_history() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let invoker = CompletionInvoker::new(provider, ModelParams::default());
        let (session, state) = Session::start(
            &StaticTemplate("  Bakery bot.  ".into()),
            Arc::new(BrokenStore),
            invoker,
            8,
        )
        .await
        .unwrap();

        assert_eq!(session.template(), "Bakery bot.");
        assert!(state.history.is_empty());
        assert_eq!(state.phase, SessionPhase::AwaitingInput);
    }

    #[tokio::test]
    async fn converse_runs_until_quit() {
        let provider = Arc::new(ScriptedProvider::replies(&["Hi!", "Bye for now."]));
        let store = InMemoryHistoryStore::new();
        let session = session_with(provider.clone(), Arc::new(store.clone()), 8);
        let channel = RecordingChannel::new(&["Hello", "", "Thanks", "quit", "never read"]);
        let mut rx = channel.start().await.unwrap();

        let state = session
            .converse(&channel, &mut rx, SessionState::new(History::new()), &config())
            .await
            .unwrap();

        assert!(state.is_stopped());
        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            channel.shown(),
            vec![
                "\nASSISTANT> Hi!\n".to_string(),
                "\nASSISTANT> Bye for now.\n".to_string(),
                "Goodbye!".to_string(),
            ]
        );
        assert_eq!(store.snapshot().await.len(), 4);
    }

    #[tokio::test]
    async fn converse_stops_at_end_of_input() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let session = session_with(provider, Arc::new(InMemoryHistoryStore::new()), 8);
        let channel = RecordingChannel::new(&["one message"]);
        let mut rx = channel.start().await.unwrap();

        let state = session
            .converse(&channel, &mut rx, SessionState::new(History::new()), &config())
            .await
            .unwrap();
        assert!(state.is_stopped());
        assert_eq!(state.history.len(), 2);
        assert_eq!(channel.shown().last().unwrap(), "Goodbye!");
    }
}
