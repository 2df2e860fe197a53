//! Per-widget input session.
//!
//! [`InputSessionController`] turns keystrokes, key commands and pointer
//! events into debounced searches, dropdown navigation and committed
//! selections. Everything runs on one task: the only suspension points are
//! the debounce delay and the provider round trips.
//!
//! ```text
//!            text >= 3 chars                timer fires
//!   Idle ────────────────────▶ Debouncing ───────────────▶ ResultsShown
//!    ▲  ◀──── text cleared ───────┘  ▲ new text restarts      │
//!    └──────────── text cleared ─────┴────────────────────────┘
//! ```

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};

use crate::client::{Fetch, GeocodeClient};
use crate::normalizer::{AddressNormalizer, NormalizedAddress};
use crate::options::SearchOptions;
use crate::suggestions::{DropdownState, SuggestionEntry, SuggestionListController};

/// Pause in typing before a search is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Shortest text that triggers a search.
pub const MIN_QUERY_CHARS: usize = 3;

/// Phase of the input cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing pending
    #[default]
    Idle,
    /// A search is scheduled
    Debouncing,
    /// The last search produced the dropdown entries
    ResultsShown,
}

/// Keyboard commands the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Commit the focused suggestion
    Enter,
    /// Hide the dropdown, or clear the text when already hidden
    Escape,
    /// Reveal the dropdown or focus the next suggestion
    ArrowDown,
    /// Focus the previous suggestion
    ArrowUp,
}

impl KeyCommand {
    /// Map a DOM-style key name to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Self::Enter),
            "Escape" | "Esc" => Some(Self::Escape),
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowUp" => Some(Self::ArrowUp),
            _ => None,
        }
    }
}

/// Input delivered by the host to [`InputSessionController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The text field now holds this text
    Input(String),
    /// A key command was pressed in the text field
    Key(KeyCommand),
    /// The rendered suggestion at this index was clicked
    Click(usize),
    /// The pointer moved over the rendered suggestion at this index
    Hover(usize),
    /// A click landed outside the widget
    OutsideClick,
}

/// Notification sent to subscribers when a suggestion is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    /// Normalized form of the committed suggestion
    pub address: NormalizedAddress,
}

/// A scheduled search. Dropping the timer cancels it.
#[derive(Debug)]
pub struct DebounceTimer {
    term: String,
    sleep: Pin<Box<Sleep>>,
}

impl DebounceTimer {
    /// Schedule a search for `term` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(term: String, delay: Duration) -> Self {
        Self {
            term,
            sleep: Box::pin(tokio::time::sleep(delay)),
        }
    }

    /// Text the search will run with.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// When the search fires.
    pub fn deadline(&self) -> Instant {
        self.sleep.deadline()
    }

    async fn elapsed(&mut self) {
        self.sleep.as_mut().await;
    }
}

/// Drives one autocomplete widget.
#[derive(Debug)]
pub struct InputSessionController<F> {
    client: GeocodeClient<F>,
    overrides: SearchOptions,
    text: String,
    state: SessionState,
    suggestions: SuggestionListController,
    debounce: Option<DebounceTimer>,
    subscribers: Vec<mpsc::UnboundedSender<SelectionEvent>>,
}

impl<F: Fetch> InputSessionController<F> {
    /// Create a session searching through `client` with caller option
    /// `overrides` laid over the client defaults.
    pub fn new(client: GeocodeClient<F>, overrides: SearchOptions) -> Self {
        Self {
            client,
            overrides,
            text: String::new(),
            state: SessionState::Idle,
            suggestions: SuggestionListController::new(),
            debounce: None,
            subscribers: Vec::new(),
        }
    }

    /// Receive a [`SelectionEvent`] for every commit from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SelectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Current text of the field.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current dropdown.
    pub fn dropdown(&self) -> &DropdownState {
        self.suggestions.state()
    }

    /// Term of the scheduled search, if one is pending.
    pub fn pending_term(&self) -> Option<&str> {
        self.debounce.as_ref().map(DebounceTimer::term)
    }

    /// The client searches go through.
    pub fn client(&self) -> &GeocodeClient<F> {
        &self.client
    }

    fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The field's text changed.
    ///
    /// Clearing the field hides the dropdown and cancels a pending search.
    /// Text shorter than [`MIN_QUERY_CHARS`] is otherwise ignored. Longer
    /// text replaces any pending search with a new one.
    pub fn on_input(&mut self, text: impl Into<String>) {
        self.text = text.into();

        match self.text_len() {
            0 => {
                self.debounce = None;
                self.suggestions.hide();
                self.state = SessionState::Idle;
            }
            len if len < MIN_QUERY_CHARS => {}
            _ => {
                self.debounce = Some(DebounceTimer::start(self.text.clone(), DEBOUNCE_DELAY));
                self.state = SessionState::Debouncing;
                tracing::debug!(term = %self.text, "search scheduled");
            }
        }
    }

    /// Wait for the pending search timer and return its term.
    ///
    /// Never resolves while nothing is pending. Dropping the future before
    /// it resolves leaves the timer armed.
    pub async fn debounce_elapsed(&mut self) -> String {
        match self.debounce.as_mut() {
            Some(timer) => timer.elapsed().await,
            None => std::future::pending::<()>().await,
        }
        self.debounce
            .take()
            .map(|timer| timer.term)
            .unwrap_or_default()
    }

    /// Run a search for `term` and show its results.
    ///
    /// A failed search is logged and leaves the dropdown as it was.
    pub async fn search(&mut self, term: &str) {
        match self.client.search(term, &self.overrides).await {
            Ok(records) => {
                tracing::debug!(term, count = records.len(), "showing suggestions");
                self.suggestions.show(records);
                self.state = SessionState::ResultsShown;
            }
            Err(error) => {
                tracing::warn!(term, %error, "suggestion search failed");
                if self.debounce.is_none() {
                    self.state = SessionState::Idle;
                }
            }
        }
    }

    /// Wait for the pending search, if any, and run it.
    ///
    /// Returns `false` when nothing was pending.
    pub async fn flush(&mut self) -> bool {
        if self.debounce.is_none() {
            return false;
        }
        let term = self.debounce_elapsed().await;
        self.search(&term).await;
        true
    }

    /// React to a key command.
    ///
    /// Returns `true` when the host should suppress the key's default
    /// behaviour.
    pub async fn on_key(&mut self, key: KeyCommand) -> bool {
        match key {
            KeyCommand::Enter => {
                if !self.suggestions.state().is_visible() {
                    return false;
                }
                let index = self.suggestions.state().focused_index();
                self.commit(index).await;
                self.suggestions.focus(0);
                true
            }
            KeyCommand::Escape => {
                if self.suggestions.state().is_visible() {
                    self.suggestions.hide();
                } else {
                    self.text.clear();
                    self.debounce = None;
                    self.state = SessionState::Idle;
                }
                false
            }
            KeyCommand::ArrowDown => {
                if !self.suggestions.state().is_visible() && self.text_len() >= MIN_QUERY_CHARS {
                    self.suggestions.reveal();
                } else {
                    self.suggestions.focus_next();
                }
                true
            }
            KeyCommand::ArrowUp => {
                self.suggestions.focus_previous();
                true
            }
        }
    }

    /// A rendered suggestion was clicked; commit it regardless of focus.
    pub async fn on_click(&mut self, index: usize) -> Option<NormalizedAddress> {
        if !self.suggestions.state().is_visible() {
            return None;
        }
        self.commit(index).await
    }

    /// The pointer moved over a rendered suggestion.
    pub fn on_hover(&mut self, index: usize) {
        if self.suggestions.state().is_visible() {
            self.suggestions.focus(index);
        }
    }

    /// A click landed outside the widget.
    pub fn on_outside_click(&mut self) {
        self.suggestions.hide();
    }

    async fn commit(&mut self, index: usize) -> Option<NormalizedAddress> {
        let record = match self.suggestions.entry(index) {
            Some(SuggestionEntry::Place { record, .. }) => record.clone(),
            _ => return None,
        };

        let address = AddressNormalizer::new(&self.client)
            .normalize(&record)
            .await;
        tracing::debug!(address = %address.address(), "selection committed");

        let event = SelectionEvent {
            address: address.clone(),
        };
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        Some(address)
    }

    /// Apply one widget event.
    pub async fn handle(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Input(text) => self.on_input(text),
            WidgetEvent::Key(key) => {
                self.on_key(key).await;
            }
            WidgetEvent::Click(index) => {
                self.on_click(index).await;
            }
            WidgetEvent::Hover(index) => self.on_hover(index),
            WidgetEvent::OutsideClick => self.on_outside_click(),
        }
    }

    /// Process events until the sender side closes, firing debounced
    /// searches as their timers elapse. Returns the session afterwards.
    pub async fn run(mut self, mut events: mpsc::Receiver<WidgetEvent>) -> Self {
        loop {
            tokio::select! {
                term = self.debounce_elapsed() => self.search(&term).await,
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
            }
        }
        self
    }
}
