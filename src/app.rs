//! Application state and core logic

use crate::config::FormsConfig;
use crate::draft::{self, DraftPersister, DraftStorage, DraftSubscription};
use crate::state::{FormKind, FormState, SubmitOutcome};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

/// Main application struct
pub struct App {
    /// Form currently shown
    pub form: FormState,
    /// Draft storage shared by both forms
    storage: Arc<dyn DraftStorage>,
    config: FormsConfig,
    /// Draft observer for the current form
    subscription: Option<DraftSubscription>,
    /// Feedback shown in the status bar
    pub status_message: Option<String>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App showing the login form.
    ///
    /// Must be called inside a tokio runtime; the draft observer is spawned
    /// onto it.
    pub fn new(storage: Arc<dyn DraftStorage>, config: FormsConfig) -> Self {
        let mut app = Self {
            form: FormState::default(),
            storage,
            config,
            subscription: None,
            status_message: None,
            quit: false,
        };
        app.open(FormKind::Login);
        app
    }

    /// Show `kind`, seeded from its stored draft.
    ///
    /// The previous form's observer is stopped before anything else, so a
    /// pending draft of the old form is discarded rather than written late.
    pub fn open(&mut self, kind: FormKind) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }

        let spec = self.config.draft_spec(kind);
        let snapshot = draft::load(self.storage.as_ref(), &spec);
        if snapshot.is_some() {
            tracing::info!(form = kind.title(), "Restoring draft");
        }
        self.form = FormState::new(kind, snapshot.as_ref());

        let persister = DraftPersister::new(Arc::clone(&self.storage), spec)
            .with_window(self.config.debounce());
        self.subscription = Some(persister.observe(self.form.value_changes()));
    }

    pub fn kind(&self) -> FormKind {
        self.form.kind()
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_persisting(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(DraftSubscription::is_active)
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('r') if ctrl => {
                self.form.reset();
                self.status_message = Some("Form reset".to_string());
            }
            KeyCode::Char('u') if ctrl => {
                self.form.edit_active(|f| f.clear());
            }
            KeyCode::F(2) => {
                let next = self.kind().other();
                self.open(next);
                self.status_message = None;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => {
                self.form.edit_active(|f| f.cycle_option(false));
            }
            KeyCode::Right => {
                self.form.edit_active(|f| f.cycle_option(true));
            }
            KeyCode::Enter => self.submit().await,
            KeyCode::Backspace => {
                self.form.edit_active(|f| f.pop_char());
            }
            KeyCode::Char(' ') => {
                self.form.edit_active(|f| f.toggle() || f.push_char(' '));
            }
            KeyCode::Char(c) if !ctrl => {
                self.form.edit_active(|f| f.push_char(c));
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve async rules left pending by the last edit
    pub async fn settle_validation(&mut self) {
        self.form.settle().await;
    }

    pub async fn submit(&mut self) {
        let message = match self.form.submit().await {
            SubmitOutcome::Accepted(_) => format!("{} submitted", self.kind().title()),
            SubmitOutcome::Rejected { invalid } => {
                format!("Invalid form: {}", invalid.join(", "))
            }
        };
        self.status_message = Some(message);
    }
}
