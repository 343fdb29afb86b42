use crate::card::{Card, CardId, Correctness, Operation};
use crate::config::{ConfigStore, Settings};
use crate::parser::{AnswerParser, EnglishAnswerParser};
use crate::speech::TranscriptSource;
use chrono::Local;
use directories::ProjectDirs;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Length of one play session, in ticks.
pub const SESSION_SECS: u32 = 60;
/// Cards dealt per session.
pub const DECK_SIZE: usize = 10;
/// Delay before the answer channel is re-armed after a submission, so the
/// transcript has time to settle.
pub const REARM_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Stopped,
    Started,
    Paused,
    Over,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("answer channel is not authorized")]
    PermissionDenied,
    #[error(transparent)]
    Card(#[from] crate::card::CardError),
}

/// Notifications for the presentation layer, drained once per loop
/// iteration. Message passing instead of callback subscriptions keeps the
/// session synchronous and free of UI-framework coupling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StatusChanged(GameStatus),
    DeckReset,
    CardAnswered { id: CardId, result: Correctness },
    TimeChanged(u32),
}

/// The game session: owns the deck, the countdown, the lifecycle status and
/// the configured operation set. All mutation goes through the intent
/// methods below; the UI only reads.
pub struct GameSession {
    cards: Vec<Card>,
    example_cards: Vec<Card>,
    time_remaining: u32,
    status: GameStatus,
    operations: Vec<Operation>,
    allow_negatives: bool,
    permission_alert: bool,
    settings_open: bool,
    rearm_deadline: Option<Instant>,
    events: VecDeque<SessionEvent>,
    store: Box<dyn ConfigStore>,
    transcripts: Box<dyn TranscriptSource>,
    parser: Box<dyn AnswerParser>,
}

impl GameSession {
    pub fn new(store: Box<dyn ConfigStore>, transcripts: Box<dyn TranscriptSource>) -> Self {
        let settings = store.load();
        let mut session = Self {
            cards: Vec::new(),
            example_cards: Vec::new(),
            time_remaining: SESSION_SECS,
            status: GameStatus::Stopped,
            operations: settings.operations,
            allow_negatives: settings.allow_negatives,
            permission_alert: false,
            settings_open: false,
            rearm_deadline: None,
            events: VecDeque::new(),
            store,
            transcripts,
            parser: Box::new(EnglishAnswerParser),
        };
        session.reset_cards();
        session.reset_example_cards();
        session.events.clear();
        session
    }

    pub fn with_parser(mut self, parser: Box<dyn AnswerParser>) -> Self {
        self.parser = parser;
        self
    }

    // --- observable state ---

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn example_cards(&self) -> &[Card] {
        &self.example_cards
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_operation_enabled(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn allow_negatives(&self) -> bool {
        self.allow_negatives
    }

    pub fn solved_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_solved()).count()
    }

    /// Set when `start` was refused because the answer channel is not
    /// authorized; cleared once the UI has shown the alert.
    pub fn take_permission_alert(&mut self) -> bool {
        std::mem::take(&mut self.permission_alert)
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// While the settings overlay is up, ticks are suppressed.
    pub fn set_settings_open(&mut self, open: bool) {
        self.settings_open = open;
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    // --- lifecycle ---

    pub fn start(&mut self) -> Result<(), GameError> {
        if !self.transcripts.is_authorized() {
            self.permission_alert = true;
            return Err(GameError::PermissionDenied);
        }
        self.set_status(GameStatus::Started);
        self.transcripts.start_capture();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.status == GameStatus::Started {
            self.set_status(GameStatus::Paused);
            self.transcripts.stop_capture();
        }
    }

    /// Resets deck and timer. The source game lands in Paused here rather
    /// than Stopped; that behavior is kept (see DESIGN.md).
    pub fn stop(&mut self) {
        self.reset_cards();
        self.set_time(SESSION_SECS);
        self.set_status(GameStatus::Paused);
        self.rearm_deadline = None;
        self.transcripts.stop_capture();
    }

    pub fn restart(&mut self) -> Result<(), GameError> {
        self.reset_cards();
        self.set_time(SESSION_SECS);
        self.start()
    }

    fn end(&mut self) {
        self.set_status(GameStatus::Over);
        self.rearm_deadline = None;
        self.transcripts.stop_capture();
        let _ = self.save_results();
    }

    /// One external one-second timer pulse. Only meaningful while Started;
    /// the settings overlay freezes the clock.
    pub fn tick(&mut self) {
        if self.status != GameStatus::Started || self.settings_open {
            return;
        }
        if self.time_remaining > 0 {
            self.set_time(self.time_remaining - 1);
            if self.time_remaining == 0 {
                self.end();
            }
        } else {
            self.end();
        }
    }

    // --- deck management ---

    /// Deals a fresh deck: `DECK_SIZE` cards, each drawn from a uniformly
    /// random enabled operation. An empty operation set deals nothing.
    pub fn reset_cards(&mut self) {
        let mut rng = rand::thread_rng();
        self.cards.clear();
        if !self.operations.is_empty() {
            for _ in 0..DECK_SIZE {
                if let Some(&op) = self.operations.choose(&mut rng) {
                    let card = self.random_card(op, &mut rng);
                    self.cards.push(card);
                }
            }
        }
        self.events.push_back(SessionEvent::DeckReset);
    }

    /// Replace the deck wholesale. Used by tests and scripted demos.
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.events.push_back(SessionEvent::DeckReset);
    }

    pub fn move_card_to_front(&mut self, id: CardId) {
        if let Some(pos) = self.cards.iter().position(|c| c.id() == id) {
            let card = self.cards.remove(pos);
            self.cards.insert(0, card);
        }
    }

    pub fn move_card_to_back(&mut self, id: CardId) {
        if let Some(pos) = self.cards.iter().position(|c| c.id() == id) {
            let card = self.cards.remove(pos);
            self.cards.push(card);
        }
    }

    pub fn allowed_numbers(&self) -> Vec<i32> {
        if self.allow_negatives {
            (-10..=10).collect()
        } else {
            (0..=10).collect()
        }
    }

    /// Denominator pool. Zero is never a candidate.
    pub fn allowed_denominators(&self) -> Vec<i32> {
        if self.allow_negatives {
            (-10..=-1).chain(1..=10).collect()
        } else {
            (1..=10).collect()
        }
    }

    pub fn random_card(&self, operation: Operation, rng: &mut impl Rng) -> Card {
        let numbers = self.allowed_numbers();
        self.random_card_from(operation, &numbers, rng)
    }

    /// `first_pool` only constrains the first operand; the second follows
    /// the session policy. Subtraction rejection-samples the second operand
    /// until the difference is non-negative when negatives are off.
    fn random_card_from(&self, operation: Operation, first_pool: &[i32], rng: &mut impl Rng) -> Card {
        let numbers = self.allowed_numbers();
        let first = first_pool.choose(rng).copied().unwrap_or(0);
        let mut second = if operation == Operation::Division {
            self.allowed_denominators().choose(rng).copied().unwrap_or(1)
        } else {
            numbers.choose(rng).copied().unwrap_or(0)
        };
        if operation == Operation::Subtraction && !self.allow_negatives {
            while first - second < 0 {
                second = numbers.choose(rng).copied().unwrap_or(0);
            }
        }
        Card::new(first, second, operation)
    }

    /// One demo card per operation for the settings screen, plus an addition
    /// with a negative first operand to show how negatives render.
    pub fn reset_example_cards(&mut self) {
        let mut rng = rand::thread_rng();
        let numbers = self.allowed_numbers();
        let negatives: Vec<i32> = (-10..=-1).collect();
        self.example_cards = Operation::ALL
            .iter()
            .map(|&op| self.random_card_from(op, &numbers, &mut rng))
            .collect();
        let demo = self.random_card_from(Operation::Addition, &negatives, &mut rng);
        self.example_cards.push(demo);
    }

    // --- answering ---

    /// Feed one raw transcript at the front card. Parse failures are
    /// swallowed; a correct answer that completes the deck ends the session
    /// early. Always schedules the debounced channel re-arm.
    pub fn submit_answer(&mut self, raw: &str) -> Result<Option<Correctness>, GameError> {
        if self.status != GameStatus::Started {
            return Ok(None);
        }
        self.rearm_deadline = Some(Instant::now() + REARM_DELAY);

        let Some(value) = self.parser.parse(raw) else {
            return Ok(None);
        };
        let Some(card) = self.cards.first_mut() else {
            return Ok(None);
        };
        let id = card.id();
        let result = card.submit_answer(value)?;
        self.events.push_back(SessionEvent::CardAnswered { id, result });

        if result == Correctness::Correct && self.cards.iter().all(|c| c.is_solved()) {
            self.end();
        }
        Ok(Some(result))
    }

    /// Stale-callback guard for the debounced re-arm: fires the channel
    /// re-arm only if the deadline passed and the session is still Started.
    /// The driving loop calls this with its notion of "now".
    pub fn poll_rearm(&mut self, now: Instant) -> bool {
        match self.rearm_deadline {
            Some(deadline) if now >= deadline => {
                self.rearm_deadline = None;
                if self.status == GameStatus::Started {
                    self.transcripts.rearm();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn rearm_pending(&self) -> bool {
        self.rearm_deadline.is_some()
    }

    // --- configuration ---

    /// Enable or disable one operation. Persisted immediately; the running
    /// deck is untouched, so the change applies from the next reset.
    pub fn toggle_operation(&mut self, op: Operation) {
        if let Some(pos) = self.operations.iter().position(|&o| o == op) {
            self.operations.remove(pos);
        } else {
            self.operations.push(op);
        }
        self.persist_settings();
        self.reset_example_cards();
    }

    /// Changing the number-range policy mid-deck would leave inconsistent
    /// cards around, so this forces a stop.
    pub fn set_negatives_allowed(&mut self, allow: bool) {
        self.allow_negatives = allow;
        self.persist_settings();
        self.reset_example_cards();
        self.stop();
    }

    fn persist_settings(&mut self) {
        let settings = Settings {
            operations: self.operations.clone(),
            allow_negatives: self.allow_negatives,
        };
        let _ = self.store.save(&settings);
    }

    // --- internals ---

    fn set_status(&mut self, status: GameStatus) {
        if self.status != status {
            self.status = status;
            self.events.push_back(SessionEvent::StatusChanged(status));
        }
    }

    fn set_time(&mut self, secs: u32) {
        if self.time_remaining != secs {
            self.time_remaining = secs;
            self.events.push_back(SessionEvent::TimeChanged(secs));
        }
    }

    /// Best-effort session log, one line per finished game.
    fn save_results(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "flashmath") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(log_file, "date,solved,deck_size,secs_used")?;
            }

            writeln!(
                log_file,
                "{},{},{},{}",
                Local::now().format("%c"),
                self.solved_count(),
                self.cards.len(),
                SESSION_SECS - self.time_remaining,
            )?;
        }

        Ok(())
    }
}
