use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use crate::card::Operation;
use crate::game::{GameSession, GameStatus};

/// Which surface currently has the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Game,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Top-level application state: the session plus the typed answer buffer
/// and the active screen. Translates key events into session intents.
pub struct App {
    pub game: GameSession,
    pub answer_buffer: String,
    pub screen: Screen,
    /// One-line message for the player, e.g. the permission alert raised
    /// when the answer channel refused to start.
    pub notice: Option<String>,
}

impl App {
    pub fn new(game: GameSession) -> Self {
        Self {
            game,
            answer_buffer: String::new(),
            screen: Screen::Game,
            notice: None,
        }
    }

    /// One second elapsed. Also the moment the debounced answer-channel
    /// re-arm gets a chance to fire.
    pub fn on_tick(&mut self) {
        self.game.tick();
        self.game.poll_rearm(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_control_key(key.code);
        }
        match self.screen {
            Screen::Game => self.handle_game_key(key.code),
            Screen::Settings => self.handle_settings_key(key.code),
        }
    }

    fn handle_control_key(&mut self, code: KeyCode) -> KeyOutcome {
        match code {
            KeyCode::Char('c') => KeyOutcome::Quit,
            KeyCode::Char('r') => {
                let _ = self.game.restart();
                self.answer_buffer.clear();
                KeyOutcome::Continue
            }
            KeyCode::Char('s') => {
                self.game.stop();
                self.answer_buffer.clear();
                KeyOutcome::Continue
            }
            _ => KeyOutcome::Continue,
        }
    }

    fn handle_game_key(&mut self, code: KeyCode) -> KeyOutcome {
        match code {
            KeyCode::Esc => {
                if self.answer_buffer.is_empty() {
                    return KeyOutcome::Quit;
                }
                self.answer_buffer.clear();
            }
            KeyCode::Tab => {
                self.screen = Screen::Settings;
                self.game.set_settings_open(true);
            }
            KeyCode::Enter => {
                if !self.answer_buffer.is_empty() {
                    let text = std::mem::take(&mut self.answer_buffer);
                    let _ = self.game.submit_answer(&text);
                }
            }
            KeyCode::Backspace => {
                self.answer_buffer.pop();
            }
            // flick the front card away (skip it)
            KeyCode::Up => {
                if let Some(front) = self.game.cards().first() {
                    let id = front.id();
                    self.game.move_card_to_back(id);
                }
            }
            // recall the most recently skipped card
            KeyCode::Down => {
                if let Some(back) = self.game.cards().last() {
                    let id = back.id();
                    self.game.move_card_to_front(id);
                }
            }
            KeyCode::Char(' ') => {
                if self.game.status() == GameStatus::Started && !self.answer_buffer.is_empty() {
                    self.answer_buffer.push(' ');
                } else {
                    self.toggle_play();
                }
            }
            KeyCode::Char(c) => {
                if self.game.status() == GameStatus::Started
                    && (c.is_alphanumeric() || c == '-')
                {
                    self.answer_buffer.push(c);
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_settings_key(&mut self, code: KeyCode) -> KeyOutcome {
        match code {
            KeyCode::Esc | KeyCode::Tab => {
                self.screen = Screen::Game;
                self.game.set_settings_open(false);
            }
            KeyCode::Char('1') => self.game.toggle_operation(Operation::Addition),
            KeyCode::Char('2') => self.game.toggle_operation(Operation::Subtraction),
            KeyCode::Char('3') => self.game.toggle_operation(Operation::Multiplication),
            KeyCode::Char('4') => self.game.toggle_operation(Operation::Division),
            KeyCode::Char('n') => {
                let allow = !self.game.allow_negatives();
                self.game.set_negatives_allowed(allow);
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn toggle_play(&mut self) {
        let result = match self.game.status() {
            GameStatus::Started => {
                self.game.pause();
                Ok(())
            }
            GameStatus::Over => {
                self.answer_buffer.clear();
                self.game.restart()
            }
            GameStatus::Stopped | GameStatus::Paused => self.game.start(),
        };
        match result {
            Ok(()) => self.notice = None,
            Err(_) => {
                if self.game.take_permission_alert() {
                    self.notice =
                        Some("answer input not authorized; grant access and retry".to_string());
                }
            }
        }
    }
}
