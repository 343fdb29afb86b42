use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use flashmath::app::{App, KeyOutcome};
use flashmath::card::{Card, Operation};
use flashmath::config::{MemoryConfigStore, Settings};
use flashmath::game::{GameSession, GameStatus, DECK_SIZE, SESSION_SECS};
use flashmath::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use flashmath::speech::KeyboardTranscriptSource;

// Headless integration using the internal runtime + GameSession without a
// TTY: events flow through Runner/TestEventSource exactly as in the binary,
// with a fast tick so the 60-second session elapses in milliseconds.

fn fresh_app() -> App {
    let game = GameSession::new(
        Box::new(MemoryConfigStore::with_settings(Settings::default())),
        Box::new(KeyboardTranscriptSource),
    );
    App::new(game)
}

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn drive(app: &mut App, runner: &Runner<TestEventSource, FixedTicker>, max_steps: u32) {
    for _ in 0..max_steps {
        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(k) => {
                if app.handle_key(k) == KeyOutcome::Quit {
                    break;
                }
            }
        }
        if app.game.status() == GameStatus::Over {
            break;
        }
    }
}

#[test]
fn headless_session_times_out_after_sixty_ticks() {
    let mut app = fresh_app();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap(); // start

    drive(&mut app, &runner, SESSION_SECS + 10);

    assert_eq!(app.game.status(), GameStatus::Over);
    assert_eq!(app.game.time_remaining(), 0);
}

#[test]
fn headless_single_card_win() {
    let mut app = fresh_app();
    app.game
        .set_cards(vec![Card::new(2, 3, Operation::Addition)]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap();
    tx.send(key(KeyCode::Char('5'))).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();

    drive(&mut app, &runner, 20);

    assert_eq!(app.game.status(), GameStatus::Over);
    assert_eq!(app.game.cards()[0].answer, Some(5));
    assert_eq!(app.game.solved_count(), 1);
}

#[test]
fn headless_spelled_answer_wins_like_digits() {
    let mut app = fresh_app();
    app.game
        .set_cards(vec![Card::new(2, 3, Operation::Addition)]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap();
    for c in "five".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();

    drive(&mut app, &runner, 30);

    assert_eq!(app.game.status(), GameStatus::Over);
    assert_eq!(app.game.cards()[0].answer, Some(5));
}

#[test]
fn headless_skip_cycles_the_deck() {
    let mut app = fresh_app();
    assert_eq!(app.game.cards().len(), DECK_SIZE);
    let front = app.game.cards()[0].id();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap(); // start
    tx.send(key(KeyCode::Up)).unwrap(); // flick front card away

    drive(&mut app, &runner, 10);

    assert_eq!(app.game.status(), GameStatus::Started);
    assert_eq!(app.game.cards().last().map(|c| c.id()), Some(front));
    assert_eq!(app.game.cards().len(), DECK_SIZE);
}

#[test]
fn headless_disabling_negatives_mid_game_pauses_and_regenerates() {
    let mut app = fresh_app();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap(); // start
    tx.send(key(KeyCode::Tab)).unwrap(); // settings
    tx.send(key(KeyCode::Char('n'))).unwrap(); // negatives off
    tx.send(key(KeyCode::Esc)).unwrap(); // back

    drive(&mut app, &runner, 10);

    assert!(!app.game.allow_negatives());
    assert_eq!(app.game.status(), GameStatus::Paused);
    for card in &app.game.example_cards()[..4] {
        assert!((0..=10).contains(&card.first_number));
        assert!((0..=10).contains(&card.second_number));
    }
    // the whole freshly dealt deck obeys the new range too
    for card in app.game.cards() {
        assert!((0..=10).contains(&card.first_number));
        assert!((0..=10).contains(&card.second_number));
    }
}

#[test]
fn headless_pause_freezes_the_clock() {
    let mut app = fresh_app();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap(); // start
    // consume the key, then let a few ticks through
    for _ in 0..4 {
        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Key(k) => {
                app.handle_key(k);
            }
            GameEvent::Resize => {}
        }
    }
    let elapsed = SESSION_SECS - app.game.time_remaining();
    assert!(elapsed > 0);

    app.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)); // pause
    let frozen = app.game.time_remaining();
    for _ in 0..5 {
        if let GameEvent::Tick = runner.step() {
            app.on_tick();
        }
    }
    assert_eq!(app.game.status(), GameStatus::Paused);
    assert_eq!(app.game.time_remaining(), frozen);
}
