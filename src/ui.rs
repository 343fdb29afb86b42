use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};
use crate::card::Card;
use crate::game::{GameStatus, SESSION_SECS};

const HORIZONTAL_MARGIN: u16 = 4;

fn card_color(card: &Card) -> Color {
    match card.answer {
        None => Color::White,
        Some(_) if card.is_solved() => Color::Blue,
        Some(_) => Color::Red,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(3), // timer gauge
                Constraint::Min(5),    // cards / settings / summary
                Constraint::Length(2), // key hints
            ])
            .split(area);

        render_timer(self, chunks[0], buf);

        match self.screen {
            Screen::Settings => render_settings(self, chunks[1], buf),
            Screen::Game => match self.game.status() {
                GameStatus::Over => render_over(self, chunks[1], buf),
                _ => render_deck(self, chunks[1], buf),
            },
        }

        render_hints(self, chunks[2], buf);
    }
}

fn render_timer(app: &App, area: Rect, buf: &mut Buffer) {
    let status = match app.game.status() {
        GameStatus::Stopped => "ready",
        GameStatus::Started => "playing",
        GameStatus::Paused => "paused",
        GameStatus::Over => "over",
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" flashmath · {status} ")),
        )
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(f64::from(app.game.time_remaining()) / f64::from(SESSION_SECS))
        .label(format!(
            "{}s · {}/{} solved",
            app.game.time_remaining(),
            app.game.solved_count(),
            app.game.cards().len()
        ));
    gauge.render(area, buf);
}

fn render_deck(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let Some(front) = app.game.cards().first() else {
        let msg = Paragraph::new(
            "No operations enabled.\nOpen settings (tab) and enable at least one.",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
        msg.render(area, buf);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            front.question(),
            bold.fg(card_color(front)),
        ))
        .alignment(Alignment::Center),
    );
    lines.push(Line::from(""));

    let answer = if app.game.status() == GameStatus::Started {
        format!("= {}▏", app.answer_buffer)
    } else if let Some(notice) = &app.notice {
        notice.clone()
    } else {
        "space to play".to_string()
    };
    lines.push(Line::from(Span::styled(answer, dim)).alignment(Alignment::Center));
    lines.push(Line::from(""));

    // the rest of the stack, front to back, padded to equal width so the
    // pile reads as a column
    let rest = &app.game.cards()[1..];
    let widest = rest.iter().map(|c| c.question().width()).max().unwrap_or(0);
    for card in rest.iter().take(area.height.saturating_sub(5) as usize) {
        let q = card.question();
        let pad = (widest - q.width()) / 2;
        lines.push(
            Line::from(Span::styled(
                format!("{}{}", " ".repeat(pad), q),
                dim.fg(card_color(card)),
            ))
            .alignment(Alignment::Center),
        );
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn render_over(app: &App, area: Rect, buf: &mut Buffer) {
    let solved = app.game.solved_count();
    let total = app.game.cards().len();
    let headline = if solved == total && total > 0 {
        "Deck cleared!"
    } else {
        "Time's up"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{headline} · {solved}/{total}"),
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
    ];

    for card in app.game.cards() {
        let correct = card.correct_answer().map(|v| v.to_string());
        let correct = correct.as_deref().unwrap_or("?");
        let text = if card.is_solved() {
            format!("{} = {}", card.question(), correct)
        } else {
            match card.answer {
                Some(got) => format!("{} = {}   (answered {})", card.question(), correct, got),
                None => format!("{} = {}   (unanswered)", card.question(), correct),
            }
        };
        lines.push(
            Line::from(Span::styled(
                text,
                Style::default().fg(card_color(card)),
            ))
            .alignment(Alignment::Center),
        );
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let on = Style::default().fg(Color::Green);
    let off = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled(
            "Settings",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
    ];

    // one line per operation: toggle key, name, enabled marker, example
    for (i, card) in app.game.example_cards().iter().take(4).enumerate() {
        let enabled = app.game.is_operation_enabled(card.operation);
        let marker = if enabled { "[x]" } else { "[ ]" };
        let style = if enabled { on } else { off };
        lines.push(
            Line::from(Span::styled(
                format!(
                    "({}) {} {:<14}  e.g. {}",
                    i + 1,
                    marker,
                    card.operation,
                    card.question()
                ),
                style,
            ))
            .alignment(Alignment::Center),
        );
    }

    lines.push(Line::from(""));
    let negatives = app.game.allow_negatives();
    let marker = if negatives { "[x]" } else { "[ ]" };
    let demo = app
        .game
        .example_cards()
        .get(4)
        .map(|c| format!("  e.g. {}", c.question()))
        .unwrap_or_default();
    lines.push(
        Line::from(Span::styled(
            format!("(n) {marker} Negative numbers{demo}"),
            if negatives { on } else { off },
        ))
        .alignment(Alignment::Center),
    );
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            "Changing negatives resets the deck; operations apply from the next deal.",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
        .alignment(Alignment::Center),
    );

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_hints(app: &App, area: Rect, buf: &mut Buffer) {
    let hints = match app.screen {
        Screen::Settings => "(1-4) operations  (n) negatives  (tab/esc) back",
        Screen::Game => match app.game.status() {
            GameStatus::Started => {
                "type answer, (enter) submit  (↑) skip card  (↓) recall  (space after clearing) pause  (tab) settings  (esc) quit"
            }
            GameStatus::Over => "(space) play again  (^s) stop  (tab) settings  (esc) quit",
            _ => "(space) play  (^r) restart  (tab) settings  (esc) quit",
        },
    };
    Paragraph::new(Span::styled(
        hints,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::{MemoryConfigStore, Settings};
    use crate::game::GameSession;
    use crate::speech::KeyboardTranscriptSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(GameSession::new(
            Box::new(MemoryConfigStore::with_settings(Settings::default())),
            Box::new(KeyboardTranscriptSource),
        ))
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(90, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_game_screen_shows_front_card_question() {
        let mut app = app();
        app.game
            .set_cards(vec![Card::new(2, 3, crate::card::Operation::Addition)]);
        let content = render(&app);
        assert!(content.contains("2 + 3"));
        assert!(content.contains("flashmath"));
    }

    #[test]
    fn test_over_screen_reveals_answers() {
        let mut app = app();
        app.game
            .set_cards(vec![Card::new(2, 3, crate::card::Operation::Addition)]);
        app.game.start().unwrap();
        app.game.submit_answer("5").unwrap();
        let content = render(&app);
        assert!(content.contains("Deck cleared"));
        assert!(content.contains("2 + 3 = 5"));
    }

    #[test]
    fn test_settings_screen_lists_operations() {
        let mut app = app();
        app.screen = Screen::Settings;
        let content = render(&app);
        assert!(content.contains("Addition"));
        assert!(content.contains("Negative numbers"));
    }

    #[test]
    fn test_empty_deck_prompts_for_operations() {
        let mut app = App::new(GameSession::new(
            Box::new(MemoryConfigStore::with_settings(Settings {
                operations: vec![],
                allow_negatives: true,
            })),
            Box::new(KeyboardTranscriptSource),
        ));
        app.game.reset_cards();
        let content = render(&app);
        assert!(content.contains("No operations enabled"));
    }
}
