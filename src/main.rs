use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, path::PathBuf};

use flashmath::{
    app::{App, KeyOutcome},
    card::Operation,
    config::{ConfigStore, FileConfigStore},
    game::GameSession,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    speech::KeyboardTranscriptSource,
};

/// timed mental-arithmetic flashcards for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A 60-second arithmetic flashcard game: a deck of ten cards, answers typed in \
digits or words, skipped cards cycle back until the clock runs out."
)]
struct Cli {
    /// restrict this run to the given operations (overrides saved settings)
    #[clap(short = 'o', long = "ops", value_enum, num_args = 1..)]
    operations: Option<Vec<Operation>>,

    /// allow negative operands and answers (overrides saved settings)
    #[clap(long, overrides_with = "no_negatives")]
    negatives: bool,

    /// keep every operand non-negative (overrides saved settings)
    #[clap(long, overrides_with = "negatives")]
    no_negatives: bool,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn build_session(&self) -> GameSession {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };

        // CLI overrides are applied through the store so they persist like
        // any other settings change
        let mut settings = store.load();
        if let Some(ops) = &self.operations {
            settings.operations = ops.clone();
        }
        if self.negatives {
            settings.allow_negatives = true;
        } else if self.no_negatives {
            settings.allow_negatives = false;
        }
        let _ = store.save(&settings);

        GameSession::new(Box::new(store), Box::new(KeyboardTranscriptSource))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut app = App::new(cli.build_session());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.handle_key(key) == KeyOutcome::Quit {
                    break;
                }
            }
        }

        // drained here so a burst of key events still redraws just once
        app.game.drain_events();
    }

    Ok(())
}
