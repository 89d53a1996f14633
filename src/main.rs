use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::prelude::*;
use std::{error::Error, io, time::Duration};

mod app;

// Start the app.
pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = app::config::Cli::parse();

    // Logging is best effort; the board works without it
    let _logger = match app::logging::init_logging(&cli.log_level, &cli.log_dir()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: file logging disabled: {err}");
            None
        }
    };

    // Open the store before touching the terminal so errors print normally
    let storage = app::storage::Storage::open(&cli.db, &cli.storage_key)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(cli.tick_rate_ms);
    let app = app::ui::App::new(&storage);
    let res = app::ui::run_app(&mut terminal, app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("event=app_exit module=main status=error error={}", err);
        println!("{err:?}");
    }

    Ok(())
}
