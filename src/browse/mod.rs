//! Contact browser
//!
//! A full-screen terminal view of the contact book, sorted by name.
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection
//! - g/G or Home/End: First/last contact
//! - n: New contact
//! - e or Enter: Edit the selected contact's email address
//! - d or Delete: Delete the selected contact (asks first)
//! - /: Filter (live, whitespace-separated terms)
//! - r: Reload if the file changed
//! - ?: About
//! - q or Esc: Quit
//!
//! Every change is saved immediately. When the terminal regains focus the contacts are reloaded
//! if another program changed the backing file.

mod app;
mod ui;

use {
    crate::{config::Config, store::ContactStore},
    anyhow::Context,
    app::App,
    crossterm::{
        event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    },
    ratatui::prelude::*,
    std::{
        io::{self, stdout, Write},
        time::Duration,
    },
    tracing::info,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Runs the browser until the user quits or the contacts can no longer be loaded or saved.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let store = ContactStore::open(&config.store_path)
        .context("There was an error while loading your contacts.")?;
    let mut app = App::new(store);
    info!(path = %config.store_path.display(), "starting browser");

    enable_raw_mode()?;
    let result = enter_screen(&mut stdout())
        .and_then(|()| Terminal::new(CrosstermBackend::new(stdout())))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| run_app(&mut terminal, &mut app));

    // runs even if entering the screen failed, raw mode is already on
    let restored = restore_terminal(&mut stdout());
    result.and(restored.map_err(anyhow::Error::from))
}

fn enter_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.execute(EnterAlternateScreen)?.execute(EnableFocusChange)?;
    Ok(())
}

/// Leaves raw mode and the alternate screen, attempting both even if one fails.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let raw_mode = disable_raw_mode();
    out.execute(DisableFocusChange)?.execute(LeaveAlternateScreen)?;
    raw_mode
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key)?,
            Event::FocusGained => app.reload()?,
            _ => {}
        }
    }
    Ok(())
}
