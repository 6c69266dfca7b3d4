use crate::app::{Action, App};
use crate::ui;
use anyhow::Context;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use folio_core::compare::run_comparison;
use folio_core::ingest::MarketDataGateway;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;

/// Leaves the alternate screen before the default hook prints a panic.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        default_hook(info);
    }));
}

pub async fn run_tui(app: &mut App, gateway: &dyn MarketDataGateway) -> anyhow::Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        SetTitle(ui::WINDOW_TITLE)
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, gateway).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    gateway: &dyn MarketDataGateway,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Event::Paste(text) => {
                app.handle_paste(&text);
                Action::None
            }
            _ => Action::None,
        };

        match action {
            Action::Quit => return Ok(()),
            Action::Compare => {
                app.begin_comparison();
                terminal.draw(|f| ui::draw(f, app))?;

                let outcome = run_comparison(
                    gateway,
                    &app.editor.text(),
                    app.start.date(),
                    app.end.date(),
                )
                .await;
                app.finish_comparison(outcome);

                let dropped = discard_pending(pending_events())?;
                if dropped > 0 {
                    tracing::debug!(dropped, "ignored input received during comparison");
                }
            }
            Action::None => {}
        }
    }
}

// Events already queued in the terminal, without blocking for new ones.
fn pending_events() -> impl Iterator<Item = io::Result<Event>> {
    std::iter::from_fn(|| match event::poll(Duration::ZERO) {
        Ok(true) => Some(event::read()),
        Ok(false) => None,
        Err(err) => Some(Err(err)),
    })
}

// Input typed while a comparison was running is dropped, so a second Compare
// press cannot queue up behind the first.
fn discard_pending(events: impl Iterator<Item = io::Result<Event>>) -> io::Result<usize> {
    let mut dropped = 0;
    for event in events {
        event?;
        dropped += 1;
    }
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn queued_compare_presses_are_dropped() {
        let mut queue = vec![press(KeyCode::F(5)), press(KeyCode::Enter), press(KeyCode::F(5))].into_iter();
        assert_eq!(discard_pending(queue.by_ref()).unwrap(), 3);
        assert!(queue.next().is_none());
    }

    #[test]
    fn drain_stops_on_read_error() {
        let queue = vec![
            press(KeyCode::F(5)),
            Err(io::Error::new(io::ErrorKind::Other, "tty closed")),
        ];
        assert!(discard_pending(queue.into_iter()).is_err());
    }
}
