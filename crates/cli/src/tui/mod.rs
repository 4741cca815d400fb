//! The ratatui terminal UI context.
//!
//! Creating a [`TerminalUi`] takes over the terminal (raw mode, alternate
//! screen); dropping it gives the terminal back. The session controller
//! drops it before the editor runs and creates a fresh one afterwards.

mod render;

use std::io::{self, Stdout};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use fac_core::errors::UiError;
use fac_core::session::{SessionContext, UiContext, UiEvent, UiFactory};

/// Builds [`TerminalUi`] contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalUiFactory;

impl UiFactory for TerminalUiFactory {
    type Context = TerminalUi;

    fn create(&mut self, ctx: &SessionContext) -> Result<TerminalUi, UiError> {
        enable_raw_mode()?;
        let terminal = match open_terminal() {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal(&mut io::stdout());
                return Err(e.into());
            }
        };
        debug!("terminal UI acquired");
        Ok(TerminalUi {
            terminal,
            input: String::new(),
            continuous: ctx.settings().continuous_evaluation,
        })
    }
}

fn open_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal<W: io::Write>(out: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, crossterm::cursor::Show);
}

/// One live terminal session.
pub struct TerminalUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input: String,
    continuous: bool,
}

/// Apply one key press to the input line. Returns an event when the key
/// ends input.
fn handle_key(input: &mut String, continuous: bool, key: KeyEvent) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(UiEvent::Quit),
        KeyCode::Enter => Some(UiEvent::Submit(std::mem::take(input))),
        KeyCode::Backspace => {
            input.pop();
            None
        }
        KeyCode::Esc => {
            input.clear();
            None
        }
        KeyCode::Char(c) => {
            input.push(c);
            continuous.then(|| UiEvent::Submit(std::mem::take(input)))
        }
        _ => None,
    }
}

impl UiContext for TerminalUi {
    fn next_event(&mut self, ctx: &SessionContext) -> Result<UiEvent, UiError> {
        loop {
            let input = self.input.as_str();
            self.terminal.draw(|frame| render::draw(frame, ctx, input))?;

            match event::read()? {
                Event::Key(key) => {
                    if let Some(ui_event) = handle_key(&mut self.input, self.continuous, key) {
                        return Ok(ui_event);
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    self.terminal.autoresize()?;
                }
                _ => {}
            }
        }
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        restore_terminal(self.terminal.backend_mut());
        let _ = self.terminal.show_cursor();
        debug!("terminal UI released");
    }
}
