//! Picker screen session: raw mode, alternate screen, and mouse capture.
//!
//! The shell's screen is handed back on every exit path, panics included.

use std::io::{Stdout, Write};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::Result;

/// Drawing surface of the picker.
pub type PickerTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Active picker screen; the shell's screen comes back when it is left or dropped.
pub struct ScreenSession {
    /// Ratatui terminal drawing to stdout.
    terminal: PickerTerminal,
    /// Whether raw mode and the alternate screen are still in effect.
    active: bool,
}

impl ScreenSession {
    /// What: Take over the terminal for the picker.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - Session owning the ratatui terminal.
    ///
    /// # Errors
    /// - Raw mode or the alternate screen cannot be entered; whatever was
    ///   already switched on is switched off again before returning.
    ///
    /// Details:
    /// - Installs a panic hook that puts the shell screen back before the
    ///   panic message is printed.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            release_screen();
            return Err(e.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(std::io::stdout())) {
            Ok(t) => t,
            Err(e) => {
                release_screen();
                return Err(e.into());
            }
        };
        install_panic_restore();
        tracing::debug!("picker screen entered");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Terminal to draw frames on.
    pub fn terminal(&mut self) -> &mut PickerTerminal {
        &mut self.terminal
    }

    /// What: Give the screen back to the shell.
    ///
    /// Inputs: None.
    ///
    /// # Errors
    /// - Raw mode or the alternate screen cannot be left.
    ///
    /// Details:
    /// - Only the first call does anything; the cursor is shown again.
    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.terminal.backend_mut().flush()?;
        tracing::debug!("picker screen left");
        Ok(())
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            tracing::warn!(error = %e, "failed to restore the terminal");
        }
    }
}

/// Best-effort undo of every screen mode the picker switches on.
fn release_screen() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
}

/// Chain a panic hook that releases the screen before the previous hook runs.
fn install_panic_restore() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        release_screen();
        previous(info);
    }));
}
