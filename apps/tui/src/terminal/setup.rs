use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr, Write};
use tracing::{debug, warn};

/// Enter raw mode and the alternate screen on stderr with mouse capture on,
/// leaving stdout free for the final click.
/// Each step undoes the earlier ones if it fails.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stderr>>> {
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    debug!(width, height, "Setting up terminal");

    enable_raw_mode().map_err(|e| eyre!("Failed to enable raw mode: {e}"))?;

    let mut stderr = stderr();
    if let Err(e) = execute!(stderr, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(eyre!("Failed to enter alternate screen: {e}"));
    }

    let mut terminal = match Terminal::new(CrosstermBackend::new(stderr)) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = execute!(std::io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(eyre!("Failed to create terminal: {e}"));
        }
    };

    // Cosmetic; the map still works if these fail.
    if let Err(e) = terminal.clear() {
        warn!(error = %e, "Failed to clear terminal");
    }
    if let Err(e) = execute!(std::io::stderr(), cursor::Hide) {
        warn!(error = %e, "Failed to hide cursor");
    }

    Ok(terminal)
}

/// Restore the terminal, logging rather than failing on each step.
pub fn cleanup_terminal_state(raw_mode: bool, alternate_screen: bool) {
    let mut stderr_handle = stderr();

    if let Err(e) = execute!(stderr_handle, cursor::Show) {
        warn!(error = %e, "Failed to show cursor");
    }

    if alternate_screen {
        if let Err(e) = execute!(stderr_handle, DisableMouseCapture, LeaveAlternateScreen) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
    }

    if raw_mode {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to disable raw mode");
        }
    }

    let _ = stderr_handle.flush();
    debug!("Terminal restored");
}
