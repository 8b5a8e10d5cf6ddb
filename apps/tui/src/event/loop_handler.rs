use std::io::Stderr;
use std::time::Duration;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use crate::app::{handle_key, handle_mouse, App};
use crate::ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Run the interactive map until the user quits.
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stderr>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_load();

        terminal
            .draw(|f| ui::ui(app, f))
            .map_err(|e| eyre!("Terminal draw error: {e}"))?;

        if event::poll(EVENT_POLL_TIMEOUT)? {
            match event::read()? {
                Event::Key(key) => handle_key(app, &key),
                Event::Mouse(mouse) => handle_mouse(app, &mouse),
                Event::Resize(width, height) => debug!(width, height, "Terminal resized"),
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }

        tokio::task::yield_now().await;
    }

    Ok(())
}
