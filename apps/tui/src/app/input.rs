use chrono::Local;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use geosafe_core::MapCommand;

use crate::app::state::App;

pub fn command_for_key(key: &KeyEvent) -> Option<MapCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(MapCommand::Quit);
    }

    let command = match key.code {
        KeyCode::Left | KeyCode::Char('h') => MapCommand::PanLeft,
        KeyCode::Right | KeyCode::Char('l') => MapCommand::PanRight,
        KeyCode::Up | KeyCode::Char('k') => MapCommand::PanUp,
        KeyCode::Down | KeyCode::Char('j') => MapCommand::PanDown,
        KeyCode::Char('+' | '=') => MapCommand::ZoomIn,
        KeyCode::Char('-') => MapCommand::ZoomOut,
        KeyCode::Char('0') => MapCommand::Recenter,
        KeyCode::Enter | KeyCode::Char(' ') => MapCommand::ClickCenter,
        KeyCode::Tab | KeyCode::Char('n') => MapCommand::NextFeature,
        KeyCode::BackTab | KeyCode::Char('p') => MapCommand::PreviousFeature,
        KeyCode::Esc => MapCommand::ClosePopup,
        KeyCode::Char('r') => MapCommand::Reload,
        KeyCode::Char('c') => MapCommand::Copy,
        KeyCode::Char('?') => MapCommand::ToggleHelp,
        KeyCode::Char('q') => MapCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub fn handle_key(app: &mut App, key: &KeyEvent) {
    if let Some(command) = command_for_key(key) {
        app.handle_command(command, Local::now());
    }
}

pub fn handle_mouse(app: &mut App, mouse: &MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.handle_click(mouse.column, mouse.row, Local::now());
        }
        MouseEventKind::ScrollUp => app.handle_command(MapCommand::ZoomIn, Local::now()),
        MouseEventKind::ScrollDown => app.handle_command(MapCommand::ZoomOut, Local::now()),
        _ => {}
    }
}
