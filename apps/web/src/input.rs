use geosafe_core::MapCommand;
use ratzilla::event::KeyCode;

/// Map a browser key to a map command. There is no quit key in the page.
pub fn command_for_key(code: &KeyCode) -> Option<MapCommand> {
    let command = match code {
        KeyCode::Left | KeyCode::Char('h') => MapCommand::PanLeft,
        KeyCode::Right | KeyCode::Char('l') => MapCommand::PanRight,
        KeyCode::Up | KeyCode::Char('k') => MapCommand::PanUp,
        KeyCode::Down | KeyCode::Char('j') => MapCommand::PanDown,
        KeyCode::Char('+' | '=') => MapCommand::ZoomIn,
        KeyCode::Char('-') => MapCommand::ZoomOut,
        KeyCode::Char('0') => MapCommand::Recenter,
        KeyCode::Enter | KeyCode::Char(' ') => MapCommand::ClickCenter,
        KeyCode::Char('n') => MapCommand::NextFeature,
        KeyCode::Char('p') => MapCommand::PreviousFeature,
        KeyCode::Esc => MapCommand::ClosePopup,
        KeyCode::Char('r') => MapCommand::Reload,
        KeyCode::Char('c') => MapCommand::Copy,
        KeyCode::Char('?') => MapCommand::ToggleHelp,
        _ => return None,
    };
    Some(command)
}
