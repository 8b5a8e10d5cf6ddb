mod clipboard;
mod fetch;
mod input;
mod pointer;
mod render;
mod state;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use geosafe_core::click::COPIED_MESSAGE;
use geosafe_core::session::{ClickOutcome, SessionEvent};
use geosafe_core::MapCommand;
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

use crate::input::command_for_key;
use crate::state::WebState;

fn main() -> io::Result<()> {
    let store = Rc::new(RefCell::new(WebState::new(fetch::api_config())));

    fetch::spawn_load(store.clone());

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let store = store.clone();
        move |event| {
            if let Some(command) = command_for_key(&event.code) {
                run_command(&store, command);
            }
        }
    });

    let click_store = store.clone();
    if let Err(error) = pointer::on_click(move |grid_cell| {
        let cell = click_store.borrow().map_cell_at(grid_cell);
        if let Some((col, row)) = cell {
            let outcome = click_store
                .borrow_mut()
                .session
                .click(col, row, chrono::Local::now());
            report_click(&click_store, &outcome);
        }
    }) {
        web_sys::console::error_1(&error);
    }

    terminal.draw_web(move |f| {
        render::render(&mut store.borrow_mut(), f);
    });

    Ok(())
}

fn run_command(store: &Rc<RefCell<WebState>>, command: MapCommand) {
    let event = store
        .borrow_mut()
        .session
        .apply(command, chrono::Local::now());

    match event {
        SessionEvent::Redraw | SessionEvent::Quit => {}
        SessionEvent::Clicked(outcome) => report_click(store, &outcome),
        SessionEvent::ReloadRequested => {
            store.borrow_mut().status = None;
            fetch::spawn_load(store.clone());
        }
        SessionEvent::NothingToCopy => {
            store.borrow_mut().status = Some("Click on the map first.".to_string());
        }
        SessionEvent::CopyRequested(text) => {
            let store = store.clone();
            spawn_local(async move {
                let status = match clipboard::write_text(&text).await {
                    Ok(()) => COPIED_MESSAGE.to_string(),
                    Err(error) => {
                        web_sys::console::error_1(&error);
                        format!("Copy failed, select manually: {text}")
                    }
                };
                store.borrow_mut().status = Some(status);
            });
        }
    }
}

fn report_click(store: &Rc<RefCell<WebState>>, outcome: &ClickOutcome) {
    if let Some(event) = outcome.event() {
        web_sys::console::log_1(&event.log_line().into());
        store.borrow_mut().status = None;
    }
}
