use crate::app::App;
use crate::route::Route;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }

    let mut guard = app.lock().await;
    let requests = dispatch(&mut guard, key_event);
    drop(guard);

    crate::send_all(requests, network_requests).await;
}

/// Apply one key press to the app; returns the requests it produced.
fn dispatch(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let code = key_event.code;
    let modifiers = key_event.modifiers;

    if let (Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    if app.state.confirm.is_some() {
        return match code {
            Char('y') | Char('Y') => app.confirm_delete(),
            Char('n') | Char('N') | KeyCode::Esc => {
                app.cancel_confirm();
                Vec::new()
            }
            _ => Vec::new(),
        };
    }

    if app.state.show_help {
        if matches!(code, Char('?') | KeyCode::Esc | Char('q')) {
            app.toggle_help();
        }
        return Vec::new();
    }

    if app.active_form().is_some() {
        return form_keys(app, code, modifiers);
    }

    let mut requests = Vec::new();
    match (app.state.route, code) {
        (_, Char('q')) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char(digit @ '1'..='6')) => {
            let index = digit as usize - '1' as usize;
            requests = app.select_tab(index);
        }
        (_, Char('?')) => app.toggle_help(),
        (_, Char('"')) => app.toggle_show_logs(),
        (_, Char('f')) => app.toggle_full_screen(),
        (_, Char('r')) => requests = app.refresh(),

        // Collection page
        (Route::Collection(_), Char('j') | KeyCode::Down) => app.move_selection(true),
        (Route::Collection(_), Char('k') | KeyCode::Up) => app.move_selection(false),
        (Route::Collection(_), KeyCode::Enter) => requests = app.open_selected(),
        (Route::Collection(_), Char('n')) => app.open_form(),
        (Route::Collection(_), Char('d')) => app.request_delete(),
        (Route::Collection(_), Char('c')) => app.clear_filters(),
        (Route::Collection(_), Char(key)) => {
            app.cycle_filter(key);
        }

        // Detail page
        (Route::Detail(..), Char('e')) => app.start_edit(),
        (Route::Detail(..), Char('d')) => app.request_delete(),
        (Route::Detail(..), KeyCode::Esc | Char('b')) => requests = app.back_to_collection(),

        _ => {}
    }
    requests
}

fn form_keys(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Vec<NetworkRequest> {
    match code {
        KeyCode::Enter => return app.submit_form(),
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Left => app.cycle_choice(false),
        KeyCode::Right => app.cycle_choice(true),
        _ => {
            let Some(form) = app.active_form_mut() else {
                return Vec::new();
            };
            match (code, modifiers) {
                (KeyCode::Tab | KeyCode::Down, _) => form.focus_next(),
                (KeyCode::BackTab | KeyCode::Up, _) => form.focus_prev(),
                (KeyCode::Backspace, _) => form.backspace(),
                (Char(ch), KeyModifiers::NONE | KeyModifiers::SHIFT) => form.insert_char(ch),
                _ => {}
            }
        }
    }
    Vec::new()
}
