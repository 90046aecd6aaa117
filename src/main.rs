mod app;
mod components;
mod draw;
mod keys;
mod route;
mod state;
mod ui;

use crate::app::App;
use crate::route::Route;
use crate::state::app_settings::{API_URL_ENV, AppSettings, LOG_LEVEL_ENV};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tourney_api::client::TourneyApi;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = AppSettings::load();
    if handle_cli_args(&mut settings) {
        return Ok(());
    }

    better_panic::install();

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(settings.log_level);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    log::info!("using api at {}", settings.api_base_url);
    let api = TourneyApi::with_base_url(settings.api_base_url.clone());
    let app = Arc::new(Mutex::new(App::new(settings, &api)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(api, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Load the start page
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

/// Apply command-line overrides. Returns `true` when the program should
/// exit without starting the UI.
fn handle_cli_args(settings: &mut AppSettings) -> bool {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return true;
            }
            "-V" | "--version" => {
                println!("tourney-admin {}", env!("CARGO_PKG_VERSION"));
                return true;
            }
            "--api-url" => match args.next() {
                Some(url) if !url.trim().is_empty() => settings.api_base_url = url.trim().to_string(),
                _ => exit_with_usage("--api-url needs a value"),
            },
            route if !route.starts_with('-') => match Route::parse(route) {
                Some(route) => settings.start_route = route,
                None => exit_with_usage(&format!("Unknown route: {route}")),
            },
            _ => exit_with_usage(&format!("Unknown argument: {arg}")),
        }
    }
    false
}

fn exit_with_usage(message: &str) -> ! {
    eprintln!("{message}\n\n{}", usage_text());
    std::process::exit(2);
}

fn usage_text() -> String {
    format!(
        "tourney-admin - tournament administration terminal UI

Usage:
  tourney-admin [--api-url <url>] [route]
  tourney-admin --help
  tourney-admin --version

Routes:
  /tournaments, /teams, /tournament-teams, /players, /tournament-players, /games
  /<collection>/<id> opens a single record

Environment:
  {API_URL_ENV}   REST API base URL (default {})
  {LOG_LEVEL_ENV}       Log level: error, warn, info, debug, trace (default info)",
        tourney_api::client::DEFAULT_BASE_URL
    )
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &network_requests).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &network_requests, &mut loading).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.activate();
            send_all(requests, network_requests).await;
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
        }
        UiEvent::Resize => {}
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return;
    }
    let requests = app.lock().await.on_network_response(response);
    send_all(requests, network_requests).await;
}

async fn send_all(requests: Vec<NetworkRequest>, network_requests: &mpsc::Sender<NetworkRequest>) {
    for request in requests {
        if network_requests.send(request).await.is_err() {
            log::error!("network worker is gone");
            return;
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                log::error!("failed to read terminal event: {e}");
                continue;
            }
            Err(_) => break,
        };

        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Restore the terminal. Failures are ignored since this also runs from the
/// panic hook and on exit.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
