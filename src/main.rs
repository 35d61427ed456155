use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use stopwatch::input::map_event;
use stopwatch::{ui, Config, FileStore, Pump, StopwatchApp, StopwatchController, SystemClock};

const APP_NAME: &str = "Stopwatch";
const IDLE_WAIT: Duration = Duration::from_secs(1);

enum AppOp {
    Input(Event),
    Pump(u64),
}

fn init_logging(log_path: &Path) {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir).ok();
    }
    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{APP_NAME}: logging disabled, can't open {}: {e}", log_path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal() {
    disable_raw_mode().ok();
    crossterm::execute!(
        io::stdout(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .ok();
}

fn input_thread(tx: Sender<AppOp>) {
    loop {
        match crossterm::event::read() {
            Ok(event) => {
                if tx.send(AppOp::Input(event)).is_err() {
                    break;
                }
            }
            Err(e) => {
                log::error!("Reading terminal input failed: {e}");
                break;
            }
        }
    }
}

fn main() -> stopwatch::Result<()> {
    // Logger first so warnings about the environment are kept.
    init_logging(&Config::log_path_from_env());
    let config = Config::from_env();
    log::info!("{APP_NAME} starting, state file {}", config.state_path.display());

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &config);
    restore_terminal();

    match &result {
        Ok(()) => log::info!("{APP_NAME} exiting"),
        Err(e) => log::error!("{APP_NAME} failed: {e}"),
    }
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: &Config) -> stopwatch::Result<()> {
    let (tx, rx) = mpsc::channel::<AppOp>();
    let input_tx = tx.clone();
    std::thread::Builder::new()
        .name("input".into())
        .spawn(move || input_thread(input_tx))?;

    let pump = Pump::spawn(config.refresh_interval, move |generation| {
        tx.send(AppOp::Pump(generation)).is_ok()
    })?;

    let controller = StopwatchController::new(
        SystemClock::new(),
        FileStore::new(&config.state_path),
        pump,
        config,
    );
    let mut app = StopwatchApp::new(controller);

    let size = terminal.size()?;
    if let Err(e) = ui::check_size(Rect::new(0, 0, size.width, size.height)) {
        app.controller.report_error(&e.to_string());
    }
    app.controller.restore();

    while !app.should_quit() {
        app.controller.expire_banner();

        let mut controls = ui::ControlAreas::default();
        let drawn = terminal.draw(|frame| {
            controls = ui::layout(frame.area()).controls;
            ui::draw(frame, app.controller.surfaces(), app.help_visible);
        });
        if let Err(e) = drawn {
            app.controller.report_error(&format!("Display update error: {e}"));
        }

        let wait = app.controller.banner_remaining().unwrap_or(IDLE_WAIT);
        match rx.recv_timeout(wait) {
            Ok(AppOp::Input(event)) => {
                let running = app.controller.is_running();
                if let Some(action) = map_event(&event, running, app.help_visible, &controls) {
                    app.handle(action);
                }
            }
            Ok(AppOp::Pump(generation)) => app.controller.on_tick(generation),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Event channel closed");
                app.controller.unload();
                break;
            }
        }
    }
    Ok(())
}
