use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use toune_remote::config::RemoteConfig;
use toune_remote::controller::AppController;
use toune_remote::gateway::{HttpTransport, RequestGateway, SharedCredential};
use toune_remote::logging;
use toune_remote::model::{TouneClient, DEFAULT_ROOT};
use toune_remote::sync::StatusSyncEngine;
use toune_remote::view::TuiRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors go to stderr; the log file location is itself configured
    let config = RemoteConfig::from_env().context("invalid configuration")?;

    let _log_guard = match logging::init_logging(&config.log_dir, config.log_filter.as_deref()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {:#}", e);
            None
        }
    };

    tracing::info!("=== toune-remote starting ===");
    tracing::info!(
        url = %config.base_url,
        poll_ms = config.poll_interval.as_millis() as u64,
        tick_ms = config.tick_interval.as_millis() as u64,
        "Configuration loaded"
    );

    let transport = HttpTransport::new(&config.base_url).context("cannot create HTTP client")?;
    let credentials = SharedCredential::new(config.resolve_api_key());
    let gateway = RequestGateway::new(
        Arc::new(transport),
        Arc::new(credentials),
        config.request_timeout,
    );
    let client = TouneClient::new(gateway);

    let renderer = Arc::new(TuiRenderer::new());
    let sync = StatusSyncEngine::new(client.clone(), renderer.clone(), config.sync_config());
    let controller = AppController::new(client, sync.clone(), renderer.clone(), config.browse_config());

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    sync.start().await;
    controller.spawn_initial_load(DEFAULT_ROOT);

    let res = run_app(&mut terminal, &renderer, controller).await;

    sync.stop().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("toune-remote shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    renderer: &TuiRenderer,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let view = renderer.snapshot();
        let ui_state = controller.ui_state().await;

        terminal.draw(|f| {
            TuiRenderer::draw(f, &view, &ui_state);
        })?;

        if ui_state.should_quit {
            break;
        }

        // Short poll keeps the interpolated time moving on screen
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // Failures are reported through the renderer
                    let _ = controller.handle_key_event(key).await;
                }
                Event::FocusLost => controller.set_active(false).await,
                Event::FocusGained => controller.set_active(true).await,
                _ => {}
            }
        }
    }

    Ok(())
}
