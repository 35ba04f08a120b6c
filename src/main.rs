mod backend;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        EventStream,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use backend::{video_id, ClockSurface, DefaultBackendFactory, EmbedApi, EmbedLibraryLoader, LocalEmbedHost};
use config::AppConfig;
use controller::{AppController, PlayerController};
use model::{Catalog, MediaKind};
use view::AppView;

const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== shortreels starting ===");

    let config = AppConfig::from_env();
    let catalog = match config.catalog_path.as_deref() {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => Catalog::bundled().context("loading bundled catalog")?,
    };
    tracing::info!(
        groups = catalog.group_count(),
        items = catalog.items().count(),
        origin = %config.origin,
        block_autoplay = config.block_autoplay,
        "Catalog loaded"
    );

    // The local embed host plays each video for its catalog duration.
    let durations: HashMap<String, f64> = catalog
        .items()
        .filter(|item| item.media_kind == MediaKind::Embed)
        .map(|item| (video_id::resolve(&item.media_url, &item.id), item.duration_seconds))
        .collect();
    let embed_api: Arc<dyn EmbedApi> = Arc::new(LocalEmbedHost::new(durations));
    let loader = EmbedLibraryLoader::global(embed_api.clone());

    let factory = DefaultBackendFactory::new(
        Arc::new(ClockSurface::new(config.block_autoplay)),
        embed_api,
        loader,
        config.origin.clone(),
        config.tuning.embed_poll_interval,
    );
    let initial_reveal = config.tuning.initial_reveal;
    let player = PlayerController::new(Arc::new(catalog), Arc::new(factory), config.tuning);
    let controller = AppController::new(player, initial_reveal);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("shortreels shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut controller: AppController,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

    loop {
        let snapshot = controller.snapshot();
        let mut layout = None;
        terminal.draw(|f| {
            layout = Some(AppView::render(
                f,
                &snapshot,
                &controller.feed_view(),
                controller.show_help(),
            ));
        })?;
        if let Some(layout) = layout {
            controller.apply_layout(layout);
        }

        if controller.should_quit() {
            break;
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => controller.handle_key_event(key),
                Some(Ok(Event::Mouse(mouse))) => controller.handle_mouse_event(mouse),
                Some(Ok(Event::FocusLost)) => controller.handle_focus_lost(),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
            _ = controller.process_next() => {}
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}
