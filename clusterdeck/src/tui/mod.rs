//! Terminal dashboard
//!
//! A cluster table with a modal register/edit form on top. [`run`] owns the
//! terminal; [`App`] holds all state and can be driven without one, which is
//! how the integration tests exercise it.

pub mod app;
pub mod events;
pub mod forms;
pub mod ui;

pub use app::App;
pub use events::{Event, EventHandler};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;

use clusterdeck_core::{ClusterDeckResult, ClusterService, Config};

/// Run the dashboard until the user quits
///
/// The terminal is restored even when the event loop fails.
///
/// # Arguments
///
/// * `config` - Tick rate, tag width, kubeconfig check and the endpoint shown
/// * `service` - Backend for listing, fetching and submitting clusters
pub async fn run(config: &Config, service: Arc<dyn ClusterService>) -> ClusterDeckResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(config.ui.tick_rate);
    let mut app = App::new(service, events.sender(), config);
    app.refresh();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> ClusterDeckResult<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let event = events.next().await?;
        app.handle_event(event).await?;

        if app.should_quit {
            return Ok(());
        }
    }
}
