use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use clusterdeck_core::types::{ClusterDetail, ClusterSummary, ServiceResponse};
use clusterdeck_core::{ClusterDeckError, ClusterDeckResult};

/// Events that drive the dashboard
///
/// Terminal input and ticks come from [`EventHandler::next`]; the remaining
/// variants are posted by background tasks when a service call completes.
///
/// # Variants
///
/// * `Key(KeyEvent)` - A key press (releases are filtered out)
/// * `Tick` - Regular timer event; nothing else happened this interval
/// * `ClustersLoaded` - Result of a cluster list refresh
/// * `DetailLoaded` - Result of fetching a cluster for the edit form
/// * `SubmitFinished` - Result of a form submission, tagged with the id of
///   the form that started it so a later form never receives it
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    ClustersLoaded(ClusterDeckResult<Vec<ClusterSummary>>),
    DetailLoaded(ClusterDeckResult<ClusterDetail>),
    SubmitFinished {
        form_id: u64,
        result: ClusterDeckResult<ServiceResponse>,
    },
}

/// Merges terminal input, ticks and task completions into one stream
///
/// Background tasks obtain a sender via [`EventHandler::sender`] and post
/// their results; the main loop pulls everything through
/// [`EventHandler::next`], which never blocks longer than 50ms so task
/// completions are picked up promptly even without input.
///
/// # Usage
///
/// ```no_run
/// use clusterdeck::tui::events::{Event, EventHandler};
/// use std::time::Duration;
///
/// # async fn demo() -> clusterdeck::ClusterDeckResult<()> {
/// let mut events = EventHandler::new(Duration::from_millis(250));
/// let sender = events.sender();
/// tokio::spawn(async move {
///     let _ = sender.send(Event::Tick);
/// });
/// match events.next().await? {
///     Event::Key(key) => println!("pressed {:?}", key.code),
///     _ => {}
/// }
/// # Ok(())
/// # }
/// ```
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    last_tick: Instant,
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a handler that emits a `Tick` every `tick_rate`
    ///
    /// # Arguments
    ///
    /// * `tick_rate` - Interval between ticks when no other event arrives
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            receiver,
            last_tick: Instant::now(),
            tick_rate,
        }
    }

    /// Next event to process
    ///
    /// Completed background work is delivered first, then key presses, and a
    /// `Tick` once per tick interval when nothing else happened.
    ///
    /// # Returns
    ///
    /// The next event, or an internal error if the terminal cannot be polled.
    pub async fn next(&mut self) -> ClusterDeckResult<Event> {
        if let Ok(event) = self.receiver.try_recv() {
            return Ok(event);
        }

        let timeout = self
            .tick_rate
            .checked_sub(self.last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0))
            .min(Duration::from_millis(50));

        if event::poll(timeout).map_err(|e| ClusterDeckError::Internal {
            message: format!("Failed to poll events: {}", e),
        })? {
            let read = event::read().map_err(|e| ClusterDeckError::Internal {
                message: format!("Failed to read event: {}", e),
            })?;
            // Presses only; some platforms also report releases
            if let CrosstermEvent::Key(key) = read {
                if key.kind == KeyEventKind::Press {
                    return Ok(Event::Key(key));
                }
            }
        }

        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
            return Ok(Event::Tick);
        }

        match self.receiver.try_recv() {
            Ok(event) => Ok(event),
            Err(_) => Ok(Event::Tick),
        }
    }

    /// Sender for background tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}
