//! Dashboard application state
//!
//! The cluster list plus at most one open register/edit form. Service calls
//! run on spawned tasks and report back through the event channel, so key
//! handling never waits on the network.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::forms::ClusterForm;
use super::Event;
use clusterdeck_core::form::{Confirm, FormMode, KubeconfigCheck, SubmitOutcome};
use clusterdeck_core::types::{ClusterDetail, ClusterSummary, ServiceResponse};
use clusterdeck_core::{ClusterDeckError, ClusterDeckResult, ClusterService, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTab {
    Clusters,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unknown,
    Connected,
    Unreachable,
}

/// Dashboard state and key handling
///
/// Owns the cluster list and at most one open [`ClusterForm`]. Every service
/// call is spawned onto the runtime and its result comes back as an
/// [`Event`] posted to the sender passed to [`App::new`]; feed those events
/// (and key presses) to [`App::handle_event`].
///
/// Each opened form gets a fresh id. A submission carries the id of the form
/// that started it, so a result arriving after that form was cancelled is
/// reported on the status line and never applied to a newer form.
///
/// # Examples
///
/// ```no_run
/// use clusterdeck::tui::{App, EventHandler};
/// use clusterdeck::{Config, HttpClusterService};
/// use std::sync::Arc;
///
/// # async fn demo() -> clusterdeck::ClusterDeckResult<()> {
/// let config = Config::default();
/// let service = Arc::new(HttpClusterService::new(&config.api)?);
/// let mut events = EventHandler::new(config.ui.tick_rate);
/// let mut app = App::new(service, events.sender(), &config);
/// app.refresh();
/// while !app.should_quit {
///     let event = events.next().await?;
///     app.handle_event(event).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct App {
    pub current_tab: AppTab,
    pub should_quit: bool,

    // Backend
    pub endpoint: String,
    pub connection: ConnectionStatus,
    pub loading: bool,
    service: Arc<dyn ClusterService>,
    events: mpsc::UnboundedSender<Event>,

    // Cluster list
    pub clusters: Vec<ClusterSummary>,
    pub cluster_table_state: TableState,
    pub tag_max_len: usize,

    // Register/edit dialog
    pub form: Option<ClusterForm>,
    form_id: u64,
    kubeconfig_check: KubeconfigCheck,

    // UI state
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create the dashboard state
    ///
    /// # Arguments
    ///
    /// * `service` - Backend every list, detail and submit call goes to
    /// * `events` - Where spawned tasks post their results
    /// * `config` - Endpoint shown in the header, tag width and kubeconfig check
    pub fn new(
        service: Arc<dyn ClusterService>,
        events: mpsc::UnboundedSender<Event>,
        config: &Config,
    ) -> Self {
        Self {
            current_tab: AppTab::Clusters,
            should_quit: false,

            endpoint: config.api.endpoint.clone(),
            connection: ConnectionStatus::Unknown,
            loading: false,
            service,
            events,

            clusters: Vec::new(),
            cluster_table_state: TableState::default(),
            tag_max_len: config.ui.tag_max_len,

            form: None,
            form_id: 0,
            kubeconfig_check: config.form.kubeconfig_check,

            status_message: None,
            error_message: None,
        }
    }

    /// Reload the cluster list in the background
    pub fn refresh(&mut self) {
        self.loading = true;
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = service.list_clusters().await;
            let _ = events.send(Event::ClustersLoaded(result));
        });
    }

    pub fn selected_cluster(&self) -> Option<&ClusterSummary> {
        self.cluster_table_state
            .selected()
            .and_then(|index| self.clusters.get(index))
    }

    pub fn open_create_form(&mut self) {
        debug!("Opening register form");
        self.show_form(ClusterForm::create());
    }

    fn show_form(&mut self, form: ClusterForm) {
        self.form_id += 1;
        self.form = Some(form.with_kubeconfig_check(self.kubeconfig_check));
    }

    /// Fetch the selected cluster's detail; the edit form opens when it arrives
    pub fn request_edit_form(&mut self) {
        let name = match self.selected_cluster() {
            Some(cluster) => cluster.name().to_string(),
            None => {
                self.error_message = Some("No cluster selected".to_string());
                return;
            }
        };
        self.status_message = Some(format!("Loading cluster '{}'...", name));
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = service.get_cluster(&name).await;
            let _ = events.send(Event::DetailLoaded(result));
        });
    }

    /// Apply one event to the dashboard
    ///
    /// Key presses may spawn service calls; their results arrive later as
    /// further events. Only terminal-level failures are returned as errors,
    /// everything else ends up on the status line.
    pub async fn handle_event(&mut self, event: Event) -> ClusterDeckResult<()> {
        match event {
            Event::Tick => {}
            Event::Key(key) => self.handle_key_event(key).await?,
            Event::ClustersLoaded(result) => self.on_clusters_loaded(result),
            Event::DetailLoaded(result) => self.on_detail_loaded(result),
            Event::SubmitFinished { form_id, result } => self.on_submit_finished(form_id, result),
        }
        Ok(())
    }

    async fn handle_key_event(&mut self, key: KeyEvent) -> ClusterDeckResult<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        self.status_message = None;
        self.error_message = None;

        if self.form.is_some() {
            self.handle_form_keys(key).await
        } else {
            self.handle_list_keys(key);
            Ok(())
        }
    }

    fn handle_list_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.current_tab = AppTab::Clusters,
            KeyCode::Char('2') => self.current_tab = AppTab::Help,
            KeyCode::Char('r') => {
                self.refresh();
                self.status_message = Some("Refreshing clusters...".to_string());
            }
            KeyCode::Char('n') => self.open_create_form(),
            KeyCode::Char('e') => self.request_edit_form(),
            KeyCode::Up => {
                if let Some(selected) = self.cluster_table_state.selected() {
                    if selected > 0 {
                        self.cluster_table_state.select(Some(selected - 1));
                    }
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.cluster_table_state.selected() {
                    if selected < self.clusters.len().saturating_sub(1) {
                        self.cluster_table_state.select(Some(selected + 1));
                    }
                } else if !self.clusters.is_empty() {
                    self.cluster_table_state.select(Some(0));
                }
            }
            _ => {}
        }
    }

    async fn handle_form_keys(&mut self, key: KeyEvent) -> ClusterDeckResult<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.close_form();
                self.status_message = Some("Cancelled".to_string());
                return Ok(());
            }
            KeyCode::Enter => {
                self.submit_form();
                return Ok(());
            }
            KeyCode::Char('o') if ctrl => {
                self.load_kubeconfig_file().await;
                return Ok(());
            }
            _ => {}
        }

        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return Ok(()),
        };
        let result = match key.code {
            KeyCode::Tab => {
                form.next_field();
                Ok(())
            }
            KeyCode::BackTab => {
                form.previous_field();
                Ok(())
            }
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char('l') if ctrl => {
                form.add_label();
                Ok(())
            }
            KeyCode::Char('t') if ctrl => {
                form.add_taint();
                Ok(())
            }
            KeyCode::Char('d') if ctrl => form.remove_focused_row().map(|_| ()),
            KeyCode::Char('a') if ctrl => {
                let visible = form.toggle_advanced();
                self.status_message = Some(if visible {
                    "Labels and taints shown".to_string()
                } else {
                    "Labels and taints hidden".to_string()
                });
                Ok(())
            }
            KeyCode::Char(c) if !ctrl => form.insert_char(c),
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.error_message = Some(e.to_string());
        }
        Ok(())
    }

    /// Cancel the open form and hide it; any in-flight submit is left to finish
    fn close_form(&mut self) {
        if let Some(mut form) = self.form.take() {
            form.cancel();
        }
    }

    fn submit_form(&mut self) {
        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return,
        };
        match form.controller.begin_submit() {
            Confirm::Submit(pending) => {
                let form_id = self.form_id;
                self.status_message = Some(format!(
                    "Submitting '{}'...",
                    pending.request().cluster_name()
                ));
                let service = Arc::clone(&self.service);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = pending.dispatch(service.as_ref()).await;
                    let _ = events.send(Event::SubmitFinished { form_id, result });
                });
            }
            Confirm::Invalid { error_count } => {
                // Row errors are only visible with labels and taints expanded
                if form.controller.errors().keys().any(|path| path.entry().is_some()) {
                    form.controller.set_advanced(true);
                }
                self.error_message = Some(format!("{} field(s) need attention", error_count));
            }
            Confirm::AlreadySubmitting => {
                self.status_message = Some("Submission in progress".to_string());
            }
        }
    }

    async fn load_kubeconfig_file(&mut self) {
        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return,
        };
        let path = form.kubeconfig_path.trim().to_string();
        if path.is_empty() {
            self.error_message = Some("Type a kubeconfig path first".to_string());
            return;
        }
        let loaded = match tokio::fs::read_to_string(&path).await {
            Ok(content) => form.controller.load_kubeconfig(content),
            Err(e) => Err(ClusterDeckError::invalid_input(
                "kubeconfig",
                format!("Failed to read {}: {}", path, e),
            )),
        };
        match loaded {
            Ok(()) => self.status_message = Some(format!("Loaded kubeconfig from {}", path)),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn on_clusters_loaded(&mut self, result: ClusterDeckResult<Vec<ClusterSummary>>) {
        self.loading = false;
        match result {
            Ok(clusters) => {
                debug!("Loaded {} clusters", clusters.len());
                self.clusters = clusters;
                self.connection = ConnectionStatus::Connected;
                let selected = match self.cluster_table_state.selected() {
                    _ if self.clusters.is_empty() => None,
                    Some(index) => Some(index.min(self.clusters.len() - 1)),
                    None => Some(0),
                };
                self.cluster_table_state.select(selected);
            }
            Err(e) => {
                warn!("Failed to load clusters: {}", e);
                self.connection = ConnectionStatus::Unreachable;
                self.error_message = Some(format!("Failed to load clusters: {}", e));
            }
        }
    }

    fn on_detail_loaded(&mut self, result: ClusterDeckResult<ClusterDetail>) {
        match result {
            Ok(detail) if self.form.is_none() => {
                debug!("Opening edit form for '{}'", detail.name());
                self.status_message = None;
                self.show_form(ClusterForm::edit(&detail));
            }
            Ok(detail) => {
                debug!("Ignoring detail for '{}', a form is already open", detail.name());
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to load cluster: {}", e));
            }
        }
    }

    /// The submitting form was closed while the request was in flight
    fn on_closed_form_finished(&mut self, form_id: u64, result: ClusterDeckResult<ServiceResponse>) {
        debug!("Submission from closed form {} finished", form_id);
        match result {
            Ok(response) if response.success => {
                self.status_message = Some("Request completed".to_string());
                self.refresh();
            }
            Ok(response) => {
                self.error_message = response.message;
            }
            Err(e) => self.error_message = Some(failure_message(&e)),
        }
    }

    fn on_submit_finished(&mut self, form_id: u64, result: ClusterDeckResult<ServiceResponse>) {
        let form = match self.form.as_mut() {
            Some(form) if form_id == self.form_id => form,
            _ => {
                self.on_closed_form_finished(form_id, result);
                return;
            }
        };

        let mode = form.mode();
        match form.controller.finish_submit(result) {
            SubmitOutcome::Completed(response) if response.success => {
                self.form = None;
                self.status_message = Some(match mode {
                    FormMode::Create => "Cluster registered".to_string(),
                    FormMode::Edit => "Cluster updated".to_string(),
                });
                info!("Closed {} form after successful submit", mode);
                self.refresh();
            }
            SubmitOutcome::Completed(response) => {
                self.error_message = Some(
                    response
                        .message
                        .unwrap_or_else(|| "Request rejected".to_string()),
                );
            }
            SubmitOutcome::Failed(e) => {
                self.error_message = Some(failure_message(&e));
            }
            SubmitOutcome::Invalid { .. } | SubmitOutcome::AlreadySubmitting => {}
        }
    }
}

fn failure_message(error: &ClusterDeckError) -> String {
    if error.is_transient() {
        format!("Request failed: {} (press Enter to retry)", error)
    } else {
        format!("Request failed: {}", error)
    }
}
