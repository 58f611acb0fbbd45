//! Dashboard form workflows driven through key events

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::time::{timeout, Duration};

use clusterdeck::tui::app::App;
use clusterdeck::tui::events::Event;
use clusterdeck::tui::forms::ClusterFormField;
use clusterdeck::{ClusterDeckResult, Config};
use clusterdeck_core::form::FormMode;
use clusterdeck_core::test_helpers::{MockClusterService, RecordedCall};
use clusterdeck_core::types::{ClusterDetail, Label, ObjectMeta, SyncMode};
use pretty_assertions::assert_eq;

/// Drives an [`App`] with synthetic key presses and delivers task completions
pub struct TuiTestHarness {
    app: App,
    service: Arc<MockClusterService>,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl TuiTestHarness {
    pub fn new(service: MockClusterService) -> Self {
        let service = Arc::new(service);
        let (sender, receiver) = mpsc::unbounded_channel();
        let app = App::new(service.clone(), sender, &Config::default());
        Self {
            app,
            service,
            receiver,
        }
    }

    /// Send a key event to the app
    pub async fn send_key(&mut self, key_code: KeyCode) -> ClusterDeckResult<()> {
        self.send_key_with_modifiers(key_code, KeyModifiers::NONE).await
    }

    pub async fn send_key_with_modifiers(
        &mut self,
        key_code: KeyCode,
        modifiers: KeyModifiers,
    ) -> ClusterDeckResult<()> {
        let key_event = KeyEvent::new(key_code, modifiers);
        self.app.handle_event(Event::Key(key_event)).await
    }

    pub async fn send_ctrl(&mut self, c: char) -> ClusterDeckResult<()> {
        self.send_key_with_modifiers(KeyCode::Char(c), KeyModifiers::CONTROL)
            .await
    }

    /// Send a string as individual character events
    pub async fn send_string(&mut self, s: &str) -> ClusterDeckResult<()> {
        for c in s.chars() {
            self.send_key(KeyCode::Char(c)).await?;
        }
        Ok(())
    }

    /// Deliver the next background completion to the app
    pub async fn pump(&mut self) -> ClusterDeckResult<()> {
        let event = timeout(Duration::from_secs(2), self.receiver.recv())
            .await
            .expect("timed out waiting for background event")
            .expect("event channel closed");
        self.app.handle_event(event).await
    }

    fn form_mode(&self) -> Option<FormMode> {
        self.app.form.as_ref().map(|form| form.mode())
    }
}

fn member_detail() -> ClusterDetail {
    let mut labels = BTreeMap::new();
    labels.insert("b".to_string(), "2".to_string());
    labels.insert("a".to_string(), "1".to_string());
    ClusterDetail {
        object_meta: ObjectMeta {
            name: "member1".to_string(),
            labels,
            creation_timestamp: None,
        },
        sync_mode: SyncMode::Pull,
        taints: Vec::new(),
    }
}

#[tokio::test]
async fn test_register_cluster_from_keys() {
    let mut harness = TuiTestHarness::new(MockClusterService::new());

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    assert_eq!(harness.form_mode(), Some(FormMode::Create));

    harness.send_string("demo").await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Right).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_string("server: https://x:6443").await.unwrap();
    harness.send_key(KeyCode::Enter).await.unwrap();

    // the submission result, then the list refresh it triggers
    harness.pump().await.unwrap();
    assert!(harness.app.form.is_none());
    assert_eq!(harness.app.status_message.as_deref(), Some("Cluster registered"));
    harness.pump().await.unwrap();
    assert_eq!(harness.app.clusters.len(), 1);

    match &harness.service.calls()[0] {
        RecordedCall::Create(req) => {
            assert_eq!(req.cluster_name, "demo");
            assert_eq!(req.mode, SyncMode::Push);
            assert_eq!(req.kubeconfig, "server: https://x:6443");
        }
        other => panic!("expected create call, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_field_blocks_submit() {
    let mut harness = TuiTestHarness::new(MockClusterService::new());

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_string("demo").await.unwrap();
    harness.send_key(KeyCode::Enter).await.unwrap();

    assert_eq!(harness.form_mode(), Some(FormMode::Create));
    assert_eq!(
        harness.app.error_message.as_deref(),
        Some("2 field(s) need attention")
    );
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn test_escape_cancels_without_service_call() {
    let mut harness = TuiTestHarness::new(MockClusterService::new());

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_string("demo").await.unwrap();
    harness.send_key(KeyCode::Esc).await.unwrap();

    assert!(harness.app.form.is_none());
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn test_repeated_enter_while_submitting_sends_once() {
    let (service, gate) = MockClusterService::gated();
    let mut harness = TuiTestHarness::new(service);

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_string("demo").await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Left).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_string("server: https://x").await.unwrap();

    for _ in 0..3 {
        harness.send_key(KeyCode::Enter).await.unwrap();
    }
    assert!(harness
        .app
        .form
        .as_ref()
        .map(|form| form.controller.is_submitting())
        .unwrap_or(false));

    release(&gate);
    harness.pump().await.unwrap();

    assert_eq!(harness.service.submission_count(), 1);
    assert!(harness.app.form.is_none());
}

fn release(gate: &Arc<Notify>) {
    gate.notify_one();
}

impl TuiTestHarness {
    /// Open the register form and fill every required field
    async fn fill_create_form(&mut self, name: &str) -> ClusterDeckResult<()> {
        self.send_key(KeyCode::Char('n')).await?;
        self.send_string(name).await?;
        self.send_key(KeyCode::Tab).await?;
        self.send_key(KeyCode::Right).await?;
        self.send_key(KeyCode::Tab).await?;
        self.send_key(KeyCode::Tab).await?;
        self.send_string("server: https://x").await
    }
}

#[tokio::test]
async fn test_cancelled_submission_result_does_not_touch_next_form() {
    let (service, gate) = MockClusterService::gated();
    let mut harness = TuiTestHarness::new(service);

    harness.fill_create_form("first").await.unwrap();
    harness.send_key(KeyCode::Enter).await.unwrap();
    harness.send_key(KeyCode::Esc).await.unwrap();
    assert!(harness.app.form.is_none());

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_string("second").await.unwrap();

    release(&gate);
    harness.pump().await.unwrap();

    let form = harness
        .app
        .form
        .as_ref()
        .expect("new form closed by the earlier submission");
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.controller.state().cluster_name, "second");
    assert!(!form.controller.is_submitting());
    assert_eq!(harness.app.status_message.as_deref(), Some("Request completed"));

    match &harness.service.calls()[0] {
        RecordedCall::Create(req) => assert_eq!(req.cluster_name, "first"),
        other => panic!("expected create call, got {:?}", other),
    }
    assert_eq!(harness.service.submission_count(), 1);
}

#[tokio::test]
async fn test_empty_row_expands_collapsed_section() {
    let mut harness = TuiTestHarness::new(MockClusterService::new());

    harness.fill_create_form("demo").await.unwrap();
    harness.send_ctrl('l').await.unwrap();
    harness.send_ctrl('a').await.unwrap();
    assert!(!harness.app.form.as_ref().unwrap().controller.show_advanced());

    harness.send_key(KeyCode::Enter).await.unwrap();

    let form = harness.app.form.as_ref().unwrap();
    assert!(form.controller.show_advanced());
    assert!(form
        .fields()
        .iter()
        .any(|field| matches!(field, ClusterFormField::LabelKey(_))));
    assert_eq!(
        harness.app.error_message.as_deref(),
        Some("2 field(s) need attention")
    );
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn test_edit_cluster_adds_label() {
    let mut harness = TuiTestHarness::new(MockClusterService::new().with_cluster(member_detail()));

    harness.send_key(KeyCode::Char('r')).await.unwrap();
    harness.pump().await.unwrap();
    assert_eq!(harness.app.clusters.len(), 1);

    harness.send_key(KeyCode::Char('e')).await.unwrap();
    harness.pump().await.unwrap();
    assert_eq!(harness.form_mode(), Some(FormMode::Edit));

    let form = harness.app.form.as_ref().unwrap();
    let keys: Vec<String> = form
        .controller
        .state()
        .labels
        .values()
        .map(|l| l.key.clone())
        .collect();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    assert!(!form.fields().contains(&ClusterFormField::Kubeconfig));

    // read-only name cannot be typed into
    harness.app.form.as_mut().unwrap().current_field = ClusterFormField::Name;
    harness.send_string("x").await.unwrap();
    assert!(harness.app.error_message.is_some());

    harness.send_ctrl('l').await.unwrap();
    harness.send_string("zone").await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_string("eu").await.unwrap();
    harness.send_key(KeyCode::Enter).await.unwrap();
    harness.pump().await.unwrap();

    let update = harness
        .service
        .calls()
        .into_iter()
        .find_map(|call| match call {
            RecordedCall::Update(req) => Some(req),
            _ => None,
        })
        .unwrap();
    assert_eq!(update.cluster_name, "member1");
    assert_eq!(
        update.labels,
        vec![
            Label {
                key: "a".to_string(),
                value: "1".to_string()
            },
            Label {
                key: "b".to_string(),
                value: "2".to_string()
            },
            Label {
                key: "zone".to_string(),
                value: "eu".to_string()
            },
        ]
    );
    assert_eq!(harness.app.status_message.as_deref(), Some("Cluster updated"));
}

#[tokio::test]
async fn test_transport_failure_keeps_form_open() {
    let service = MockClusterService::new();
    service.fail_with("connection refused");
    let mut harness = TuiTestHarness::new(service);

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_string("demo").await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Right).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_string("server: https://x").await.unwrap();
    harness.send_key(KeyCode::Enter).await.unwrap();
    harness.pump().await.unwrap();

    let form = harness.app.form.as_ref().unwrap();
    assert!(!form.controller.is_submitting());
    assert_eq!(form.controller.state().cluster_name, "demo");
    let message = harness.app.error_message.as_deref().unwrap_or_default();
    assert!(message.starts_with("Request failed"));
    // connection refused is worth retrying
    assert!(message.ends_with("(press Enter to retry)"));
}

#[tokio::test]
async fn test_load_kubeconfig_from_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "clusters:\n- cluster:\n    server: https://x\n").unwrap();
    let mut harness = TuiTestHarness::new(MockClusterService::new());

    harness.send_key(KeyCode::Char('n')).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    harness.send_key(KeyCode::Tab).await.unwrap();
    assert_eq!(
        harness.app.form.as_ref().unwrap().current_field,
        ClusterFormField::KubeconfigPath
    );
    harness
        .send_string(&file.path().display().to_string())
        .await
        .unwrap();
    harness.send_ctrl('o').await.unwrap();

    let form = harness.app.form.as_ref().unwrap();
    assert!(form.controller.state().kubeconfig.contains("server:"));
    assert!(harness.app.error_message.is_none());
}
