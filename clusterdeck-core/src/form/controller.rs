//! Form controller: field editing, validation and the submit/cancel flow

use super::field_list::EntryId;
use super::state::ClusterFormState;
use super::validation::{
    self, ContentCheck, FieldError, FieldErrors, FieldPath, KubeconfigCheck, ServerFieldCheck,
};
use super::FormMode;
use crate::error::{ClusterDeckError, ClusterDeckResult};
use crate::service::ClusterService;
use crate::types::{
    ClusterDetail, ClusterRequest, CreateClusterRequest, ServiceResponse, SyncMode, TaintEffect,
    UpdateClusterRequest,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of pressing "confirm"
#[derive(Debug)]
pub enum Confirm {
    /// Validation passed; the controller is now submitting
    Submit(PendingSubmit),
    /// Validation failed; errors are recorded on the controller
    Invalid { error_count: usize },
    /// A submission is already in flight; nothing was produced
    AlreadySubmitting,
}

/// The single request produced by a successful confirm
///
/// Detached from the controller so it can be awaited on another task while
/// the controller keeps handling input.
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    request: ClusterRequest,
}

impl PendingSubmit {
    pub fn request(&self) -> &ClusterRequest {
        &self.request
    }

    pub async fn dispatch(&self, service: &dyn ClusterService) -> ClusterDeckResult<ServiceResponse> {
        service.submit(self.request.clone()).await
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The service answered; the response is passed through untouched
    Completed(ServiceResponse),
    /// The service could not be reached or answered garbage
    Failed(ClusterDeckError),
    Invalid { error_count: usize },
    AlreadySubmitting,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Completed(response) if response.success)
    }
}

pub struct ClusterFormController {
    mode: FormMode,
    state: ClusterFormState,
    errors: FieldErrors,
    show_advanced: bool,
    submitting: bool,
    content_check: Arc<dyn ContentCheck>,
}

impl fmt::Debug for ClusterFormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterFormController")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("errors", &self.errors)
            .field("show_advanced", &self.show_advanced)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

impl ClusterFormController {
    pub fn create() -> Self {
        Self::open(FormMode::Create, None)
    }

    pub fn edit(detail: &ClusterDetail) -> Self {
        Self::open(FormMode::Edit, Some(detail))
    }

    /// Open a fresh form
    ///
    /// In edit mode the name, sync mode, labels and taints come from `detail`
    /// and the advanced (labels/taints) section starts expanded. Edit mode
    /// without a detail yields empty read-only fields.
    pub fn open(mode: FormMode, detail: Option<&ClusterDetail>) -> Self {
        let state = match (mode, detail) {
            (FormMode::Edit, Some(detail)) => ClusterFormState::from_detail(detail),
            _ => ClusterFormState::default(),
        };
        debug!(
            "Opening {} form for '{}' with {} labels and {} taints",
            mode,
            state.cluster_name,
            state.labels.len(),
            state.taints.len()
        );
        Self {
            mode,
            state,
            errors: FieldErrors::new(),
            show_advanced: Self::initial_advanced(mode),
            submitting: false,
            content_check: Arc::new(ServerFieldCheck),
        }
    }

    /// Replace the check applied to uploaded kubeconfig content
    pub fn with_content_check(mut self, check: impl ContentCheck + 'static) -> Self {
        self.content_check = Arc::new(check);
        self
    }

    /// Use one of the named kubeconfig checks
    pub fn with_kubeconfig_check(mut self, check: KubeconfigCheck) -> Self {
        self.content_check = check.content_check();
        self
    }

    fn initial_advanced(mode: FormMode) -> bool {
        mode == FormMode::Edit
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> &ClusterFormState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, path: FieldPath) -> Option<&FieldError> {
        self.errors.get(&path)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    /// The kubeconfig field only exists when registering
    pub fn shows_kubeconfig(&self) -> bool {
        self.mode == FormMode::Create
    }

    pub fn is_read_only(&self, path: FieldPath) -> bool {
        match path {
            FieldPath::ClusterName | FieldPath::SyncMode | FieldPath::Kubeconfig => {
                self.mode == FormMode::Edit
            }
            _ => false,
        }
    }

    fn ensure_editable(&self, path: FieldPath) -> ClusterDeckResult<()> {
        if self.is_read_only(path) {
            return Err(ClusterDeckError::ReadOnlyField {
                field: path.to_string(),
                mode: self.mode.to_string(),
            });
        }
        Ok(())
    }

    fn unknown_row(list: &str, id: EntryId) -> ClusterDeckError {
        ClusterDeckError::invalid_input(list, format!("no row with id {}", id))
    }

    pub fn set_cluster_name(&mut self, name: impl Into<String>) -> ClusterDeckResult<()> {
        self.ensure_editable(FieldPath::ClusterName)?;
        self.state.cluster_name = name.into();
        self.errors.remove(&FieldPath::ClusterName);
        Ok(())
    }

    pub fn set_sync_mode(&mut self, mode: SyncMode) -> ClusterDeckResult<()> {
        self.ensure_editable(FieldPath::SyncMode)?;
        self.state.sync_mode = Some(mode);
        self.errors.remove(&FieldPath::SyncMode);
        Ok(())
    }

    /// Set the kubeconfig text as typed; not content-checked
    pub fn set_kubeconfig(&mut self, text: impl Into<String>) -> ClusterDeckResult<()> {
        self.ensure_editable(FieldPath::Kubeconfig)?;
        self.state.kubeconfig = text.into();
        self.errors.remove(&FieldPath::Kubeconfig);
        Ok(())
    }

    /// Load kubeconfig content from an upload or file
    ///
    /// Content failing the content check is rejected; the field keeps its
    /// previous value and shows the rejection in place.
    pub fn load_kubeconfig(&mut self, content: impl Into<String>) -> ClusterDeckResult<()> {
        self.ensure_editable(FieldPath::Kubeconfig)?;
        let content = content.into();
        if !self.content_check.check(&content) {
            let reason = self.content_check.describe().to_string();
            warn!("Rejected kubeconfig content: {}", reason);
            self.errors
                .insert(FieldPath::Kubeconfig, FieldError::InvalidContent(reason.clone()));
            return Err(ClusterDeckError::validation("kubeconfig", reason));
        }
        self.state.kubeconfig = content;
        self.errors.remove(&FieldPath::Kubeconfig);
        Ok(())
    }

    pub fn add_label(&mut self) -> EntryId {
        let id = self.state.labels.add();
        debug!("Added label row {} ({} rows)", id, self.state.labels.len());
        id
    }

    pub fn remove_label(&mut self, index: usize) -> ClusterDeckResult<()> {
        let (id, _) = self.state.labels.remove(index)?;
        self.drop_label_errors(id);
        debug!("Removed label row {} at index {}", id, index);
        Ok(())
    }

    pub fn remove_label_entry(&mut self, id: EntryId) -> ClusterDeckResult<()> {
        self.state
            .labels
            .remove_entry(id)
            .ok_or_else(|| Self::unknown_row("labels", id))?;
        self.drop_label_errors(id);
        Ok(())
    }

    pub fn set_label_key(&mut self, id: EntryId, key: impl Into<String>) -> ClusterDeckResult<()> {
        let entry = self
            .state
            .labels
            .get_mut(id)
            .ok_or_else(|| Self::unknown_row("labels", id))?;
        entry.key = key.into();
        self.errors.remove(&FieldPath::LabelKey(id));
        Ok(())
    }

    pub fn set_label_value(&mut self, id: EntryId, value: impl Into<String>) -> ClusterDeckResult<()> {
        let entry = self
            .state
            .labels
            .get_mut(id)
            .ok_or_else(|| Self::unknown_row("labels", id))?;
        entry.value = value.into();
        self.errors.remove(&FieldPath::LabelValue(id));
        Ok(())
    }

    pub fn add_taint(&mut self) -> EntryId {
        let id = self.state.taints.add();
        debug!("Added taint row {} ({} rows)", id, self.state.taints.len());
        id
    }

    pub fn remove_taint(&mut self, index: usize) -> ClusterDeckResult<()> {
        let (id, _) = self.state.taints.remove(index)?;
        self.drop_taint_errors(id);
        debug!("Removed taint row {} at index {}", id, index);
        Ok(())
    }

    pub fn remove_taint_entry(&mut self, id: EntryId) -> ClusterDeckResult<()> {
        self.state
            .taints
            .remove_entry(id)
            .ok_or_else(|| Self::unknown_row("taints", id))?;
        self.drop_taint_errors(id);
        Ok(())
    }

    pub fn set_taint_key(&mut self, id: EntryId, key: impl Into<String>) -> ClusterDeckResult<()> {
        let entry = self
            .state
            .taints
            .get_mut(id)
            .ok_or_else(|| Self::unknown_row("taints", id))?;
        entry.key = key.into();
        self.errors.remove(&FieldPath::TaintKey(id));
        Ok(())
    }

    pub fn set_taint_value(&mut self, id: EntryId, value: impl Into<String>) -> ClusterDeckResult<()> {
        let entry = self
            .state
            .taints
            .get_mut(id)
            .ok_or_else(|| Self::unknown_row("taints", id))?;
        entry.value = value.into();
        self.errors.remove(&FieldPath::TaintValue(id));
        Ok(())
    }

    pub fn set_taint_effect(&mut self, id: EntryId, effect: TaintEffect) -> ClusterDeckResult<()> {
        let entry = self
            .state
            .taints
            .get_mut(id)
            .ok_or_else(|| Self::unknown_row("taints", id))?;
        entry.effect = Some(effect);
        self.errors.remove(&FieldPath::TaintEffect(id));
        Ok(())
    }

    fn drop_label_errors(&mut self, id: EntryId) {
        self.errors.remove(&FieldPath::LabelKey(id));
        self.errors.remove(&FieldPath::LabelValue(id));
    }

    fn drop_taint_errors(&mut self, id: EntryId) {
        self.errors.remove(&FieldPath::TaintKey(id));
        self.errors.remove(&FieldPath::TaintValue(id));
        self.errors.remove(&FieldPath::TaintEffect(id));
    }

    /// Show or hide the labels/taints section; entered data is kept either way
    pub fn toggle_advanced(&mut self) -> bool {
        self.show_advanced = !self.show_advanced;
        self.show_advanced
    }

    pub fn set_advanced(&mut self, visible: bool) {
        self.show_advanced = visible;
    }

    /// Validate all rendered fields, recording field errors; `true` if clean
    pub fn validate(&mut self) -> bool {
        self.errors = validation::validate(self.mode, &self.state);
        self.errors.is_empty()
    }

    /// First half of confirm: validate and, if clean, enter the submitting state
    pub fn begin_submit(&mut self) -> Confirm {
        if self.submitting {
            debug!("Confirm ignored, submission already in flight");
            return Confirm::AlreadySubmitting;
        }
        if !self.validate() {
            warn!(
                "Blocked {} submission for '{}': {} field error(s)",
                self.mode,
                self.state.cluster_name,
                self.errors.len()
            );
            return Confirm::Invalid {
                error_count: self.errors.len(),
            };
        }
        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to build request from validated form: {}", e);
                return Confirm::Invalid { error_count: 1 };
            }
        };
        self.submitting = true;
        info!("Submitting {} request for cluster '{}'", self.mode, request.cluster_name());
        Confirm::Submit(PendingSubmit { request })
    }

    /// Second half of confirm: leave the submitting state and hand back the result
    ///
    /// Responses, successful or not, are passed through unchanged. A transport
    /// error is logged and returned as [`SubmitOutcome::Failed`]; either way the
    /// form can be confirmed again afterwards.
    pub fn finish_submit(&mut self, result: ClusterDeckResult<ServiceResponse>) -> SubmitOutcome {
        if !self.submitting {
            warn!("Submission result arrived with no submission in flight");
        }
        self.submitting = false;
        match result {
            Ok(response) => {
                if response.success {
                    info!("Cluster {} request succeeded", self.mode);
                    self.reset();
                } else {
                    warn!(
                        "Cluster {} request rejected by service: {}",
                        self.mode,
                        response.message.as_deref().unwrap_or("no message")
                    );
                }
                SubmitOutcome::Completed(response)
            }
            Err(e) => {
                error!("Cluster {} request failed: {}", self.mode, e);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Validate, send and finish in one go
    pub async fn submit(&mut self, service: &dyn ClusterService) -> SubmitOutcome {
        match self.begin_submit() {
            Confirm::Submit(pending) => {
                let result = pending.dispatch(service).await;
                self.finish_submit(result)
            }
            Confirm::Invalid { error_count } => SubmitOutcome::Invalid { error_count },
            Confirm::AlreadySubmitting => SubmitOutcome::AlreadySubmitting,
        }
    }

    /// Discard every edit. Never touches the service.
    pub fn cancel(&mut self) {
        debug!("Cancelled {} form", self.mode);
        self.reset();
    }

    fn reset(&mut self) {
        self.state = ClusterFormState::default();
        self.errors.clear();
        self.show_advanced = Self::initial_advanced(self.mode);
    }

    fn build_request(&self) -> ClusterDeckResult<ClusterRequest> {
        match self.mode {
            FormMode::Create => {
                let mode = self
                    .state
                    .sync_mode
                    .ok_or_else(|| ClusterDeckError::validation("mode", "is required"))?;
                Ok(ClusterRequest::Create(CreateClusterRequest {
                    cluster_name: self.state.cluster_name.clone(),
                    kubeconfig: self.state.kubeconfig.clone(),
                    mode,
                }))
            }
            FormMode::Edit => Ok(ClusterRequest::Update(UpdateClusterRequest {
                cluster_name: self.state.cluster_name.clone(),
                labels: self.state.labels(),
                taints: self.state.taints(),
            })),
        }
    }
}
