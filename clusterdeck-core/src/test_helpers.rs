//! Test doubles for the cluster service
//!
//! [`MockClusterService`] records every call, answers from an in-memory
//! cluster table and can be told to fail or to hold submissions until a test
//! releases them.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::{ClusterDeckError, ClusterDeckResult};
use crate::service::ClusterService;
use crate::types::{
    ClusterDetail, ClusterSummary, CreateClusterRequest, ObjectMeta, ServiceResponse,
    UpdateClusterRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Create(CreateClusterRequest),
    Update(UpdateClusterRequest),
    Get(String),
    List,
}

#[derive(Debug, Clone)]
enum Reply {
    /// Apply the change to the table and answer with this response
    Respond(ServiceResponse),
    /// Simulate an unreachable backend
    Unreachable(String),
}

pub struct MockClusterService {
    calls: Mutex<Vec<RecordedCall>>,
    reply: Mutex<Reply>,
    clusters: Mutex<BTreeMap<String, ClusterDetail>>,
    gate: Option<Arc<Notify>>,
}

impl Default for MockClusterService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClusterService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Mutex::new(Reply::Respond(ServiceResponse::ok())),
            clusters: Mutex::new(BTreeMap::new()),
            gate: None,
        }
    }

    /// Create/update calls wait on the returned `Notify` before answering
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let service = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new()
        };
        (service, gate)
    }

    pub fn with_cluster(self, detail: ClusterDetail) -> Self {
        self.lock_clusters()
            .insert(detail.object_meta.name.clone(), detail);
        self
    }

    pub fn respond_with(&self, response: ServiceResponse) {
        *self.lock_reply() = Reply::Respond(response);
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.lock_reply() = Reply::Unreachable(message.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    /// Number of create/update calls
    pub fn submission_count(&self) -> usize {
        self.lock_calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::Create(_) | RecordedCall::Update(_)))
            .count()
    }

    pub fn cluster(&self, name: &str) -> Option<ClusterDetail> {
        self.lock_clusters().get(name).cloned()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_reply(&self) -> std::sync::MutexGuard<'_, Reply> {
        self.reply.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_clusters(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ClusterDetail>> {
        self.clusters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn current_reply(&self) -> ClusterDeckResult<ServiceResponse> {
        match self.lock_reply().clone() {
            Reply::Respond(response) => Ok(response),
            Reply::Unreachable(message) => Err(ClusterDeckError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
        }
    }
}

#[async_trait]
impl ClusterService for MockClusterService {
    async fn create_cluster(&self, request: CreateClusterRequest) -> ClusterDeckResult<ServiceResponse> {
        self.lock_calls().push(RecordedCall::Create(request.clone()));
        self.wait_for_gate().await;
        let response = self.current_reply()?;
        if response.success {
            self.lock_clusters().insert(
                request.cluster_name.clone(),
                ClusterDetail {
                    object_meta: ObjectMeta {
                        name: request.cluster_name,
                        ..ObjectMeta::default()
                    },
                    sync_mode: request.mode,
                    taints: Vec::new(),
                },
            );
        }
        Ok(response)
    }

    async fn update_cluster(&self, request: UpdateClusterRequest) -> ClusterDeckResult<ServiceResponse> {
        self.lock_calls().push(RecordedCall::Update(request.clone()));
        self.wait_for_gate().await;
        let response = self.current_reply()?;
        if response.success {
            if let Some(detail) = self.lock_clusters().get_mut(&request.cluster_name) {
                detail.object_meta.labels = request
                    .labels
                    .into_iter()
                    .map(|label| (label.key, label.value))
                    .collect();
                detail.taints = request.taints;
            }
        }
        Ok(response)
    }

    async fn get_cluster(&self, name: &str) -> ClusterDeckResult<ClusterDetail> {
        self.lock_calls().push(RecordedCall::Get(name.to_string()));
        self.cluster(name).ok_or_else(|| ClusterDeckError::NotFound {
            resource: format!("cluster/{}", name),
        })
    }

    async fn list_clusters(&self) -> ClusterDeckResult<Vec<ClusterSummary>> {
        self.lock_calls().push(RecordedCall::List);
        Ok(self
            .lock_clusters()
            .values()
            .map(|detail| ClusterSummary {
                object_meta: detail.object_meta.clone(),
                sync_mode: detail.sync_mode,
                ready: true,
                kubernetes_version: None,
            })
            .collect())
    }
}
