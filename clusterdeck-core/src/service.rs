//! Cluster service abstraction
//!
//! The form controller and the dashboard only ever talk to the backend through
//! [`ClusterService`]. The production implementation speaks HTTP
//! ([`crate::http_client::HttpClusterService`]); tests use the recording mock
//! from [`crate::test_helpers`].

use async_trait::async_trait;

use crate::error::ClusterDeckResult;
use crate::types::{
    ClusterDetail, ClusterRequest, ClusterSummary, CreateClusterRequest, ServiceResponse,
    UpdateClusterRequest,
};

/// Operations the dashboard needs from the cluster backend
///
/// `create_cluster` and `update_cluster` return `Ok` whenever the backend
/// answered, including when it answered with a failure (`success == false`).
/// `Err` means the answer never arrived or could not be understood.
///
/// No timeout is applied to these calls by callers; implementations decide
/// how long they are willing to wait.
#[async_trait]
pub trait ClusterService: Send + Sync {
    async fn create_cluster(&self, request: CreateClusterRequest) -> ClusterDeckResult<ServiceResponse>;

    async fn update_cluster(&self, request: UpdateClusterRequest) -> ClusterDeckResult<ServiceResponse>;

    async fn get_cluster(&self, name: &str) -> ClusterDeckResult<ClusterDetail>;

    async fn list_clusters(&self) -> ClusterDeckResult<Vec<ClusterSummary>>;

    /// Send whichever request a form produced
    async fn submit(&self, request: ClusterRequest) -> ClusterDeckResult<ServiceResponse> {
        match request {
            ClusterRequest::Create(req) => self.create_cluster(req).await,
            ClusterRequest::Update(req) => self.update_cluster(req).await,
        }
    }
}
