//! HTTP implementation of [`ClusterService`]
//!
//! Every endpoint answers with the envelope `{"code", "message", "data"}`;
//! `code == 200` means the operation succeeded. An envelope with any other
//! code is an answer, not an error, and is reported as an unsuccessful
//! [`ServiceResponse`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClusterDeckError, ClusterDeckResult};
use crate::service::ClusterService;
use crate::types::{
    ClusterDetail, ClusterSummary, CreateClusterRequest, Label, ServiceResponse, SyncMode, Taint,
    UpdateClusterRequest,
};

const SUCCESS_CODE: i64 = 200;
const NOT_FOUND_CODE: i64 = 404;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    // a missing `data` key decodes as None
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl From<Envelope<serde_json::Value>> for ServiceResponse {
    fn from(envelope: Envelope<serde_json::Value>) -> Self {
        ServiceResponse {
            success: envelope.is_success(),
            message: if envelope.message.is_empty() {
                None
            } else {
                Some(envelope.message)
            },
            data: envelope.data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostClusterBody<'a> {
    member_cluster_name: &'a str,
    member_cluster_kube_config: &'a str,
    sync_mode: SyncMode,
}

#[derive(Debug, Serialize)]
struct PutClusterBody<'a> {
    labels: &'a [Label],
    taints: &'a [Taint],
}

#[derive(Debug, Deserialize)]
struct ClusterList {
    #[serde(default)]
    clusters: Vec<ClusterSummary>,
}

pub struct HttpClusterService {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpClusterService {
    pub fn new(config: &ApiConfig) -> ClusterDeckResult<Self> {
        let mut base = Url::parse(&config.endpoint).map_err(|e| {
            ClusterDeckError::configuration("api.endpoint", format!("Invalid URL: {}", e))
        })?;
        // Url::join treats the last segment as a file unless it ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClusterDeckError::transport("build_client", e))?;

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    fn collection_url(&self) -> ClusterDeckResult<Url> {
        self.base
            .join("cluster")
            .map_err(|e| ClusterDeckError::internal(format!("Failed to build URL: {}", e)))
    }

    fn cluster_url(&self, name: &str) -> ClusterDeckResult<Url> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|_| ClusterDeckError::internal("API endpoint cannot be a base URL"))?
            .push(name);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> ClusterDeckResult<Envelope<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClusterDeckError::transport(operation, e))?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ClusterDeckError::transport(operation, e))?;
        tracing::debug!("{} -> HTTP {} ({} bytes)", operation, status, body.len());

        decode_envelope(status.as_u16(), &url, &body)
    }
}

fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    url: &str,
    body: &str,
) -> ClusterDeckResult<Envelope<T>> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(envelope) => Ok(envelope),
        // A non-JSON error page says more through its status than its body
        Err(_) if !(200..300).contains(&status) => Err(ClusterDeckError::HttpStatus {
            status,
            url: url.to_string(),
            body: body.chars().take(512).collect(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn into_data<T>(envelope: Envelope<T>, resource: &str) -> ClusterDeckResult<T> {
    if envelope.code == NOT_FOUND_CODE {
        return Err(ClusterDeckError::NotFound {
            resource: resource.to_string(),
        });
    }
    if !envelope.is_success() {
        return Err(ClusterDeckError::Service {
            message: envelope.message,
        });
    }
    envelope.data.ok_or_else(|| ClusterDeckError::Service {
        message: format!("response for {} carried no data", resource),
    })
}

#[async_trait]
impl ClusterService for HttpClusterService {
    async fn create_cluster(&self, request: CreateClusterRequest) -> ClusterDeckResult<ServiceResponse> {
        let body = PostClusterBody {
            member_cluster_name: &request.cluster_name,
            member_cluster_kube_config: &request.kubeconfig,
            sync_mode: request.mode,
        };
        let builder = self.request(Method::POST, self.collection_url()?).json(&body);
        let envelope: Envelope<serde_json::Value> = self.send("create_cluster", builder).await?;
        Ok(envelope.into())
    }

    async fn update_cluster(&self, request: UpdateClusterRequest) -> ClusterDeckResult<ServiceResponse> {
        let body = PutClusterBody {
            labels: &request.labels,
            taints: &request.taints,
        };
        let url = self.cluster_url(&request.cluster_name)?;
        let builder = self.request(Method::PUT, url).json(&body);
        let envelope: Envelope<serde_json::Value> = self.send("update_cluster", builder).await?;
        Ok(envelope.into())
    }

    async fn get_cluster(&self, name: &str) -> ClusterDeckResult<ClusterDetail> {
        let builder = self.request(Method::GET, self.cluster_url(name)?);
        let envelope = self.send("get_cluster", builder).await?;
        into_data(envelope, &format!("cluster/{}", name))
    }

    async fn list_clusters(&self) -> ClusterDeckResult<Vec<ClusterSummary>> {
        let builder = self.request(Method::GET, self.collection_url()?);
        let envelope: Envelope<ClusterList> = self.send("list_clusters", builder).await?;
        Ok(into_data(envelope, "cluster")?.clusters)
    }
}
