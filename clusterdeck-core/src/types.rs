//! Cluster domain and wire types

use crate::error::{ClusterDeckError, ClusterDeckResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a member cluster is kept in sync with the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// The control plane connects to the member cluster
    Push,
    /// An agent inside the member cluster connects to the control plane
    Pull,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Push => "Push",
            SyncMode::Pull => "Pull",
        }
    }

    pub fn all() -> Vec<SyncMode> {
        vec![SyncMode::Push, SyncMode::Pull]
    }

    pub fn toggled(&self) -> SyncMode {
        match self {
            SyncMode::Push => SyncMode::Pull,
            SyncMode::Pull => SyncMode::Push,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = ClusterDeckError;

    fn from_str(s: &str) -> ClusterDeckResult<Self> {
        match s {
            "Push" | "push" => Ok(SyncMode::Push),
            "Pull" | "pull" => Ok(SyncMode::Pull),
            other => Err(ClusterDeckError::invalid_input(
                "syncMode",
                format!("expected Push or Pull, got '{}'", other),
            )),
        }
    }
}

/// Scheduling repulsion applied to workloads that do not tolerate a taint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

impl TaintEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::PreferNoSchedule => "PreferNoSchedule",
            TaintEffect::NoExecute => "NoExecute",
        }
    }

    pub fn all() -> Vec<TaintEffect> {
        vec![
            TaintEffect::NoSchedule,
            TaintEffect::PreferNoSchedule,
            TaintEffect::NoExecute,
        ]
    }

    /// Next effect in selection order, wrapping around
    pub fn next(&self) -> TaintEffect {
        match self {
            TaintEffect::NoSchedule => TaintEffect::PreferNoSchedule,
            TaintEffect::PreferNoSchedule => TaintEffect::NoExecute,
            TaintEffect::NoExecute => TaintEffect::NoSchedule,
        }
    }

    pub fn previous(&self) -> TaintEffect {
        match self {
            TaintEffect::NoSchedule => TaintEffect::NoExecute,
            TaintEffect::PreferNoSchedule => TaintEffect::NoSchedule,
            TaintEffect::NoExecute => TaintEffect::PreferNoSchedule,
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaintEffect {
    type Err = ClusterDeckError;

    fn from_str(s: &str) -> ClusterDeckResult<Self> {
        TaintEffect::all()
            .into_iter()
            .find(|effect| effect.as_str() == s)
            .ok_or_else(|| {
                ClusterDeckError::invalid_input(
                    "effect",
                    format!(
                        "expected one of NoSchedule, PreferNoSchedule, NoExecute, got '{}'",
                        s
                    ),
                )
            })
    }
}

/// A submitted cluster label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// Parses `key=value`
impl FromStr for Label {
    type Err = ClusterDeckError;

    fn from_str(s: &str) -> ClusterDeckResult<Self> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Label {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(ClusterDeckError::invalid_input(
                "label",
                format!("expected key=value, got '{}'", s),
            )),
        }
    }
}

/// A submitted cluster taint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: TaintEffect,
}

/// Parses `key=value:Effect`
impl FromStr for Taint {
    type Err = ClusterDeckError;

    fn from_str(s: &str) -> ClusterDeckResult<Self> {
        let malformed = || {
            ClusterDeckError::invalid_input(
                "taint",
                format!("expected key=value:Effect, got '{}'", s),
            )
        };
        let (pair, effect) = s.rsplit_once(':').ok_or_else(malformed)?;
        let (key, value) = pair.split_once('=').ok_or_else(malformed)?;
        if key.is_empty() {
            return Err(malformed());
        }
        Ok(Taint {
            key: key.to_string(),
            value: value.to_string(),
            effect: effect.parse()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// Everything the edit form needs to know about an existing cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetail {
    pub object_meta: ObjectMeta,
    pub sync_mode: SyncMode,
    #[serde(default)]
    pub taints: Vec<Taint>,
}

impl ClusterDetail {
    pub fn name(&self) -> &str {
        &self.object_meta.name
    }
}

/// Row of the cluster list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub object_meta: ObjectMeta,
    pub sync_mode: SyncMode,
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
}

impl ClusterSummary {
    pub fn name(&self) -> &str {
        &self.object_meta.name
    }

    /// Labels as `key=value` tags, in key order
    pub fn label_tags(&self) -> Vec<String> {
        self.object_meta
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }
}

/// Outcome reported by the cluster service
///
/// A failed operation that the service reports in-band (`success == false`)
/// is still an `Ok(ServiceResponse)`; only transport-level failures are errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ServiceResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Payload for registering a new member cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub cluster_name: String,
    pub kubeconfig: String,
    pub mode: SyncMode,
}

/// Payload for editing an existing cluster's labels and taints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClusterRequest {
    pub cluster_name: String,
    pub labels: Vec<Label>,
    pub taints: Vec<Taint>,
}

/// The one request a form submission produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterRequest {
    Create(CreateClusterRequest),
    Update(UpdateClusterRequest),
}

impl ClusterRequest {
    pub fn cluster_name(&self) -> &str {
        match self {
            ClusterRequest::Create(req) => &req.cluster_name,
            ClusterRequest::Update(req) => &req.cluster_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("Push", SyncMode::Push)]
    #[test_case("pull", SyncMode::Pull)]
    fn test_sync_mode_parse(input: &str, expected: SyncMode) {
        assert_eq!(input.parse::<SyncMode>().unwrap(), expected);
    }

    #[test]
    fn test_sync_mode_rejects_unknown() {
        assert!("Sideways".parse::<SyncMode>().is_err());
    }

    #[test]
    fn test_taint_effect_cycles_through_all() {
        let mut effect = TaintEffect::NoSchedule;
        for _ in 0..3 {
            effect = effect.next();
        }
        assert_eq!(effect, TaintEffect::NoSchedule);
        assert_eq!(TaintEffect::NoSchedule.previous(), TaintEffect::NoExecute);
    }

    #[test_case("env=prod", "env", "prod")]
    #[test_case("empty=", "empty", "")]
    #[test_case("url=a=b", "url", "a=b")]
    fn test_label_parse(input: &str, key: &str, value: &str) {
        let label: Label = input.parse().unwrap();
        assert_eq!(label.key, key);
        assert_eq!(label.value, value);
    }

    #[test_case("novalue")]
    #[test_case("=value")]
    fn test_label_parse_rejects(input: &str) {
        assert!(input.parse::<Label>().is_err());
    }

    #[test]
    fn test_taint_parse() {
        let taint: Taint = "dedicated=gpu:NoSchedule".parse().unwrap();
        assert_eq!(
            taint,
            Taint {
                key: "dedicated".to_string(),
                value: "gpu".to_string(),
                effect: TaintEffect::NoSchedule,
            }
        );
        assert!("dedicated=gpu".parse::<Taint>().is_err());
        assert!("dedicated=gpu:Evict".parse::<Taint>().is_err());
    }

    #[test]
    fn test_create_request_wire_shape() {
        let req = CreateClusterRequest {
            cluster_name: "demo".to_string(),
            kubeconfig: "server: https://x".to_string(),
            mode: SyncMode::Push,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "clusterName": "demo",
                "kubeconfig": "server: https://x",
                "mode": "Push",
            })
        );
    }

    #[test]
    fn test_cluster_detail_decodes_camel_case() {
        let detail: ClusterDetail = serde_json::from_value(serde_json::json!({
            "objectMeta": {"name": "member1", "labels": {"b": "2", "a": "1"}},
            "syncMode": "Pull",
            "taints": [{"key": "k", "value": "v", "effect": "NoExecute"}],
        }))
        .unwrap();
        assert_eq!(detail.name(), "member1");
        assert_eq!(detail.sync_mode, SyncMode::Pull);
        assert_eq!(detail.taints[0].effect, TaintEffect::NoExecute);
        let keys: Vec<_> = detail.object_meta.labels.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
