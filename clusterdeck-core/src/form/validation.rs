//! Required-field validation and kubeconfig content checks

use super::field_list::EntryId;
use super::state::ClusterFormState;
use super::FormMode;
use crate::error::{ClusterDeckError, ClusterDeckResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Location of a single input in the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    ClusterName,
    SyncMode,
    Kubeconfig,
    LabelKey(EntryId),
    LabelValue(EntryId),
    TaintKey(EntryId),
    TaintValue(EntryId),
    TaintEffect(EntryId),
}

impl FieldPath {
    /// The list row this field belongs to, if any
    pub fn entry(&self) -> Option<EntryId> {
        match self {
            FieldPath::LabelKey(id)
            | FieldPath::LabelValue(id)
            | FieldPath::TaintKey(id)
            | FieldPath::TaintValue(id)
            | FieldPath::TaintEffect(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::ClusterName => f.write_str("clusterName"),
            FieldPath::SyncMode => f.write_str("mode"),
            FieldPath::Kubeconfig => f.write_str("kubeconfig"),
            FieldPath::LabelKey(id) => write!(f, "labels{}.key", id),
            FieldPath::LabelValue(id) => write!(f, "labels{}.value", id),
            FieldPath::TaintKey(id) => write!(f, "taints{}.key", id),
            FieldPath::TaintValue(id) => write!(f, "taints{}.value", id),
            FieldPath::TaintEffect(id) => write!(f, "taints{}.effect", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidContent(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("is required"),
            FieldError::InvalidContent(reason) => f.write_str(reason),
        }
    }
}

pub type FieldErrors = BTreeMap<FieldPath, FieldError>;

/// Check every required field that is rendered in `mode`
pub fn validate(mode: FormMode, state: &ClusterFormState) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let mut require = |path: FieldPath, present: bool| {
        if !present {
            errors.insert(path, FieldError::Required);
        }
    };

    require(FieldPath::ClusterName, !state.cluster_name.is_empty());
    require(FieldPath::SyncMode, state.sync_mode.is_some());
    if mode == FormMode::Create {
        require(FieldPath::Kubeconfig, !state.kubeconfig.is_empty());
    }

    for (id, label) in state.labels.iter() {
        require(FieldPath::LabelKey(id), !label.key.is_empty());
        require(FieldPath::LabelValue(id), !label.value.is_empty());
    }
    for (id, taint) in state.taints.iter() {
        require(FieldPath::TaintKey(id), !taint.key.is_empty());
        require(FieldPath::TaintValue(id), !taint.value.is_empty());
        require(FieldPath::TaintEffect(id), taint.effect.is_some());
    }

    errors
}

/// Client-side plausibility check for uploaded kubeconfig content
///
/// Only decides whether content is worth submitting; the server does the real
/// validation.
pub trait ContentCheck: Send + Sync {
    fn check(&self, content: &str) -> bool;

    fn describe(&self) -> &str {
        "content rejected"
    }
}

impl<F> ContentCheck for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, content: &str) -> bool {
        self(content)
    }
}

/// Accepts content mentioning a `server:` key anywhere
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerFieldCheck;

impl ContentCheck for ServerFieldCheck {
    fn check(&self, content: &str) -> bool {
        content.contains("server:")
    }

    fn describe(&self) -> &str {
        "kubeconfig must contain a 'server:' entry"
    }
}

/// Parses the content as a kubeconfig and requires at least one cluster server
#[derive(Debug, Default, Clone, Copy)]
pub struct KubeconfigYamlCheck;

#[derive(serde::Deserialize)]
struct KubeconfigDoc {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
}

#[derive(serde::Deserialize)]
struct NamedCluster {
    cluster: ClusterEndpoint,
}

#[derive(serde::Deserialize)]
struct ClusterEndpoint {
    #[serde(default)]
    server: String,
}

impl ContentCheck for KubeconfigYamlCheck {
    fn check(&self, content: &str) -> bool {
        match serde_yaml::from_str::<KubeconfigDoc>(content) {
            Ok(doc) => doc.clusters.iter().any(|c| !c.cluster.server.is_empty()),
            Err(e) => {
                tracing::debug!("kubeconfig content is not valid YAML: {}", e);
                false
            }
        }
    }

    fn describe(&self) -> &str {
        "kubeconfig must define at least one cluster with a server"
    }
}

/// Named content checks selectable from configuration or the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KubeconfigCheck {
    /// [`ServerFieldCheck`]
    #[default]
    Server,
    /// [`KubeconfigYamlCheck`]
    Yaml,
}

impl KubeconfigCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            KubeconfigCheck::Server => "server",
            KubeconfigCheck::Yaml => "yaml",
        }
    }

    pub fn content_check(&self) -> Arc<dyn ContentCheck> {
        match self {
            KubeconfigCheck::Server => Arc::new(ServerFieldCheck),
            KubeconfigCheck::Yaml => Arc::new(KubeconfigYamlCheck),
        }
    }
}

impl fmt::Display for KubeconfigCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KubeconfigCheck {
    type Err = ClusterDeckError;

    fn from_str(s: &str) -> ClusterDeckResult<Self> {
        match s {
            "server" => Ok(KubeconfigCheck::Server),
            "yaml" => Ok(KubeconfigCheck::Yaml),
            other => Err(ClusterDeckError::invalid_input(
                "kubeconfig_check",
                format!("expected server or yaml, got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::state::{LabelEntry, TaintEntry};
    use crate::types::SyncMode;

    const KUBECONFIG: &str = "apiVersion: v1\nclusters:\n- cluster:\n    server: https://10.0.0.1:6443\n  name: member\n";

    fn complete_create_state() -> ClusterFormState {
        ClusterFormState {
            cluster_name: "demo".to_string(),
            sync_mode: Some(SyncMode::Push),
            kubeconfig: KUBECONFIG.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_create_state_passes() {
        assert!(validate(FormMode::Create, &complete_create_state()).is_empty());
    }

    #[test]
    fn test_kubeconfig_only_required_in_create_mode() {
        let mut state = complete_create_state();
        state.kubeconfig.clear();
        let errors = validate(FormMode::Create, &state);
        assert_eq!(errors.get(&FieldPath::Kubeconfig), Some(&FieldError::Required));
        assert!(validate(FormMode::Edit, &state).is_empty());
    }

    #[test]
    fn test_every_row_field_is_required() {
        let mut state = complete_create_state();
        let label = state.labels.push(LabelEntry::new("env", ""));
        let taint = state.taints.push(TaintEntry::default());

        let errors = validate(FormMode::Create, &state);

        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key(&FieldPath::LabelValue(label)));
        assert!(errors.contains_key(&FieldPath::TaintKey(taint)));
        assert!(errors.contains_key(&FieldPath::TaintValue(taint)));
        assert!(errors.contains_key(&FieldPath::TaintEffect(taint)));
    }

    #[test]
    fn test_server_field_check() {
        assert!(ServerFieldCheck.check(KUBECONFIG));
        assert!(!ServerFieldCheck.check("apiVersion: v1\n"));
    }

    #[test]
    fn test_yaml_check_requires_a_server() {
        assert!(KubeconfigYamlCheck.check(KUBECONFIG));
        assert!(!KubeconfigYamlCheck.check("clusters: []\n"));
        assert!(!KubeconfigYamlCheck.check("server: [unterminated"));
    }

    #[test]
    fn test_closure_as_content_check() {
        let check = |content: &str| content.starts_with("apiVersion");
        assert!(check.check(KUBECONFIG));
        assert!(!ContentCheck::check(&check, "kind: Config"));
    }

    #[test]
    fn test_field_path_display() {
        let mut state = ClusterFormState::default();
        let id = state.labels.add();
        assert_eq!(FieldPath::LabelKey(id).to_string(), "labels#0.key");
        assert_eq!(FieldPath::ClusterName.to_string(), "clusterName");
    }

    #[test]
    fn test_named_checks_differ_on_bare_server_line() {
        let content = "server: https://10.0.0.1:6443";
        assert!(KubeconfigCheck::Server.content_check().check(content));
        assert!(!KubeconfigCheck::Yaml.content_check().check(content));
        assert!(KubeconfigCheck::Yaml.content_check().check(KUBECONFIG));
    }

    #[test]
    fn test_named_check_parse() {
        assert_eq!("yaml".parse::<KubeconfigCheck>().unwrap(), KubeconfigCheck::Yaml);
        assert_eq!(KubeconfigCheck::default(), KubeconfigCheck::Server);
        assert!("strict".parse::<KubeconfigCheck>().is_err());
    }
}
