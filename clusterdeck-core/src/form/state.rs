//! Editable form state

use super::field_list::FieldList;
use crate::types::{ClusterDetail, Label, SyncMode, Taint, TaintEffect};

/// A label row as it is being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelEntry {
    pub key: String,
    pub value: String,
}

impl LabelEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn to_label(&self) -> Label {
        Label {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl From<Label> for LabelEntry {
    fn from(label: Label) -> Self {
        Self {
            key: label.key,
            value: label.value,
        }
    }
}

/// A taint row as it is being edited; `effect` stays unset until chosen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaintEntry {
    pub key: String,
    pub value: String,
    pub effect: Option<TaintEffect>,
}

impl TaintEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, effect: TaintEffect) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            effect: Some(effect),
        }
    }

    /// `None` while the effect has not been chosen
    pub fn to_taint(&self) -> Option<Taint> {
        self.effect.map(|effect| Taint {
            key: self.key.clone(),
            value: self.value.clone(),
            effect,
        })
    }
}

impl From<Taint> for TaintEntry {
    fn from(taint: Taint) -> Self {
        Self {
            key: taint.key,
            value: taint.value,
            effect: Some(taint.effect),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterFormState {
    pub cluster_name: String,
    pub sync_mode: Option<SyncMode>,
    pub kubeconfig: String,
    pub labels: FieldList<LabelEntry>,
    pub taints: FieldList<TaintEntry>,
}

impl ClusterFormState {
    /// State for editing an existing cluster
    ///
    /// Labels come from a key/value map and are laid out in key order so the
    /// initial list is the same on every platform.
    pub fn from_detail(detail: &ClusterDetail) -> Self {
        Self {
            cluster_name: detail.object_meta.name.clone(),
            sync_mode: Some(detail.sync_mode),
            kubeconfig: String::new(),
            labels: FieldList::from_values(
                detail
                    .object_meta
                    .labels
                    .iter()
                    .map(|(key, value)| LabelEntry::new(key.as_str(), value.as_str())),
            ),
            taints: FieldList::from_values(detail.taints.iter().cloned().map(TaintEntry::from)),
        }
    }

    pub fn labels(&self) -> Vec<Label> {
        self.labels.values().map(LabelEntry::to_label).collect()
    }

    /// Taints with a chosen effect; rows without one are skipped
    pub fn taints(&self) -> Vec<Taint> {
        self.taints.values().filter_map(TaintEntry::to_taint).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectMeta;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_detail_sorts_labels_and_copies_taints() {
        let mut labels = BTreeMap::new();
        labels.insert("zone".to_string(), "eu".to_string());
        labels.insert("env".to_string(), "prod".to_string());
        let detail = ClusterDetail {
            object_meta: ObjectMeta {
                name: "member1".to_string(),
                labels,
                creation_timestamp: None,
            },
            sync_mode: SyncMode::Push,
            taints: vec![Taint {
                key: "gpu".to_string(),
                value: "true".to_string(),
                effect: TaintEffect::NoSchedule,
            }],
        };

        let state = ClusterFormState::from_detail(&detail);

        assert_eq!(state.cluster_name, "member1");
        assert_eq!(state.sync_mode, Some(SyncMode::Push));
        assert!(state.kubeconfig.is_empty());
        assert_eq!(
            state.labels.values().cloned().collect::<Vec<_>>(),
            vec![LabelEntry::new("env", "prod"), LabelEntry::new("zone", "eu")]
        );
        assert_eq!(state.taints(), detail.taints);
    }

    #[test]
    fn test_taint_without_effect_is_not_submittable() {
        let entry = TaintEntry {
            key: "k".to_string(),
            value: "v".to_string(),
            effect: None,
        };
        assert!(entry.to_taint().is_none());
    }
}
