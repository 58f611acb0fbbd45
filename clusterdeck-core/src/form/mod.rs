//! Cluster registration / edit form
//!
//! The form controller is the state machine behind the "add cluster" and
//! "edit cluster" dialogs. It owns the field values, the label and taint
//! rows, the per-field validation errors and the submitting flag, and turns
//! a confirmed form into exactly one [`crate::types::ClusterRequest`].
//!
//! ```text
//!   open(mode) ──► Editing ──confirm──► validate ──fail──► Editing (errors shown)
//!                    ▲   │                  │
//!                    │ cancel             pass
//!                    │   ▼                  ▼
//!                    │  reset           Submitting ──► service call
//!                    │                      │
//!                    └──────────────────────┘ finish (response or error)
//! ```

pub mod controller;
pub mod field_list;
pub mod state;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use controller::{ClusterFormController, Confirm, PendingSubmit, SubmitOutcome};
pub use field_list::{EntryId, FieldList};
pub use state::{ClusterFormState, LabelEntry, TaintEntry};
pub use validation::{
    validate, ContentCheck, FieldError, FieldErrors, FieldPath, KubeconfigCheck,
    KubeconfigYamlCheck, ServerFieldCheck,
};

/// Whether the form registers a new cluster or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Edit => "edit",
        }
    }
}

impl std::fmt::Display for FormMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
