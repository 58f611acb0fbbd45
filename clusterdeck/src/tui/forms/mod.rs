//! Form definitions for the TUI

pub mod cluster;

pub use cluster::{ClusterForm, ClusterFormField};
