pub mod config;
pub mod error;
pub mod form;
pub mod http_client;
pub mod service;
pub mod tag_list;
pub mod types;

// Test helpers are exposed for integration tests
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::Config;
pub use error::{ClusterDeckError, ClusterDeckResult};
pub use form::{ClusterFormController, Confirm, FormMode, SubmitOutcome};
pub use http_client::HttpClusterService;
pub use service::ClusterService;
