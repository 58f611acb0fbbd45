pub mod cli;
pub mod logging;
pub mod tui;

// Re-export commonly used types
pub use clusterdeck_core::{
    error::{ClusterDeckError, ClusterDeckResult},
    ClusterService, Config, HttpClusterService,
};
