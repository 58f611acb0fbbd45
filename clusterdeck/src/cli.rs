//! Command-line interface
//!
//! Mutating commands drive a [`ClusterFormController`] exactly as the
//! dashboard does, so both surfaces share validation and payload shaping.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use clusterdeck_core::config::UiConfig;
use clusterdeck_core::form::{ClusterFormController, KubeconfigCheck, SubmitOutcome};
use clusterdeck_core::tag_list::{TagList, EMPTY_PLACEHOLDER};
use clusterdeck_core::types::{Label, SyncMode, Taint};
use clusterdeck_core::{ClusterDeckError, ClusterDeckResult, ClusterService, Config};

#[derive(Parser, Debug)]
#[command(name = "clusterdeck")]
#[command(about = "Register and edit member clusters", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults plus environment when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive dashboard
    Tui,
    /// Cluster operations
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    /// List member clusters
    List,
    /// Show one cluster as JSON
    Show {
        #[arg(long)]
        name: String,
    },
    /// Register a new cluster
    Create {
        #[arg(long)]
        name: String,

        /// Push or Pull
        #[arg(long)]
        sync_mode: SyncMode,

        /// Path to the member cluster's kubeconfig
        #[arg(long)]
        kubeconfig: PathBuf,

        /// Content check for the kubeconfig: server or yaml (default from config)
        #[arg(long)]
        check: Option<KubeconfigCheck>,
    },
    /// Edit labels and taints of an existing cluster
    Edit {
        #[arg(long)]
        name: String,

        /// Label as key=value; repeatable
        #[arg(long = "label")]
        labels: Vec<Label>,

        /// Taint as key=value:Effect; repeatable
        #[arg(long = "taint")]
        taints: Vec<Taint>,

        /// Replace existing labels and taints instead of merging onto them
        #[arg(long)]
        replace: bool,
    },
}

pub async fn run_cluster_command(
    command: ClusterCommands,
    service: &dyn ClusterService,
    config: &Config,
    out: &mut dyn Write,
) -> ClusterDeckResult<()> {
    match command {
        ClusterCommands::List => list_clusters(service, &config.ui, out).await,
        ClusterCommands::Show { name } => {
            let detail = service.get_cluster(&name).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&detail)?)?;
            Ok(())
        }
        ClusterCommands::Create {
            name,
            sync_mode,
            kubeconfig,
            check,
        } => {
            let content = tokio::fs::read_to_string(&kubeconfig).await.map_err(|e| {
                ClusterDeckError::invalid_input(
                    "kubeconfig",
                    format!("Failed to read {}: {}", kubeconfig.display(), e),
                )
            })?;
            let mut form = ClusterFormController::create()
                .with_kubeconfig_check(check.unwrap_or(config.form.kubeconfig_check));
            form.set_cluster_name(name.as_str())?;
            form.set_sync_mode(sync_mode)?;
            form.load_kubeconfig(content)?;
            let outcome = form.submit(service).await;
            report_outcome(&form, outcome, &format!("Registered cluster '{}'", name), out)
        }
        ClusterCommands::Edit {
            name,
            labels,
            taints,
            replace,
        } => {
            let detail = service.get_cluster(&name).await?;
            let mut form = ClusterFormController::edit(&detail);
            if replace {
                while !form.state().labels.is_empty() {
                    form.remove_label(0)?;
                }
                while !form.state().taints.is_empty() {
                    form.remove_taint(0)?;
                }
            }
            for label in labels {
                merge_label(&mut form, label)?;
            }
            for taint in taints {
                merge_taint(&mut form, taint)?;
            }
            let outcome = form.submit(service).await;
            report_outcome(&form, outcome, &format!("Updated cluster '{}'", name), out)
        }
    }
}

async fn list_clusters(
    service: &dyn ClusterService,
    ui: &UiConfig,
    out: &mut dyn Write,
) -> ClusterDeckResult<()> {
    let clusters = service.list_clusters().await?;
    writeln!(out, "{:<24} {:<6} {:<6} {:<10} LABELS", "NAME", "MODE", "READY", "VERSION")?;
    for cluster in &clusters {
        let tags = cluster.label_tags();
        writeln!(
            out,
            "{:<24} {:<6} {:<6} {:<10} {}",
            cluster.name(),
            cluster.sync_mode.as_str(),
            cluster.ready,
            cluster.kubernetes_version.as_deref().unwrap_or(EMPTY_PLACEHOLDER),
            TagList::new(&tags, ui.tag_max_len).render_inline()
        )?;
    }
    Ok(())
}

/// Overwrite the value of a row with the same key, or append a new row
fn merge_label(form: &mut ClusterFormController, label: Label) -> ClusterDeckResult<()> {
    let existing = form
        .state()
        .labels
        .iter()
        .find(|(_, entry)| entry.key == label.key)
        .map(|(id, _)| id);
    let id = match existing {
        Some(id) => id,
        None => {
            let id = form.add_label();
            form.set_label_key(id, label.key)?;
            id
        }
    };
    form.set_label_value(id, label.value)
}

fn merge_taint(form: &mut ClusterFormController, taint: Taint) -> ClusterDeckResult<()> {
    let existing = form
        .state()
        .taints
        .iter()
        .find(|(_, entry)| entry.key == taint.key)
        .map(|(id, _)| id);
    let id = match existing {
        Some(id) => id,
        None => {
            let id = form.add_taint();
            form.set_taint_key(id, taint.key)?;
            id
        }
    };
    form.set_taint_value(id, taint.value)?;
    form.set_taint_effect(id, taint.effect)
}

fn report_outcome(
    form: &ClusterFormController,
    outcome: SubmitOutcome,
    success: &str,
    out: &mut dyn Write,
) -> ClusterDeckResult<()> {
    match outcome {
        SubmitOutcome::Completed(response) if response.success => {
            writeln!(out, "{}", success)?;
            Ok(())
        }
        SubmitOutcome::Completed(response) => Err(ClusterDeckError::Service {
            message: response
                .message
                .unwrap_or_else(|| "request rejected".to_string()),
        }),
        SubmitOutcome::Failed(e) => Err(e),
        SubmitOutcome::Invalid { .. } => {
            let fields: Vec<String> = form
                .errors()
                .iter()
                .map(|(path, error)| format!("{} {}", path, error))
                .collect();
            Err(ClusterDeckError::validation("form", fields.join(", ")))
        }
        SubmitOutcome::AlreadySubmitting => {
            Err(ClusterDeckError::internal("submission already in flight"))
        }
    }
}
