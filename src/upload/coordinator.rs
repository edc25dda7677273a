//! Batch planning, bounded parallel dispatch and result aggregation

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use super::rate_limiter::RateLimiter;
use super::retry::RetryPolicy;
use super::task::{UploadResult, UploadTask};
use crate::client::CollectionApi;
use crate::config::Config;
use crate::discovery::{discover_files, document_name, resolve_roots, SkipRules};
use crate::utils::prompt::Confirm;

/// Aggregate counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Destination names of failed uploads, in completion order
    pub failures: Vec<String>,
}

impl UploadSummary {
    fn record(&mut self, result: &UploadResult) {
        if result.succeeded {
            self.successful += 1;
        } else {
            self.failed += 1;
            self.failures.push(result.document_name.clone());
        }
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Upload Summary")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total files: {}", self.total)?;
        writeln!(f, "Successful: {}", self.successful)?;
        writeln!(f, "Failed: {}", self.failed)?;
        for name in &self.failures {
            writeln!(f, "  - {}", name)?;
        }
        write!(f, "{}", rule)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToUpload,
    Cancelled,
    Completed(UploadSummary),
}

/// Build the task list for `config` without touching the network
pub fn plan_uploads(config: &Config) -> Vec<UploadTask> {
    let roots = resolve_roots(&config.sources);
    let rules = SkipRules::from_config(config);

    discover_files(&roots, &rules)
        .into_iter()
        .map(|source| UploadTask {
            document_name: document_name(&source, &roots),
            source,
            collection_id: config.collection_id.clone(),
        })
        .collect()
}

/// Number of workers for a batch of `task_count` tasks
pub fn worker_count(max_workers: usize, task_count: usize) -> usize {
    max_workers.min(task_count).max(1)
}

/// Runs upload tasks over a bounded pool sharing one rate limiter
pub struct Coordinator<C: CollectionApi + ?Sized> {
    api: Arc<C>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    max_workers: usize,
}

impl<C: CollectionApi + ?Sized + 'static> Coordinator<C> {
    pub fn new(
        api: Arc<C>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
        max_workers: usize,
    ) -> Self {
        Self {
            api,
            limiter,
            policy,
            max_workers,
        }
    }

    pub fn from_config(api: Arc<C>, config: &Config) -> Self {
        Self::new(
            api,
            Arc::new(RateLimiter::new(config.rate_limit_interval())),
            RetryPolicy::from_config(config),
            config.max_workers,
        )
    }

    /// Upload every task and count outcomes as they complete
    pub async fn dispatch(&self, tasks: Vec<UploadTask>) -> UploadSummary {
        let total = tasks.len();
        let mut summary = UploadSummary {
            total,
            ..Default::default()
        };
        if total == 0 {
            return summary;
        }

        let workers = worker_count(self.max_workers, total);
        info!("Using {} parallel workers", workers);

        let mut results = stream::iter(tasks.into_iter().map(|task| {
            let api = Arc::clone(&self.api);
            let limiter = Arc::clone(&self.limiter);
            let policy = self.policy;
            async move {
                let name = task.document_name.clone();
                let handle = tokio::spawn(async move {
                    task.execute(api.as_ref(), &limiter, &policy).await
                });
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Error uploading {}: {}", name, e);
                        UploadResult::failed(&name, 0)
                    }
                }
            }
        }))
        .buffer_unordered(workers);

        while let Some(result) = results.next().await {
            summary.record(&result);
        }

        summary
    }

    /// Verify the collection, plan, ask for confirmation and upload
    pub async fn run<G: Confirm + ?Sized>(
        &self,
        config: &Config,
        gate: &mut G,
    ) -> Result<RunOutcome> {
        info!("Verifying collection: {}", config.collection_id);
        let collection = self
            .api
            .get_collection(&config.collection_id)
            .await
            .with_context(|| {
                format!(
                    "Could not access collection {} (check the collection id)",
                    config.collection_id
                )
            })?;
        info!("Collection found: {} ({})", collection.name, collection.id);

        for source in &config.sources {
            info!("Scanning {}", source.display());
        }
        let tasks = plan_uploads(config);
        info!("Found {} files to upload", tasks.len());

        if tasks.is_empty() {
            return Ok(RunOutcome::NothingToUpload);
        }

        let message = format!(
            "Ready to upload {} files to collection: {}",
            tasks.len(),
            config.collection_id
        );
        if !gate
            .confirm(&message)
            .context("Failed to read confirmation")?
        {
            return Ok(RunOutcome::Cancelled);
        }

        Ok(RunOutcome::Completed(self.dispatch(tasks).await))
    }
}
