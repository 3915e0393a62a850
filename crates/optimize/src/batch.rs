//! Fan the pipeline out over many sources

use crate::options::OptimizationOptions;
use crate::pipeline::OptimizationPipeline;
use crate::source::{OptimizationResult, SourceImage};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// A source the batch could not process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    /// Successful results in completion order
    pub results: Vec<OptimizationResult>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    pipeline: OptimizationPipeline,
    concurrency: usize,
}

impl BatchCoordinator {
    pub fn new(pipeline: OptimizationPipeline) -> Self {
        Self {
            pipeline,
            concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn pipeline(&self) -> &OptimizationPipeline {
        &self.pipeline
    }

    /// Run `process_image` over every source
    ///
    /// One source failing never affects another; failures are logged and
    /// reported separately from the results.
    pub async fn optimize_batch(
        &self,
        sources: Vec<SourceImage>,
        options: &OptimizationOptions,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let requested = sources.len();
        let pipeline = &self.pipeline;

        let outcomes: Vec<_> = stream::iter(sources)
            .map(|source| async move {
                let result = pipeline.process_image(&source, options, cancel).await;
                (source.name, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (name, result) in outcomes {
            match result {
                Ok(result) => outcome.results.push(result),
                Err(error) => {
                    warn!(source = %name, error = %error, "Batch item failed");
                    outcome.failures.push(BatchFailure {
                        name,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            requested,
            processed = outcome.processed(),
            failed = outcome.failed(),
            "Batch optimization finished"
        );
        outcome
    }
}
