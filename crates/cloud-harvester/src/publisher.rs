// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::{PublishError, RejectionError};
use crate::metric::MetricPoint;
use crate::provider::MetricPublisher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Submits the points of a run, retrying a failed submission exactly once.
#[derive(Clone)]
pub struct Publisher {
    submitter: Arc<dyn MetricPublisher>,
}

impl Publisher {
    pub fn new(submitter: Arc<dyn MetricPublisher>) -> Self {
        Self { submitter }
    }

    /// Publishes `points` and returns how many were accepted. An empty list is a no-op.
    ///
    /// A transport failure or a response reporting errors triggers one more submission of the
    /// same payload; the outcome of that second attempt is final.
    pub async fn publish(&self, points: &[MetricPoint]) -> Result<usize, PublishError> {
        if points.is_empty() {
            info!("No metrics to publish");
            return Ok(0);
        }

        if let Err(e) = self.submit(points).await {
            warn!("Failed to publish {} metrics, retrying once: {e}", points.len());
            if let Err(e) = self.submit(points).await {
                error!("Failed to publish {} metrics after retry: {e}", points.len());
                return Err(e);
            }
        }

        info!("Successfully published {} metrics", points.len());
        Ok(points.len())
    }

    async fn submit(&self, points: &[MetricPoint]) -> Result<(), PublishError> {
        debug!("Submitting {} metrics", points.len());
        let response = self.submitter.submit(points).await?;
        if response.has_errors() {
            return Err(RejectionError {
                message: response.error_message(),
            }
            .into());
        }
        Ok(())
    }
}
