// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::METRIC_QUERIES_PER_CALL;
use crate::errors::FetchError;
use crate::provider::MetricSeriesFetcher;
use crate::request::FetchRequest;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Time range queried from the metrics provider, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: i64,
    pub end: i64,
}

impl QueryWindow {
    pub fn lookback(now: i64, lookback: Duration) -> Self {
        let secs = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
        Self {
            start: now.saturating_sub(secs),
            end: now,
        }
    }
}

/// Samples returned for one request. `timestamps[i]` belongs to `values[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub correlation_id: String,
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

/// Splits request sets into provider-sized batches and concatenates what comes back.
#[derive(Clone)]
pub struct BatchFetcher {
    series: Arc<dyn MetricSeriesFetcher>,
    batch_size: usize,
}

impl BatchFetcher {
    pub fn new(series: Arc<dyn MetricSeriesFetcher>) -> Self {
        Self::with_batch_size(series, METRIC_QUERIES_PER_CALL)
    }

    pub fn with_batch_size(series: Arc<dyn MetricSeriesFetcher>, batch_size: usize) -> Self {
        Self {
            series,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches every request. The first failing batch fails the whole call.
    pub async fn fetch(
        &self,
        region: &str,
        window: QueryWindow,
        requests: &[FetchRequest],
    ) -> Result<Vec<FetchResult>, FetchError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let batches = requests.len().div_ceil(self.batch_size);
        let mut results = Vec::with_capacity(requests.len());
        for (index, batch) in requests.chunks(self.batch_size).enumerate() {
            debug!(
                "Fetching metric series batch {} of {batches} ({} requests)",
                index + 1,
                batch.len()
            );
            let fetched = self
                .series
                .fetch(region, window, batch)
                .await
                .map_err(|e| FetchError {
                    batch: index + 1,
                    batches,
                    requests: batch.len(),
                    message: e.to_string(),
                })?;
            results.extend(fetched);
        }
        Ok(results)
    }
}
