// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One harvesting run across every configured resource kind.
//!
//! Each kind runs its whole pipeline (collect, build requests, fetch, correlate, assemble) in its
//! own task. Tasks report points and errors to an [`AccumulatorService`] and never affect each
//! other. Once every task has finished, the accumulated points are published in one go.

use crate::accumulator_service::{AccumulatorHandle, AccumulatorService, DrainResponse};
use crate::collector::Collector;
use crate::config::{HarvestConfig, MonitoredResourceConfig};
use crate::correlator::correlate;
use crate::custom_metrics;
use crate::errors::{HarvestError, ProviderError, PublishError};
use crate::fetcher::{BatchFetcher, QueryWindow};
use crate::metric::{MetricPoint, PointAssembler};
use crate::properties;
use crate::provider::Collaborators;
use crate::publisher::Publisher;
use crate::request::build_requests;
use crate::resource::ResourceKind;
use crate::util::now_epoch_secs;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Run phases, traced at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    /// One task per configured kind has been spawned.
    Dispatched,
    /// Waiting for every task to finish.
    Collecting,
    /// Accumulated points and errors have been taken out.
    Drained,
}

/// Outcome of a harvesting run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestReport {
    /// Points accepted by the monitoring service; 0 when publishing failed.
    pub metrics_published: usize,
    /// Errors recorded by the resource kind tasks.
    pub errors: Vec<HarvestError>,
    pub publish_error: Option<PublishError>,
}

/// Everything one resource kind task needs, owned.
struct KindTask {
    kind: ResourceKind,
    monitored: MonitoredResourceConfig,
    region: String,
    lookback: Duration,
    account_id: Option<String>,
    collaborators: Collaborators,
}

impl KindTask {
    async fn run(self) -> Result<Vec<MetricPoint>, ProviderError> {
        let kind = self.kind;
        let collector = Collector::new(
            self.collaborators.lister.clone(),
            self.collaborators.tags.clone(),
        );
        let resources = collector
            .collect(kind, &self.region, &self.monitored.tags)
            .await?;
        debug!("Collected {} {kind} resources", resources.len());

        let requests = build_requests(kind, &self.monitored.metrics, &resources);
        let window = QueryWindow::lookback(now_epoch_secs(), kind.lookback(self.lookback));
        let results = BatchFetcher::new(self.collaborators.series.clone())
            .fetch(&self.region, window, &requests)
            .await?;
        debug!(
            "Fetched {} results for {} {kind} requests",
            results.len(),
            requests.len()
        );

        let assembler = PointAssembler::new(self.account_id.as_deref(), now_epoch_secs());
        let mut points = Vec::new();
        for correlated in correlate(&requests, results) {
            let properties = properties::assemble(&correlated.request.resource);
            points.extend(assembler.assemble(
                &correlated.request.stat.name,
                &correlated.result.timestamps,
                &correlated.result.values,
                properties,
                kind.stamps_single_value_with_now(),
            ));
        }
        points.extend(custom_metrics::derive(
            kind,
            &self.monitored.custom_metrics,
            &resources,
            &assembler,
        ));
        Ok(points)
    }
}

fn spawn_kind_task(task: KindTask, accumulator: AccumulatorHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let kind = task.kind;
        let sent = match task.run().await {
            Ok(points) => {
                debug!("{kind} harvest produced {} points", points.len());
                accumulator.insert_points(points)
            }
            Err(source) => accumulator.record_error(HarvestError::Provider { kind, source }),
        };
        if let Err(e) = sent {
            error!("{kind} harvest could not report to the accumulator: {e}");
        }
    })
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("Harvest run {state:?} -> {next:?}");
    *state = next;
}

/// Runs every configured resource kind concurrently, waits for all of them, then publishes what
/// they produced. Never fails: errors end up in the report.
pub async fn run_harvest(config: &HarvestConfig, collaborators: Collaborators) -> HarvestReport {
    let mut state = RunState::Idle;
    let (service, accumulator) = AccumulatorService::new();
    let service_task = tokio::spawn(service.run());

    let tasks: Vec<(ResourceKind, JoinHandle<()>)> = config
        .resources
        .monitored()
        .into_iter()
        .map(|(kind, monitored)| {
            let task = KindTask {
                kind,
                monitored: monitored.clone(),
                region: config.region_for(monitored).to_string(),
                lookback: config.lookback(),
                account_id: config.account_id.clone(),
                collaborators: collaborators.clone(),
            };
            (kind, spawn_kind_task(task, accumulator.clone()))
        })
        .collect();
    transition(&mut state, RunState::Dispatched);
    info!("Harvesting {} resource kinds", tasks.len());

    transition(&mut state, RunState::Collecting);
    for (kind, handle) in tasks {
        if let Err(e) = handle.await {
            let error = HarvestError::Task {
                kind,
                message: e.to_string(),
            };
            if let Err(e) = accumulator.record_error(error) {
                error!("Failed to record {kind} task failure: {e}");
            }
        }
    }

    let DrainResponse { metrics, errors } = match accumulator.drain().await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to drain accumulated metrics: {e}");
            DrainResponse::default()
        }
    };
    transition(&mut state, RunState::Drained);
    if let Err(e) = accumulator.shutdown() {
        error!("Failed to shut down accumulator: {e}");
    }
    if let Err(e) = service_task.await {
        error!("Accumulator service task failed: {e}");
    }

    for e in &errors {
        error!("{e}");
    }

    let publisher = Publisher::new(collaborators.publisher.clone());
    let (metrics_published, publish_error) = match publisher.publish(&metrics).await {
        Ok(published) => (published, None),
        Err(e) => (0, Some(e)),
    };

    HarvestReport {
        metrics_published,
        errors,
        publish_error,
    }
}
