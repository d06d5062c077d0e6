// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Owns the metric and error lists of a harvesting run. Resource kind tasks append through a
//! cloneable [`AccumulatorHandle`]; the service applies commands in arrival order.

use crate::errors::HarvestError;
use crate::metric::MetricPoint;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

#[derive(Debug)]
pub enum AccumulatorCommand {
    InsertPoints(Vec<MetricPoint>),
    RecordError(HarvestError),
    Drain(oneshot::Sender<DrainResponse>),
    Shutdown,
}

/// Everything accumulated since the previous drain.
#[derive(Debug, Default)]
pub struct DrainResponse {
    pub metrics: Vec<MetricPoint>,
    pub errors: Vec<HarvestError>,
}

#[derive(Clone)]
pub struct AccumulatorHandle {
    tx: mpsc::UnboundedSender<AccumulatorCommand>,
}

impl AccumulatorHandle {
    pub fn insert_points(
        &self,
        points: Vec<MetricPoint>,
    ) -> Result<(), mpsc::error::SendError<AccumulatorCommand>> {
        self.tx.send(AccumulatorCommand::InsertPoints(points))
    }

    pub fn record_error(
        &self,
        error: HarvestError,
    ) -> Result<(), mpsc::error::SendError<AccumulatorCommand>> {
        self.tx.send(AccumulatorCommand::RecordError(error))
    }

    pub async fn drain(&self) -> Result<DrainResponse, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(AccumulatorCommand::Drain(response_tx))
            .map_err(|e| format!("Failed to send drain command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive drain response: {}", e))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<AccumulatorCommand>> {
        self.tx.send(AccumulatorCommand::Shutdown)
    }
}

pub struct AccumulatorService {
    metrics: Vec<MetricPoint>,
    errors: Vec<HarvestError>,
    rx: mpsc::UnboundedReceiver<AccumulatorCommand>,
}

impl AccumulatorService {
    pub fn new() -> (Self, AccumulatorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            metrics: Vec::new(),
            errors: Vec::new(),
            rx,
        };
        (service, AccumulatorHandle { tx })
    }

    pub async fn run(mut self) {
        debug!("Accumulator service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                AccumulatorCommand::InsertPoints(points) => {
                    self.metrics.extend(points);
                }

                AccumulatorCommand::RecordError(error) => {
                    self.errors.push(error);
                }

                AccumulatorCommand::Drain(response_tx) => {
                    let response = DrainResponse {
                        metrics: std::mem::take(&mut self.metrics),
                        errors: std::mem::take(&mut self.errors),
                    };
                    if response_tx.send(response).is_err() {
                        error!("Failed to send drain response - receiver dropped");
                    }
                }

                AccumulatorCommand::Shutdown => {
                    debug!("Accumulator service shutting down");
                    break;
                }
            }
        }

        debug!("Accumulator service stopped");
    }
}
