// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::resource::ResourceKind;
use reqwest::StatusCode;

/// A call to the cloud provider (listing, tag lookup or time series) failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("{operation} failed: {message}")]
    Call {
        operation: &'static str,
        message: String,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ProviderError {
    pub fn call(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            operation,
            message: message.into(),
        }
    }
}

/// A batch of metric series requests could not be fetched. The whole request set of the
/// resource kind is lost with it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("metric series batch {batch} of {batches} ({requests} requests) failed: {message}")]
pub struct FetchError {
    pub batch: usize,
    pub batches: usize,
    pub requests: usize,
    pub message: String,
}

/// The publish call did not reach the monitoring service or was refused at the HTTP level.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("failed to submit metrics ({status:?}): {message}")]
pub struct TransportError {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// The monitoring service accepted the request but reported errors in its content.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("metrics rejected: {message}")]
pub struct RejectionError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Rejected(#[from] RejectionError),
}

/// An error recorded by one resource kind's task. Never aborts the other kinds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HarvestError {
    #[error("{kind} harvest failed: {source}")]
    Provider {
        kind: ResourceKind,
        #[source]
        source: ProviderError,
    },
    #[error("{kind} harvest task did not complete: {message}")]
    Task { kind: ResourceKind, message: String },
}

impl HarvestError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Provider { kind, .. } | Self::Task { kind, .. } => *kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}
