// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Contracts of the collaborators the harvester drives: the cloud provider's resource listing,
//! tag lookup and time-series APIs, and the monitoring service's submit API.

use crate::errors::{ProviderError, TransportError};
use crate::fetcher::{FetchResult, QueryWindow};
use crate::metric::MetricPoint;
use crate::request::FetchRequest;
use crate::resource::{ResourceDetail, ResourceKind};
use crate::tags::TagDescription;
use async_trait::async_trait;
use std::sync::Arc;

/// One page of a resource listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePage {
    pub resources: Vec<ResourceDetail>,
    /// Token for the next page, `None` on the last one.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// Lists one page of at most `page_size` resources of `kind` in `region`.
    async fn list(
        &self,
        kind: ResourceKind,
        region: &str,
        page_size: usize,
        next_token: Option<String>,
    ) -> Result<ResourcePage, ProviderError>;
}

#[async_trait]
pub trait TagFetcher: Send + Sync {
    /// Looks up the tags of `ids`. Callers never pass more than
    /// [`TAG_LOOKUP_BATCH_SIZE`](crate::constants::TAG_LOOKUP_BATCH_SIZE) ids at once.
    async fn fetch_tags(
        &self,
        kind: ResourceKind,
        region: &str,
        ids: &[String],
    ) -> Result<Vec<TagDescription>, ProviderError>;
}

#[async_trait]
pub trait MetricSeriesFetcher: Send + Sync {
    /// Fetches the series of one provider-sized batch of requests.
    async fn fetch(
        &self,
        region: &str,
        window: QueryWindow,
        requests: &[FetchRequest],
    ) -> Result<Vec<FetchResult>, ProviderError>;
}

/// What the monitoring service answered to a submit call that reached it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitResponse {
    /// Content-level errors reported by the service; empty on full acceptance.
    pub errors: Vec<String>,
}

impl SubmitResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

#[async_trait]
pub trait MetricPublisher: Send + Sync {
    async fn submit(&self, points: &[MetricPoint]) -> Result<SubmitResponse, TransportError>;
}

/// The collaborators of one harvesting run. Cheap to clone.
#[derive(Clone)]
pub struct Collaborators {
    pub lister: Arc<dyn ResourceLister>,
    pub tags: Arc<dyn TagFetcher>,
    pub series: Arc<dyn MetricSeriesFetcher>,
    pub publisher: Arc<dyn MetricPublisher>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collaborators")
    }
}
