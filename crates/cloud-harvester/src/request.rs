// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builds one correlated metric fetch request per (statistic, resource) pair.

use crate::config::StatSpec;
use crate::resource::{NormalizedResource, ResourceKind};
use serde::Serialize;

/// Name/value pair identifying a resource to the metrics provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Unique within the request set of one resource kind only.
    pub correlation_id: String,
    pub namespace: &'static str,
    pub dimensions: Vec<Dimension>,
    pub stat: StatSpec,
    pub resource: NormalizedResource,
}

/// Cartesian product of `stats` and `resources`, statistics outermost. Ids are
/// `<prefix><index>` with the index counting requests built so far.
pub fn build_requests(
    kind: ResourceKind,
    stats: &[StatSpec],
    resources: &[NormalizedResource],
) -> Vec<FetchRequest> {
    let mut requests = Vec::with_capacity(stats.len() * resources.len());
    for stat in stats {
        for resource in resources {
            let correlation_id = format!("{}{}", kind.correlation_prefix(), requests.len());
            let mut stat = stat.clone();
            stat.id.clone_from(&correlation_id);
            requests.push(FetchRequest {
                correlation_id,
                namespace: kind.namespace(),
                dimensions: resource.detail.dimensions(),
                stat,
                resource: resource.clone(),
            });
        }
    }
    requests
}
