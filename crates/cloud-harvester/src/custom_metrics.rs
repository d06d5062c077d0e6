// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metrics derived from resource metadata rather than fetched as time series.

use crate::metric::{MetricPoint, PointAssembler};
use crate::properties;
use crate::resource::{NormalizedResource, ResourceDetail, ResourceKind};
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CustomMetric {
    #[display("CoreCount")]
    CoreCount,
    #[display("VCpuCount")]
    VCpuCount,
    #[display("Size")]
    Size,
}

impl FromStr for CustomMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CoreCount" => Ok(Self::CoreCount),
            "VCpuCount" => Ok(Self::VCpuCount),
            "Size" => Ok(Self::Size),
            other => Err(format!("unknown custom metric '{other}'")),
        }
    }
}

impl CustomMetric {
    pub fn kind(self) -> ResourceKind {
        match self {
            Self::CoreCount | Self::VCpuCount => ResourceKind::Instance,
            Self::Size => ResourceKind::Volume,
        }
    }

    fn value(self, detail: &ResourceDetail) -> Option<f64> {
        match (self, detail) {
            (Self::CoreCount, ResourceDetail::Instance(i)) => {
                i.cpu.map(|cpu| f64::from(cpu.core_count))
            }
            (Self::VCpuCount, ResourceDetail::Instance(i)) => i
                .cpu
                .map(|cpu| f64::from(cpu.core_count) * f64::from(cpu.threads_per_core)),
            (Self::Size, ResourceDetail::Volume(v)) => Some(v.size_gib as f64),
            _ => None,
        }
    }
}

/// Points for the custom metrics named in `names` that apply to `kind`, one per resource and
/// metric, stamped with the assembly time.
pub fn derive(
    kind: ResourceKind,
    names: &[String],
    resources: &[NormalizedResource],
    assembler: &PointAssembler<'_>,
) -> Vec<MetricPoint> {
    let mut points = Vec::new();
    for name in names {
        let metric = match name.parse::<CustomMetric>() {
            Ok(metric) if metric.kind() == kind => metric,
            Ok(metric) => {
                warn!("Custom metric {metric} does not apply to {kind} resources");
                continue;
            }
            Err(e) => {
                warn!("{kind}: {e}");
                continue;
            }
        };
        debug!("Processing {kind} custom metric {metric}");
        let name = metric.to_string();
        for resource in resources {
            if let Some(value) = metric.value(&resource.detail) {
                points.push(assembler.point_now(&name, value, properties::assemble(resource)));
            }
        }
    }
    points
}
