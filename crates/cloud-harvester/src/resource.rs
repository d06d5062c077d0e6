// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The harvested resource kinds and their normalized representation.

use crate::constants::BUCKET_LOOKBACK;
use crate::request::Dimension;
use crate::tags::{Tag, Tagged};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The fixed set of harvested resource types. Displays as the `service` property value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum ResourceKind {
    #[display("elb")]
    LoadBalancer,
    #[display("ec2")]
    Instance,
    #[display("ebs")]
    Volume,
    #[display("s3")]
    Bucket,
    #[display("cloudfront")]
    Distribution,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::LoadBalancer,
        ResourceKind::Instance,
        ResourceKind::Volume,
        ResourceKind::Bucket,
        ResourceKind::Distribution,
    ];

    /// Metrics provider namespace holding this kind's statistics.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::LoadBalancer => "AWS/ELB",
            Self::Instance => "AWS/EC2",
            Self::Volume => "AWS/EBS",
            Self::Bucket => "AWS/S3",
            Self::Distribution => "AWS/CloudFront",
        }
    }

    /// Prefix of the correlation ids built for this kind.
    pub fn correlation_prefix(self) -> &'static str {
        match self {
            Self::LoadBalancer => "elb",
            Self::Instance => "ec2",
            Self::Volume => "ebs",
            Self::Bucket => "s3",
            Self::Distribution => "cf",
        }
    }

    /// How far back to query. Only buckets override the configured default.
    pub fn lookback(self, default: Duration) -> Duration {
        match self {
            Self::Bucket => BUCKET_LOOKBACK,
            _ => default,
        }
    }

    /// Whether a single returned sample is stamped with the assembly time instead of the
    /// provider's timestamp.
    pub fn stamps_single_value_with_now(self) -> bool {
        matches!(self, Self::Bucket)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancer {
    pub name: String,
    pub availability_zones: Vec<String>,
    pub vpc_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuOptions {
    pub core_count: u32,
    pub threads_per_core: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub instance_id: String,
    pub instance_type: String,
    pub availability_zone: String,
    pub cpu: Option<CpuOptions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub volume_id: String,
    pub volume_type: String,
    pub availability_zone: String,
    pub size_gib: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub name: String,
    pub storage_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub id: String,
    pub domain_name: String,
}

/// Kind-specific identity of a resource, as returned by the resource lister.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDetail {
    LoadBalancer(LoadBalancer),
    Instance(Instance),
    Volume(Volume),
    Bucket(Bucket),
    Distribution(Distribution),
}

impl ResourceDetail {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::LoadBalancer(_) => ResourceKind::LoadBalancer,
            Self::Instance(_) => ResourceKind::Instance,
            Self::Volume(_) => ResourceKind::Volume,
            Self::Bucket(_) => ResourceKind::Bucket,
            Self::Distribution(_) => ResourceKind::Distribution,
        }
    }

    /// Identifier used to join tag lookups back to the resource.
    pub fn id(&self) -> &str {
        match self {
            Self::LoadBalancer(lb) => &lb.name,
            Self::Instance(i) => &i.instance_id,
            Self::Volume(v) => &v.volume_id,
            Self::Bucket(b) => &b.name,
            Self::Distribution(d) => &d.id,
        }
    }

    /// Dimensions pinning the resource for the metrics provider.
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            Self::LoadBalancer(lb) => vec![Dimension::new("LoadBalancerName", &lb.name)],
            Self::Instance(i) => vec![Dimension::new("InstanceId", &i.instance_id)],
            Self::Volume(v) => vec![Dimension::new("VolumeId", &v.volume_id)],
            Self::Bucket(b) => vec![
                Dimension::new("BucketName", &b.name),
                Dimension::new("StorageType", &b.storage_type),
            ],
            Self::Distribution(d) => vec![
                Dimension::new("DistributionId", &d.id),
                Dimension::new("Region", "Global"),
            ],
        }
    }
}

/// A discovered resource that passed the tag filter, with its placement and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResource {
    pub region: String,
    pub tags: Vec<Tag>,
    pub detail: ResourceDetail,
}

impl NormalizedResource {
    pub fn kind(&self) -> ResourceKind {
        self.detail.kind()
    }

    pub fn id(&self) -> &str {
        self.detail.id()
    }
}

impl Tagged for NormalizedResource {
    fn tags(&self) -> &[Tag] {
        &self.tags
    }
}
