// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Version stamped into every published point as `metric_version`.
pub const METRIC_VERSION: &str = "5";

/// Property marking points produced by this collector.
pub const COLLECTOR_KEY: &str = "anodot-collector";
pub const COLLECTOR_VALUE: &str = "aws";

/// Anodot accepts at most this many properties per metric.
pub const MAX_PROPERTIES: usize = 17;
pub const MIN_PROPERTY_VALUE_LEN: usize = 2;
pub const MAX_PROPERTY_LEN: usize = 50;

/// Page size requested from resource listing calls.
pub const LIST_PAGE_SIZE: usize = 400;
/// Tag lookup calls reject more ids than this.
pub const TAG_LOOKUP_BATCH_SIZE: usize = 20;
/// Maximum metric data queries per time-series fetch call.
pub const METRIC_QUERIES_PER_CALL: usize = 500;

pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(10 * 60);
/// Storage metrics are reported daily, so buckets look further back.
pub const BUCKET_LOOKBACK: Duration = Duration::from_secs(36 * 60 * 60);

pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);
