// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::METRIC_VERSION;
use crate::properties::PropertyMap;
use tracing::warn;

/// One normalized sample ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub value: f64,
    /// Epoch seconds
    pub timestamp: i64,
    pub properties: PropertyMap,
}

/// Turns aligned timestamp/value arrays into metric points.
#[derive(Debug, Clone, Copy)]
pub struct PointAssembler<'a> {
    account_id: Option<&'a str>,
    now: i64,
}

impl<'a> PointAssembler<'a> {
    /// `now` is the assembly time, used whenever a point is stamped with the current time.
    pub fn new(account_id: Option<&'a str>, now: i64) -> Self {
        Self { account_id, now }
    }

    /// Completes a resource property map with the point-level fields.
    pub fn point_properties(&self, what: &str, mut properties: PropertyMap) -> PropertyMap {
        properties.insert("what".to_string(), what.to_string());
        properties.insert("metric_version".to_string(), METRIC_VERSION.to_string());
        if let Some(account_id) = self.account_id {
            properties.insert("account_id".to_string(), account_id.to_string());
        }
        properties
    }

    /// One point per sample, in sample order. With `stamp_single_value_now`, a lone sample is
    /// stamped with the assembly time instead of its own timestamp.
    pub fn assemble(
        &self,
        what: &str,
        timestamps: &[i64],
        values: &[f64],
        properties: PropertyMap,
        stamp_single_value_now: bool,
    ) -> Vec<MetricPoint> {
        if values.is_empty() {
            return Vec::new();
        }
        let properties = self.point_properties(what, properties);

        if values.len() == 1 && stamp_single_value_now {
            return vec![MetricPoint {
                value: values[0],
                timestamp: self.now,
                properties,
            }];
        }

        if timestamps.len() != values.len() {
            warn!(
                "{what}: {} timestamps for {} values, extra samples dropped",
                timestamps.len(),
                values.len()
            );
        }
        timestamps
            .iter()
            .zip(values)
            .map(|(&timestamp, &value)| MetricPoint {
                value,
                timestamp,
                properties: properties.clone(),
            })
            .collect()
    }

    /// A single point stamped with the assembly time.
    pub fn point_now(&self, what: &str, value: f64, properties: PropertyMap) -> MetricPoint {
        MetricPoint {
            value,
            timestamp: self.now,
            properties: self.point_properties(what, properties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PropertyMap {
        [("service", "elb"), ("name", "web")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_one_point_per_sample() {
        let assembler = PointAssembler::new(None, 9_999);
        let points = assembler.assemble(
            "RequestCount",
            &[100, 160, 220],
            &[1.0, 2.0, 3.0],
            base(),
            false,
        );

        assert_eq!(points.len(), 3);
        for (point, (ts, value)) in points.iter().zip([(100, 1.0), (160, 2.0), (220, 3.0)]) {
            assert_eq!(point.timestamp, ts);
            assert_eq!(point.value, value);
            assert_eq!(point.properties["what"], "RequestCount");
            assert_eq!(point.properties["metric_version"], "5");
            assert_eq!(point.properties["name"], "web");
            assert!(!point.properties.contains_key("account_id"));
        }
    }

    #[test]
    fn test_account_id_when_configured() {
        let assembler = PointAssembler::new(Some("123456789012"), 0);
        let points = assembler.assemble("Latency", &[1], &[0.5], base(), false);
        assert_eq!(points[0].properties["account_id"], "123456789012");
    }

    #[test]
    fn test_single_value_stamped_with_now() {
        let assembler = PointAssembler::new(None, 5_000);
        let points = assembler.assemble("BucketSizeBytes", &[100], &[42.0], base(), true);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, 5_000);
        assert_eq!(points[0].value, 42.0);

        // several samples keep their own timestamps
        let points =
            assembler.assemble("BucketSizeBytes", &[100, 200], &[1.0, 2.0], base(), true);
        assert_eq!(points[0].timestamp, 100);
        assert_eq!(points[1].timestamp, 200);
    }

    #[test]
    fn test_single_value_keeps_provider_timestamp_without_policy() {
        let assembler = PointAssembler::new(None, 5_000);
        let points = assembler.assemble("RequestCount", &[100], &[1.0], base(), false);
        assert_eq!(points[0].timestamp, 100);
    }

    #[test]
    fn test_empty_values() {
        let assembler = PointAssembler::new(None, 5_000);
        assert!(assembler.assemble("RequestCount", &[], &[], base(), true).is_empty());
    }

    #[test]
    fn test_misaligned_arrays_are_truncated() {
        let assembler = PointAssembler::new(None, 0);
        let points = assembler.assemble("RequestCount", &[1, 2], &[1.0, 2.0, 3.0], base(), false);
        assert_eq!(points.len(), 2);
    }
}
