// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bounded property maps attached to every published point.
//!
//! Anodot caps the number of properties per metric and the length of their values, so the map
//! is seeded with the resource's identity, topped up with its tags until the cap is hit, and
//! finally swept of any value outside the accepted length range.

use crate::constants::{
    COLLECTOR_KEY, COLLECTOR_VALUE, MAX_PROPERTIES, MAX_PROPERTY_LEN, MIN_PROPERTY_VALUE_LEN,
};
use crate::resource::{NormalizedResource, ResourceDetail};
use crate::util::char_len;
use std::collections::BTreeMap;

pub type PropertyMap = BTreeMap<String, String>;

/// Colons are reserved in Anodot property names and values.
pub fn escape(s: &str) -> String {
    s.replace(':', "_")
}

fn seed(resource: &NormalizedResource) -> PropertyMap {
    let mut properties = PropertyMap::new();
    properties.insert("service".to_string(), resource.kind().to_string());
    properties.insert("region".to_string(), resource.region.clone());
    properties.insert(COLLECTOR_KEY.to_string(), COLLECTOR_VALUE.to_string());

    let identity: Vec<(&str, &str)> = match &resource.detail {
        ResourceDetail::LoadBalancer(lb) => vec![
            ("name", lb.name.as_str()),
            (
                "az",
                lb.availability_zones.first().map_or("", String::as_str),
            ),
            ("vpc_id", lb.vpc_id.as_str()),
        ],
        ResourceDetail::Instance(i) => vec![
            ("instance_id", i.instance_id.as_str()),
            ("instance_type", i.instance_type.as_str()),
            ("az", i.availability_zone.as_str()),
        ],
        ResourceDetail::Volume(v) => vec![
            ("volume_id", v.volume_id.as_str()),
            ("volume_type", v.volume_type.as_str()),
            ("az", v.availability_zone.as_str()),
        ],
        ResourceDetail::Bucket(b) => vec![
            ("name", b.name.as_str()),
            ("storage_type", b.storage_type.as_str()),
        ],
        ResourceDetail::Distribution(d) => vec![
            ("distribution_id", d.id.as_str()),
            ("domain_name", d.domain_name.as_str()),
        ],
    };
    for (key, value) in identity {
        properties.insert(key.to_string(), value.to_string());
    }
    properties
}

/// Builds the property map of `resource`: at most [`MAX_PROPERTIES`] entries, every value
/// between [`MIN_PROPERTY_VALUE_LEN`] and [`MAX_PROPERTY_LEN`] characters.
///
/// Tags are added in order; once the map is full the remaining tags are ignored.
pub fn assemble(resource: &NormalizedResource) -> PropertyMap {
    let mut properties = seed(resource);

    for tag in &resource.tags {
        if char_len(&tag.name) > MAX_PROPERTY_LEN || char_len(&tag.value) < MIN_PROPERTY_VALUE_LEN {
            continue;
        }
        if properties.len() >= MAX_PROPERTIES {
            break;
        }
        properties.insert(escape(&tag.name), escape(&tag.value));
    }

    properties.retain(|_, value| {
        (MIN_PROPERTY_VALUE_LEN..=MAX_PROPERTY_LEN).contains(&char_len(value))
    });
    properties
}
