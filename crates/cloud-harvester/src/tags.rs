// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Resource tags and the conjunctive tag filter applied to discovered resources.

use serde::{Deserialize, Serialize};

/// A resource tag. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Anything carrying an ordered tag set.
pub trait Tagged {
    fn tags(&self) -> &[Tag];
}

/// Tags returned by a tag lookup for one resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescription {
    pub id: String,
    pub tags: Vec<Tag>,
}

impl Tagged for TagDescription {
    fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// True when every required pair is present in `tags`. Duplicate keys are fine, any occurrence
/// with the right value matches.
pub fn matches_all(tags: &[Tag], required: &[Tag]) -> bool {
    required.iter().all(|r| tags.contains(r))
}

/// Keeps the entities carrying every required tag. An empty `required` keeps everything.
pub fn filter<T: Tagged>(tagged: Vec<T>, required: &[Tag]) -> Vec<T> {
    if required.is_empty() {
        return tagged;
    }
    tagged
        .into_iter()
        .filter(|entity| matches_all(entity.tags(), required))
        .collect()
}
