// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Resource discovery: list, look up tags in batches, filter, and join tags back to resources.

use crate::constants::{LIST_PAGE_SIZE, TAG_LOOKUP_BATCH_SIZE};
use crate::errors::ProviderError;
use crate::provider::{ResourceLister, TagFetcher};
use crate::resource::{NormalizedResource, ResourceDetail, ResourceKind};
use crate::tags::{self, Tag, TagDescription};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Collector {
    lister: Arc<dyn ResourceLister>,
    tags: Arc<dyn TagFetcher>,
}

impl Collector {
    pub fn new(lister: Arc<dyn ResourceLister>, tags: Arc<dyn TagFetcher>) -> Self {
        Self { lister, tags }
    }

    /// Discovers the resources of `kind` in `region` carrying every `required` tag.
    ///
    /// Any provider error aborts the whole collection; no partial list is returned. With an
    /// empty filter, resources the tag lookup did not describe are kept with no tags.
    pub async fn collect(
        &self,
        kind: ResourceKind,
        region: &str,
        required: &[Tag],
    ) -> Result<Vec<NormalizedResource>, ProviderError> {
        let details = self.list_all(kind, region).await?;
        if details.is_empty() {
            debug!("No {kind} resources found in {region}");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = details.iter().map(|d| d.id().to_string()).collect();
        let descriptions = self.lookup_tags(kind, region, &ids).await?;
        let described = descriptions.len();
        let by_id: HashMap<String, Vec<Tag>> = tags::filter(descriptions, required)
            .into_iter()
            .map(|d| (d.id, d.tags))
            .collect();
        debug!(
            "{} of {described} described {kind} resources match the tag filter",
            by_id.len()
        );

        let resources = details
            .into_iter()
            .filter_map(|detail| {
                let tags = match by_id.get(detail.id()) {
                    Some(tags) => tags.clone(),
                    None if required.is_empty() => Vec::new(),
                    None => return None,
                };
                Some(NormalizedResource {
                    region: region.to_string(),
                    tags,
                    detail,
                })
            })
            .collect();
        Ok(resources)
    }

    async fn list_all(
        &self,
        kind: ResourceKind,
        region: &str,
    ) -> Result<Vec<ResourceDetail>, ProviderError> {
        let mut details = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .lister
                .list(kind, region, LIST_PAGE_SIZE, next_token)
                .await?;
            for detail in page.resources {
                if detail.kind() == kind {
                    details.push(detail);
                } else {
                    warn!(
                        "Ignoring {} resource {} listed as {kind}",
                        detail.kind(),
                        detail.id()
                    );
                }
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(details)
    }

    async fn lookup_tags(
        &self,
        kind: ResourceKind,
        region: &str,
        ids: &[String],
    ) -> Result<Vec<TagDescription>, ProviderError> {
        let mut descriptions = Vec::with_capacity(ids.len());
        for batch in ids.chunks(TAG_LOOKUP_BATCH_SIZE) {
            descriptions.extend(self.tags.fetch_tags(kind, region, batch).await?);
        }
        Ok(descriptions)
    }
}
