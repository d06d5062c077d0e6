// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::fetcher::FetchResult;
use crate::request::FetchRequest;
use std::collections::HashMap;
use tracing::warn;

/// A fetch result paired with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlated<'a> {
    pub request: &'a FetchRequest,
    pub result: FetchResult,
}

/// Joins results to requests of the same request set by correlation id.
///
/// Output follows request order. Results with an unknown id are dropped, and so are requests
/// nothing came back for.
pub fn correlate(requests: &[FetchRequest], results: Vec<FetchResult>) -> Vec<Correlated<'_>> {
    let index: HashMap<&str, usize> = requests
        .iter()
        .enumerate()
        .map(|(i, r)| (r.correlation_id.as_str(), i))
        .collect();

    let mut matched: Vec<(usize, FetchResult)> = Vec::with_capacity(results.len());
    for result in results {
        match index.get(result.correlation_id.as_str()) {
            Some(&i) => matched.push((i, result)),
            None => warn!(
                "Discarding metric result with unknown id {}",
                result.correlation_id
            ),
        }
    }
    matched.sort_by_key(|(i, _)| *i);

    matched
        .into_iter()
        .map(|(i, result)| Correlated {
            request: &requests[i],
            result,
        })
        .collect()
}
