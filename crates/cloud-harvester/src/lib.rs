// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Harvests usage metrics for a fixed set of cloud resource types and republishes them as
//! Anodot 2.0 metric points.
//!
//! One harvesting run discovers the resources of every configured kind, keeps the ones whose tags
//! match the configured filter, fetches their time series in provider-sized batches, turns the
//! samples into metric points carrying a bounded property map and publishes everything once the
//! per-kind tasks have finished. See [`harvester::run_harvest`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod accumulator_service;
pub mod anodot;
pub mod api_token;
pub mod collector;
pub mod config;
pub mod constants;
pub mod correlator;
pub mod custom_metrics;
pub mod errors;
pub mod fetcher;
pub mod harvester;
pub mod logger;
pub mod metric;
pub mod properties;
pub mod provider;
pub mod publisher;
pub mod request;
pub mod resource;
pub mod tags;
pub mod util;

pub use config::HarvestConfig;
pub use harvester::{run_harvest, HarvestReport};
pub use provider::Collaborators;
