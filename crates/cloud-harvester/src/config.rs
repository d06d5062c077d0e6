// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{DEFAULT_LOOKBACK, DEFAULT_PUBLISH_TIMEOUT};
use crate::errors::ConfigError;
use crate::resource::ResourceKind;
use crate::tags::Tag;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "HARVESTER_";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One statistic to pull from the metrics provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatSpec {
    /// Provider metric name, also published as `what`.
    pub name: String,
    /// Aggregation, e.g. `Sum` or `Average`.
    pub stat: String,
    #[serde(default = "default_period_secs")]
    pub period_secs: u32,
    #[serde(default)]
    pub unit: Option<String>,
    /// Correlation id, assigned per request when requests are built.
    #[serde(skip)]
    pub id: String,
}

fn default_period_secs() -> u32 {
    300
}

impl StatSpec {
    pub fn new(name: impl Into<String>, stat: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stat: stat.into(),
            period_secs: default_period_secs(),
            unit: None,
            id: String::new(),
        }
    }
}

/// What to harvest for one resource kind.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitoredResourceConfig {
    pub metrics: Vec<StatSpec>,
    /// Required tags, all of which a resource must carry.
    pub tags: Vec<Tag>,
    /// Metrics derived from resource metadata, e.g. `CoreCount`.
    pub custom_metrics: Vec<String>,
    /// Region to harvest this kind from instead of the home region.
    pub custom_region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub elb: Option<MonitoredResourceConfig>,
    pub ec2: Option<MonitoredResourceConfig>,
    pub ebs: Option<MonitoredResourceConfig>,
    pub s3: Option<MonitoredResourceConfig>,
    pub cloudfront: Option<MonitoredResourceConfig>,
}

impl ResourcesConfig {
    pub fn get(&self, kind: ResourceKind) -> Option<&MonitoredResourceConfig> {
        match kind {
            ResourceKind::LoadBalancer => self.elb.as_ref(),
            ResourceKind::Instance => self.ec2.as_ref(),
            ResourceKind::Volume => self.ebs.as_ref(),
            ResourceKind::Bucket => self.s3.as_ref(),
            ResourceKind::Distribution => self.cloudfront.as_ref(),
        }
    }

    /// Configured kinds, in [`ResourceKind::ALL`] order.
    pub fn monitored(&self) -> Vec<(ResourceKind, &MonitoredResourceConfig)> {
        ResourceKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|config| (kind, config)))
            .collect()
    }
}

/// Configuration of a harvesting run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Home region of the harvested account
    pub region: String,
    /// Stamped into every point as `account_id` when set
    pub account_id: Option<String>,
    /// Anodot base URL, e.g. https://app.anodot.com
    pub anodot_url: String,
    pub anodot_token: String,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Default metric query window, in seconds
    pub lookback_secs: u64,
    /// Timeout for each publish request, in seconds
    pub publish_timeout_secs: u64,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    pub resources: ResourcesConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            account_id: None,
            anodot_url: "https://app.anodot.com".to_string(),
            anodot_token: String::new(),
            log_level: "info".to_string(),
            lookback_secs: DEFAULT_LOOKBACK.as_secs(),
            publish_timeout_secs: DEFAULT_PUBLISH_TIMEOUT.as_secs(),
            https_proxy: None,
            resources: ResourcesConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Loads defaults, then the YAML file at `path` if any, then `HARVESTER_*` environment
    /// variables (`__` separates nested keys), and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: HarvestConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("region cannot be empty".to_string()));
        }

        if let Err(e) = reqwest::Url::parse(&self.anodot_url) {
            return Err(ConfigError::Invalid(format!(
                "Invalid anodot_url '{}': {e}",
                self.anodot_url
            )));
        }

        if self.anodot_token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "anodot_token cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if self.lookback_secs == 0 {
            return Err(ConfigError::Invalid(
                "lookback_secs must be greater than 0".to_string(),
            ));
        }

        for (kind, monitored) in self.resources.monitored() {
            for stat in &monitored.metrics {
                if stat.name.trim().is_empty() || stat.stat.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{kind}: metrics need both a name and a stat"
                    )));
                }
                if stat.period_secs == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "{kind}: period_secs of {} must be greater than 0",
                        stat.name
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    /// Region a kind is harvested from.
    pub fn region_for<'a>(&'a self, monitored: &'a MonitoredResourceConfig) -> &'a str {
        monitored.custom_region.as_deref().unwrap_or(&self.region)
    }
}
