// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the Anodot 2.0 metrics API.

use crate::api_token::ApiTokenFactory;
use crate::config::HarvestConfig;
use crate::errors::{ConfigError, TransportError};
use crate::metric::MetricPoint;
use crate::properties::PropertyMap;
use crate::provider::{MetricPublisher, SubmitResponse};
use async_trait::async_trait;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const METRICS_PATH: &str = "/api/v1/metrics";
const PROTOCOL: &str = "anodot20";

#[derive(Debug, Serialize)]
struct WirePoint<'a> {
    properties: &'a PropertyMap,
    timestamp: i64,
    value: f64,
    tags: BTreeMap<String, String>,
}

impl<'a> From<&'a MetricPoint> for WirePoint<'a> {
    fn from(point: &'a MetricPoint) -> Self {
        Self {
            properties: &point.properties,
            timestamp: point.timestamp,
            value: point.value,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

fn error_description(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(fields) => match fields.get("description") {
            Some(serde_json::Value::String(description)) => description.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct AnodotClient {
    client: reqwest::Client,
    endpoint: String,
    token_factory: Arc<ApiTokenFactory>,
}

impl AnodotClient {
    pub fn new(
        base_url: &str,
        token_factory: Arc<ApiTokenFactory>,
        timeout: Duration,
        https_proxy: Option<&str>,
    ) -> Result<Self, ConfigError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid anodot_url '{base_url}': {e}")))?;

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(270)))
            .tcp_keepalive(Some(Duration::from_secs(120)));
        if let Some(proxy) = https_proxy {
            let proxy = reqwest::Proxy::https(proxy)
                .map_err(|e| ConfigError::Invalid(format!("invalid https_proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{METRICS_PATH}", base_url.trim_end_matches('/')),
            token_factory,
        })
    }

    /// Client for the configured endpoint, authenticated with the configured static token.
    pub fn from_config(config: &HarvestConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.anodot_url,
            Arc::new(ApiTokenFactory::new_from_static_token(&config.anodot_token)),
            config.publish_timeout(),
            config.https_proxy.as_deref(),
        )
    }
}

#[async_trait]
impl MetricPublisher for AnodotClient {
    async fn submit(&self, points: &[MetricPoint]) -> Result<SubmitResponse, TransportError> {
        let body: Vec<WirePoint<'_>> = points.iter().map(WirePoint::from).collect();
        let Some(token) = self.token_factory.get_token().await else {
            return Err(TransportError::new(None, "Anodot API token is empty"));
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("token", token), ("protocol", PROTOCOL)])
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::new(e.status(), e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new(Some(status), e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(TransportError::new(Some(status), text));
        }

        if text.trim().is_empty() {
            return Ok(SubmitResponse::default());
        }
        match serde_json::from_str::<WireResponse>(&text) {
            Ok(parsed) => Ok(SubmitResponse {
                errors: parsed.errors.iter().map(error_description).collect(),
            }),
            Err(e) => {
                debug!("Unparseable submit response body: {text}");
                Ok(SubmitResponse {
                    errors: vec![format!("unparseable response ({status}): {e}")],
                })
            }
        }
    }
}
