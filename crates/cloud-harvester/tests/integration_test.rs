// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use cloud_harvester::{
    anodot::AnodotClient,
    api_token::ApiTokenFactory,
    config::{MonitoredResourceConfig, StatSpec},
    errors::{HarvestError, ProviderError, PublishError, TransportError},
    fetcher::{FetchResult, QueryWindow},
    metric::MetricPoint,
    provider::{
        MetricPublisher, MetricSeriesFetcher, ResourceLister, ResourcePage, SubmitResponse,
        TagFetcher,
    },
    request::FetchRequest,
    resource::{CpuOptions, Instance, LoadBalancer, ResourceDetail, ResourceKind, Volume},
    run_harvest,
    tags::{Tag, TagDescription},
    Collaborators, HarvestConfig,
};
use mockito::{Matcher, Server};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Resources and tags of a fake account. Listing pages through `page_size` entries using the
/// offset as continuation token.
#[derive(Default)]
struct FakeCloud {
    resources: HashMap<ResourceKind, Vec<ResourceDetail>>,
    failing: HashMap<ResourceKind, ProviderError>,
    tags: HashMap<String, Vec<Tag>>,
}

#[async_trait]
impl ResourceLister for FakeCloud {
    async fn list(
        &self,
        kind: ResourceKind,
        _region: &str,
        page_size: usize,
        next_token: Option<String>,
    ) -> Result<ResourcePage, ProviderError> {
        if let Some(error) = self.failing.get(&kind) {
            return Err(error.clone());
        }
        let all = self.resources.get(&kind).cloned().unwrap_or_default();
        let start: usize = next_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + page_size).min(all.len());
        Ok(ResourcePage {
            resources: all[start..end].to_vec(),
            next_token: (end < all.len()).then(|| end.to_string()),
        })
    }
}

#[async_trait]
impl TagFetcher for FakeCloud {
    async fn fetch_tags(
        &self,
        _kind: ResourceKind,
        _region: &str,
        ids: &[String],
    ) -> Result<Vec<TagDescription>, ProviderError> {
        assert!(ids.len() <= 20, "tag lookup over the provider limit");
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.tags.get(id).map(|tags| TagDescription {
                    id: id.clone(),
                    tags: tags.clone(),
                })
            })
            .collect())
    }
}

/// Answers every request with one sample and remembers what it was asked.
#[derive(Default)]
struct OneSampleSeries {
    requests: Mutex<Vec<FetchRequest>>,
}

#[async_trait]
impl MetricSeriesFetcher for OneSampleSeries {
    async fn fetch(
        &self,
        _region: &str,
        window: QueryWindow,
        requests: &[FetchRequest],
    ) -> Result<Vec<FetchResult>, ProviderError> {
        self.requests.lock().unwrap().extend_from_slice(requests);
        Ok(requests
            .iter()
            .map(|r| FetchResult {
                correlation_id: r.correlation_id.clone(),
                timestamps: vec![window.end],
                values: vec![7.0],
            })
            .collect())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    calls: Mutex<Vec<Vec<MetricPoint>>>,
}

#[async_trait]
impl MetricPublisher for RecordingPublisher {
    async fn submit(&self, points: &[MetricPoint]) -> Result<SubmitResponse, TransportError> {
        self.calls.lock().unwrap().push(points.to_vec());
        Ok(SubmitResponse::default())
    }
}

fn load_balancer(name: &str) -> ResourceDetail {
    ResourceDetail::LoadBalancer(LoadBalancer {
        name: name.to_string(),
        availability_zones: vec!["us-east-1a".to_string()],
        vpc_id: "vpc-0a1b2c".to_string(),
    })
}

fn instance(id: &str) -> ResourceDetail {
    ResourceDetail::Instance(Instance {
        instance_id: id.to_string(),
        instance_type: "m5.large".to_string(),
        availability_zone: "us-east-1b".to_string(),
        cpu: Some(CpuOptions {
            core_count: 1,
            threads_per_core: 2,
        }),
    })
}

fn volume(id: &str) -> ResourceDetail {
    ResourceDetail::Volume(Volume {
        volume_id: id.to_string(),
        volume_type: "gp3".to_string(),
        availability_zone: "us-east-1b".to_string(),
        size_gib: 100,
    })
}

fn monitored(stat: &str, tags: Vec<Tag>) -> MonitoredResourceConfig {
    MonitoredResourceConfig {
        metrics: vec![StatSpec::new(stat, "Sum")],
        tags,
        ..MonitoredResourceConfig::default()
    }
}

fn config() -> HarvestConfig {
    HarvestConfig {
        region: "us-east-1".to_string(),
        anodot_token: "mock-token".to_string(),
        ..HarvestConfig::default()
    }
}

fn collaborators(
    cloud: FakeCloud,
    series: Arc<OneSampleSeries>,
    publisher: Arc<dyn MetricPublisher>,
) -> Collaborators {
    let cloud = Arc::new(cloud);
    Collaborators {
        lister: cloud.clone(),
        tags: cloud,
        series,
        publisher,
    }
}

#[tokio::test]
async fn load_balancers_filtered_by_tag() {
    let mut cloud = FakeCloud::default();
    cloud.resources.insert(
        ResourceKind::LoadBalancer,
        vec![load_balancer("web"), load_balancer("api"), load_balancer("batch")],
    );
    let prod = Tag::new("env", "prod");
    cloud.tags.insert("web".to_string(), vec![prod.clone()]);
    cloud
        .tags
        .insert("api".to_string(), vec![Tag::new("team", "core"), prod.clone()]);
    cloud
        .tags
        .insert("batch".to_string(), vec![Tag::new("env", "staging")]);

    let series = Arc::new(OneSampleSeries::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let mut config = config();
    config.resources.elb = Some(monitored("RequestCount", vec![prod]));

    let report = run_harvest(
        &config,
        collaborators(cloud, series.clone(), publisher.clone()),
    )
    .await;

    assert!(report.errors.is_empty());
    assert_eq!(report.publish_error, None);
    assert_eq!(report.metrics_published, 2);

    let requests = series.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].correlation_id, "elb0");
    assert_eq!(requests[1].correlation_id, "elb1");
    assert_eq!(requests[0].namespace, "AWS/ELB");

    let calls = publisher.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let mut names: Vec<&str> = calls[0]
        .iter()
        .map(|p| p.properties["name"].as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["api", "web"]);
    for point in &calls[0] {
        assert_eq!(point.properties["what"], "RequestCount");
        assert_eq!(point.properties["env"], "prod");
        assert_eq!(point.properties["anodot-collector"], "aws");
        assert_eq!(point.value, 7.0);
    }
}

#[tokio::test]
async fn nothing_passes_the_filter() {
    let mut cloud = FakeCloud::default();
    cloud
        .resources
        .insert(ResourceKind::LoadBalancer, vec![load_balancer("web")]);
    cloud
        .tags
        .insert("web".to_string(), vec![Tag::new("env", "dev")]);

    let series = Arc::new(OneSampleSeries::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let mut config = config();
    config.resources.elb = Some(monitored("RequestCount", vec![Tag::new("env", "prod")]));

    let report = run_harvest(
        &config,
        collaborators(cloud, series.clone(), publisher.clone()),
    )
    .await;

    assert_eq!(report.metrics_published, 0);
    assert!(report.errors.is_empty());
    assert_eq!(report.publish_error, None);
    assert!(series.requests.lock().unwrap().is_empty());
    assert!(publisher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failing_kind_does_not_affect_siblings() {
    let mut cloud = FakeCloud::default();
    cloud.failing.insert(
        ResourceKind::Volume,
        ProviderError::call("DescribeVolumes", "access denied"),
    );
    cloud
        .resources
        .insert(ResourceKind::Volume, vec![volume("vol-1")]);
    // more instances than one listing page holds
    let instances: Vec<ResourceDetail> = (0..450).map(|i| instance(&format!("i-{i:04}"))).collect();
    cloud.resources.insert(ResourceKind::Instance, instances);

    let series = Arc::new(OneSampleSeries::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let mut config = config();
    config.account_id = Some("123456789012".to_string());
    config.resources.ebs = Some(monitored("VolumeReadOps", vec![]));
    let mut ec2 = monitored("CPUUtilization", vec![]);
    ec2.custom_metrics = vec!["VCpuCount".to_string()];
    config.resources.ec2 = Some(ec2);

    let report = run_harvest(
        &config,
        collaborators(cloud, series.clone(), publisher.clone()),
    )
    .await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0],
        HarvestError::Provider {
            kind: ResourceKind::Volume,
            source: ProviderError::call("DescribeVolumes", "access denied"),
        }
    );
    assert_eq!(report.metrics_published, 900);

    let calls = publisher.calls.lock().unwrap();
    let points = &calls[0];
    assert!(points.iter().all(|p| p.properties["service"] == "ec2"));
    assert!(points
        .iter()
        .all(|p| p.properties["account_id"] == "123456789012"));
    let vcpus: Vec<&MetricPoint> = points
        .iter()
        .filter(|p| p.properties["what"] == "VCpuCount")
        .collect();
    assert_eq!(vcpus.len(), 450);
    assert!(vcpus.iter().all(|p| p.value == 2.0));
}

#[tokio::test]
async fn publish_to_anodot_retries_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/metrics")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("token".into(), "mock-token".into()),
            Matcher::UrlEncoded("protocol".into(), "anodot20".into()),
        ]))
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(2)
        .create_async()
        .await;

    let mut cloud = FakeCloud::default();
    cloud
        .resources
        .insert(ResourceKind::LoadBalancer, vec![load_balancer("web")]);
    let mut config = config();
    config.anodot_url = server.url();
    config.resources.elb = Some(monitored("Latency", vec![]));

    let client = AnodotClient::from_config(&config).expect("failed to build client");
    let report = run_harvest(
        &config,
        collaborators(cloud, Arc::new(OneSampleSeries::default()), Arc::new(client)),
    )
    .await;

    assert_eq!(report.metrics_published, 0);
    assert!(report.errors.is_empty());
    match report.publish_error {
        Some(PublishError::Transport(e)) => assert_eq!(e.message, "Service Unavailable"),
        other => panic!("unexpected publish outcome: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn publish_to_anodot_with_resolved_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/metrics")
        .match_query(Matcher::UrlEncoded("token".into(), "from-secret".into()))
        .with_status(200)
        .with_body(r#"{"errors":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut cloud = FakeCloud::default();
    cloud
        .resources
        .insert(ResourceKind::LoadBalancer, vec![load_balancer("web")]);
    let mut config = config();
    config.resources.elb = Some(monitored("Latency", vec![]));

    let factory = ApiTokenFactory::new_from_resolver(Arc::new(|| {
        Box::pin(async { "from-secret".to_string() })
    }));
    let client = AnodotClient::new(&server.url(), Arc::new(factory), Duration::from_secs(5), None)
        .expect("failed to build client");
    let report = run_harvest(
        &config,
        collaborators(cloud, Arc::new(OneSampleSeries::default()), Arc::new(client)),
    )
    .await;

    assert_eq!(report.metrics_published, 1);
    assert_eq!(report.publish_error, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn publish_to_anodot_unparseable_body_is_a_rejection() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/metrics")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .expect(2)
        .create_async()
        .await;

    let mut cloud = FakeCloud::default();
    cloud
        .resources
        .insert(ResourceKind::LoadBalancer, vec![load_balancer("web")]);
    let mut config = config();
    config.anodot_url = server.url();
    config.resources.elb = Some(monitored("Latency", vec![]));

    let client = AnodotClient::from_config(&config).expect("failed to build client");
    let report = run_harvest(
        &config,
        collaborators(cloud, Arc::new(OneSampleSeries::default()), Arc::new(client)),
    )
    .await;

    assert_eq!(report.metrics_published, 0);
    match report.publish_error {
        Some(PublishError::Rejected(e)) => assert!(e.message.starts_with("unparseable response")),
        other => panic!("unexpected publish outcome: {other:?}"),
    }
    mock.assert_async().await;
}
