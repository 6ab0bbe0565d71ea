use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fleetmetric_core::{Action, HandlerRequest, Outcome, ResourceModel};
use fleetmetric_handlers::config::{merge_tag_sources, resource_defined_tags};
use fleetmetric_handlers::{invoke, HandlerError};
use fleetmetric_remote::{FleetMetricClient, FleetSnapshot, InMemoryFleet};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fleetmetricctl", version, about = "Fleet metric lifecycle handlers")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Tags returned per ListTagsForResource page
    #[arg(long = "tag-page-size", env = "FLEETMETRIC_TAG_PAGE_SIZE", global = true, default_value_t = 25)]
    tag_page_size: usize,

    /// Descriptors returned per ListFleetMetrics page
    #[arg(long = "list-page-size", env = "FLEETMETRIC_LIST_PAGE_SIZE", global = true, default_value_t = 50)]
    list_page_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one handler invocation against an in-process fleet
    Invoke {
        /// Request envelope (JSON or YAML)
        request: PathBuf,
        /// Fleet state to start from (YAML)
        #[arg(long = "fixture")]
        fixture: Option<PathBuf>,
        /// Write the fleet state after the invocation here (YAML)
        #[arg(long = "state-out")]
        state_out: Option<PathBuf>,
    },
}

/// What the orchestrator hands a handler, before tag sources are merged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    action: Action,
    #[serde(default)]
    desired_resource_state: ResourceModel,
    #[serde(default)]
    previous_resource_state: Option<ResourceModel>,
    #[serde(default)]
    resource_tags: Option<HashMap<String, String>>,
    #[serde(default)]
    stack_tags: Option<HashMap<String, String>>,
    #[serde(default)]
    system_tags: Option<HashMap<String, String>>,
    #[serde(default)]
    next_token: Option<String>,
    #[serde(default)]
    client_request_token: Option<String>,
    #[serde(default)]
    aws_account_id: Option<String>,
}

impl Envelope {
    fn into_request(self) -> (Action, HandlerRequest) {
        // descriptor Tags win over the envelope's resourceTags on a shared key
        let resource_tags = merge_tag_sources(resource_defined_tags(&self.desired_resource_state), self.resource_tags);
        let request = HandlerRequest {
            desired_resource_tags: merge_tag_sources(resource_tags, self.stack_tags),
            desired_resource_state: self.desired_resource_state,
            previous_resource_state: self.previous_resource_state,
            previous_resource_tags: None,
            system_tags: self.system_tags,
            next_token: self.next_token,
            client_request_token: Some(self.client_request_token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
            aws_account_id: self.aws_account_id,
        };
        (self.action, request)
    }
}

/// Logs go to stderr under `FLEETMETRIC_LOG`; a Prometheus endpoint is
/// served when `FLEETMETRIC_METRICS_ADDR` names a socket address.
fn init_observability() {
    let directives = std::env::var("FLEETMETRIC_LOG").unwrap_or_else(|_| "info".to_string());
    let filter =
        tracing_subscriber::EnvFilter::from_str(&directives).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries the outcome document
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();

    let Ok(addr) = std::env::var("FLEETMETRIC_METRICS_ADDR") else { return };
    match addr.parse::<std::net::SocketAddr>() {
        Ok(sock) => match metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(sock).install() {
            Ok(()) => info!(%sock, "serving handler metrics"),
            Err(e) => warn!(error = %e, %sock, "handler metrics disabled"),
        },
        Err(_) => warn!(addr = %addr, "FLEETMETRIC_METRICS_ADDR is not host:port; handler metrics disabled"),
    }
}

fn load_envelope(path: &Path) -> Result<Envelope> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading request {}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both
    serde_yaml::from_str(&raw).with_context(|| format!("parsing request {}", path.display()))
}

fn load_fleet(fixture: Option<&Path>, tag_page_size: usize, list_page_size: usize) -> Result<InMemoryFleet> {
    let snapshot = match fixture {
        Some(p) => {
            let raw = std::fs::read_to_string(p).with_context(|| format!("reading fixture {}", p.display()))?;
            FleetSnapshot::from_yaml(&raw)?
        }
        None => FleetSnapshot::default(),
    };
    info!(metrics = snapshot.metrics.len(), indexing = snapshot.indexing_enabled, "fleet loaded");
    Ok(InMemoryFleet::from_snapshot(snapshot).with_page_sizes(tag_page_size, list_page_size))
}

fn print_outcome(output: Output, action: Action, outcome: &Outcome) -> Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        Output::Human => {
            match &outcome.error_code {
                None => println!("{} • {:?}", action.as_str(), outcome.status),
                Some(code) => println!(
                    "{} • {:?} • {} • {}",
                    action.as_str(),
                    outcome.status,
                    code,
                    outcome.message.as_deref().unwrap_or("-")
                ),
            }
            if let Some(m) = &outcome.resource_model {
                println!("{}", serde_yaml::to_string(m)?.trim_end());
            }
            if let Some(models) = &outcome.resource_models {
                println!("NAME                           ARN");
                for m in models {
                    println!("{:<30} {}", m.name(), m.metric_arn.as_deref().unwrap_or("-"));
                }
            }
            if let Some(t) = &outcome.next_token {
                println!("next token: {}", t);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_observability();
    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke { request, fixture, state_out } => {
            let (action, req) = load_envelope(&request)?.into_request();
            info!(action = action.as_str(), request = %request.display(), "invocation requested");
            let fleet = Arc::new(load_fleet(fixture.as_deref(), cli.tag_page_size, cli.list_page_size)?);
            let client: Arc<dyn FleetMetricClient> = fleet.clone();

            let model = req.desired_resource_state.clone();
            let outcome = match invoke(action, client, req).await {
                Ok(o) => o,
                Err(e @ HandlerError::AlreadyExists { .. }) => {
                    warn!(error = %e, "create conflict raised by handler");
                    e.into_outcome(Some(model))
                }
            };
            print_outcome(cli.output, action, &outcome)?;

            if let Some(path) = state_out {
                std::fs::write(&path, fleet.snapshot().to_yaml()?)
                    .with_context(|| format!("writing fleet state {}", path.display()))?;
                info!(path = %path.display(), "fleet state written");
            }
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(yaml: &str) -> Envelope {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn stack_tags_merge_under_resource_tags() {
        let (action, req) = envelope(
            r#"
action: CREATE
desiredResourceState:
  MetricName: m1
  Tags:
    - { Key: team, Value: iot }
stackTags: { team: platform, env: prod }
clientRequestToken: tok-1
"#,
        )
        .into_request();
        assert_eq!(action, Action::Create);
        let tags = req.desired_resource_tags.unwrap();
        assert_eq!(tags.get("team").map(String::as_str), Some("iot"));
        assert_eq!(tags.get("env").map(String::as_str), Some("prod"));
        assert_eq!(req.client_request_token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn descriptor_and_envelope_resource_tags_both_kept() {
        let (_, req) = envelope(
            r#"
action: UPDATE
desiredResourceState:
  MetricName: m1
  Tags:
    - { Key: team, Value: iot }
resourceTags: { owner: platform, team: other }
stackTags: { env: prod }
"#,
        )
        .into_request();
        let tags = req.desired_resource_tags.unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("team").map(String::as_str), Some("iot"));
        assert_eq!(tags.get("owner").map(String::as_str), Some("platform"));
        assert_eq!(tags.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn envelope_tags_used_when_model_declares_none() {
        let (_, req) = envelope(
            r#"{"action": "UPDATE", "desiredResourceState": {"MetricName": "m1"}, "resourceTags": {"a": "1"}}"#,
        )
        .into_request();
        assert_eq!(req.desired_resource_tags.unwrap().get("a").map(String::as_str), Some("1"));
        assert!(req.client_request_token.is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn no_tag_sources_means_no_desired_tags() {
        let (action, req) = envelope("action: LIST\n").into_request();
        assert_eq!(action, Action::List);
        assert!(req.desired_resource_tags.is_none());
    }
}
