// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Governance HTTP server
//!
//! Builds the service graph once from configuration and serves the REST API
//! until Ctrl+C / SIGTERM.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use dao_governance_core::{
    application::{NotificationRelay, StandardGovernanceService},
    domain::{
        collaborators::{DiscussionBridge, NotificationSender},
        config::{GovernanceConfig, GovernanceSpec},
        repository::ProposalRepository,
    },
    infrastructure::{
        EventBus, InMemoryProposalRepository, InMemoryVoteRepository, InMemoryWorkflowRepository,
        LoggingNotificationSender, NoopDiscussionBridge, WebhookDiscussionBridge,
        WebhookNotificationSender,
    },
    presentation,
};

/// Everything `serve` and `simulate` need, wired once.
pub struct ServiceGraph {
    pub service: Arc<StandardGovernanceService>,
    pub relay: Arc<NotificationRelay>,
    pub event_bus: EventBus,
}

pub fn build_service_graph(spec: &GovernanceSpec) -> Result<ServiceGraph> {
    let event_bus = EventBus::new(spec.event_bus_capacity);
    let proposals: Arc<dyn ProposalRepository> = Arc::new(InMemoryProposalRepository::new());

    let service = Arc::new(StandardGovernanceService::new(
        spec,
        proposals.clone(),
        Arc::new(InMemoryVoteRepository::new()),
        Arc::new(InMemoryWorkflowRepository::new()),
        event_bus.clone(),
    ));

    let collaborators = &spec.collaborators;
    let notifier: Arc<dyn NotificationSender> = match &collaborators.notification_webhook {
        Some(url) => {
            info!("Notifications delivered to {}", url);
            Arc::new(
                WebhookNotificationSender::new(url.clone(), collaborators.timeout)
                    .context("Failed to configure notification webhook")?,
            )
        }
        None => Arc::new(LoggingNotificationSender),
    };
    let discussions: Arc<dyn DiscussionBridge> = match &collaborators.discussion_webhook {
        Some(url) => {
            info!("Discussion threads created through {}", url);
            Arc::new(
                WebhookDiscussionBridge::new(url.clone(), collaborators.timeout)
                    .context("Failed to configure discussion webhook")?,
            )
        }
        None => Arc::new(NoopDiscussionBridge),
    };
    let relay = Arc::new(NotificationRelay::new(notifier, discussions, proposals));

    Ok(ServiceGraph {
        service,
        relay,
        event_bus,
    })
}

pub async fn start_server(config_path: Option<PathBuf>, port_override: Option<u16>) -> Result<()> {
    let mut config =
        GovernanceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    if let Some(port) = port_override {
        config.spec.server.port = port;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Configuration loaded: name={}, quorum={}, supported_types={}",
        config.metadata.name,
        config.spec.voting.quorum_fraction,
        config.spec.proposals.supported_types.len()
    );

    if let Some(port) = config.spec.observability.metrics_port {
        install_metrics_exporter(port)?;
    }

    let graph = build_service_graph(&config.spec)?;
    let _relay_task = graph.relay.clone().start(&graph.event_bus);

    let addr = format!("{}:{}", config.spec.server.bind_address, config.spec.server.port);
    let app = presentation::app(graph.service.clone(), Arc::new(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Governance API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Governance server shutting down");

    Ok(())
}

fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    metrics::describe_counter!("governance_proposals_created_total", "Proposals created");
    metrics::describe_counter!(
        "governance_stage_transitions_total",
        "Proposal stage transitions by target stage"
    );
    metrics::describe_counter!("governance_votes_cast_total", "Votes cast by option");
    metrics::describe_counter!("governance_votes_replaced_total", "Votes that replaced an earlier vote");
    metrics::describe_counter!(
        "governance_proposals_finalized_total",
        "Finalized proposals by outcome"
    );
    metrics::describe_counter!(
        "governance_collaborator_failures_total",
        "Failed notification or discussion deliveries"
    );

    info!("Prometheus metrics exposed on {}", addr);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
