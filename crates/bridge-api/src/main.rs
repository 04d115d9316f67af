//! CribOps bridge entry point.
//!
//! Binary name: `cbridge`
//!
//! Loads configuration, wires the platform client, event bus, webhook
//! ingestor and queue poller, performs the optional startup webhook link,
//! and serves the HTTP receiver until ctrl-c.

mod http;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use bridge_core::bus::EventBus;
use bridge_core::ingest::WebhookIngestor;
use bridge_infra::config::{load_config, resolve_api_token};
use bridge_infra::platform::HttpPlatformClient;
use bridge_infra::store::FileBindingStore;
use bridge_types::binding::LinkRequest;

use http::router::build_router;
use state::{AppState, ConcreteLinkManager, ConcretePoller, ConcreteReplyRouter};

#[derive(Parser)]
#[command(name = "cbridge", version, about = "Workflow bridge for the CribOps agent platform")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml", env = "CRIBOPS_BRIDGE_CONFIG")]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    bridge_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let config = load_config(&cli.config).await;
    let api_token = resolve_api_token(&config).ok_or_else(|| {
        anyhow::anyhow!(
            "no API token configured; set {} or platform.api_token",
            bridge_infra::config::TOKEN_ENV_VAR
        )
    })?;

    let client = Arc::new(HttpPlatformClient::new(
        config.platform.base_url.clone(),
        api_token,
    ));
    let bus = EventBus::new(1024);
    let ingestor = Arc::new(WebhookIngestor::new(&config.webhook, bus.clone()));
    let reply = Arc::new(ConcreteReplyRouter::new(Arc::clone(&client)));
    let store = Arc::new(FileBindingStore::new(config.server.data_dir.clone()));
    let link_manager = ConcreteLinkManager::new(Arc::clone(&client), store);

    // Link on activate: a remote failure aborts startup.
    if let Some(link) = &config.link {
        if !link_manager.check_exists(&link.node_key).await? {
            link_manager
                .create(
                    &link.node_key,
                    &link.webhook_id,
                    LinkRequest {
                        workflow_id: link.workflow_id.clone(),
                        webhook_url: link.callback_url.clone(),
                        test_webhook_url: link.test_callback_url.clone(),
                        workflow_name: link.workflow_name.clone(),
                    },
                )
                .await?;
        }
    }

    // Queue polling runs only with a tenant scope.
    let cancel = CancellationToken::new();
    let (poller, poller_handle) = match config.platform.tenant_id.clone() {
        Some(tenant_id) => {
            let poller = Arc::new(ConcretePoller::new(
                Arc::clone(&client),
                bus.clone(),
                tenant_id,
                config.poll.clone(),
            ));
            let handle = Arc::clone(&poller).spawn(cancel.clone());
            (Some(poller), Some(handle))
        }
        None => {
            tracing::info!("no tenant_id configured, queue polling disabled");
            (None, None)
        }
    };

    let app_state = AppState {
        client: Arc::clone(&client),
        ingestor,
        reply,
        poller,
        bus,
        webhook_path: config.webhook.path.clone(),
    };
    let router = build_router(app_state);

    let bind_addr = cli.bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, webhook_path = %config.webhook.path, "bridge listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // Stop the poll timer; an in-flight tick completes on its own.
    cancel.cancel();
    if let Some(handle) = poller_handle {
        let _ = handle.await;
    }

    // Unlink on deactivate: failures are logged, never block shutdown.
    if let Some(link) = &config.link {
        if let Err(e) = link_manager.delete(&link.node_key).await {
            tracing::warn!(error = %e, "webhook unlink failed during shutdown");
        }
    }

    bridge_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
