//! Application state wiring the bridge components together.
//!
//! Components are generic over the `PlatformClient`/`BindingStore` traits;
//! AppState pins them to the concrete infra implementations.

use std::sync::Arc;

use bridge_core::bus::EventBus;
use bridge_core::ingest::WebhookIngestor;
use bridge_core::link::LinkManager;
use bridge_core::poller::QueuePoller;
use bridge_core::reply::ReplyRouter;
use bridge_infra::platform::HttpPlatformClient;
use bridge_infra::store::FileBindingStore;

/// Concrete type aliases pinned to the infra implementations.
pub type ConcretePoller = QueuePoller<HttpPlatformClient>;
pub type ConcreteReplyRouter = ReplyRouter<HttpPlatformClient>;
pub type ConcreteLinkManager = LinkManager<HttpPlatformClient, FileBindingStore>;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Platform transport for outbound actions.
    pub client: Arc<HttpPlatformClient>,
    /// Webhook ingestion pipeline.
    pub ingestor: Arc<WebhookIngestor>,
    /// Reply routing and dispatch.
    pub reply: Arc<ConcreteReplyRouter>,
    /// On-demand queue polling; None when no tenant is configured.
    pub poller: Option<Arc<ConcretePoller>>,
    /// Canonical-event bus (workflow subscribers attach here).
    pub bus: EventBus,
    /// The single configured webhook path segment.
    pub webhook_path: String,
}
