//! Timed queue poll loop with at-least-once delivery.
//!
//! Each tick runs Polling -> Emitting -> Acknowledging. Emission happens
//! before acknowledgement so a crash between the two favors redelivery
//! over message loss. Tick errors (fetch or acknowledge) are logged and
//! swallowed -- the loop must self-heal on the next tick. Overlapping
//! ticks are skipped, never queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use bridge_types::config::PollConfig;
use bridge_types::event::{CanonicalEvent, EventSource, QueueMeta};
use bridge_types::queue::QueueMessage;

use crate::bus::EventBus;
use crate::client::PlatformClient;
use crate::normalize::{normalize_event, parse_data};

/// Header keys consulted for the per-message tenant fallback.
const TENANT_HEADER_KEYS: &[&str] = &["x-tenant-id", "tenant_id"];

/// Result of one poll tick.
#[derive(Debug, Default, Serialize)]
pub struct TickOutcome {
    /// A prior tick was still in flight; nothing ran.
    pub skipped: bool,
    /// Ids emitted to the bus this tick.
    pub emitted: Vec<i64>,
    /// Ids that found no subscriber and were reported failed instead.
    pub failed: Vec<i64>,
    /// Whether the batched acknowledge call succeeded.
    pub acknowledged: bool,
}

impl TickOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Pull-side entry point: polls the platform queue on a fixed period and
/// emits canonical events.
pub struct QueuePoller<C> {
    client: Arc<C>,
    bus: EventBus,
    tenant_id: String,
    config: PollConfig,
    in_flight: AtomicBool,
}

impl<C: PlatformClient + 'static> QueuePoller<C> {
    pub fn new(client: Arc<C>, bus: EventBus, tenant_id: String, config: PollConfig) -> Self {
        Self {
            client,
            bus,
            tenant_id,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Start the poll loop on the given period.
    ///
    /// The interval's first tick fires immediately (eager initial poll).
    /// Cancellation stops the timer; an in-flight tick completes without
    /// interruption because the tick body runs outside the select.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(self.config.interval_secs.max(1));
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                tenant_id = %self.tenant_id,
                interval_secs = self.config.interval_secs,
                batch_size = self.config.effective_batch_size(),
                "queue poller started"
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!(tenant_id = %self.tenant_id, "queue poller stopped");
                        break;
                    }
                    _ = interval.tick() => {}
                }
                let _ = self.run_once().await;
            }
        })
    }

    /// Run exactly one tick synchronously.
    ///
    /// Skips (does not queue) when a prior tick is still in flight.
    pub async fn run_once(&self) -> TickOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::warn!(tenant_id = %self.tenant_id, "previous tick still in flight, skipping");
            return TickOutcome::skipped();
        }
        let outcome = self.tick().await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    /// One Polling -> Emitting -> Acknowledging pass.
    async fn tick(&self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        let messages = match self
            .client
            .poll_queue(
                &self.tenant_id,
                self.config.effective_batch_size(),
                self.config.queue_name.as_deref(),
            )
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(tenant_id = %self.tenant_id, error = %e, "queue poll failed");
                return outcome;
            }
        };

        if messages.is_empty() {
            return outcome;
        }

        for message in &messages {
            let id = message.id;
            let event = queue_event(message, &self.tenant_id);
            if self.bus.deliver(event) {
                outcome.emitted.push(id);
            } else {
                outcome.failed.push(id);
            }
        }

        // Failed deliveries are annotated on the platform so they are not
        // lost silently; acknowledgement is withheld for them.
        if !outcome.failed.is_empty() {
            tracing::warn!(
                tenant_id = %self.tenant_id,
                count = outcome.failed.len(),
                "no active subscriber, reporting messages as failed"
            );
            if let Err(e) = self
                .client
                .fail_messages(&self.tenant_id, &outcome.failed, "no active workflow subscriber")
                .await
            {
                tracing::warn!(tenant_id = %self.tenant_id, error = %e, "fail report did not reach the platform");
            }
        }

        // Acknowledge the whole emitted batch in one call, after emission.
        if !outcome.emitted.is_empty() {
            match self.client.acknowledge(&self.tenant_id, &outcome.emitted).await {
                Ok(()) => {
                    outcome.acknowledged = true;
                    tracing::debug!(
                        tenant_id = %self.tenant_id,
                        count = outcome.emitted.len(),
                        "batch acknowledged"
                    );
                }
                Err(e) => {
                    // Swallowed: the platform may redeliver (at-least-once).
                    tracing::warn!(tenant_id = %self.tenant_id, error = %e, "acknowledge failed");
                }
            }
        }

        outcome
    }
}

/// Build the canonical event for one queue message.
///
/// The parsed `payload.data` runs through the same alias chain as webhook
/// payloads, so queue-sourced events carry the canonical fields when the
/// payload has them. Delivery metadata lands in `QueueMeta`.
fn queue_event(message: &QueueMessage, polling_tenant: &str) -> CanonicalEvent {
    let payload = message
        .payload
        .data
        .as_deref()
        .map(parse_data)
        .unwrap_or(Value::Null);

    let mut event = normalize_event(EventSource::Queue, &payload, None);
    if event.event_type.is_none() {
        event.event_type = Some("queue_message".to_string());
    }

    let tenant_id = TENANT_HEADER_KEYS
        .iter()
        .find_map(|key| {
            message
                .payload
                .headers
                .get(*key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| polling_tenant.to_string());

    event.queue = Some(QueueMeta {
        message_id: message.id,
        correlation_id: message.correlation_id.clone(),
        queue_name: message.queue_name.clone(),
        payload,
        params: message.payload.params.clone(),
        headers: message.payload.headers.clone(),
        inserted_at: message.inserted_at.map(|t| t.to_rfc3339()),
        tenant_id: Some(tenant_id),
    });

    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::queue::QueuePayload;
    use serde_json::json;

    use crate::testutil::FakeClient;

    fn message(id: i64, data: &str) -> QueueMessage {
        QueueMessage {
            id,
            correlation_id: Some(format!("corr-{id}")),
            queue_name: Some("inbound".to_string()),
            payload: QueuePayload {
                data: Some(data.to_string()),
                params: Value::Null,
                headers: Value::Null,
            },
            inserted_at: None,
        }
    }

    fn poller(client: Arc<FakeClient>, bus: EventBus) -> QueuePoller<FakeClient> {
        QueuePoller::new(
            client,
            bus,
            "t1".to_string(),
            PollConfig {
                batch_size: 2,
                ..PollConfig::default()
            },
        )
    }

    // -------------------------------------------------------------------
    // Emit-then-acknowledge
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn batch_emitted_then_acknowledged_once() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![
            message(10, r#"{"content":"a"}"#),
            message(11, r#"{"content":"b"}"#),
        ]]));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        let outcome = poller.run_once().await;

        assert!(!outcome.skipped);
        assert_eq!(outcome.emitted, vec![10, 11]);
        assert!(outcome.acknowledged);

        // two canonical events on the bus
        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.queue.as_ref().unwrap().message_id, 10);
        assert_eq!(second.queue.as_ref().unwrap().message_id, 11);
        assert_eq!(first.message.as_deref(), Some("a"));

        // exactly one acknowledge call carrying exactly the emitted ids
        let ack_calls = client.ack_calls.lock().unwrap();
        assert_eq!(ack_calls.len(), 1);
        assert_eq!(ack_calls[0], vec![10, 11]);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_acknowledge_call() {
        let client = Arc::new(FakeClient::default());
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        let outcome = poller.run_once().await;

        assert!(outcome.emitted.is_empty());
        assert!(client.ack_calls.lock().unwrap().is_empty());
    }

    // -------------------------------------------------------------------
    // Loop liveness
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn acknowledge_failure_does_not_stop_next_tick() {
        let client = Arc::new(FakeClient::with_batches(vec![
            vec![message(1, "{}")],
            vec![message(2, "{}")],
        ]));
        *client.ack_fails.lock().unwrap() = true;
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        let first = poller.run_once().await;
        assert_eq!(first.emitted, vec![1]);
        assert!(!first.acknowledged);

        // next tick still polls and emits
        let second = poller.run_once().await;
        assert_eq!(second.emitted, vec![2]);
        assert_eq!(*client.poll_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn poll_failure_is_swallowed() {
        let client = Arc::new(FakeClient::default());
        *client.poll_error.lock().unwrap() = Some("connection refused".to_string());
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        let outcome = poller.run_once().await;
        assert!(outcome.emitted.is_empty());
        assert!(!outcome.acknowledged);

        // loop recovers once the error clears
        *client.poll_error.lock().unwrap() = None;
        let outcome = poller.run_once().await;
        assert!(!outcome.skipped);
        assert_eq!(*client.poll_calls.lock().unwrap(), 2);
    }

    // -------------------------------------------------------------------
    // Delivery guarantees
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn no_subscriber_fails_messages_instead_of_acknowledging() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![message(5, "{}")]]));
        let bus = EventBus::new(16); // no subscriber
        let poller = poller(Arc::clone(&client), bus);

        let outcome = poller.run_once().await;

        assert!(outcome.emitted.is_empty());
        assert_eq!(outcome.failed, vec![5]);
        assert!(client.ack_calls.lock().unwrap().is_empty());
        let fail_calls = client.fail_calls.lock().unwrap();
        assert_eq!(fail_calls.len(), 1);
        assert_eq!(fail_calls[0].0, vec![5]);
    }

    // -------------------------------------------------------------------
    // Payload parsing and tenant fallback
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn unparseable_data_kept_as_raw_string() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![message(
            7,
            "plain text payload",
        )]]));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        let outcome = poller.run_once().await;
        assert_eq!(outcome.emitted, vec![7]);

        let event = rx.try_recv().unwrap();
        let meta = event.queue.unwrap();
        assert_eq!(meta.payload, json!("plain text payload"));
        assert_eq!(event.event_type.as_deref(), Some("queue_message"));
    }

    #[tokio::test]
    async fn tenant_header_overrides_polling_tenant() {
        let mut msg = message(8, "{}");
        msg.payload.headers = json!({"x-tenant-id": "t-other"});
        let client = Arc::new(FakeClient::with_batches(vec![vec![msg]]));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        poller.run_once().await;

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event.queue.unwrap().tenant_id.as_deref(),
            Some("t-other")
        );
    }

    #[tokio::test]
    async fn tenant_falls_back_to_polling_tenant() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![message(9, "{}")]]));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        poller.run_once().await;

        let event = rx.try_recv().unwrap();
        assert_eq!(event.queue.unwrap().tenant_id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn queue_payload_runs_through_alias_chain() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![message(
            12,
            r#"{"content":"hi","thread_id":"c1","event_type":"message"}"#,
        )]]));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let poller = poller(Arc::clone(&client), bus);

        poller.run_once().await;

        let event = rx.try_recv().unwrap();
        assert_eq!(event.source, EventSource::Queue);
        assert_eq!(event.message.as_deref(), Some("hi"));
        assert_eq!(event.conversation_id.as_deref(), Some("c1"));
        assert_eq!(event.event_type.as_deref(), Some("message"));
    }

    // -------------------------------------------------------------------
    // Single-flight and lifecycle
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn concurrent_tick_is_skipped() {
        let client = Arc::new(FakeClient::default());
        let bus = EventBus::new(16);
        let poller = poller(Arc::clone(&client), bus);

        poller.in_flight.store(true, Ordering::SeqCst);
        let outcome = poller.run_once().await;
        assert!(outcome.skipped);
        assert_eq!(*client.poll_calls.lock().unwrap(), 0);

        poller.in_flight.store(false, Ordering::SeqCst);
        let outcome = poller.run_once().await;
        assert!(!outcome.skipped);
    }

    #[tokio::test]
    async fn spawn_polls_eagerly_and_stops_on_cancel() {
        let client = Arc::new(FakeClient::with_batches(vec![vec![message(1, "{}")]]));
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let poller = Arc::new(QueuePoller::new(
            Arc::clone(&client),
            bus,
            "t1".to_string(),
            PollConfig {
                interval_secs: 3600,
                ..PollConfig::default()
            },
        ));

        let cancel = CancellationToken::new();
        let handle = Arc::clone(&poller).spawn(cancel.clone());

        // the eager first tick fires without waiting for the period
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*client.poll_calls.lock().unwrap(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }
}
