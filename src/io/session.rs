//! MQTT subscription session for broker `$SYS` topics
//!
//! Startup drives the rumqttc event loop inline so that connect and
//! subscribe failures surface as errors. Once subscribed, the event loop
//! moves into a delivery task that feeds every publish to the decoder.
//! The session is clean, so a reconnect starts with no subscriptions on the
//! broker side; the delivery task re-issues them on every fresh CONNACK.

use crate::domain::decoder::{DecodeOutcome, Decoder};
use crate::domain::display::SharedState;
use crate::infra::config::Config;
use crate::infra::metrics::SessionMetrics;
use anyhow::{bail, Context};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, Publish, QoS,
    SubscribeReasonCode,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Backoff between polls after a transport error
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Routes inbound publishes into the shared display state
pub struct Dispatcher {
    decoder: Decoder,
    state: SharedState,
    metrics: Arc<SessionMetrics>,
}

impl Dispatcher {
    pub fn new(decoder: Decoder, state: SharedState, metrics: Arc<SessionMetrics>) -> Self {
        Self { decoder, state, metrics }
    }

    /// Decode one publish under the state lock
    pub fn dispatch(&self, publish: &Publish) -> DecodeOutcome {
        let outcome = {
            let mut state = self.state.lock();
            self.decoder.decode(&mut state, &publish.topic, &publish.payload)
        };
        self.metrics.record(outcome);

        match outcome {
            DecodeOutcome::Updated => debug!(topic = %publish.topic, "field_updated"),
            DecodeOutcome::Rejected => debug!(
                topic = %publish.topic,
                payload = %String::from_utf8_lossy(&publish.payload),
                "payload_rejected"
            ),
            DecodeOutcome::Ignored => {}
        }
        outcome
    }

    fn set_link(&self, connected: bool) {
        self.state.lock().broker_connected = connected;
    }
}

/// Connected session that has not started its delivery task yet
pub struct Session {
    client: AsyncClient,
    eventloop: EventLoop,
    dispatcher: Dispatcher,
    subscribed: Vec<String>,
}

impl Session {
    /// Connect to the configured broker and wait for CONNACK
    pub async fn connect(
        config: &Config,
        state: SharedState,
        metrics: Arc<SessionMetrics>,
    ) -> anyhow::Result<Self> {
        let broker = config.broker();
        let mut mqttoptions = MqttOptions::new(config.client_id(), broker.host(), broker.port());
        mqttoptions.set_keep_alive(config.keep_alive());
        mqttoptions.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, 100);

        loop {
            let event = eventloop
                .poll()
                .await
                .with_context(|| format!("failed to connect to broker {}", broker))?;
            if let Event::Incoming(Packet::ConnAck(ack)) = event {
                if ack.code != ConnectReturnCode::Success {
                    bail!("broker {} refused connection: {:?}", broker, ack.code);
                }
                break;
            }
        }

        info!(broker = %broker, client_id = %config.client_id(), "session_connected");
        let dispatcher = Dispatcher::new(Decoder::new(config.topic_prefix()), state, metrics);
        dispatcher.set_link(true);

        Ok(Self { client, eventloop, dispatcher, subscribed: Vec::new() })
    }

    /// Subscribe one topic at most once (QoS 0) and wait for its SUBACK
    ///
    /// Publishes that arrive while waiting are dispatched normally.
    pub async fn subscribe(&mut self, topic: &str) -> anyhow::Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .with_context(|| format!("failed to request subscription to {}", topic))?;

        let mut pkid = None;
        loop {
            let event = self
                .eventloop
                .poll()
                .await
                .with_context(|| format!("connection lost while subscribing to {}", topic))?;
            match event {
                Event::Outgoing(Outgoing::Subscribe(id)) if pkid.is_none() => pkid = Some(id),
                Event::Incoming(Packet::SubAck(ack)) if Some(ack.pkid) == pkid => {
                    return match ack.return_codes.first() {
                        Some(SubscribeReasonCode::Success(qos)) => {
                            debug!(topic = %topic, qos = ?qos, "subscribed");
                            self.subscribed.push(topic.to_string());
                            Ok(())
                        }
                        other => bail!("broker rejected subscription to {}: {:?}", topic, other),
                    };
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    self.dispatcher.dispatch(&publish);
                }
                _ => {}
            }
        }
    }

    /// Subscribe every topic in order, stopping at the first failure
    pub async fn subscribe_all(&mut self, topics: &[String]) -> anyhow::Result<()> {
        for topic in topics {
            self.subscribe(topic).await?;
        }
        info!(count = %topics.len(), "session_subscribed");
        Ok(())
    }

    /// Move the event loop into the delivery task
    pub fn start(self) -> SessionHandle {
        let disconnecting = Arc::new(AtomicBool::new(false));
        let delivery = Delivery {
            client: self.client.clone(),
            topics: self.subscribed,
            dispatcher: self.dispatcher,
        };
        let task = tokio::spawn(deliver(self.eventloop, delivery, disconnecting.clone()));
        SessionHandle { client: self.client, task, disconnecting }
    }
}

/// Running session; consumed by `disconnect`
pub struct SessionHandle {
    client: AsyncClient,
    task: JoinHandle<()>,
    disconnecting: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Send DISCONNECT and give the delivery task `grace` to flush it
    pub async fn disconnect(mut self, grace: Duration) {
        self.disconnecting.store(true, Ordering::Release);
        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "session_disconnect_request_failed");
        }

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(_) => info!("session_disconnected"),
            Err(_) => {
                warn!(grace_ms = %grace.as_millis(), "session_disconnect_timeout");
                self.task.abort();
            }
        }
    }
}

/// State owned by the delivery task
struct Delivery {
    client: AsyncClient,
    topics: Vec<String>,
    dispatcher: Dispatcher,
}

/// Queue a QoS 0 subscription per topic without waiting for SUBACKs
///
/// Runs inside the poll loop, so requests must not block on the event loop
/// that would drain them. Returns how many were queued.
fn resubscribe(client: &AsyncClient, topics: &[String]) -> usize {
    let mut queued = 0;
    for topic in topics {
        match client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
            Ok(()) => queued += 1,
            Err(e) => warn!(topic = %topic, error = %e, "resubscribe_request_failed"),
        }
    }
    queued
}

async fn deliver(mut eventloop: EventLoop, delivery: Delivery, disconnecting: Arc<AtomicBool>) {
    let Delivery { client, topics, dispatcher } = delivery;
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                dispatcher.dispatch(&publish);
            }
            // rumqttc turns a refused CONNACK into an error, so this one is accepted
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if !ack.session_present {
                    let queued = resubscribe(&client, &topics);
                    info!(count = %queued, "session_resubscribed");
                }
                info!("session_reconnected");
                dispatcher.set_link(true);
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                if ack.return_codes.iter().any(|code| matches!(code, SubscribeReasonCode::Failure)) {
                    warn!(pkid = %ack.pkid, "resubscribe_rejected");
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("session_disconnect_sent");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                if disconnecting.load(Ordering::Acquire) {
                    return;
                }
                dispatcher.set_link(false);
                warn!(error = %e, "session_connection_error");
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display;
    use crate::domain::topics::SYS_BROKER_PREFIX;

    fn publish(topic: &str, payload: &str) -> Publish {
        Publish::new(topic, QoS::AtMostOnce, payload.as_bytes().to_vec())
    }

    fn dispatcher() -> (Dispatcher, SharedState, Arc<SessionMetrics>) {
        let state = display::shared();
        let metrics = Arc::new(SessionMetrics::new());
        let dispatcher = Dispatcher::new(Decoder::new(SYS_BROKER_PREFIX), state.clone(), metrics.clone());
        (dispatcher, state, metrics)
    }

    #[test]
    fn test_dispatch_updates_shared_state() {
        let (dispatcher, state, metrics) = dispatcher();

        assert_eq!(
            dispatcher.dispatch(&publish("$SYS/broker/clients/connected", "5")),
            DecodeOutcome::Updated
        );
        assert_eq!(
            dispatcher.dispatch(&publish("$SYS/broker/clients/maximum", "ten")),
            DecodeOutcome::Rejected
        );
        assert_eq!(
            dispatcher.dispatch(&publish("$SYS/broker/messages/inflight", "3")),
            DecodeOutcome::Ignored
        );

        let state = state.lock();
        assert_eq!(state.connection_count, 5);
        assert_eq!(state.max_connection_count, 2);

        let summary = metrics.snapshot();
        assert_eq!(summary.messages_received, 3);
        assert_eq!(summary.payloads_rejected, 1);
        assert_eq!(summary.topics_ignored, 1);
    }

    #[tokio::test]
    async fn test_resubscribe_queues_every_topic() {
        let options = rumqttc::MqttOptions::new("resubscribe-test", "127.0.0.1", 1);
        let (client, eventloop) = AsyncClient::new(options, 16);
        let topics = crate::domain::topics::subscription_list(SYS_BROKER_PREFIX);

        assert_eq!(resubscribe(&client, &topics), topics.len());
        assert_eq!(resubscribe(&client, &[]), 0);

        // Requests only reach the wire once the event loop polls
        drop(eventloop);
        assert_eq!(resubscribe(&client, &topics), 0);
    }

    #[test]
    fn test_link_status() {
        let (dispatcher, state, _) = dispatcher();
        dispatcher.set_link(true);
        assert!(state.lock().broker_connected);
        dispatcher.set_link(false);
        assert!(!state.lock().broker_connected);
    }
}
