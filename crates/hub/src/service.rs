//! Command dispatch and notification services.
//!
//! Both are fire-and-forget at the protocol level: callers log failures and
//! move on, they never wait on an outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::entity::EntityId;
use crate::error::Result;

/// A service invocation against the hub, e.g. `switch.turn_off`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    /// Service domain (`switch`).
    pub domain: String,
    /// Service action (`turn_off`).
    pub service: String,
    /// Target entity.
    pub target: EntityId,
}

impl ServiceCall {
    /// Create a service call.
    pub fn new(domain: impl Into<String>, service: impl Into<String>, target: EntityId) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            target,
        }
    }

    /// The one command this add-on is allowed to issue.
    pub fn turn_off(target: &EntityId) -> Self {
        Self::new("switch", "turn_off", target.clone())
    }
}

/// Dispatches service calls to the hub.
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// Dispatch a call. Callers treat the result as best-effort.
    async fn dispatch(&self, call: &ServiceCall) -> Result<()>;
}

/// Delivers user-visible notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Callers treat the result as best-effort.
    async fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Command bus that only logs (embedding default).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCommandBus;

#[async_trait]
impl CommandBus for TracingCommandBus {
    async fn dispatch(&self, call: &ServiceCall) -> Result<()> {
        info!(
            domain = %call.domain,
            service = %call.service,
            target = %call.target,
            "Dispatching service call"
        );
        Ok(())
    }
}

/// Notifier that only logs (embedding default).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        info!(title = %title, message = %message, "Notification");
        Ok(())
    }
}

/// Command bus that records dispatched calls (for testing).
#[derive(Default)]
pub struct RecordingCommandBus {
    calls: Mutex<Vec<ServiceCall>>,
}

impl RecordingCommandBus {
    /// Create a new recording bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new recording bus wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// All calls dispatched so far, in order.
    pub async fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CommandBus for RecordingCommandBus {
    async fn dispatch(&self, call: &ServiceCall) -> Result<()> {
        self.calls.lock().await.push(call.clone());
        Ok(())
    }
}

/// Notifier that records messages (for testing).
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new recording notifier wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// All `(title, message)` pairs delivered so far, in order.
    pub async fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        self.messages
            .lock()
            .await
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(raw: &str) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn test_turn_off_call_shape() {
        let call = ServiceCall::turn_off(&id("switch.kettle_keep_warm"));
        assert_eq!(call.domain, "switch");
        assert_eq!(call.service, "turn_off");
        assert_eq!(call.target.as_str(), "switch.kettle_keep_warm");
    }

    #[tokio::test]
    async fn should_record_dispatched_calls_in_order() {
        let bus = RecordingCommandBus::new();
        let first = ServiceCall::turn_off(&id("switch.kettle_keep_warm"));
        let second = ServiceCall::new("switch", "turn_off", id("switch.other"));

        bus.dispatch(&first).await.unwrap();
        bus.dispatch(&second).await.unwrap();

        assert_eq!(bus.calls().await, vec![first, second]);
    }

    #[tokio::test]
    async fn should_record_notifications() {
        let notifier = RecordingNotifier::new();
        notifier.notify("Kettle", "something happened").await.unwrap();

        let messages = notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "Kettle");
    }

    #[tokio::test]
    async fn test_tracing_impls_always_succeed() {
        let call = ServiceCall::turn_off(&id("switch.kettle_keep_warm"));
        assert!(TracingCommandBus.dispatch(&call).await.is_ok());
        assert!(TracingNotifier.notify("Kettle", "hi").await.is_ok());
    }
}
