//! Aggregate handle bundling the hub collaborators.

use std::sync::Arc;

use crate::bus::StateChangeBus;
use crate::clock::{Clock, SystemClock};
use crate::service::{CommandBus, Notifier, TracingCommandBus, TracingNotifier};
use crate::state::StateRegistry;

/// Shared handles to the hub runtime a protocol instance is wired against.
///
/// Cloning is cheap; all fields are shared.
#[derive(Clone)]
pub struct Hub {
    /// Live entity states.
    pub registry: Arc<StateRegistry>,
    /// State-change fan-out.
    pub bus: Arc<StateChangeBus>,
    /// Service-call dispatch.
    pub commands: Arc<dyn CommandBus>,
    /// User-visible notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Hub {
    /// Build a hub with the default (tracing-only) services and system clock.
    pub fn new() -> Self {
        HubBuilder::new().build()
    }

    /// Start building a hub with custom services.
    pub fn builder() -> HubBuilder {
        HubBuilder::new()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Hub`].
pub struct HubBuilder {
    commands: Arc<dyn CommandBus>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl HubBuilder {
    /// Create a builder with default services.
    pub fn new() -> Self {
        Self {
            commands: Arc::new(TracingCommandBus),
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the command bus.
    #[must_use]
    pub fn with_commands(mut self, commands: Arc<dyn CommandBus>) -> Self {
        self.commands = commands;
        self
    }

    /// Set the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the hub; the registry publishes on a fresh bus.
    pub fn build(self) -> Hub {
        let bus = Arc::new(StateChangeBus::new());
        let registry = Arc::new(StateRegistry::new(Arc::clone(&bus)));
        Hub {
            registry,
            bus,
            commands: self.commands,
            notifier: self.notifier,
            clock: self.clock,
        }
    }
}

impl Default for HubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::service::RecordingCommandBus;

    #[tokio::test]
    async fn should_wire_registry_to_its_bus() {
        let hub = Hub::new();
        let switch = EntityId::new("switch.kettle_keep_warm").unwrap();

        let (_sub_id, mut sub) = hub.bus.subscribe(std::slice::from_ref(&switch)).await;
        hub.registry.set(switch, "on").await;

        assert!(sub.recv().await.is_ok());
    }

    #[tokio::test]
    async fn should_use_builder_services() {
        let commands = RecordingCommandBus::new_arc();
        let hub = Hub::builder()
            .with_commands(Arc::clone(&commands) as Arc<dyn crate::service::CommandBus>)
            .build();

        let switch = EntityId::new("switch.kettle_keep_warm").unwrap();
        let call = crate::service::ServiceCall::turn_off(&switch);
        hub.commands.dispatch(&call).await.unwrap();

        assert_eq!(commands.calls().await.len(), 1);
    }
}
