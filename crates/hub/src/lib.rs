//! Smart-home hub boundary for samovar.
//!
//! This crate holds everything the keep-warm protocol needs from its host
//! platform, expressed as traits and small runtime pieces:
//!
//! - **Entities**: validated `domain.object_id` identifiers and state-change
//!   notifications
//! - **State registry**: live entity states; writes publish on the bus
//! - **Change bus**: pub/sub fan-out filtered per subscriber to an entity set
//! - **Durable store**: load/save of a JSON mapping, in-memory or file-backed
//! - **Services**: fire-and-forget command dispatch and notifications
//! - **Clock**: wall-clock or manually-driven time
//!
//! # Example
//!
//! ```ignore
//! use samovar_hub::{EntityId, Hub};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = Hub::new();
//!     let switch = EntityId::new("switch.kettle_keep_warm").unwrap();
//!
//!     let (_id, mut sub) = hub.bus.subscribe(&[switch.clone()]).await;
//!     hub.registry.set(switch, "on").await;
//!
//!     let change = sub.recv().await.unwrap();
//!     println!("{} -> {:?}", change.entity_id, change.new_value);
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod bus;
pub mod clock;
pub mod entity;
pub mod entry;
pub mod error;
pub mod hub;
pub mod service;
pub mod state;
pub mod store;

// Re-export main types
pub use bus::{StateChangeBus, StateChangeSubscription, SubscriptionId};
pub use clock::{parse_timestamp, Clock, ManualClock, SystemClock};
pub use entity::{EntityId, StateChange};
pub use entry::ConfigEntry;
pub use error::{Error, Result};
pub use hub::{Hub, HubBuilder};
pub use service::{
    CommandBus, Notifier, RecordingCommandBus, RecordingNotifier, ServiceCall, TracingCommandBus,
    TracingNotifier,
};
pub use state::StateRegistry;
pub use store::{InMemoryStateStore, JsonFileStore, StateRecord, StateStore};
