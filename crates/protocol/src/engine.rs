//! The keep-warm coordination engine.
//!
//! Reacts to keep-warm switch and status-sensor changes, keeps the runtime
//! anchor persisted, and enforces the timeout and abort-status policies on
//! an adaptive tick cadence.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use samovar_core::ResultExt;
use samovar_hub::{
    Clock, CommandBus, Hub, Notifier, ServiceCall, StateChange, StateChangeBus,
    StateChangeSubscription, StateRegistry, StateStore, SubscriptionId,
};

use crate::anchor::RuntimeAnchor;
use crate::config::ProtocolConfig;
use crate::error::{Error, Result};

/// Tick cadence in seconds while the protocol is armed.
pub const ACTIVE_TICK_SECONDS: u64 = 1;
/// Tick cadence in seconds while idle.
pub const IDLE_TICK_SECONDS: u64 = 10;

/// Live state value of a switch that is on.
pub(crate) const SWITCH_ON: &str = "on";

/// Handles owned while the driver task runs.
struct Driver {
    subscription_id: SubscriptionId,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Coordinates the keep-warm protocol for one configured kettle.
///
/// One engine per config entry, owned by its handle and torn down with
/// [`KeepWarmEngine::stop`]; never a process-wide singleton. All anchor
/// mutation happens on the driver task, so queries only ever observe a
/// fully-persisted transition.
pub struct KeepWarmEngine {
    config: ProtocolConfig,
    anchor: RwLock<RuntimeAnchor>,
    registry: Arc<StateRegistry>,
    bus: Arc<StateChangeBus>,
    store: Arc<dyn StateStore>,
    commands: Arc<dyn CommandBus>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    driver: Mutex<Option<Driver>>,
}

impl KeepWarmEngine {
    /// Create an engine wired to the hub collaborators.
    pub fn new(hub: &Hub, store: Arc<dyn StateStore>, config: ProtocolConfig) -> Self {
        Self {
            config,
            anchor: RwLock::new(RuntimeAnchor::new()),
            registry: Arc::clone(&hub.registry),
            bus: Arc::clone(&hub.bus),
            store,
            commands: Arc::clone(&hub.commands),
            notifier: Arc::clone(&hub.notifier),
            clock: Arc::clone(&hub.clock),
            driver: Mutex::new(None),
        }
    }

    /// This engine's configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Load the persisted anchor into memory.
    ///
    /// Called before [`start`](Self::start) so a restart resumes an armed
    /// protocol without waiting for a fresh "on" transition.
    ///
    /// # Errors
    ///
    /// Propagates store failures; a missing record is not an error.
    pub async fn restore(&self) -> Result<()> {
        let record = self.store.load().await?;
        let restored = RuntimeAnchor::restore(record.as_ref());
        if restored.is_armed() {
            info!(start_ts = ?restored.start_ts(), "Restored armed keep-warm anchor");
        }
        *self.anchor.write().await = restored;
        Ok(())
    }

    /// Subscribe to the keep-warm switch and status sensor and spawn the
    /// driver task.
    ///
    /// Takes an `Arc` receiver because the driver task shares ownership of
    /// the engine; call as `Arc::clone(&engine).start()`.
    ///
    /// # Errors
    ///
    /// Fails if the engine is already started.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        let mut driver = self.driver.lock().await;
        if driver.is_some() {
            return Err(Error::lifecycle("engine already started"));
        }

        let watched = [
            self.config.keep_warm_switch.clone(),
            self.config.status_sensor.clone(),
        ];
        let (subscription_id, subscription) = self.bus.subscribe(&watched).await;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(drive(Arc::clone(&self), subscription, shutdown_rx));

        *driver = Some(Driver {
            subscription_id,
            shutdown,
            task,
        });
        info!(
            keep_warm_switch = %self.config.keep_warm_switch,
            status_sensor = %self.config.status_sensor,
            "Keep-warm engine started"
        );
        Ok(())
    }

    /// Stop the driver task and unsubscribe from the bus.
    ///
    /// No-op when never started or already stopped. A tick already
    /// executing completes before the driver exits; nothing fires after
    /// this returns.
    pub async fn stop(&self) {
        let Some(driver) = self.driver.lock().await.take() else {
            return;
        };

        let _ = driver.shutdown.send(true);
        if let Err(e) = driver.task.await {
            if !e.is_cancelled() {
                error!(error = %e, "Keep-warm driver task failed");
            }
        }
        self.bus.unsubscribe(&driver.subscription_id).await;
        info!("Keep-warm engine stopped");
    }

    // ==========================================================================
    // Queries - pure projections of config + anchor + clock + live states
    // ==========================================================================

    /// True iff the keep-warm switch is live "on" AND the anchor is armed.
    ///
    /// Both conditions are required: a switch left "on" across a restart
    /// with no persisted anchor is NOT active.
    pub async fn is_active(&self) -> bool {
        let switch_on = self
            .registry
            .get(&self.config.keep_warm_switch)
            .await
            .is_some_and(|state| state == SWITCH_ON);
        switch_on && self.anchor.read().await.is_armed()
    }

    /// Time left under the keep-warm cap.
    ///
    /// `None` when inactive or the anchor timestamp is unparsable; floors
    /// at zero once the cap is exceeded, never negative.
    pub async fn remaining(&self) -> Option<Duration> {
        if !self.is_active().await {
            return None;
        }

        let start = self.anchor.read().await.start_time()?;
        let elapsed = self.clock.now() - start;
        let rem = self.config.max_duration() - elapsed;
        if rem < Duration::zero() {
            Some(Duration::zero())
        } else {
            Some(rem)
        }
    }

    /// [`remaining`](Self::remaining) rendered as zero-padded `MM:SS`.
    pub async fn remaining_mmss(&self) -> Option<String> {
        let rem = self.remaining().await?;
        let total = rem.num_seconds();
        Some(format!("{:02}:{:02}", total / 60, total % 60))
    }

    /// Human-friendly live status with an optional countdown.
    pub async fn status_live(&self) -> String {
        let status = self
            .registry
            .get(&self.config.status_sensor)
            .await
            .unwrap_or_else(|| "unknown".to_string());

        // Show Warm with countdown while the protocol is active.
        if status == self.config.warm_value && self.is_active().await {
            if let Some(mmss) = self.remaining_mmss().await {
                return format!("Warm ({mmss})");
            }
            return "Warm".to_string();
        }

        // Normalize common cases.
        match status.as_str() {
            "heating" => "Heating".to_string(),
            "standby" => "Standby".to_string(),
            s if s == self.config.warm_value => "Warm".to_string(),
            _ => status,
        }
    }

    /// Cadence until the next tick: fast while armed, slow while idle.
    pub async fn tick_interval(&self) -> std::time::Duration {
        if self.is_active().await {
            std::time::Duration::from_secs(ACTIVE_TICK_SECONDS)
        } else {
            std::time::Duration::from_secs(IDLE_TICK_SECONDS)
        }
    }

    // ==========================================================================
    // Reactions
    // ==========================================================================

    /// React to a state change for a watched entity, then run one eager
    /// tick so abort policy is checked without waiting for the cadence.
    ///
    /// # Errors
    ///
    /// Propagates store failures from anchor persistence.
    pub async fn handle_state_change(&self, change: &StateChange) -> Result<()> {
        let Some(new_value) = change.new_value.as_deref() else {
            // Entity vanished; nothing to anchor on.
            return Ok(());
        };

        if change.entity_id == self.config.keep_warm_switch {
            if new_value == SWITCH_ON {
                self.arm_if_unarmed().await?;
            } else {
                self.clear_if_armed().await?;
            }
        }

        // Status changes are evaluated by the tick; run one now regardless
        // of which entity moved.
        self.tick().await
    }

    /// One policy evaluation: status aborts first, then the timeout cap.
    ///
    /// # Errors
    ///
    /// Propagates store failures from a force-abort.
    pub async fn tick(&self) -> Result<()> {
        if !self.is_active().await {
            return Ok(());
        }

        let status = self.registry.get(&self.config.status_sensor).await;
        if let Some(status) = status.filter(|s| self.config.is_abort_status(s)) {
            return self
                .force_abort(&format!("Abort: status '{status}'"))
                .await;
        }

        if let Some(rem) = self.remaining().await {
            if rem <= Duration::zero() {
                let reason = format!("Max time reached ({} min)", self.config.max_minutes);
                return self.force_abort(&reason).await;
            }
        }

        Ok(())
    }

    /// Turn the keep-warm switch off, clear the anchor, and notify.
    ///
    /// The switch command goes out before the anchor write: if persistence
    /// fails, the kettle has still stopped warming.
    ///
    /// # Errors
    ///
    /// Propagates store failures; command and notification failures are
    /// logged and swallowed.
    pub async fn force_abort(&self, reason: &str) -> Result<()> {
        warn!(
            reason = %reason,
            keep_warm_switch = %self.config.keep_warm_switch,
            "Forcing keep-warm off"
        );

        let call = ServiceCall::turn_off(&self.config.keep_warm_switch);
        self.commands.dispatch(&call).await.into_option_logged();

        self.clear_and_persist().await?;

        let message = format!("{reason}. Keep Warm turned OFF.");
        self.notifier
            .notify("Kettle", &message)
            .await
            .into_option_logged();
        Ok(())
    }

    async fn arm_if_unarmed(&self) -> Result<()> {
        let mut anchor = self.anchor.write().await;
        if anchor.is_armed() {
            debug!("Keep-warm already anchored, repeated 'on' ignored");
            return Ok(());
        }
        anchor.arm(self.clock.now());
        let record = anchor.to_record();
        drop(anchor);

        self.store.save(&record).await?;
        info!("Keep-warm protocol armed");
        Ok(())
    }

    async fn clear_if_armed(&self) -> Result<()> {
        let mut anchor = self.anchor.write().await;
        if !anchor.is_armed() {
            return Ok(());
        }
        anchor.clear();
        let record = anchor.to_record();
        drop(anchor);

        self.store.save(&record).await?;
        info!("Keep-warm protocol disarmed");
        Ok(())
    }

    async fn clear_and_persist(&self) -> Result<()> {
        let mut anchor = self.anchor.write().await;
        anchor.clear();
        let record = anchor.to_record();
        drop(anchor);

        self.store.save(&record).await?;
        Ok(())
    }
}

/// Reactive loop: wake on a watched state change or on the adaptive tick
/// cadence, whichever comes first. Persistence errors are logged here and
/// the loop keeps running; the next tick re-evaluates from scratch.
async fn drive(
    engine: Arc<KeepWarmEngine>,
    mut subscription: StateChangeSubscription,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let interval = engine.tick_interval().await;
        tokio::select! {
            _ = shutdown.changed() => break,
            change = subscription.recv() => match change {
                Ok(change) => {
                    debug!(
                        entity_id = %change.entity_id,
                        new_value = ?change.new_value,
                        "State change received"
                    );
                    if let Err(e) = engine.handle_state_change(&change).await {
                        error!(error = %e, "State-change handling failed");
                    }
                }
                Err(e) => {
                    error!(error = %e, "State-change subscription ended");
                    break;
                }
            },
            () = sleep(interval) => {
                if let Err(e) = engine.tick().await {
                    error!(error = %e, "Tick evaluation failed");
                }
            }
        }
    }
    debug!("Keep-warm driver exited");
}
