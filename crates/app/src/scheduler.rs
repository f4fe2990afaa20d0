//! Device timer scheduler — the orchestrator for deferred actions.
//!
//! `trigger` decides whether to (re)apply an action, computes the expiry,
//! arms a countdown, and records the timer. At expiry the device is turned
//! off or restored to its pre-action value; a manual-off watcher cancels the
//! timer when the user turns the device off by hand.
//!
//! All registry mutations — trigger, cancel, expiry, manual-off — run under
//! one `tokio::sync::Mutex` held across their actuator awaits, so every
//! interleaving collapses to a real serialization. Handles are re-validated
//! under that lock, which makes a countdown or watcher that lost a race
//! against cancellation a harmless no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use afterglow_domain::capability::{Capability, CapabilityValue};
use afterglow_domain::error::{AfterglowError, ValidationError};
use afterglow_domain::event::TimerEvent;
use afterglow_domain::id::DeviceId;
use afterglow_domain::time::{Timestamp, now};
use afterglow_domain::timer::TimerExport;

use crate::ports::{Countdown, CountdownHandle, DeviceActuator, EventNotifier, WatcherHandle};
use crate::registry::{TimerEntry, TimerRegistry};

/// Inputs for one trigger of the deferred action.
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub device: DeviceId,
    /// The capability the action sets (e.g. `onoff`, `dim`).
    pub capability: Capability,
    /// The value to apply.
    pub value: CapabilityValue,
    /// Countdown length; zero or negative fires immediately.
    pub duration_secs: i64,
    /// Ignore the device's current on state and always act.
    pub ignore_when_on: bool,
    /// Allow replacing an existing timer even when it would fire later.
    pub overrule_longer: bool,
    /// Capture the pre-action value and reapply it at expiry instead of
    /// turning the device off.
    pub restore: bool,
}

impl TriggerRequest {
    /// Build a request with all policy flags off.
    #[must_use]
    pub fn new(
        device: DeviceId,
        capability: Capability,
        value: CapabilityValue,
        duration_secs: i64,
    ) -> Self {
        Self {
            device,
            capability,
            value,
            duration_secs,
            ignore_when_on: false,
            overrule_longer: false,
            restore: false,
        }
    }

    #[must_use]
    pub fn ignore_when_on(mut self, ignore_when_on: bool) -> Self {
        self.ignore_when_on = ignore_when_on;
        self
    }

    #[must_use]
    pub fn overrule_longer(mut self, overrule_longer: bool) -> Self {
        self.overrule_longer = overrule_longer;
        self
    }

    #[must_use]
    pub fn restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }
}

/// What a call to [`DeviceTimerScheduler::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The action was applied (or the running timer replaced) and a
    /// countdown is armed until `expires_at`.
    Armed { expires_at: Timestamp },
    /// Nothing to do: the device is on, no forced trigger, and any running
    /// timer already covers at least the requested duration.
    Skipped,
}

/// The deferred-action scheduler.
///
/// Generic over the actuator, notifier, and countdown ports to avoid dynamic
/// dispatch. Constructed inside an [`Arc`] because expiry jobs and watcher
/// callbacks keep a weak back-reference to the scheduler.
pub struct DeviceTimerScheduler<A, N, C> {
    actuator: A,
    notifier: N,
    countdown: C,
    registry: Mutex<TimerRegistry>,
}

impl<A, N, C> DeviceTimerScheduler<A, N, C>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
{
    /// Create a new scheduler with an empty registry.
    pub fn new(actuator: A, notifier: N, countdown: C) -> Arc<Self> {
        Arc::new(Self {
            actuator,
            notifier,
            countdown,
            registry: Mutex::new(TimerRegistry::default()),
        })
    }

    /// Conditionally apply the action and (re)arm a countdown for the device.
    ///
    /// A no-op (`Ok(Skipped)`, no side effects) unless at least one holds:
    /// the trigger is forced (`ignore_when_on`), a timer is already running
    /// and may be replaced (`overrule_longer` or the new expiry is later),
    /// or the device currently reads as off.
    ///
    /// # Errors
    ///
    /// Returns [`AfterglowError::Validation`] when `duration_secs` is beyond
    /// the representable expiry range, and propagates actuator failures
    /// ([`AfterglowError::DeviceUnavailable`],
    /// [`AfterglowError::CapabilityUnsupported`]); on error no registry
    /// mutation is committed.
    #[tracing::instrument(skip(self, request), fields(device = %request.device))]
    pub async fn trigger(
        self: &Arc<Self>,
        request: TriggerRequest,
    ) -> Result<TriggerOutcome, AfterglowError> {
        let mut registry = self.registry.lock().await;
        let expires_at = chrono::Duration::try_seconds(request.duration_secs)
            .and_then(|offset| now().checked_add_signed(offset))
            .ok_or(ValidationError::DurationOutOfRange {
                seconds: request.duration_secs,
            })?;

        if !self.should_act(&registry, &request, expires_at).await? {
            tracing::debug!("trigger skipped, device on and existing timer covers the duration");
            return Ok(TriggerOutcome::Skipped);
        }

        let (watcher, restore_value) = match registry.remove(request.device) {
            Some(previous) => {
                // Rescheduling: only the countdown is replaced. The
                // manual-off subscription is reused and the captured restore
                // value is never recomputed.
                self.countdown.cancel(previous.countdown);
                tracing::debug!("rescheduling running timer");
                (previous.watcher, previous.restore_value)
            }
            None => {
                let restore_value = if request.restore {
                    self.capture_restore_value(request.device, &request.capability)
                        .await?
                } else {
                    None
                };
                self.actuator
                    .set_value(request.device, &request.capability, request.value.clone())
                    .await?;
                let watcher = self.watch_manual_off(request.device).await?;
                tracing::debug!(capability = %request.capability, "applied action for fresh timer");
                (watcher, restore_value)
            }
        };

        let delay = Duration::from_secs(u64::try_from(request.duration_secs.max(0)).unwrap_or(0));
        let countdown = self.arm(request.device, delay);
        registry.put(TimerEntry {
            device: request.device,
            capability: request.capability.clone(),
            target_value: request.value.clone(),
            restore_value: restore_value.clone(),
            expires_at,
            countdown,
            watcher,
        });
        tracing::info!(%expires_at, "timer armed");

        let event = TimerEvent::started(
            request.device,
            request.capability,
            request.value,
            restore_value,
            registry.export(),
        );
        self.notifier.notify(event).await?;

        Ok(TriggerOutcome::Armed { expires_at })
    }

    /// Whether a timer is currently running for `device`.
    ///
    /// Pure registry query, no side effects; exposed as a flow condition.
    pub async fn is_timer_running(&self, device: DeviceId) -> bool {
        self.registry.lock().await.contains(device)
    }

    /// Ordered, handle-free snapshot of all active timers.
    pub async fn export(&self) -> TimerExport {
        self.registry.lock().await.export()
    }

    /// Cancel a running timer without touching the device's current state.
    ///
    /// Idempotent: returns `Ok(false)` when no timer is running. Cancellation
    /// only stops the pending off/restore action, it is not a rollback.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; stale watcher handles are logged and
    /// ignored, and the notifier never fails with zero subscribers.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_timer(&self, device: DeviceId) -> Result<bool, AfterglowError> {
        let mut registry = self.registry.lock().await;
        let Some(entry) = registry.remove(device) else {
            tracing::debug!("no timer to cancel");
            return Ok(false);
        };

        self.countdown.cancel(entry.countdown);
        if let Err(err) = self.actuator.unsubscribe(entry.watcher).await {
            tracing::debug!(%err, "watcher already released");
        }
        tracing::info!("timer cancelled");

        let event = TimerEvent::deleted(device, registry.export());
        self.notifier.notify(event).await?;
        Ok(true)
    }

    /// Evaluate the decision-to-act conditions, cheapest first. The actuator
    /// round-trip only happens when neither the force flag nor an existing
    /// entry already decides.
    async fn should_act(
        &self,
        registry: &TimerRegistry,
        request: &TriggerRequest,
        expires_at: Timestamp,
    ) -> Result<bool, AfterglowError> {
        if request.ignore_when_on {
            return Ok(true);
        }
        if let Some(entry) = registry.get(request.device) {
            if request.overrule_longer || expires_at > entry.expires_at {
                return Ok(true);
            }
        }
        let current = self
            .actuator
            .get_value(request.device, &Capability::OnOff)
            .await?;
        Ok(!current.is_on())
    }

    /// Read the pre-action value of `capability`, but only when the device
    /// is currently on — a device that is off has nothing worth restoring.
    async fn capture_restore_value(
        &self,
        device: DeviceId,
        capability: &Capability,
    ) -> Result<Option<CapabilityValue>, AfterglowError> {
        let on = self
            .actuator
            .get_value(device, &Capability::OnOff)
            .await?
            .is_on();
        if !on {
            return Ok(None);
        }
        let previous = self.actuator.get_value(device, capability).await?;
        Ok(Some(previous))
    }

    /// Subscribe an `onoff` watcher that cancels the timer when the device
    /// is observed going off outside the scheduler.
    async fn watch_manual_off(
        self: &Arc<Self>,
        device: DeviceId,
    ) -> Result<WatcherHandle, AfterglowError> {
        let scheduler = Arc::downgrade(self);
        self.actuator
            .subscribe(
                device,
                &Capability::OnOff,
                Box::new(move |watcher, value| {
                    if value.is_on() {
                        return;
                    }
                    let Some(scheduler) = scheduler.upgrade() else {
                        return;
                    };
                    tokio::spawn(async move {
                        scheduler.handle_manual_off(device, watcher).await;
                    });
                }),
            )
            .await
    }

    /// Arm the countdown; the job captures only the device id and receives
    /// its own handle at fire time.
    fn arm(self: &Arc<Self>, device: DeviceId, delay: Duration) -> CountdownHandle {
        let scheduler = Arc::downgrade(self);
        self.countdown.schedule(
            delay,
            Box::new(move |handle| {
                Box::pin(async move {
                    if let Some(scheduler) = scheduler.upgrade() {
                        scheduler.handle_expiry(device, handle).await;
                    }
                })
            }),
        )
    }

    /// The expiry action: turn the device off, or restore its pre-action
    /// value when one was captured.
    async fn handle_expiry(self: Arc<Self>, device: DeviceId, handle: CountdownHandle) {
        let mut registry = self.registry.lock().await;
        let live = registry
            .get(device)
            .is_some_and(|entry| entry.countdown == handle);
        if !live {
            tracing::debug!(device = %device, "stale countdown fired, cancellation won the race");
            return;
        }
        let Some(entry) = registry.remove(device) else {
            return;
        };

        if let Err(err) = self.actuator.unsubscribe(entry.watcher).await {
            tracing::debug!(%err, device = %device, "watcher already released");
        }

        let write = match &entry.restore_value {
            None => {
                self.actuator
                    .set_value(device, &Capability::OnOff, CapabilityValue::Bool(false))
                    .await
            }
            Some(previous) => {
                self.actuator
                    .set_value(device, &entry.capability, previous.clone())
                    .await
            }
        };
        // The countdown is spent either way; a kept entry would out-live its
        // handle and block future triggers, so the timer is dropped even
        // when the device write fails.
        if let Err(err) = write {
            tracing::warn!(%err, device = %device, "device write failed at expiry, dropping timer anyway");
        } else {
            tracing::info!(
                device = %device,
                restored = entry.restore_value.is_some(),
                "timer fired"
            );
        }

        let event = TimerEvent::deleted(device, registry.export());
        if let Err(err) = self.notifier.notify(event).await {
            tracing::warn!(%err, device = %device, "failed to publish timer_deleted");
        }
    }

    /// Manual-off cleanup: same as cancel, and crucially no off command is
    /// sent — the user already turned the device off.
    async fn handle_manual_off(self: Arc<Self>, device: DeviceId, watcher: WatcherHandle) {
        let mut registry = self.registry.lock().await;
        let live = registry
            .get(device)
            .is_some_and(|entry| entry.watcher == watcher);
        if !live {
            tracing::debug!(device = %device, "stale watcher fired, ignoring");
            return;
        }
        let Some(entry) = registry.remove(device) else {
            return;
        };

        self.countdown.cancel(entry.countdown);
        if let Err(err) = self.actuator.unsubscribe(entry.watcher).await {
            tracing::debug!(%err, device = %device, "watcher already released");
        }
        tracing::info!(device = %device, "timer cancelled after manual off");

        let event = TimerEvent::deleted(device, registry.export());
        if let Err(err) = self.notifier.notify(event).await {
            tracing::warn!(%err, device = %device, "failed to publish timer_deleted");
        }
    }
}
