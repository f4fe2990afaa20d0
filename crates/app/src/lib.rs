//! # afterglow-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceActuator` — read/write capability values, watch for changes
//!   - `EventNotifier` — publish timer lifecycle events
//!   - `Countdown` — arm and cancel deferred callbacks
//!   - `DeviceDirectory` — list known devices
//! - Provide the **core scheduler** (`DeviceTimerScheduler`) that decides
//!   whether to (re)trigger an action, arms countdowns, and applies the
//!   restore-or-off policy at expiry
//! - Own the **timer registry** (the only shared mutable state)
//! - Provide **in-process infrastructure** (event bus, tokio countdown) that
//!   doesn't need IO
//!
//! ## Dependency rule
//! Depends on `afterglow-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod countdown;
pub mod event_bus;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod services;
