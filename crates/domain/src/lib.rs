//! # afterglow-domain
//!
//! Pure domain model for the afterglow deferred-action scheduler.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Capabilities** (named, typed, settable/readable device properties)
//! - Define **Devices** (things that expose capabilities, grouped by zone)
//! - Define **Timer snapshots** (handle-free reporting form of an active countdown)
//! - Define **Events** (`timer_started` / `timer_deleted` realtime records)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod capability;
pub mod device;
pub mod event;
pub mod timer;
