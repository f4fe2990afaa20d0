//! # afterglow-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **timer API**: trigger the deferred action, query/cancel
//!   running timers, export the active-timer snapshot
//! - Serve **device listings** with capability filtering and autocomplete
//!   search
//! - Stream timer lifecycle events over **SSE** (`/api/events/stream`)
//! - Map HTTP requests into application calls and application errors into
//!   HTTP status codes
//!
//! ## Dependency rule
//! Depends on `afterglow-app` (scheduler, services, port traits) and
//! `afterglow-domain` (types used in request/response mapping). Never leaks
//! axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
