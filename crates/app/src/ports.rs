//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod actuator;
pub mod countdown;
pub mod directory;
pub mod notifier;

pub use actuator::{ChangeCallback, DeviceActuator, WatcherHandle};
pub use countdown::{Countdown, CountdownHandle, ExpiryFuture, ExpiryJob};
pub use directory::DeviceDirectory;
pub use notifier::EventNotifier;
