//! Registry of in-flight refresh sessions.
//!
//! Each refresh owns a bounded progress outlet:
//! - [`SessionRegistry::create`] hands the producing half ([`ProgressOutlet`])
//!   to the refresh task and keeps the consuming half under the session id
//! - [`SessionRegistry::attach`] gives observers a [`ProgressSubscription`]
//! - [`SessionRegistry::destroy`] unregisters the session; the outlet itself
//!   closes when the producer drops its [`ProgressOutlet`]
//!
//! Pushing never blocks the producer: when an outlet is full, the event is
//! dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use osreport_session::{RegistryConfig, SessionRegistry};
//!
//! let registry = SessionRegistry::new(RegistryConfig::default());
//! let (id, outlet) = registry.create();
//! outlet.try_push(ProgressMessage::start("Starting"));
//!
//! let mut sub = registry.attach(&id)?;
//! while let Some(msg) = sub.next().await { /* ... */ }
//! ```

mod config;
mod error;
mod outlet;
mod registry;

pub use config::{DEFAULT_OUTLET_CAPACITY, RegistryConfig};
pub use error::{Error, Result};
pub use outlet::{ProgressOutlet, ProgressSubscription, PushOutcome};
pub use registry::SessionRegistry;
