//! Inventory collection for osreport.
//!
//! A [`Collector`] produces a complete [`Report`](osreport_types::Report)
//! from some inventory source. The refresh pipeline only ever talks to this
//! trait, so the source can be swapped without touching the rest of the
//! service.

pub mod collector;
pub mod error;
pub mod inventory;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use collector::{Collector, SharedCollector};
pub use error::{CollectionError, Result};
pub use inventory::{Inventory, InventoryFileCollector};

#[cfg(any(test, feature = "testing"))]
pub use mock::MockCollector;
