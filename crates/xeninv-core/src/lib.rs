//! xeninv-core: inventory synthesis engine
//!
//! Transforms the flat record maps returned by a XenServer / Xen Orchestra
//! deployment into a grouped, tagged, variable-annotated inventory graph,
//! then applies user-defined composition rules on top of the native groups.

pub mod compose;
pub mod config;
pub mod error;
pub mod graph;
pub mod naming;
pub mod record;
pub mod synth;

pub use compose::{ComposeConfig, KeyedGroup};
pub use config::Config;
pub use error::CoreError;
pub use graph::{Entry, Group, InventoryGraph};
pub use record::{Record, RecordMap, Snapshot};
pub use synth::{HOST_GROUP, POOL_GROUP, PowerState, synthesize};
