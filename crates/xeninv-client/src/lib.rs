//! xeninv-client: XenServer API boundary adapter
//!
//! Thin JSON-RPC client for a XenServer / Xen Orchestra deployment plus the
//! on-disk snapshot cache. Every remote failure is translated into a
//! `ClientError` carrying the remote diagnostic; callers never see raw
//! transport errors.
//!
//! # Example
//!
//! ```no_run
//! use xeninv_client::{TransportConfig, XenSession, fetch_snapshot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = XenSession::connect(
//!     "xoa.example.org",
//!     "root",
//!     "secret",
//!     TransportConfig::default(),
//! )
//! .await?;
//!
//! let snapshot = fetch_snapshot(&session).await?;
//! println!("{} VMs", snapshot.vms.len());
//!
//! session.logout().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod object_class;
pub mod rpc;

pub use cache::SnapshotCache;
pub use error::{ClientError, Result};
pub use object_class::ObjectClass;
pub use rpc::{TransportConfig, XenSession, fetch_snapshot};
