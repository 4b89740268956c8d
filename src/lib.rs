//! # route53-sync
//!
//! A dynamic DNS updater for Amazon Route 53.
//!
//! Each run looks up the machine's public IPv4 address, reads `zoneId,hostname`
//! pairs from a hostnames file, and upserts an A record for every hostname,
//! one change batch per hosted zone.
//!
//! ## Usage
//!
//! ```bash
//! # Update all records
//! route53-sync sync
//!
//! # Show what would be sent
//! route53-sync sync --dry-run
//!
//! # Check the hostnames file
//! route53-sync validate
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod hostnames;
pub mod providers;
pub mod sync;
pub mod updater;

pub use config::Config;
pub use detector::IpResolver;
pub use error::{Result, SyncError};
pub use sync::{SyncReport, Syncer};
