//! # Discovery
//!
//! Coordinator-side enumeration of dispatchable exposures.
//!
//! Responsibilities:
//! - Walk the raw night/expid tree and locate simspec inputs
//! - Read `FLAVOR`/`EXPID` from each input header
//! - Apply night range, flavor whitelist and completeness filters
//! - Produce a deterministic, sorted work list
//!
//! # Example
//!
//! ```no_run
//! use discovery::{discover, DiscoveryOptions};
//! # let blueprint: contracts::RunBlueprint = todo!();
//!
//! let items = discover(&blueprint, blueprint.layout(), DiscoveryOptions::default()).unwrap();
//! for item in &items {
//!     println!("{item}");
//! }
//! ```

mod header;
mod scan;

pub use header::{read_header, write_stub, ExposureHeader};
pub use scan::{discover, Discovery, DiscoveryOptions};
