//! VulnMatch DB - SQLite artifact storage
//!
//! The vulnerability database is a single SQLite file, rebuilt from scratch
//! on every ingestion run and treated as immutable afterwards. This crate
//! provides:
//! - The artifact schema and its preseeded platform rows
//! - Row models for every table
//! - `Session`: a connection wrapper with transaction recycling, insertion
//!   statistics and per-session caches
//! - `VulnDb`: the artifact holder that query code opens sessions through,
//!   reloading when the file changes

pub mod models;
pub mod schema;
pub mod session;
pub mod vulndb;

pub use models::{
    Advisory, CveMatch, IgnoreListItem, Platform, PlatformVulnerability, Product, ProductAlias,
    ProductItem, Vendor, VendorAlias, VendorCvssEntry, VersionBound, VersionSpec, Windows10Version,
};
pub use schema::{SOURCE_CISCO, SOURCE_CPE, SOURCE_MSRC, SOURCE_REDHAT_OVAL};
pub use session::Session;
pub use vulndb::VulnDb;
