//! VulnMatch Match - Product resolution and CVE matching
//!
//! Given a software installation identified by `(systype, publisher, title,
//! version, patch, target_sw)`, resolve the product through the alias tables
//! and CPE-friendly name candidates, filter its versioned rows with the
//! vendor-aware version engine, and return the top advisories ranked by
//! CVSS3 base score.

pub mod lookup;
pub mod matcher;
pub mod resolver;

pub use lookup::{find_products_by_cpe, find_products_by_titles, ProductLookup};
pub use matcher::{get_advisory, match_cves};
pub use resolver::{get_vendor, match_product, match_vendor, ProductMatch, VendorMatch};
