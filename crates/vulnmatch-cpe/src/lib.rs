//! VulnMatch CPE - Common Platform Enumeration parsing and name synthesis
//!
//! This crate provides:
//! - Lossless parsing of CPE 2.2 and CPE 2.3 URIs into `CpeParts`
//! - Canonicalization of free-form vendor/product display names into
//!   CPE-friendly identifiers
//! - Alternative-name expansion used by the product resolver

pub mod names;
pub mod uri;

pub use names::{alternative_names, cpe_friendly_product, cpe_friendly_vendor};
pub use uri::{parse_cpe, CpeParseError, CpeParts, CpeVersion};
