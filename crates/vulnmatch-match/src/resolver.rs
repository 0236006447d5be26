//! Vendor and product resolution
//!
//! Inventory data identifies software by raw publisher/title display
//! strings. Resolution tries the curated alias tables first and falls back
//! to CPE-friendly name synthesis.

use tracing::debug;
use vulnmatch_cpe::{alternative_names, cpe_friendly_product, cpe_friendly_vendor};
use vulnmatch_core::Result;
use vulnmatch_db::{Session, Vendor};

/// How a vendor was resolved.
#[derive(Debug, Clone)]
pub struct VendorMatch {
    pub vendor: Vendor,
    /// True if resolved through a vendor alias
    pub from_alias: bool,
    /// The alias that matched, if any
    pub vendor_alias: String,
    /// True if resolved through the CPE-friendly name
    pub cpe_friendly_match: bool,
    /// The CPE-friendly name that matched, if any
    pub cpe_friendly_name: String,
}

/// Resolve `vendor_name` to a vendor:
/// 1. Exact match on the canonical vendor name.
/// 2. Exact match on a vendor alias, dereferenced to its vendor.
/// 3. Exact match of the CPE-friendly form of the name.
/// Returns `None` when nothing matches.
pub fn match_vendor(session: &mut Session, vendor_name: &str) -> Result<Option<VendorMatch>> {
    if let Some(vendor) = session.vendor_by_name(vendor_name)? {
        return Ok(Some(VendorMatch {
            vendor,
            from_alias: false,
            vendor_alias: String::new(),
            cpe_friendly_match: false,
            cpe_friendly_name: String::new(),
        }));
    }

    if let Some(alias) = session.vendor_alias_by_alias(vendor_name)? {
        if let Some(vendor) = session.vendor_by_id(alias.vendor_id)? {
            return Ok(Some(VendorMatch {
                vendor,
                from_alias: true,
                vendor_alias: alias.alias,
                cpe_friendly_match: false,
                cpe_friendly_name: String::new(),
            }));
        }
        debug!("vendor alias '{}' references missing vendor", alias.alias);
        return Ok(None);
    }

    let cpe_friendly = cpe_friendly_vendor(vendor_name);
    if let Some(vendor) = session.vendor_by_name(&cpe_friendly)? {
        return Ok(Some(VendorMatch {
            vendor,
            from_alias: false,
            vendor_alias: String::new(),
            cpe_friendly_match: true,
            cpe_friendly_name: cpe_friendly,
        }));
    }

    Ok(None)
}

/// Resolve `vendor_name` to its vendor row, dropping the match details.
pub fn get_vendor(session: &mut Session, vendor_name: &str) -> Result<Option<Vendor>> {
    Ok(match_vendor(session, vendor_name)?.map(|m| m.vendor))
}

/// Result of resolving a `(publisher, title)` pair to products.
#[derive(Debug, Clone, Default)]
pub struct ProductMatch {
    pub product_ids: Vec<i64>,
    /// True if resolved through a product alias
    pub alias_match: bool,
    /// True if one of the matches was the CPE-friendly product name
    pub cpe_friendly_match: bool,
    /// The CPE-friendly product name, when it matched
    pub cpe_friendly_name: String,
}

/// Resolve a `(publisher, title)` pair to product ids:
/// 1. Product alias lookup: exact vendor alias, GLOB product alias.
/// 2. Otherwise resolve the vendor and query the title plus the
///    CPE-friendly name candidates under it.
/// An empty `product_ids` means no match.
pub fn match_product(session: &mut Session, publisher: &str, title: &str) -> Result<ProductMatch> {
    let mut result = ProductMatch::default();

    if let Some(alias) = session.find_product_alias_match(publisher, title)? {
        result.alias_match = true;
        result.product_ids.push(alias.product_id);
        return Ok(result);
    }

    let vendor = match get_vendor(session, publisher)? {
        Some(vendor) => vendor,
        None => return Ok(result),
    };

    // Try both the title directly and the prepared CPE-friendly name.
    let cpe_friendly = cpe_friendly_product(title, &vendor.name);
    let mut candidates = vec![title.to_string()];
    candidates.extend(alternative_names(&cpe_friendly));

    let products = session.find_products_by_names(vendor.id, &candidates)?;
    for product in products {
        if product.product_name == cpe_friendly {
            result.cpe_friendly_match = true;
            result.cpe_friendly_name = cpe_friendly.clone();
        }
        result.product_ids.push(product.id);
    }

    Ok(result)
}
