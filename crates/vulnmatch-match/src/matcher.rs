//! CVE matching
//!
//! `match_cves` is the query-time entry point: resolve the product, filter
//! its versioned rows with the version engine, apply the ignore list and
//! target-software specificity, and rank the advisories.

use crate::resolver;
use std::collections::HashSet;
use vulnmatch_core::Result;
use vulnmatch_db::{Advisory, CveMatch, Session, VersionBound, VersionSpec};
use vulnmatch_version::{compare_product, VersionOrder};

/// Number of hits per CVE match for a product, ordered by CVSS3 base score.
const MAX_NUM_HITS: usize = 5;

/// SQLite bound-parameter headroom: advisories are fetched in id chunks of
/// this size.
const ADVISORY_CHUNK_SIZE: usize = 900;

/// Look up an NVD advisory by CVE id (case-insensitive).
pub fn get_advisory(session: &Session, cve: &str) -> Result<Option<Advisory>> {
    session.advisory_by_cve(cve)
}

/// Look up a product by systype ("o"/"a"/"h"), publisher, title, version,
/// patch and target_sw, and return up to [`MAX_NUM_HITS`] matching CVE
/// advisories ordered by CVSS3 base score, sorted alphabetically by CVE id.
pub fn match_cves(
    session: &mut Session,
    systype: &str,
    publisher: &str,
    title: &str,
    version: &str,
    patch: &str,
    target_sw: &str,
) -> Result<Vec<CveMatch>> {
    let cache_key = format!("{}{}{}{}{}{}", systype, publisher, title, version, patch, target_sw);
    if let Some(cached) = session.cached_matches(&cache_key) {
        return Ok(cached.clone());
    }

    let resolution = resolver::match_product(session, publisher, title)?;
    if resolution.product_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Pull all potential matches by product id and filter the items by
    // version here.
    let items = session.find_product_items(&resolution.product_ids, systype)?;

    let mut matched_item_ids: Vec<i64> = Vec::new();
    let mut specific_items: HashSet<i64> = HashSet::new();

    for item in &items {
        let mut specific = false;
        if let Some(sw_target) = &item.sw_target {
            if !sw_target.is_empty() {
                if !match_sw_target(sw_target, target_sw) {
                    continue;
                }
                specific = true;
            }
        }

        let product = match session.product_by_id(item.product_id)? {
            Some(product) => product,
            None => continue,
        };
        let vendor = match session.vendor_by_id(product.vendor_id)? {
            Some(vendor) => vendor,
            None => continue,
        };

        if session.is_ignored(&vendor.name, &product.product_name)? {
            continue;
        }

        let order_against = |template: &str| {
            compare_product(
                &vendor.name,
                &product.product_name,
                template,
                version,
                &item.patch,
                patch,
            )
        };

        let matches = match item.version_spec() {
            VersionSpec::Exact(template) => order_against(&template) == VersionOrder::Equal,
            VersionSpec::Range { start, end } => {
                let (has_start, start_ok) = match &start {
                    VersionBound::Unbounded => (false, true),
                    // Disqualified when version < start (or no ordering).
                    VersionBound::Including(template) => (
                        true,
                        !matches!(
                            order_against(template),
                            VersionOrder::Less | VersionOrder::Incompatible
                        ),
                    ),
                    // Disqualified when version <= start (or no ordering).
                    VersionBound::Excluding(template) => (
                        true,
                        !matches!(
                            order_against(template),
                            VersionOrder::Equal | VersionOrder::Less | VersionOrder::Incompatible
                        ),
                    ),
                };
                let (has_end, end_ok) = match &end {
                    VersionBound::Unbounded => (false, false),
                    // Disqualified when version > end (or no ordering).
                    VersionBound::Including(template) => (
                        true,
                        !matches!(
                            order_against(template),
                            VersionOrder::Greater | VersionOrder::Incompatible
                        ),
                    ),
                    // Disqualified when version >= end (or no ordering).
                    VersionBound::Excluding(template) => (
                        true,
                        !matches!(
                            order_against(template),
                            VersionOrder::Equal | VersionOrder::Greater | VersionOrder::Incompatible
                        ),
                    ),
                };
                // An item without an end range never matches.
                (!has_start || start_ok) && has_end && end_ok
            }
        };

        if matches {
            matched_item_ids.push(item.id);
            if specific {
                specific_items.insert(item.id);
            }
        }
    }

    if matched_item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let vulnerabilities = session.find_vulnerabilities(&matched_item_ids)?;
    if vulnerabilities.is_empty() {
        return Ok(Vec::new());
    }

    let mut advisory_ids: Vec<i64> = Vec::new();
    let mut specific_advisories: HashSet<i64> = HashSet::new();
    for (product_item_id, advisory_id) in vulnerabilities {
        advisory_ids.push(advisory_id);
        if specific_items.contains(&product_item_id) {
            specific_advisories.insert(advisory_id);
        }
    }

    let mut advisories: Vec<Advisory> = Vec::new();
    for chunk in advisory_ids.chunks(ADVISORY_CHUNK_SIZE) {
        let mut ranked = session.find_advisories_ranked(chunk)?;
        ranked.truncate(MAX_NUM_HITS);
        advisories.extend(ranked);
    }

    // Merge the chunks: re-rank by base score (missing score counts as 0)
    // and cap, then sort alphabetically for output stability.
    if advisories.len() > MAX_NUM_HITS {
        advisories.sort_by(|a, b| {
            let a_score = a.cvss3_base_score.unwrap_or(0.0);
            let b_score = b.cvss3_base_score.unwrap_or(0.0);
            b_score.total_cmp(&a_score)
        });
        advisories.truncate(MAX_NUM_HITS);
    }
    advisories.sort_by(|a, b| a.cve_id.cmp(&b.cve_id));

    let matches: Vec<CveMatch> = advisories
        .into_iter()
        .map(|advisory| CveMatch {
            targeted_sw: specific_advisories.contains(&advisory.id),
            advisory,
        })
        .collect();

    session.store_matches(cache_key, matches.clone());
    Ok(matches)
}

/// Normalize a target-software name. The CPE data uses several spellings
/// for the same platform.
fn normalize_sw_target(sw_target: &str) -> String {
    let sw_target = sw_target.to_lowercase();
    match sw_target.as_str() {
        "mac" | "mac_os" | "mac_os_x" => String::from("mac_os_x"),
        "ios" | "ipad" | "iphone_os" | "ipod_touch" => String::from("ios"),
        _ => sw_target,
    }
}

/// Match a template sw_target against the queried one. The sw_target part
/// of a CPE marks vulnerabilities that apply only on a certain platform; a
/// template shorter than two characters (empty, `*`, `-`) matches anything,
/// while a set template does not match an empty target.
pub fn match_sw_target(template: &str, target: &str) -> bool {
    if template.chars().count() < 2 {
        return true;
    }

    normalize_sw_target(template) == normalize_sw_target(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_sw_target_short_template_always_matches() {
        assert!(match_sw_target("", ""));
        assert!(match_sw_target("*", "windows"));
        assert!(match_sw_target("-", ""));
    }

    #[test]
    fn test_match_sw_target_set_template() {
        assert!(match_sw_target("windows", "Windows"));
        assert!(!match_sw_target("windows", ""));
        assert!(!match_sw_target("windows", "linux"));
    }

    #[test]
    fn test_match_sw_target_normalization() {
        assert!(match_sw_target("iphone_os", "ios"));
        assert!(match_sw_target("ipad", "ipod_touch"));
        assert!(match_sw_target("mac", "mac_os_x"));
        assert!(!match_sw_target("mac", "ios"));
    }
}
